use rayon::prelude::*;
use serde::Serialize;

use liuhe_data::models::{is_valid_value, DrawRecord, VALUE_COUNT};

use crate::config::EngineConfig;
use crate::scoring::{compose_scores, rank_of};
use crate::stats::AttributeStatistics;
use crate::strategy::{StrategyWeights, BALANCED, DEFAULT_STRATEGY};

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub name: String,
    /// Rang du numéro réellement sorti pour chaque tirage test (0 = meilleur)
    pub ranks: Vec<usize>,
    pub total_rank: usize,
    /// Tirages tests dont le numéro sorti était classé sous `hit_cutoff`
    pub hits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategySelection {
    pub index: usize,
    pub strategy: StrategyWeights,
    /// Vrai si l'historique était trop court et que la stratégie par défaut a été retenue
    pub skipped: bool,
    pub test_size: usize,
    pub reports: Vec<StrategyReport>,
}

/// Nombre de tirages rejoués, 0 si l'historique est sous `min_history`.
pub fn effective_test_size(history_len: usize, config: &EngineConfig) -> usize {
    let bt = &config.backtest;
    if history_len < bt.min_history {
        return 0;
    }
    bt.test_size.min(history_len.saturating_sub(bt.min_training))
}

/// Rejoue chaque stratégie sur les tirages les plus récents : pour le tirage `i`,
/// seules les données strictement plus anciennes (`history[i+1..]`, bornées à
/// `train_window`) servent à classer les 49 numéros. La stratégie au rang cumulé
/// le plus bas l'emporte ; à égalité, la plus petite position dans le catalogue.
///
/// Un catalogue vide retombe sur `BALANCED`, sans backtest.
pub fn select_strategy(
    history: &[DrawRecord],
    catalog: &[StrategyWeights],
    config: &EngineConfig,
) -> StrategySelection {
    if catalog.is_empty() {
        log::warn!("Catalogue de stratégies vide : stratégie {} utilisée", BALANCED.name);
        return StrategySelection {
            index: 0,
            strategy: BALANCED,
            skipped: true,
            test_size: 0,
            reports: Vec::new(),
        };
    }

    let test_size = effective_test_size(history.len(), config);
    if test_size == 0 {
        let index = DEFAULT_STRATEGY.min(catalog.len() - 1);
        log::debug!(
            "Backtest ignoré : {} tirages (minimum {}), stratégie {}",
            history.len(),
            config.backtest.min_history,
            catalog[index].name
        );
        return StrategySelection {
            index,
            strategy: catalog[index].clone(),
            skipped: true,
            test_size: 0,
            reports: Vec::new(),
        };
    }

    let train_window = config.backtest.train_window.max(1);
    let per_test: Vec<Option<Vec<usize>>> = (0..test_size)
        .into_par_iter()
        .map(|i| {
            let target = history[i].special;
            if !is_valid_value(target) {
                return None;
            }
            let end = (i + 1 + train_window).min(history.len());
            let train = &history[i + 1..end];
            let stats = AttributeStatistics::compute(train, &config.stats);
            let ranks = catalog
                .iter()
                .map(|strategy| {
                    let ranked = compose_scores(&stats, strategy, train.first(), &config.scoring);
                    rank_of(&ranked, target).unwrap_or(VALUE_COUNT)
                })
                .collect();
            Some(ranks)
        })
        .collect();

    let reports: Vec<StrategyReport> = catalog
        .iter()
        .enumerate()
        .map(|(s, strategy)| {
            let ranks: Vec<usize> = per_test.iter().flatten().map(|r| r[s]).collect();
            StrategyReport {
                name: strategy.name.to_string(),
                total_rank: ranks.iter().sum(),
                hits: ranks.iter().filter(|&&r| r < config.backtest.hit_cutoff).count(),
                ranks,
            }
        })
        .collect();

    let mut index = 0;
    for (s, report) in reports.iter().enumerate() {
        if report.total_rank < reports[index].total_rank {
            index = s;
        }
    }

    for report in &reports {
        log::debug!(
            "Backtest {} : rang cumulé {} ({} / {} sous le rang {})",
            report.name,
            report.total_rank,
            report.hits,
            report.ranks.len(),
            config.backtest.hit_cutoff
        );
    }
    log::info!("Stratégie retenue : {} ({} tirages rejoués)", catalog[index].name, test_size);

    StrategySelection {
        index,
        strategy: catalog[index].clone(),
        skipped: false,
        test_size,
        reports,
    }
}
