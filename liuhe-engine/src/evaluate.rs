use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use liuhe_data::models::{is_valid_value, DrawRecord, VALUE_COUNT};

use crate::attributes::{category_of, table};
use crate::config::EngineConfig;
use crate::recommend::{recommend, RecommendationResult};

/// Confrontation d'une recommandation au numéro spécial effectivement tiré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitReport {
    pub special: u8,
    pub value_hit: bool,
    pub core_hit: bool,
    pub category_hit: bool,
    pub head_hit: bool,
    pub tail_hit: bool,
    pub color_hit: bool,
}

impl HitReport {
    pub fn flags(&self) -> [bool; 6] {
        [
            self.value_hit,
            self.core_hit,
            self.category_hit,
            self.head_hit,
            self.tail_hit,
            self.color_hit,
        ]
    }
}

pub const HIT_LABELS: [&str; 6] = ["Numéros (18)", "Noyau (8)", "Signes", "Dizaines", "Unités", "Couleurs"];

/// Un numéro hors 1..=49 ne touche rien.
pub fn evaluate(result: &RecommendationResult, special: u8) -> HitReport {
    let Some(info) = category_of(special) else {
        return HitReport {
            special,
            value_hit: false,
            core_hit: false,
            category_hit: false,
            head_hit: false,
            tail_hit: false,
            color_hit: false,
        };
    };

    HitReport {
        special,
        value_hit: result.top_values.contains(&special),
        core_hit: result.core_values.contains(&special),
        category_hit: result.top_categories.contains(&info.zodiac),
        head_hit: result.top_heads.contains(&info.head),
        tail_hit: result.top_tails.contains(&info.tail),
        color_hit: result.top_colors.contains(&info.color),
    }
}

/// Part des 49 numéros couverte par chaque agrégat : probabilité de succès
/// d'un tirage uniforme.
pub fn coverage(result: &RecommendationResult) -> [f64; 6] {
    let mut covered = [0usize; 6];
    covered[0] = result.top_values.len();
    covered[1] = result.core_values.len();
    for info in table() {
        if result.top_categories.contains(&info.zodiac) {
            covered[2] += 1;
        }
        if result.top_heads.contains(&info.head) {
            covered[3] += 1;
        }
        if result.top_tails.contains(&info.tail) {
            covered[4] += 1;
        }
        if result.top_colors.contains(&info.color) {
            covered[5] += 1;
        }
    }
    covered.map(|c| c as f64 / VALUE_COUNT as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub draw_id: String,
    pub strategy: String,
    pub confidence: u8,
    pub report: HitReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct HitRate {
    pub label: &'static str,
    pub hits: usize,
    pub rate: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub steps: Vec<ReplayStep>,
    pub rates: Vec<HitRate>,
    /// Nombre de fois où chaque stratégie a été retenue, dans l'ordre de première apparition
    pub strategy_counts: Vec<(String, usize)>,
    pub mean_confidence: f64,
}

impl ReplaySummary {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub fn replay(history: &[DrawRecord], last: usize, config: &EngineConfig) -> ReplaySummary {
    replay_with(history, last, config, || {})
}

/// Rejoue la recommandation sur les `last` tirages les plus récents : le tirage
/// `i` est prédit à partir de `history[i+1..]` uniquement. `on_step` est appelé
/// après chaque rejeu (barre de progression).
pub fn replay_with<F>(history: &[DrawRecord], last: usize, config: &EngineConfig, on_step: F) -> ReplaySummary
where
    F: Fn() + Sync + Send,
{
    let n = last.min(history.len().saturating_sub(1));

    let outcomes: Vec<Option<(ReplayStep, [f64; 6])>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let target = &history[i];
            let outcome = if is_valid_value(target.special) {
                let result = recommend(&history[i + 1..], config);
                let step = ReplayStep {
                    draw_id: target.draw_id.clone(),
                    strategy: result.strategy.clone(),
                    confidence: result.confidence,
                    report: evaluate(&result, target.special),
                };
                Some((step, coverage(&result)))
            } else {
                log::debug!("Rejeu ignoré pour le tirage {} : numéro spécial invalide", target.draw_id);
                None
            };
            on_step();
            outcome
        })
        .collect();

    let mut steps = Vec::with_capacity(n);
    let mut hits = [0usize; 6];
    let mut baselines = [0.0f64; 6];
    let mut strategy_counts: Vec<(String, usize)> = Vec::new();

    for (step, cover) in outcomes.into_iter().flatten() {
        for (k, hit) in step.report.flags().into_iter().enumerate() {
            if hit {
                hits[k] += 1;
            }
            baselines[k] += cover[k];
        }
        match strategy_counts.iter_mut().find(|(name, _)| *name == step.strategy) {
            Some((_, count)) => *count += 1,
            None => strategy_counts.push((step.strategy.clone(), 1)),
        }
        steps.push(step);
    }

    let total = steps.len();
    let ratio = |x: f64| if total == 0 { 0.0 } else { x / total as f64 };

    let rates = HIT_LABELS
        .iter()
        .enumerate()
        .map(|(k, &label)| HitRate {
            label,
            hits: hits[k],
            rate: ratio(hits[k] as f64),
            baseline: ratio(baselines[k]),
        })
        .collect();

    let mean_confidence = ratio(steps.iter().map(|s| s.confidence as f64).sum());

    log::info!("Rejeu terminé : {} tirages évalués", total);

    ReplaySummary {
        steps,
        rates,
        strategy_counts,
        mean_confidence,
    }
}
