pub mod aggregate;

use serde::{Deserialize, Serialize};

use liuhe_data::models::DrawRecord;

use crate::attributes::{ColorBand, Zodiac};
use crate::backtest::{select_strategy, StrategySelection};
use crate::config::EngineConfig;
use crate::scoring::{compose_scores, ScoredCandidate};
use crate::stats::AttributeStatistics;
use crate::strategy::{StrategyWeights, CATALOG};
use aggregate::{
    core_values, select_values, strongest_pattern, top_categories, top_colors, top_heads, top_tails,
    TransitionPattern, CORE_VALUE_COUNT, TOP_CATEGORY_COUNT, TOP_COLOR_COUNT, TOP_HEAD_COUNT, TOP_TAIL_COUNT,
};

const BASE_CONFIDENCE: f64 = 75.0;
const MIN_CONFIDENCE: u8 = 50;
const MAX_CONFIDENCE: u8 = 99;
/// Plafond de confiance sous `SMALL_HISTORY` tirages
const SMALL_HISTORY_CAP: f64 = 65.0;
const SMALL_HISTORY: usize = 10;
/// En dessous, la justification signale un échantillon réduit
const SAMPLE_WARNING: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub draw_count: usize,
    pub strategy: String,
    pub top_categories: Vec<Zodiac>,
    pub top_values: Vec<u8>,
    pub core_values: Vec<u8>,
    pub top_heads: Vec<u8>,
    pub top_tails: Vec<u8>,
    pub top_colors: Vec<ColorBand>,
    pub pattern: Option<TransitionPattern>,
    pub rationale: String,
    pub confidence: u8,
}

impl RecommendationResult {
    /// Résultat dégradé quand aucun tirage exploitable n'est disponible.
    pub fn insufficient(strategy: &str) -> Self {
        Self {
            draw_count: 0,
            strategy: strategy.to_string(),
            top_categories: Vec::new(),
            top_values: Vec::new(),
            core_values: Vec::new(),
            top_heads: Vec::new(),
            top_tails: Vec::new(),
            top_colors: Vec::new(),
            pattern: None,
            rationale: "Aucun tirage exploitable : impossible d'établir une recommandation. \
                        Importez un historique pour obtenir une analyse."
                .to_string(),
            confidence: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_values.is_empty()
    }
}

/// État intermédiaire du pipeline, exposé pour l'affichage détaillé.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub selection: StrategySelection,
    pub stats: AttributeStatistics,
    pub ranked: Vec<ScoredCandidate>,
}

/// Tronque l'historique, choisit la stratégie par backtest puis score les 49 numéros.
pub fn analyze(history: &[DrawRecord], config: &EngineConfig) -> Analysis {
    analyze_with(history, &CATALOG, config)
}

/// Comme `analyze`, la stratégie étant choisie dans `catalog` ; un catalogue
/// d'un seul élément impose cette stratégie.
pub fn analyze_with(history: &[DrawRecord], catalog: &[StrategyWeights], config: &EngineConfig) -> Analysis {
    let history = config.limit(history);
    let selection = select_strategy(history, catalog, config);
    let stats = AttributeStatistics::compute(history, &config.stats);
    let ranked = compose_scores(&stats, &selection.strategy, history.first(), &config.scoring);
    Analysis { selection, stats, ranked }
}

pub fn recommend(history: &[DrawRecord], config: &EngineConfig) -> RecommendationResult {
    let analysis = analyze(history, config);
    extract(&analysis, config)
}

/// Construit les agrégats à partir d'une analyse déjà calculée.
pub fn extract(analysis: &Analysis, config: &EngineConfig) -> RecommendationResult {
    let Analysis { selection, stats, ranked } = analysis;
    if stats.is_empty() {
        log::warn!("Historique vide : recommandation impossible");
        return RecommendationResult::insufficient(selection.strategy.name);
    }

    let categories = top_categories(ranked, TOP_CATEGORY_COUNT);
    let values = select_values(ranked, &categories, &config.extraction);
    let core = core_values(ranked, &values, CORE_VALUE_COUNT);
    let colors = top_colors(ranked, TOP_COLOR_COUNT);
    let pattern = strongest_pattern(stats, config.extraction.pattern_min_support);

    let rationale = rationale(stats.draw_count(), selection, &categories, &colors, pattern.as_ref());
    let confidence = confidence(ranked, stats.draw_count());

    log::debug!(
        "Recommandation : stratégie {}, signes {:?}, confiance {}",
        selection.strategy.name,
        categories,
        confidence
    );

    RecommendationResult {
        draw_count: stats.draw_count(),
        strategy: selection.strategy.name.to_string(),
        top_categories: categories,
        top_values: values,
        core_values: core,
        top_heads: top_heads(ranked, TOP_HEAD_COUNT),
        top_tails: top_tails(ranked, TOP_TAIL_COUNT),
        top_colors: colors,
        pattern,
        rationale,
        confidence,
    }
}

/// Confiance déterministe dérivée du contraste entre le meilleur score et la moyenne.
pub fn confidence(ranked: &[ScoredCandidate], draw_count: usize) -> u8 {
    if ranked.is_empty() || draw_count == 0 {
        return 0;
    }

    let max = ranked.iter().map(|c| c.score).fold(f64::NEG_INFINITY, f64::max);
    let mean = ranked.iter().map(|c| c.score).sum::<f64>() / ranked.len() as f64;

    // Moyenne nulle ou négative : rapport ramené à 0
    let ratio = if mean > 0.0 { max / mean } else { 0.0 };

    let mut value = BASE_CONFIDENCE;
    if ratio > 2.5 {
        value += 15.0;
    } else if ratio > 1.8 {
        value += 10.0;
    } else if ratio < 1.2 {
        value -= 10.0;
    }
    if draw_count < SMALL_HISTORY {
        value = value.min(SMALL_HISTORY_CAP);
    }

    (value.round() as u8).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

fn rationale(
    draw_count: usize,
    selection: &StrategySelection,
    categories: &[Zodiac],
    colors: &[ColorBand],
    pattern: Option<&TransitionPattern>,
) -> String {
    let mut text = format!("Analyse de {} tirages. ", draw_count);

    if selection.skipped {
        text.push_str(&format!(
            "Stratégie « {} » retenue par défaut (historique trop court pour un backtest). ",
            selection.strategy.name
        ));
    } else {
        let hits = selection.reports.get(selection.index).map_or(0, |r| r.hits);
        text.push_str(&format!(
            "Stratégie « {} » retenue après backtest sur {} tirages ({} numéros sortis dans le top). ",
            selection.strategy.name, selection.test_size, hits
        ));
    }

    if let Some(zodiac) = categories.first() {
        text.push_str(&format!("Signe dominant : {}. ", zodiac));
    }
    if let Some(color) = colors.first() {
        text.push_str(&format!("Couleur dominante : {}. ", color));
    }
    if let Some(p) = pattern {
        text.push_str(&format!(
            "Transition marquée : {} → {} à {} tirage(s) d'écart ({}/{}, {:.0} %). ",
            p.from,
            p.to,
            p.lag,
            p.count,
            p.support,
            p.probability() * 100.0
        ));
    }
    if draw_count < SAMPLE_WARNING {
        text.push_str("Attention : échantillon réduit, résultats peu fiables.");
    }

    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liuhe_data::models::make_test_history;

    fn flat(scores: &[f64]) -> Vec<ScoredCandidate> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoredCandidate {
                value: i as u8 + 1,
                score,
                reason: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_history_result() {
        let result = recommend(&[], &EngineConfig::default());
        assert_eq!(result.draw_count, 0);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.strategy, "balanced");
        assert!(result.is_empty());
        assert!(result.top_categories.is_empty());
        assert!(result.pattern.is_none());
        assert!(!result.rationale.is_empty());
    }

    #[test]
    fn test_recommend_shapes() {
        let draws = make_test_history(60);
        let result = recommend(&draws, &EngineConfig::default());
        assert_eq!(result.draw_count, 60);
        assert_eq!(result.top_categories.len(), 6);
        assert_eq!(result.top_values.len(), 18);
        assert!(result.top_values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(result.core_values.len(), 8);
        assert!(result.core_values.iter().all(|v| result.top_values.contains(v)));
        assert_eq!(result.top_heads.len(), 3);
        assert_eq!(result.top_tails.len(), 4);
        assert_eq!(result.top_colors.len(), 2);
        assert!((50..=99).contains(&result.confidence));
        assert!(result.rationale.contains("60 tirages"));
    }

    #[test]
    fn test_history_limit_applies() {
        let draws = make_test_history(250);
        let result = recommend(&draws, &EngineConfig::default());
        assert_eq!(result.draw_count, 200);

        let config = EngineConfig { history_limit: 30, ..EngineConfig::default() };
        assert_eq!(recommend(&draws, &config).draw_count, 30);
    }

    #[test]
    fn test_small_sample_warning() {
        let draws = make_test_history(5);
        let result = recommend(&draws, &EngineConfig::default());
        assert!(result.rationale.contains("échantillon réduit"));
        assert!(result.rationale.contains("par défaut"));
        assert!(result.confidence <= 65);

        let large = recommend(&make_test_history(40), &EngineConfig::default());
        assert!(!large.rationale.contains("échantillon réduit"));
    }

    #[test]
    fn test_confidence_rules() {
        let mut scores = vec![1.0; 49];
        // ratio = 1 → -10
        assert_eq!(confidence(&flat(&scores), 50), 65);
        // ratio > 2.5
        scores[0] = 10.0;
        assert_eq!(confidence(&flat(&scores), 50), 90);
        // 1.8 < ratio <= 2.5
        scores[0] = 2.0;
        assert_eq!(confidence(&flat(&scores), 50), 85);
        // moyenne nulle ou négative : rapport 0, donc -10
        assert_eq!(confidence(&flat(&[0.0; 49]), 50), 65);
        let mut negative = vec![-10.0; 49];
        negative[0] = 5.0;
        assert_eq!(confidence(&flat(&negative), 50), 65);
        // plafond petit échantillon
        scores[0] = 10.0;
        assert_eq!(confidence(&flat(&scores), 5), 65);
        assert_eq!(confidence(&flat(&scores), 0), 0);
    }

    #[test]
    fn test_negative_mean_history_confidence() {
        // un seul numéro répété : scores majoritairement négatifs
        let draws: Vec<DrawRecord> = (0..20)
            .map(|i| DrawRecord {
                draw_id: i.to_string(),
                timestamp: None,
                primary: vec![],
                special: 5,
            })
            .collect();
        let config = EngineConfig::default();
        let analysis = analyze(&draws, &config);
        let mean = analysis.ranked.iter().map(|c| c.score).sum::<f64>() / 49.0;
        assert!(mean <= 0.0, "moyenne {}", mean);
        assert_eq!(extract(&analysis, &config).confidence, 65);
    }

    #[test]
    fn test_forced_strategy() {
        let draws = make_test_history(60);
        let config = EngineConfig::default();
        let forced = crate::strategy::find("pattern-mining").unwrap();
        let analysis = analyze_with(&draws, std::slice::from_ref(forced), &config);
        let result = extract(&analysis, &config);
        assert_eq!(result.strategy, "pattern-mining");
        assert_eq!(result.top_values.len(), 18);
    }

    #[test]
    fn test_extract_matches_recommend() {
        let draws = make_test_history(45);
        let config = EngineConfig::default();
        let analysis = analyze(&draws, &config);
        assert_eq!(analysis.ranked.len(), 49);
        assert_eq!(extract(&analysis, &config), recommend(&draws, &config));
    }
}
