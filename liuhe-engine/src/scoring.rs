use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use liuhe_data::models::{DrawRecord, VALUE_MAX, VALUE_MIN};

use crate::attributes::category_of;
use crate::config::ScoringConfig;
use crate::stats::AttributeStatistics;
use crate::strategy::StrategyWeights;

const FREQUENCY_SCALE: f64 = 10.0;
const OMISSION_SCALE: f64 = 1.5;
const TRANSITION_SCALE: f64 = 6.0;
const ZODIAC_RESONANCE: f64 = 5.0;
const COLOR_RESONANCE: f64 = 4.0;
const TAIL_RESONANCE: f64 = 6.4;
const REPEAT_BONUS: f64 = 20.0;
const NEIGHBOR_BONUS: f64 = 8.0;
const KILL_PENALTY: f64 = 25.0;
const OVERHEAT_PENALTY: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub value: u8,
    pub score: f64,
    pub reason: Option<String>,
}

/// Contribution de chaque terme au score d'un numéro.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub frequency: f64,
    pub omission: f64,
    pub transition: f64,
    pub resonance: f64,
    pub repeat: f64,
    pub kill: f64,
    pub overheat: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.frequency + self.omission + self.transition + self.resonance + self.repeat + self.kill + self.overheat
    }

    /// Terme positif dominant, s'il existe.
    pub fn dominant(&self) -> Option<&'static str> {
        [
            (self.frequency, "numéro chaud"),
            (self.omission, "retard prolongé"),
            (self.transition, "transition récurrente"),
            (self.resonance, "résonance des attributs"),
            (self.repeat, "répétition / voisinage"),
        ]
        .into_iter()
        .filter(|(v, _)| *v > 0.0)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, label)| label)
    }
}

/// Atténuation par décalage : lag^-exponent.
pub fn lag_decay(lag: usize, exponent: f64) -> f64 {
    if lag == 0 {
        return 0.0;
    }
    (lag as f64).powf(-exponent)
}

pub fn score_value(
    value: u8,
    stats: &AttributeStatistics,
    strategy: &StrategyWeights,
    last_draw: Option<&DrawRecord>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let mut b = ScoreBreakdown::default();
    let Some(info) = category_of(value) else {
        return b;
    };

    b.frequency = stats.weighted_frequency(value) * strategy.frequency * FREQUENCY_SCALE;

    let omission = stats.omission(value);
    if omission > config.omission_threshold {
        let excess = (omission - config.omission_threshold) as f64;
        b.omission = excess.powf(config.omission_exponent) * strategy.omission * OMISSION_SCALE;
    }

    for lag in 1..=stats.max_lag() {
        let Some(reference) = stats.reference(lag) else { break };
        let decay = lag_decay(lag, config.lag_decay_exponent);
        let count = stats.transition(lag, reference, value);
        b.transition += count as f64 * strategy.transition * TRANSITION_SCALE * decay;

        // Absence observée sur un échantillon suffisant
        if count == 0 && stats.transition_support(lag, reference) >= config.kill_min_support {
            b.kill -= KILL_PENALTY * strategy.transition * decay;
        }
    }

    b.resonance = strategy.synergy
        * (stats.zodiac_frequency(info.zodiac) as f64 * ZODIAC_RESONANCE
            + stats.color_frequency(info.color) as f64 * COLOR_RESONANCE
            + stats.tail_frequency(info.tail) as f64 * TAIL_RESONANCE);

    if let Some(last) = last_draw {
        if last.has_primary(value) {
            b.repeat += REPEAT_BONUS * strategy.pattern;
        }
        let below = value > VALUE_MIN && last.has_primary(value - 1);
        let above = value < VALUE_MAX && last.has_primary(value + 1);
        if below || above {
            b.repeat += NEIGHBOR_BONUS * strategy.pattern;
        }
    }

    let recent = stats.zodiac_frequency_in(info.zodiac, config.overheat_window);
    if recent >= config.overheat_threshold {
        let excess = (recent - config.overheat_threshold + 1) as f64;
        b.overheat = -excess * OVERHEAT_PENALTY * strategy.synergy;
    }

    b
}

/// Score décroissant, puis numéro croissant.
pub fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score.total_cmp(&a.score).then(a.value.cmp(&b.value))
}

/// Score les 49 numéros et les renvoie classés.
pub fn compose_scores(
    stats: &AttributeStatistics,
    strategy: &StrategyWeights,
    last_draw: Option<&DrawRecord>,
    config: &ScoringConfig,
) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = (VALUE_MIN..=VALUE_MAX)
        .map(|value| {
            let breakdown = score_value(value, stats, strategy, last_draw, config);
            ScoredCandidate {
                value,
                score: breakdown.total(),
                reason: breakdown.dominant().map(str::to_string),
            }
        })
        .collect();
    candidates.sort_by(compare_candidates);
    candidates
}

/// Rang (0 = meilleur) d'un numéro dans une liste classée.
pub fn rank_of(candidates: &[ScoredCandidate], value: u8) -> Option<usize> {
    candidates.iter().position(|c| c.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::strategy::{BALANCED, COLD_REVERSION, HOT_TRACKING, PATTERN_MINING};

    fn draw(id: usize, primary: &[u8], special: u8) -> DrawRecord {
        DrawRecord {
            draw_id: id.to_string(),
            timestamp: None,
            primary: primary.to_vec(),
            special,
        }
    }

    fn specials_only(specials: &[u8]) -> Vec<DrawRecord> {
        specials.iter().enumerate().map(|(i, &s)| draw(i, &[], s)).collect()
    }

    fn stats_of(draws: &[DrawRecord]) -> AttributeStatistics {
        AttributeStatistics::compute(draws, &StatsConfig::default())
    }

    #[test]
    fn test_ordering_is_total_and_tie_broken_by_value() {
        let stats = stats_of(&[]);
        let ranked = compose_scores(&stats, &BALANCED, None, &ScoringConfig::default());
        assert_eq!(ranked.len(), 49);
        let values: Vec<u8> = ranked.iter().map(|c| c.value).collect();
        assert_eq!(values, (1..=49).collect::<Vec<u8>>());
        assert!(ranked.iter().all(|c| c.score == 0.0 && c.reason.is_none()));
    }

    #[test]
    fn test_hot_value_ranks_first() {
        let mut specials = vec![7, 7, 7, 7, 12, 7, 7, 33, 7, 7];
        specials.extend([20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
        let draws = specials_only(&specials);
        let stats = stats_of(&draws);
        for strategy in [&BALANCED, &HOT_TRACKING, &COLD_REVERSION, &PATTERN_MINING] {
            let ranked = compose_scores(&stats, strategy, draws.first(), &ScoringConfig::default());
            assert_eq!(rank_of(&ranked, 7), Some(0), "{}", strategy.name);
            assert!(ranked[0].reason.is_some());
        }
    }

    #[test]
    fn test_omission_term_only_above_threshold() {
        let mut specials = vec![1; 30];
        specials[25] = 40;
        let stats = stats_of(&specials_only(&specials));
        let config = ScoringConfig::default();
        // 40 : retard 25 ; 41 : jamais vu, retard 30
        let b40 = score_value(40, &stats, &COLD_REVERSION, None, &config);
        let b41 = score_value(41, &stats, &COLD_REVERSION, None, &config);
        let expected = 5f64.powf(1.3) * 1.5 * 1.5;
        assert!((b40.omission - expected).abs() < 1e-9);
        assert!(b41.omission > b40.omission);

        let short = stats_of(&specials_only(&[1, 2, 3]));
        assert_eq!(score_value(41, &short, &COLD_REVERSION, None, &config).omission, 0.0);
    }

    #[test]
    fn test_repeat_and_neighbor_bonus() {
        let draws = vec![draw(0, &[10, 20, 30, 40, 45, 49], 3)];
        let stats = stats_of(&draws);
        let config = ScoringConfig::default();
        let repeat = score_value(20, &stats, &BALANCED, draws.first(), &config);
        let neighbor = score_value(21, &stats, &BALANCED, draws.first(), &config);
        let below = score_value(44, &stats, &BALANCED, draws.first(), &config);
        let none = score_value(25, &stats, &BALANCED, draws.first(), &config);
        assert!((repeat.repeat - 10.0).abs() < 1e-12);
        assert!((neighbor.repeat - 4.0).abs() < 1e-12);
        assert!((below.repeat - 4.0).abs() < 1e-12);
        assert_eq!(none.repeat, 0.0);
        // 49 est tiré et voisin de rien au-dessus
        let edge = score_value(49, &stats, &BALANCED, draws.first(), &config);
        assert!((edge.repeat - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_kill_penalty_requires_support() {
        // 5 est toujours suivi de 9 (dans le temps) : 10 transitions depuis 5
        let mut specials = Vec::new();
        for _ in 0..10 {
            specials.push(9);
            specials.push(5);
        }
        specials.insert(0, 5);
        let stats = stats_of(&specials_only(&specials));
        assert_eq!(stats.reference(1), Some(5));
        assert_eq!(stats.transition_support(1, 5), 10);

        let config = ScoringConfig::default();
        let killed = score_value(30, &stats, &BALANCED, None, &config);
        let followed = score_value(9, &stats, &BALANCED, None, &config);
        assert!(killed.kill < 0.0);
        assert!(followed.transition > 0.0);

        let strict = ScoringConfig { kill_min_support: 100, ..ScoringConfig::default() };
        assert_eq!(score_value(30, &stats, &BALANCED, None, &strict).kill, 0.0);
    }

    #[test]
    fn test_exact_terms_over_two_lags() {
        // plus récent en premier ; références : 3 (lag 1), 10 (lag 2)
        // 10 a suivi 3 au lag 1 et 10 au lag 2, une fois chacun
        let stats = stats_of(&specials_only(&[3, 10, 3, 10, 20]));
        assert_eq!(stats.transition(1, 3, 10), 1);
        assert_eq!(stats.transition(2, 10, 10), 1);
        assert_eq!(stats.transition_support(3, 3), 0);

        let config = ScoringConfig { kill_min_support: 1, ..ScoringConfig::default() };
        let decay2 = 2f64.powf(-0.4);

        let ten = score_value(10, &stats, &HOT_TRACKING, None, &config);
        assert!((ten.frequency - 2.0 * 1.5 * 10.0).abs() < 1e-9);
        assert!((ten.transition - 0.8 * 6.0 * (1.0 + decay2)).abs() < 1e-9);
        assert_eq!(ten.kill, 0.0);
        // singe ×2, bleu ×5, unité 0 ×3
        assert!((ten.resonance - 1.2 * (2.0 * 5.0 + 5.0 * 4.0 + 3.0 * 6.4)).abs() < 1e-9);

        let three = score_value(3, &stats, &HOT_TRACKING, None, &config);
        assert!((three.frequency - 30.0).abs() < 1e-9);
        assert_eq!(three.transition, 0.0);
        assert!((three.kill - (-25.0 * 0.8 * (1.0 + decay2))).abs() < 1e-9);
        // lapin ×2, bleu ×5, unité 3 ×2
        assert!((three.resonance - 1.2 * (2.0 * 5.0 + 5.0 * 4.0 + 2.0 * 6.4)).abs() < 1e-9);
        assert_eq!(three.omission, 0.0);
        assert_eq!(three.overheat, 0.0);
        assert!((three.total() - (three.frequency + three.resonance + three.kill)).abs() < 1e-9);

        // support insuffisant avec la configuration par défaut
        let default_kill = score_value(3, &stats, &HOT_TRACKING, None, &ScoringConfig::default()).kill;
        assert_eq!(default_kill, 0.0);
    }

    #[test]
    fn test_decayed_frequency_term() {
        let draws = specials_only(&[8, 8, 30, 8]);
        let stats = AttributeStatistics::compute(
            &draws,
            &StatsConfig { decay_factor: 0.5, ..StatsConfig::default() },
        );
        let b = score_value(8, &stats, &BALANCED, None, &ScoringConfig::default());
        assert!((b.frequency - (1.0 + 0.5 + 0.125) * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_overheat_penalty() {
        // 7, 19, 31, 43 : cochon
        let stats = stats_of(&specials_only(&[7, 19, 31, 43, 7, 2]));
        let config = ScoringConfig::default();
        let pig = score_value(19, &stats, &BALANCED, None, &config);
        let other = score_value(2, &stats, &BALANCED, None, &config);
        assert!((pig.overheat - (-2.0 * 6.0)).abs() < 1e-12);
        assert_eq!(other.overheat, 0.0);
    }

    #[test]
    fn test_lag_decay_monotonic() {
        for lag in 1..7 {
            assert!(lag_decay(lag, 0.4) > lag_decay(lag + 1, 0.4));
        }
        assert_eq!(lag_decay(1, 0.4), 1.0);
        assert_eq!(lag_decay(0, 0.4), 0.0);
    }

    #[test]
    fn test_out_of_range_value_scores_zero() {
        let stats = stats_of(&specials_only(&[1, 2, 3]));
        let b = score_value(0, &stats, &BALANCED, None, &ScoringConfig::default());
        assert_eq!(b, ScoreBreakdown::default());
    }
}
