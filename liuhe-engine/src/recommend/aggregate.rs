use serde::{Deserialize, Serialize};

use crate::attributes::{category_of, ColorBand, Zodiac, HEAD_COUNT, TAIL_COUNT};
use crate::config::{ExtractionConfig, ValueSelection};
use crate::scoring::ScoredCandidate;
use crate::stats::AttributeStatistics;

pub const TOP_CATEGORY_COUNT: usize = 6;
pub const TOP_VALUE_COUNT: usize = 18;
pub const CORE_VALUE_COUNT: usize = 8;
pub const TOP_HEAD_COUNT: usize = 3;
pub const TOP_TAIL_COUNT: usize = 4;
pub const TOP_COLOR_COUNT: usize = 2;
/// Numéros les mieux classés utilisés pour compter dizaines et unités
pub const DIGIT_WINDOW: usize = 20;
pub const COLOR_WINDOW: usize = 15;

/// Transition de signe la plus marquée : `to` suit `from` à `lag` tirages d'écart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPattern {
    pub lag: usize,
    pub from: Zodiac,
    pub to: Zodiac,
    pub count: u32,
    pub support: u32,
}

impl TransitionPattern {
    pub fn probability(&self) -> f64 {
        if self.support == 0 {
            0.0
        } else {
            self.count as f64 / self.support as f64
        }
    }
}

/// Signes classés par somme des scores positifs de leurs numéros.
pub fn top_categories(ranked: &[ScoredCandidate], n: usize) -> Vec<Zodiac> {
    let mut sums = [0.0f64; 12];
    for c in ranked {
        if c.score > 0.0 {
            if let Some(info) = category_of(c.value) {
                sums[info.zodiac.index()] += c.score;
            }
        }
    }
    let mut zodiacs = Zodiac::ALL.to_vec();
    // tri stable : à égalité, l'ordre du cycle est conservé
    zodiacs.sort_by(|a, b| sums[b.index()].total_cmp(&sums[a.index()]));
    zodiacs.truncate(n);
    zodiacs
}

/// Sélection des 18 numéros, renvoyés en ordre croissant.
pub fn select_values(ranked: &[ScoredCandidate], categories: &[Zodiac], config: &ExtractionConfig) -> Vec<u8> {
    let mut picked: Vec<u8> = Vec::with_capacity(TOP_VALUE_COUNT);

    if config.value_selection == ValueSelection::CoreGuard {
        let in_top = |v: u8| category_of(v).is_some_and(|c| categories.contains(&c.zodiac));
        picked.extend(
            ranked
                .iter()
                .map(|c| c.value)
                .filter(|&v| in_top(v))
                .take(config.core_count),
        );
        picked.extend(
            ranked
                .iter()
                .map(|c| c.value)
                .filter(|&v| !in_top(v))
                .take(config.guard_count),
        );
        picked.truncate(TOP_VALUE_COUNT);
    }

    for c in ranked {
        if picked.len() >= TOP_VALUE_COUNT {
            break;
        }
        if !picked.contains(&c.value) {
            picked.push(c.value);
        }
    }

    picked.sort_unstable();
    picked
}

/// Les `n` numéros de `values` les mieux classés, en ordre croissant.
pub fn core_values(ranked: &[ScoredCandidate], values: &[u8], n: usize) -> Vec<u8> {
    let mut core: Vec<u8> = ranked
        .iter()
        .map(|c| c.value)
        .filter(|v| values.contains(v))
        .take(n)
        .collect();
    core.sort_unstable();
    core
}

/// Indices triés par effectif décroissant, puis par indice croissant.
fn most_frequent(tally: &[u32], n: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..tally.len()).collect();
    idx.sort_by(|&a, &b| tally[b].cmp(&tally[a]).then(a.cmp(&b)));
    idx.truncate(n);
    idx
}

pub fn top_heads(ranked: &[ScoredCandidate], n: usize) -> Vec<u8> {
    let mut tally = [0u32; HEAD_COUNT];
    for info in ranked.iter().take(DIGIT_WINDOW).filter_map(|c| category_of(c.value)) {
        tally[info.head as usize] += 1;
    }
    let mut heads: Vec<u8> = most_frequent(&tally, n).into_iter().map(|h| h as u8).collect();
    heads.sort_unstable();
    heads
}

pub fn top_tails(ranked: &[ScoredCandidate], n: usize) -> Vec<u8> {
    let mut tally = [0u32; TAIL_COUNT];
    for info in ranked.iter().take(DIGIT_WINDOW).filter_map(|c| category_of(c.value)) {
        tally[info.tail as usize] += 1;
    }
    let mut tails: Vec<u8> = most_frequent(&tally, n).into_iter().map(|t| t as u8).collect();
    tails.sort_unstable();
    tails
}

/// Couleurs les plus représentées, la plus fréquente en tête.
pub fn top_colors(ranked: &[ScoredCandidate], n: usize) -> Vec<ColorBand> {
    let mut tally = [0u32; 3];
    for info in ranked.iter().take(COLOR_WINDOW).filter_map(|c| category_of(c.value)) {
        tally[info.color.index()] += 1;
    }
    most_frequent(&tally, n).into_iter().map(|i| ColorBand::ALL[i]).collect()
}

/// Parcourt les décalages disposant d'un signe de référence et retient la
/// transition de probabilité conditionnelle maximale parmi les états assez
/// fréquents. À égalité, le plus petit décalage puis l'ordre du cycle.
pub fn strongest_pattern(stats: &AttributeStatistics, min_support: u32) -> Option<TransitionPattern> {
    let mut best: Option<TransitionPattern> = None;
    let mut best_probability = 0.0;

    for lag in 1..=stats.max_lag() {
        let Some(reference) = stats.reference(lag) else { break };
        let Some(from) = category_of(reference).map(|c| c.zodiac) else { continue };
        let support = stats.zodiac_transition_support(lag, from);
        if support == 0 || support < min_support {
            continue;
        }
        for to in Zodiac::ALL {
            let count = stats.zodiac_transition(lag, from, to);
            if count == 0 {
                continue;
            }
            let probability = stats.zodiac_conditional(lag, from, to);
            if best.is_none() || probability > best_probability {
                best_probability = probability;
                best = Some(TransitionPattern { lag, from, to, count, support });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use liuhe_data::models::DrawRecord;

    /// Classement où `order` vient en tête (scores décroissants), puis le reste à 0.
    fn ranking(order: &[u8]) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = order
            .iter()
            .enumerate()
            .map(|(i, &value)| ScoredCandidate {
                value,
                score: 100.0 - i as f64,
                reason: None,
            })
            .collect();
        ranked.extend((1..=49u8).filter(|v| !order.contains(v)).map(|value| ScoredCandidate {
            value,
            score: 0.0,
            reason: None,
        }));
        ranked
    }

    fn history(specials: &[u8]) -> Vec<DrawRecord> {
        specials
            .iter()
            .enumerate()
            .map(|(i, &special)| DrawRecord {
                draw_id: i.to_string(),
                timestamp: None,
                primary: vec![],
                special,
            })
            .collect()
    }

    #[test]
    fn test_top_categories_by_positive_score() {
        // 1, 13, 25 : serpent ; 2 : dragon
        let ranked = ranking(&[2, 1, 13, 25]);
        let top = top_categories(&ranked, 6);
        assert_eq!(top.len(), 6);
        assert_eq!(top[0], Zodiac::Snake);
        assert_eq!(top[1], Zodiac::Dragon);
        // les signes restants sont à égalité : ordre du cycle
        assert_eq!(&top[2..], &[Zodiac::Rat, Zodiac::Ox, Zodiac::Tiger, Zodiac::Rabbit]);
    }

    #[test]
    fn test_flat_selection_takes_best_ranked() {
        let order: Vec<u8> = (20..=40).rev().collect();
        let ranked = ranking(&order);
        let config = ExtractionConfig {
            value_selection: ValueSelection::Flat,
            ..ExtractionConfig::default()
        };
        let values = select_values(&ranked, &[], &config);
        assert_eq!(values, (23..=40).collect::<Vec<u8>>());
    }

    #[test]
    fn test_core_guard_selection() {
        let ranked = ranking(&[]);
        let categories = [Zodiac::Snake];
        let config = ExtractionConfig::default();
        let values = select_values(&ranked, &categories, &config);
        assert_eq!(values.len(), 18);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        // le serpent n'a que 5 numéros : le reste vient du classement global
        for v in [1, 13, 25, 37, 49] {
            assert!(values.contains(&v));
        }
    }

    #[test]
    fn test_core_values_follow_rank() {
        let ranked = ranking(&[40, 3, 22, 9, 31, 17, 44, 5, 12, 28]);
        let values = select_values(&ranked, &[], &ExtractionConfig {
            value_selection: ValueSelection::Flat,
            ..ExtractionConfig::default()
        });
        let core = core_values(&ranked, &values, 8);
        assert_eq!(core, vec![3, 5, 9, 17, 22, 31, 40, 44]);
    }

    #[test]
    fn test_heads_tails_colors() {
        // 40..=49 puis 30..=39 : dizaines 4 et 3 dominent
        let order: Vec<u8> = (40..=49).chain(30..=39).collect();
        let ranked = ranking(&order);
        assert_eq!(top_heads(&ranked, 3), vec![0, 3, 4]);
        // chaque unité apparaît deux fois : départage par unité croissante
        assert_eq!(top_tails(&ranked, 4), vec![0, 1, 2, 3]);

        let reds = ranking(&[1, 2, 7, 8, 12, 13, 18, 19, 23, 24, 29, 30, 34, 35, 40]);
        assert_eq!(top_colors(&reds, 2), vec![ColorBand::Red, ColorBand::Blue]);
    }

    #[test]
    fn test_strongest_pattern() {
        // Serpent (1) toujours suivi de dragon (2) : 2 puis 1 en remontant le temps
        let mut specials = Vec::new();
        for _ in 0..6 {
            specials.push(2);
            specials.push(1);
        }
        specials.insert(0, 1);
        let stats = AttributeStatistics::compute(&history(&specials), &StatsConfig::default());
        let pattern = strongest_pattern(&stats, 5).unwrap();
        assert_eq!(pattern.lag, 1);
        assert_eq!(pattern.from, Zodiac::Snake);
        assert_eq!(pattern.to, Zodiac::Dragon);
        assert_eq!(pattern.count, 6);
        assert_eq!(pattern.support, 6);
        assert_eq!(pattern.probability(), 1.0);

        assert!(strongest_pattern(&stats, 50).is_none());
    }

    #[test]
    fn test_no_pattern_on_empty_stats() {
        let stats = AttributeStatistics::compute(&[], &StatsConfig::default());
        assert!(strongest_pattern(&stats, 0).is_none());
    }
}
