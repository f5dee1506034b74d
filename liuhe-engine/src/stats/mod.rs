pub mod transition;

use liuhe_data::models::{is_valid_value, DrawRecord, VALUE_COUNT};

use crate::attributes::{category_of, ColorBand, Zodiac, HEAD_COUNT, TAIL_COUNT};
use crate::config::StatsConfig;
use transition::TransitionTable;

/// Statistiques dérivées d'une tranche d'historique (index 0 = le plus récent).
/// Toujours recalculées depuis zéro ; aucune mise à jour incrémentale.
#[derive(Debug, Clone)]
pub struct AttributeStatistics {
    specials: Vec<u8>,
    frequency_window: usize,
    frequency: [u32; VALUE_COUNT],
    weighted: [f64; VALUE_COUNT],
    omission: [usize; VALUE_COUNT],
    zodiac: [u32; 12],
    color: [u32; 3],
    tail: [u32; TAIL_COUNT],
    head: [u32; HEAD_COUNT],
    transitions: TransitionTable,
    zodiac_transitions: TransitionTable,
}

fn slot(value: u8) -> Option<usize> {
    is_valid_value(value).then(|| value as usize - 1)
}

impl AttributeStatistics {
    pub fn compute(history: &[DrawRecord], config: &StatsConfig) -> Self {
        let specials: Vec<u8> = history
            .iter()
            .filter_map(|d| {
                if is_valid_value(d.special) {
                    Some(d.special)
                } else {
                    log::debug!("Tirage {} ignoré : numéro spécial {} hors limites", d.draw_id, d.special);
                    None
                }
            })
            .collect();

        let n = specials.len();
        let frequency_window = config.frequency_window.min(n);

        let mut frequency = [0u32; VALUE_COUNT];
        let mut weighted = [0.0f64; VALUE_COUNT];
        let mut zodiac = [0u32; 12];
        let mut color = [0u32; 3];
        let mut tail = [0u32; TAIL_COUNT];
        let mut head = [0u32; HEAD_COUNT];

        for (i, &special) in specials.iter().take(frequency_window).enumerate() {
            let Some(info) = category_of(special) else { continue };
            let idx = special as usize - 1;
            frequency[idx] += 1;
            weighted[idx] += config.decay_factor.powi(i as i32);
            zodiac[info.zodiac.index()] += 1;
            color[info.color.index()] += 1;
            tail[info.tail as usize] += 1;
            head[info.head as usize] += 1;
        }

        // Absent de l'historique : l'omission vaut la longueur de l'historique
        let mut omission = [n; VALUE_COUNT];
        for (i, &special) in specials.iter().enumerate().rev() {
            omission[special as usize - 1] = i;
        }

        let value_states: Vec<usize> = specials.iter().map(|&v| v as usize - 1).collect();
        let zodiac_states: Vec<usize> = specials
            .iter()
            .filter_map(|&v| category_of(v))
            .map(|c| c.zodiac.index())
            .collect();

        Self {
            transitions: TransitionTable::build(&value_states, VALUE_COUNT, config.max_lag),
            zodiac_transitions: TransitionTable::build(&zodiac_states, 12, config.max_lag),
            specials,
            frequency_window,
            frequency,
            weighted,
            omission,
            zodiac,
            color,
            tail,
            head,
        }
    }

    pub fn draw_count(&self) -> usize {
        self.specials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specials.is_empty()
    }

    pub fn specials(&self) -> &[u8] {
        &self.specials
    }

    /// Fenêtre effective, bornée par la longueur de l'historique.
    pub fn frequency_window(&self) -> usize {
        self.frequency_window
    }

    pub fn max_lag(&self) -> usize {
        self.transitions.max_lag()
    }

    pub fn frequency(&self, value: u8) -> u32 {
        slot(value).map_or(0, |i| self.frequency[i])
    }

    pub fn frequency_in(&self, value: u8, window: usize) -> u32 {
        self.specials.iter().take(window).filter(|&&s| s == value).count() as u32
    }

    pub fn weighted_frequency(&self, value: u8) -> f64 {
        slot(value).map_or(0.0, |i| self.weighted[i])
    }

    pub fn omission(&self, value: u8) -> usize {
        slot(value).map_or(self.specials.len(), |i| self.omission[i])
    }

    pub fn zodiac_frequency(&self, zodiac: Zodiac) -> u32 {
        self.zodiac[zodiac.index()]
    }

    pub fn zodiac_frequency_in(&self, zodiac: Zodiac, window: usize) -> u32 {
        self.specials
            .iter()
            .take(window)
            .filter(|&&s| category_of(s).is_some_and(|c| c.zodiac == zodiac))
            .count() as u32
    }

    pub fn color_frequency(&self, color: ColorBand) -> u32 {
        self.color[color.index()]
    }

    pub fn tail_frequency(&self, tail: u8) -> u32 {
        self.tail.get(tail as usize).copied().unwrap_or(0)
    }

    pub fn head_frequency(&self, head: u8) -> u32 {
        self.head.get(head as usize).copied().unwrap_or(0)
    }

    pub fn transition(&self, lag: usize, from: u8, to: u8) -> u32 {
        match (slot(from), slot(to)) {
            (Some(f), Some(t)) => self.transitions.count(lag, f, t),
            _ => 0,
        }
    }

    pub fn transition_support(&self, lag: usize, from: u8) -> u32 {
        slot(from).map_or(0, |f| self.transitions.support(lag, f))
    }

    pub fn zodiac_transition(&self, lag: usize, from: Zodiac, to: Zodiac) -> u32 {
        self.zodiac_transitions.count(lag, from.index(), to.index())
    }

    pub fn zodiac_transition_support(&self, lag: usize, from: Zodiac) -> u32 {
        self.zodiac_transitions.support(lag, from.index())
    }

    pub fn zodiac_conditional(&self, lag: usize, from: Zodiac, to: Zodiac) -> f64 {
        self.zodiac_transitions.conditional(lag, from.index(), to.index())
    }

    /// Numéro spécial observé `lag` tirages avant le prochain tirage.
    pub fn reference(&self, lag: usize) -> Option<u8> {
        if lag == 0 {
            return None;
        }
        self.specials.get(lag - 1).copied()
    }
}
