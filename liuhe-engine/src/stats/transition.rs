/// Comptages de transitions par décalage sur une séquence d'états
/// (index 0 = le plus récent). `count(lag, from, to)` compte les positions `i`
/// où l'état `i` vaut `to` et l'état `i + lag` (plus ancien) vaut `from`.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    states: usize,
    max_lag: usize,
    counts: Vec<u32>,
    support: Vec<u32>,
}

impl TransitionTable {
    pub fn build(sequence: &[usize], states: usize, max_lag: usize) -> Self {
        let mut counts = vec![0u32; max_lag * states * states];
        let mut support = vec![0u32; max_lag * states];

        for lag in 1..=max_lag {
            for i in 0..sequence.len().saturating_sub(lag) {
                let from = sequence[i + lag];
                let to = sequence[i];
                if from >= states || to >= states {
                    continue;
                }
                counts[((lag - 1) * states + from) * states + to] += 1;
                support[(lag - 1) * states + from] += 1;
            }
        }

        Self { states, max_lag, counts, support }
    }

    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    fn in_range(&self, lag: usize, state: usize) -> bool {
        lag >= 1 && lag <= self.max_lag && state < self.states
    }

    pub fn count(&self, lag: usize, from: usize, to: usize) -> u32 {
        if !self.in_range(lag, from) || to >= self.states {
            return 0;
        }
        self.counts[((lag - 1) * self.states + from) * self.states + to]
    }

    /// Nombre de transitions observées au départ de `from` pour ce décalage.
    pub fn support(&self, lag: usize, from: usize) -> u32 {
        if !self.in_range(lag, from) {
            return 0;
        }
        self.support[(lag - 1) * self.states + from]
    }

    /// P(to | from, lag), 0 sans observation.
    pub fn conditional(&self, lag: usize, from: usize, to: usize) -> f64 {
        let support = self.support(lag, from);
        if support == 0 {
            return 0.0;
        }
        self.count(lag, from, to) as f64 / support as f64
    }
}
