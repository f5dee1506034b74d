use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSelection {
    /// Les 18 meilleurs numéros, tels quels
    Flat,
    /// Noyau (signes retenus) + garde (hors signes retenus)
    CoreGuard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Fenêtre de fréquence (tirages les plus récents)
    pub frequency_window: usize,
    /// Décroissance exponentielle par tirage ; 1.0 = comptage plat
    pub decay_factor: f64,
    /// Décalage maximal des tables de transition
    pub max_lag: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            frequency_window: 50,
            decay_factor: 1.0,
            max_lag: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// En dessous de cette taille d'historique, la stratégie par défaut est retenue
    pub min_history: usize,
    pub test_size: usize,
    /// Nombre de tirages plus anciens utilisés pour rejouer chaque tirage test
    pub train_window: usize,
    /// Taille minimale de l'historique d'entraînement d'un rejeu
    pub min_training: usize,
    /// Rang sous lequel un rejeu compte comme un succès (affichage)
    pub hit_cutoff: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            min_history: 20,
            test_size: 10,
            train_window: 50,
            min_training: 10,
            hit_cutoff: 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub omission_threshold: usize,
    pub omission_exponent: f64,
    pub lag_decay_exponent: f64,
    pub kill_min_support: u32,
    pub overheat_window: usize,
    pub overheat_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            omission_threshold: 20,
            omission_exponent: 1.3,
            lag_decay_exponent: 0.4,
            kill_min_support: 8,
            overheat_window: 12,
            overheat_threshold: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub value_selection: ValueSelection,
    pub core_count: usize,
    pub guard_count: usize,
    /// Effectif minimal d'un état de transition pour figurer dans la justification
    pub pattern_min_support: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            value_selection: ValueSelection::CoreGuard,
            core_count: 12,
            guard_count: 6,
            pattern_min_support: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nombre maximal de tirages pris en compte (les plus récents), 0 = tout l'historique
    pub history_limit: usize,
    pub stats: StatsConfig,
    pub backtest: BacktestConfig,
    pub scoring: ScoringConfig,
    pub extraction: ExtractionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            stats: StatsConfig::default(),
            backtest: BacktestConfig::default(),
            scoring: ScoringConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Tronque l'historique à `history_limit` tirages.
    pub fn limit<'a, T>(&self, history: &'a [T]) -> &'a [T] {
        if self.history_limit == 0 {
            history
        } else {
            &history[..history.len().min(self.history_limit)]
        }
    }
}

pub fn save_config(config: &EngineConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Les champs absents du fichier prennent leur valeur par défaut.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<EngineConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&json)?;
    Ok(config)
}
