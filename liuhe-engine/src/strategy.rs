use serde::Serialize;

/// Vecteur de pondération nommé appliqué aux termes du score composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyWeights {
    pub name: &'static str,
    pub description: &'static str,
    pub frequency: f64,
    pub omission: f64,
    pub transition: f64,
    pub pattern: f64,
    pub synergy: f64,
}

pub const BALANCED: StrategyWeights = StrategyWeights {
    name: "balanced",
    description: "Équilibre entre fréquence, retard et transitions",
    frequency: 1.0,
    omission: 0.8,
    transition: 1.0,
    pattern: 0.5,
    synergy: 1.0,
};

pub const HOT_TRACKING: StrategyWeights = StrategyWeights {
    name: "hot-tracking",
    description: "Suivi des numéros chauds et résonance des attributs",
    frequency: 1.5,
    omission: 0.5,
    transition: 0.8,
    pattern: 0.6,
    synergy: 1.2,
};

pub const COLD_REVERSION: StrategyWeights = StrategyWeights {
    name: "cold-reversion",
    description: "Retour à la moyenne des numéros en retard",
    frequency: 0.6,
    omission: 1.5,
    transition: 0.8,
    pattern: 0.4,
    synergy: 0.8,
};

pub const PATTERN_MINING: StrategyWeights = StrategyWeights {
    name: "pattern-mining",
    description: "Exploitation des transitions répétées à décalage",
    frequency: 0.8,
    omission: 0.6,
    transition: 2.0,
    pattern: 1.0,
    synergy: 0.8,
};

/// Catalogue fixe ; l'ordre sert de départage (l'indice le plus bas l'emporte).
pub const CATALOG: [StrategyWeights; 4] = [BALANCED, HOT_TRACKING, COLD_REVERSION, PATTERN_MINING];

/// Stratégie retenue quand l'historique est trop court pour un backtest.
pub const DEFAULT_STRATEGY: usize = 0;

pub fn catalog() -> &'static [StrategyWeights] {
    &CATALOG
}

pub fn find(name: &str) -> Option<&'static StrategyWeights> {
    CATALOG.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}
