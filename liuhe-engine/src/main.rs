use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use liuhe_data::load::{load_history, save_history};
use liuhe_data::models::{is_valid_value, DrawRecord};
use liuhe_engine::attributes::validate_table;
use liuhe_engine::config::{load_config, save_config, EngineConfig, ValueSelection};
use liuhe_engine::display;
use liuhe_engine::evaluate::{evaluate, replay_with};
use liuhe_engine::recommend::{analyze, analyze_with, extract, RecommendationResult};
use liuhe_engine::strategy::{find, StrategyWeights, CATALOG};
use liuhe_engine::stats::AttributeStatistics;

#[derive(Parser)]
#[command(name = "liuhe", about = "Recommandation déterministe pour les tirages 6+1 / 49")]
struct Cli {
    /// Le fichier d'historique est trié du plus ancien au plus récent
    #[arg(long, global = true)]
    chronological: bool,

    /// Fichier de configuration JSON (valeurs par défaut sinon)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculer la recommandation pour le prochain tirage
    Predict {
        /// Historique (JSON ou CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Mode de sélection des 18 numéros
        #[arg(long, value_enum)]
        selection: Option<ValueSelection>,

        /// Imposer une stratégie du catalogue au lieu du backtest
        #[arg(short, long)]
        strategy: Option<String>,

        /// Sortie JSON brute
        #[arg(long)]
        json: bool,

        /// Écrire la recommandation JSON dans ce fichier
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Statistiques d'attributs de l'historique
    Stats {
        #[arg(short, long)]
        file: PathBuf,

        /// Fenêtre récente pour les signes
        #[arg(short, long, default_value = "12")]
        window: usize,
    },

    /// Détail de la sélection de stratégie par backtest
    Backtest {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Rejouer la recommandation sur les derniers tirages
    Replay {
        #[arg(short, long)]
        file: PathBuf,

        /// Nombre de tirages rejoués
        #[arg(short, long, default_value = "20")]
        last: usize,
    },

    /// Vérifier une recommandation sauvegardée contre un numéro tiré
    Check {
        /// Recommandation JSON (produite par predict --output)
        #[arg(short, long)]
        prediction: PathBuf,

        /// Numéro spécial tiré
        #[arg(short, long)]
        special: u8,
    },

    /// Normaliser un historique et l'écrire en JSON
    Import {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "history.json")]
        output: PathBuf,
    },

    /// Afficher la table des attributs
    Attributes,

    /// Écrire la configuration par défaut
    Config {
        #[arg(short, long, default_value = "liuhe.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    validate_table().context("Table des attributs incohérente")?;

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Impossible de charger la configuration {:?}", path))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Predict { file, selection, strategy, json, output } => cmd_predict(
            &file,
            cli.chronological,
            config,
            selection,
            strategy.as_deref(),
            json,
            output.as_deref(),
        ),
        Command::Stats { file, window } => cmd_stats(&file, cli.chronological, &config, window),
        Command::Backtest { file } => cmd_backtest(&file, cli.chronological, &config),
        Command::Replay { file, last } => cmd_replay(&file, cli.chronological, &config, last),
        Command::Check { prediction, special } => cmd_check(&prediction, special),
        Command::Import { file, output } => cmd_import(&file, cli.chronological, &output),
        Command::Attributes => {
            display::display_attribute_table();
            Ok(())
        }
        Command::Config { output } => {
            save_config(&config, &output)
                .with_context(|| format!("Impossible d'écrire {:?}", output))?;
            println!("Configuration écrite dans {:?}", output);
            Ok(())
        }
    }
}

fn load(file: &Path, chronological: bool) -> Result<Vec<DrawRecord>> {
    load_history(file, chronological)
        .with_context(|| format!("Impossible de charger l'historique {:?}", file))
}

fn cmd_predict(
    file: &Path,
    chronological: bool,
    mut config: EngineConfig,
    selection: Option<ValueSelection>,
    strategy: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    if let Some(mode) = selection {
        config.extraction.value_selection = mode;
    }
    let catalog: &[StrategyWeights] = match strategy {
        Some(name) => {
            let Some(forced) = find(name) else {
                let names: Vec<&str> = CATALOG.iter().map(|s| s.name).collect();
                bail!("Stratégie inconnue : {} (disponibles : {})", name, names.join(", "));
            };
            std::slice::from_ref(forced)
        }
        None => &CATALOG,
    };
    let draws = load(file, chronological)?;
    let analysis = analyze_with(&draws, catalog, &config);
    let result = extract(&analysis, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display::display_backtest(&analysis.selection, config.backtest.hit_cutoff);
        if !result.is_empty() {
            display::display_scores(&analysis.ranked, 18);
        }
        display::display_recommendation(&result);
    }

    if let Some(path) = output {
        let content = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, content).with_context(|| format!("Impossible d'écrire {:?}", path))?;
        if !json {
            println!("\nRecommandation sauvegardée dans {:?}", path);
        }
    }
    Ok(())
}

fn cmd_stats(file: &Path, chronological: bool, config: &EngineConfig, window: usize) -> Result<()> {
    let draws = load(file, chronological)?;
    if draws.is_empty() {
        bail!("Aucun tirage exploitable dans {:?}", file);
    }
    let stats = AttributeStatistics::compute(config.limit(&draws), &config.stats);
    display::display_stats(&stats, window);
    Ok(())
}

fn cmd_backtest(file: &Path, chronological: bool, config: &EngineConfig) -> Result<()> {
    let draws = load(file, chronological)?;
    let analysis = analyze(&draws, config);
    display::display_backtest(&analysis.selection, config.backtest.hit_cutoff);
    Ok(())
}

fn cmd_replay(file: &Path, chronological: bool, config: &EngineConfig, last: usize) -> Result<()> {
    let draws = load(file, chronological)?;
    if draws.len() < 2 {
        bail!("Au moins deux tirages sont nécessaires pour un rejeu");
    }

    let steps = last.min(draws.len() - 1);
    println!("Rejeu sur {} tirages...", steps);

    let pb = ProgressBar::new(steps as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("=> "),
    );

    let summary = replay_with(&draws, last, config, || pb.inc(1));
    pb.finish_and_clear();

    display::display_replay(&summary);
    Ok(())
}

fn cmd_check(prediction: &Path, special: u8) -> Result<()> {
    if !is_valid_value(special) {
        bail!("Numéro spécial {} hors de l'intervalle 1-49", special);
    }
    let json = std::fs::read_to_string(prediction)
        .with_context(|| format!("Impossible de lire {:?}", prediction))?;
    let result: RecommendationResult = serde_json::from_str(&json)
        .with_context(|| format!("Recommandation JSON invalide dans {:?}", prediction))?;

    display::display_recommendation(&result);
    display::display_hit_report(&evaluate(&result, special));
    Ok(())
}

fn cmd_import(file: &Path, chronological: bool, output: &Path) -> Result<()> {
    let draws = load(file, chronological)?;
    save_history(&draws, output)?;
    println!("{} tirages écrits dans {:?}", draws.len(), output);
    Ok(())
}
