use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::attributes::{
    category_of, table as attribute_table, values_of, ColorBand, Parity, Zodiac, HEAD_COUNT, TAIL_COUNT,
};
use crate::backtest::StrategySelection;
use crate::evaluate::{HitReport, ReplaySummary, HIT_LABELS};
use crate::recommend::RecommendationResult;
use crate::scoring::ScoredCandidate;
use crate::stats::AttributeStatistics;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn band_color(band: ColorBand) -> Color {
    match band {
        ColorBand::Red => Color::Red,
        ColorBand::Blue => Color::Blue,
        ColorBand::Green => Color::Green,
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "—".to_string();
    }
    items.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" ")
}

fn join_values(values: &[u8]) -> String {
    if values.is_empty() {
        return "—".to_string();
    }
    values.iter().map(|v| format!("{:02}", v)).collect::<Vec<_>>().join(" ")
}

fn hit_cell(hit: bool) -> Cell {
    if hit {
        Cell::new("oui").fg(Color::Green)
    } else {
        Cell::new("non").fg(Color::Red)
    }
}

pub fn display_recommendation(result: &RecommendationResult) {
    println!("\n== Recommandation ({} tirages) ==\n", result.draw_count);

    let mut table = new_table();
    table.set_header(vec!["Agrégat", "Valeur"]);
    table.add_row(vec![Cell::new("Stratégie"), Cell::new(&result.strategy)]);
    table.add_row(vec![Cell::new("Signes"), Cell::new(join(&result.top_categories)).fg(Color::Yellow)]);
    table.add_row(vec![Cell::new("Numéros"), Cell::new(join_values(&result.top_values))]);
    table.add_row(vec![Cell::new("Noyau"), Cell::new(join_values(&result.core_values)).fg(Color::Green)]);
    table.add_row(vec![Cell::new("Dizaines"), Cell::new(join(&result.top_heads))]);
    table.add_row(vec![Cell::new("Unités"), Cell::new(join(&result.top_tails))]);
    let colors = match result.top_colors.first() {
        Some(&band) => Cell::new(join(&result.top_colors)).fg(band_color(band)),
        None => Cell::new("—"),
    };
    table.add_row(vec![Cell::new("Couleurs"), colors]);
    if let Some(p) = &result.pattern {
        table.add_row(vec![
            Cell::new("Transition"),
            Cell::new(format!("{} → {} (décalage {}, {}/{})", p.from, p.to, p.lag, p.count, p.support)),
        ]);
    }
    let confidence_color = match result.confidence {
        0..=59 => Color::Red,
        60..=79 => Color::Yellow,
        _ => Color::Green,
    };
    table.add_row(vec![
        Cell::new("Confiance"),
        Cell::new(format!("{} %", result.confidence)).fg(confidence_color),
    ]);
    println!("{table}");

    println!("\n{}", result.rationale);
}

pub fn display_scores(ranked: &[ScoredCandidate], n: usize) {
    println!("\n== Meilleurs scores ==\n");

    let mut table = new_table();
    table.set_header(vec!["Rang", "Numéro", "Signe", "Couleur", "Score", "Motif"]);

    for (i, c) in ranked.iter().take(n).enumerate() {
        let info = category_of(c.value);
        let zodiac = info.map(|a| a.zodiac.to_string()).unwrap_or_default();
        let color = match info {
            Some(a) => Cell::new(a.color).fg(band_color(a.color)),
            None => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:02}", c.value)),
            Cell::new(zodiac),
            color,
            Cell::new(format!("{:.2}", c.score)),
            Cell::new(c.reason.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}

pub fn display_backtest(selection: &StrategySelection, hit_cutoff: usize) {
    println!("\n== Sélection de stratégie ==\n");

    if selection.skipped {
        println!(
            "Historique trop court : stratégie par défaut « {} ».",
            selection.strategy.name
        );
        return;
    }

    let mut table = new_table();
    table.set_header(vec![
        "Stratégie".to_string(),
        "Rang cumulé".to_string(),
        "Rang moyen".to_string(),
        format!("Top {}", hit_cutoff),
        "Rangs".to_string(),
    ]);

    for (i, report) in selection.reports.iter().enumerate() {
        let mean = if report.ranks.is_empty() {
            0.0
        } else {
            report.total_rank as f64 / report.ranks.len() as f64
        };
        let ranks = report.ranks.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(" ");
        let name = if i == selection.index {
            Cell::new(format!("{} *", report.name)).fg(Color::Green)
        } else {
            Cell::new(&report.name)
        };
        table.add_row(vec![
            name,
            Cell::new(report.total_rank),
            Cell::new(format!("{:.1}", mean)),
            Cell::new(format!("{}/{}", report.hits, report.ranks.len())),
            Cell::new(ranks),
        ]);
    }
    println!("{table}");
    println!("Tirages rejoués : {}", selection.test_size);
}

pub fn display_stats(stats: &AttributeStatistics, window: usize) {
    println!(
        "\n== Statistiques ({} tirages, fenêtre {}) ==\n",
        stats.draw_count(),
        stats.frequency_window()
    );

    let mut table = new_table();
    table.set_header(vec![
        "Signe".to_string(),
        "Numéros".to_string(),
        "Fréquence".to_string(),
        format!("{} derniers", window),
    ]);
    for zodiac in Zodiac::ALL {
        table.add_row(vec![
            Cell::new(zodiac),
            Cell::new(join_values(&values_of(zodiac))),
            Cell::new(stats.zodiac_frequency(zodiac)),
            Cell::new(stats.zodiac_frequency_in(zodiac, window)),
        ]);
    }
    println!("{table}");

    let mut table = new_table();
    table.set_header(vec!["Couleur", "Fréquence"]);
    for band in ColorBand::ALL {
        table.add_row(vec![
            Cell::new(band).fg(band_color(band)),
            Cell::new(stats.color_frequency(band)),
        ]);
    }
    println!("{table}");

    let heads: Vec<String> = (0..HEAD_COUNT as u8)
        .map(|h| format!("{}:{}", h, stats.head_frequency(h)))
        .collect();
    let tails: Vec<String> = (0..TAIL_COUNT as u8)
        .map(|t| format!("{}:{}", t, stats.tail_frequency(t)))
        .collect();
    println!("Dizaines : {}", heads.join("  "));
    println!("Unités   : {}", tails.join("  "));

    let mut values: Vec<u8> = (1..=49).collect();
    values.sort_by(|a, b| stats.frequency(*b).cmp(&stats.frequency(*a)).then(a.cmp(b)));
    let hot: Vec<String> = values
        .iter()
        .take(10)
        .map(|v| format!("{:02}({})", v, stats.frequency(*v)))
        .collect();
    values.sort_by(|a, b| stats.omission(*b).cmp(&stats.omission(*a)).then(a.cmp(b)));
    let cold: Vec<String> = values
        .iter()
        .take(10)
        .map(|v| format!("{:02}({})", v, stats.omission(*v)))
        .collect();

    let mut table = new_table();
    table.set_header(vec!["Numéros chauds", "Plus longs retards"]);
    table.add_row(vec![
        Cell::new(hot.join(" ")).fg(Color::Red),
        Cell::new(cold.join(" ")).fg(Color::Blue),
    ]);
    println!("{table}");
}

pub fn display_hit_report(report: &HitReport) {
    println!("\n== Vérification (numéro {:02}) ==\n", report.special);

    let mut table = new_table();
    table.set_header(vec!["Agrégat", "Touché"]);
    for (label, hit) in HIT_LABELS.iter().zip(report.flags()) {
        table.add_row(vec![Cell::new(label), hit_cell(hit)]);
    }
    println!("{table}");
}

pub fn display_replay(summary: &ReplaySummary) {
    println!("\n== Rejeu sur {} tirages ==\n", summary.len());

    if summary.is_empty() {
        println!("  (Pas assez de tirages pour rejouer)");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Tirage", "Stratégie", "Confiance", "Numéro", "18", "Noyau", "Signe"]);
    for step in &summary.steps {
        table.add_row(vec![
            Cell::new(&step.draw_id),
            Cell::new(&step.strategy),
            Cell::new(step.confidence),
            Cell::new(format!("{:02}", step.report.special)),
            hit_cell(step.report.value_hit),
            hit_cell(step.report.core_hit),
            hit_cell(step.report.category_hit),
        ]);
    }
    println!("{table}");

    let mut table = new_table();
    table.set_header(vec!["Agrégat", "Succès", "Taux", "Hasard", "Écart"]);
    for rate in &summary.rates {
        let edge = rate.rate - rate.baseline;
        let color = if edge > 0.0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(rate.label),
            Cell::new(format!("{}/{}", rate.hits, summary.len())),
            Cell::new(format!("{:.1} %", rate.rate * 100.0)),
            Cell::new(format!("{:.1} %", rate.baseline * 100.0)),
            Cell::new(format!("{:+.1} pts", edge * 100.0)).fg(color),
        ]);
    }
    println!("{table}");

    let counts: Vec<String> = summary
        .strategy_counts
        .iter()
        .map(|(name, count)| format!("{} ×{}", name, count))
        .collect();
    println!("Stratégies retenues : {}", counts.join(", "));
    println!("Confiance moyenne : {:.1}", summary.mean_confidence);
}

pub fn display_attribute_table() {
    println!("\n== Table des attributs ==\n");

    let mut table = new_table();
    table.set_header(vec!["Numéro", "Signe", "Couleur", "Parité", "Dizaine", "Unité"]);
    for info in attribute_table() {
        let parity = match info.parity {
            Parity::Odd => "impair",
            Parity::Even => "pair",
        };
        table.add_row(vec![
            Cell::new(format!("{:02}", info.value)),
            Cell::new(info.zodiac),
            Cell::new(info.color).fg(band_color(info.color)),
            Cell::new(parity),
            Cell::new(info.head),
            Cell::new(info.tail),
        ]);
    }
    println!("{table}");
}
