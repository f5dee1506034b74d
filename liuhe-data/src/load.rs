use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{normalize_history, DrawRecord, RawDraw, RawNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    Json,
    Csv,
}

impl HistoryFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => HistoryFormat::Csv,
            _ => HistoryFormat::Json,
        }
    }
}

/// Lit les enregistrements bruts d'un fichier d'historique.
/// Les éléments illisibles sont ignorés avec un avertissement.
pub fn read_raw_history(path: &Path) -> Result<Vec<RawDraw>> {
    match HistoryFormat::from_path(path) {
        HistoryFormat::Json => read_json(path),
        HistoryFormat::Csv => read_csv(path),
    }
}

/// Charge et normalise un historique. Avec `chronological`, le fichier est
/// supposé trié du plus ancien au plus récent et est inversé.
pub fn load_history(path: &Path, chronological: bool) -> Result<Vec<DrawRecord>> {
    let mut raw = read_raw_history(path)?;
    if chronological {
        raw.reverse();
    }
    let draws = normalize_history(&raw);
    log::info!("{} tirages chargés depuis {:?} ({} ignorés)", draws.len(), path, raw.len() - draws.len());
    Ok(draws)
}

pub fn save_history(draws: &[DrawRecord], path: &Path) -> Result<()> {
    let raw: Vec<RawDraw> = draws.iter().map(RawDraw::from).collect();
    let json = serde_json::to_string_pretty(&raw)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

fn read_json(path: &Path) -> Result<Vec<RawDraw>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&json)
        .with_context(|| format!("JSON invalide dans {:?} (tableau de tirages attendu)", path))?;

    let mut raw = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawDraw>(value) {
            Ok(record) => raw.push(record),
            Err(e) => log::warn!("Élément {} ignoré : {}", i, e),
        }
    }
    Ok(raw)
}

/// CSV `;` : draw_id;timestamp;n1;n2;n3;n4;n5;n6;special
fn read_csv(path: &Path) -> Result<Vec<RawDraw>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut raw = Vec::new();
    for (line, record_result) in reader.records().enumerate() {
        match record_result {
            Ok(record) => raw.push(parse_record(&record)),
            Err(e) => log::warn!("Erreur lecture ligne {}: {}", line + 1, e),
        }
    }
    Ok(raw)
}

fn parse_record(record: &csv::StringRecord) -> RawDraw {
    let field = |idx: usize| record.get(idx).map(str::trim).filter(|s| !s.is_empty());

    RawDraw {
        draw_id: field(0)
            .map(|s| serde_json::Value::String(s.to_string()))
            .unwrap_or_default(),
        timestamp: field(1).map(str::to_string),
        primary: (2..8).filter_map(field).map(RawNumber::from).collect(),
        special: field(8).map(RawNumber::from),
    }
}
