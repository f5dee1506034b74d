use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const VALUE_MIN: u8 = 1;
pub const VALUE_MAX: u8 = 49;
/// Nombre de valeurs possibles (1..=49).
pub const VALUE_COUNT: usize = VALUE_MAX as usize;
pub const PRIMARY_COUNT: usize = 6;

/// Tirage canonique. `history[0]` est toujours le plus récent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub draw_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub primary: Vec<u8>,
    pub special: u8,
}

impl DrawRecord {
    pub fn new(draw_id: impl Into<String>, primary: [u8; PRIMARY_COUNT], special: u8) -> Result<Self> {
        validate_draw(&primary, special)?;
        Ok(Self {
            draw_id: draw_id.into(),
            timestamp: None,
            primary: primary.to_vec(),
            special,
        })
    }

    pub fn has_primary(&self, value: u8) -> bool {
        self.primary.contains(&value)
    }
}

pub fn is_valid_value(value: u8) -> bool {
    (VALUE_MIN..=VALUE_MAX).contains(&value)
}

pub fn validate_draw(primary: &[u8], special: u8) -> Result<()> {
    if primary.len() != PRIMARY_COUNT {
        bail!("Attendu {} numéros principaux, reçu {}", PRIMARY_COUNT, primary.len());
    }
    for &n in primary {
        if !is_valid_value(n) {
            bail!("Numéro {} hors limites (1-49)", n);
        }
    }
    if !is_valid_value(special) {
        bail!("Numéro spécial {} hors limites (1-49)", special);
    }
    for i in 0..primary.len() {
        for j in (i + 1)..primary.len() {
            if primary[i] == primary[j] {
                bail!("Numéro en double : {}", primary[i]);
            }
        }
    }
    if primary.contains(&special) {
        bail!("Le numéro spécial {} figure déjà parmi les numéros principaux", special);
    }
    Ok(())
}

/// Valeur numérique telle qu'elle arrive de l'extérieur : entier, flottant ou texte ("07").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawNumber {
    /// Convertit en valeur 1..=49, `None` si illisible ou hors limites.
    pub fn coerce(&self) -> Option<u8> {
        let n = match self {
            RawNumber::Int(n) => *n,
            RawNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i64,
            RawNumber::Text(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        u8::try_from(n).ok().filter(|&v| is_valid_value(v))
    }
}

impl From<u8> for RawNumber {
    fn from(value: u8) -> Self {
        RawNumber::Int(value as i64)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// Enregistrement brut : mêmes champs que `DrawRecord`, sans garantie de validité.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDraw {
    #[serde(default)]
    pub draw_id: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub primary: Vec<RawNumber>,
    #[serde(default)]
    pub special: Option<RawNumber>,
}

impl From<&DrawRecord> for RawDraw {
    fn from(draw: &DrawRecord) -> Self {
        Self {
            draw_id: serde_json::Value::String(draw.draw_id.clone()),
            timestamp: draw.timestamp.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            primary: draw.primary.iter().map(|&n| RawNumber::from(n)).collect(),
            special: Some(RawNumber::from(draw.special)),
        }
    }
}

/// Formats acceptés : RFC 3339, "AAAA-MM-JJ HH:MM:SS", "AAAA-MM-JJ", "JJ/MM/AAAA".
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn draw_id_of(value: &serde_json::Value, position: usize) -> String {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => format!("#{}", position),
    }
}

/// Convertit un historique brut (le plus récent en premier) en tirages canoniques.
/// Un enregistrement sans numéro spécial exploitable est ignoré ; des numéros
/// principaux invalides sont retirés sans écarter le tirage.
pub fn normalize_history(raw: &[RawDraw]) -> Vec<DrawRecord> {
    let mut draws = Vec::with_capacity(raw.len());

    for (position, record) in raw.iter().enumerate() {
        let draw_id = draw_id_of(&record.draw_id, position);

        let Some(special) = record.special.as_ref().and_then(RawNumber::coerce) else {
            log::warn!("Tirage {} ignoré : numéro spécial manquant ou invalide ({:?})", draw_id, record.special);
            continue;
        };

        let mut primary: Vec<u8> = Vec::with_capacity(PRIMARY_COUNT);
        for n in record.primary.iter().filter_map(RawNumber::coerce) {
            if n != special && !primary.contains(&n) {
                primary.push(n);
            }
        }
        if primary.len() != record.primary.len() {
            log::debug!(
                "Tirage {} : {} numéro(s) principal(aux) écarté(s)",
                draw_id,
                record.primary.len() - primary.len()
            );
        }

        draws.push(DrawRecord {
            draw_id,
            timestamp: record.timestamp.as_deref().and_then(parse_timestamp),
            primary,
            special,
        });
    }

    draws
}

/// Historique synthétique déterministe de `n` tirages (le plus récent en premier).
pub fn make_test_history(n: usize) -> Vec<DrawRecord> {
    let origin = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(21, 30, 0))
        .unwrap_or_default();

    (0..n)
        .map(|i| {
            let special = ((i * 11) % VALUE_COUNT) as u8 + 1;
            let start = (i * 5) % VALUE_COUNT;
            let primary: Vec<u8> = (0..=PRIMARY_COUNT)
                .map(|k| ((start + k * 8) % VALUE_COUNT) as u8 + 1)
                .filter(|&v| v != special)
                .take(PRIMARY_COUNT)
                .collect();
            DrawRecord {
                draw_id: format!("{:03}", n - i),
                timestamp: Some(origin + Duration::days(2 * (n - 1 - i) as i64)),
                primary,
                special,
            }
        })
        .collect()
}
