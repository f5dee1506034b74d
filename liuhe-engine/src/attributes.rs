use std::sync::LazyLock;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use liuhe_data::models::{VALUE_COUNT, VALUE_MAX, VALUE_MIN};

/// Signes du zodiaque, dans l'ordre traditionnel du cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zodiac {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

impl Zodiac {
    pub const ALL: [Zodiac; 12] = [
        Zodiac::Rat,
        Zodiac::Ox,
        Zodiac::Tiger,
        Zodiac::Rabbit,
        Zodiac::Dragon,
        Zodiac::Snake,
        Zodiac::Horse,
        Zodiac::Goat,
        Zodiac::Monkey,
        Zodiac::Rooster,
        Zodiac::Dog,
        Zodiac::Pig,
    ];

    /// Signe de l'année en cours : c'est lui qui porte le numéro 1.
    pub const YEAR_SIGN: Zodiac = Zodiac::Snake;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Zodiac::Rat => "鼠",
            Zodiac::Ox => "牛",
            Zodiac::Tiger => "虎",
            Zodiac::Rabbit => "兔",
            Zodiac::Dragon => "龙",
            Zodiac::Snake => "蛇",
            Zodiac::Horse => "马",
            Zodiac::Goat => "羊",
            Zodiac::Monkey => "猴",
            Zodiac::Rooster => "鸡",
            Zodiac::Dog => "狗",
            Zodiac::Pig => "猪",
        }
    }
}

impl std::fmt::Display for Zodiac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Red,
    Blue,
    Green,
}

impl ColorBand {
    pub const ALL: [ColorBand; 3] = [ColorBand::Red, ColorBand::Blue, ColorBand::Green];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorBand::Red => "rouge",
            ColorBand::Blue => "bleu",
            ColorBand::Green => "vert",
        }
    }
}

impl std::fmt::Display for ColorBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

const RED: [u8; 17] = [1, 2, 7, 8, 12, 13, 18, 19, 23, 24, 29, 30, 34, 35, 40, 45, 46];
const BLUE: [u8; 16] = [3, 4, 9, 10, 14, 15, 20, 25, 26, 31, 36, 37, 41, 42, 47, 48];

pub const HEAD_COUNT: usize = 5;
pub const TAIL_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub value: u8,
    pub zodiac: Zodiac,
    pub color: ColorBand,
    pub parity: Parity,
    pub head: u8,
    pub tail: u8,
}

fn build_info(value: u8) -> CategoryInfo {
    // Le cycle recule d'un signe à chaque numéro à partir du signe de l'année
    let offset = (value as usize - 1) % 12;
    let zodiac = Zodiac::ALL[(Zodiac::YEAR_SIGN.index() + 12 - offset) % 12];

    let color = if RED.contains(&value) {
        ColorBand::Red
    } else if BLUE.contains(&value) {
        ColorBand::Blue
    } else {
        ColorBand::Green
    };

    CategoryInfo {
        value,
        zodiac,
        color,
        parity: if value % 2 == 1 { Parity::Odd } else { Parity::Even },
        head: value / 10,
        tail: value % 10,
    }
}

static TABLE: LazyLock<Vec<CategoryInfo>> =
    LazyLock::new(|| (VALUE_MIN..=VALUE_MAX).map(build_info).collect());

/// Attributs fixes d'une valeur ; `None` hors de 1..=49.
pub fn category_of(value: u8) -> Option<CategoryInfo> {
    if value < VALUE_MIN {
        return None;
    }
    TABLE.get(value as usize - 1).copied()
}

pub fn zodiac_of(value: u8) -> Option<Zodiac> {
    category_of(value).map(|c| c.zodiac)
}

pub fn color_of(value: u8) -> Option<ColorBand> {
    category_of(value).map(|c| c.color)
}

pub fn values_of(zodiac: Zodiac) -> Vec<u8> {
    TABLE.iter().filter(|c| c.zodiac == zodiac).map(|c| c.value).collect()
}

pub fn table() -> &'static [CategoryInfo] {
    &TABLE
}

/// Vérifie la complétude et la cohérence de la table (appelée au démarrage).
pub fn validate_table() -> Result<()> {
    if TABLE.len() != VALUE_COUNT {
        bail!("Table d'attributs incomplète : {} entrées au lieu de {}", TABLE.len(), VALUE_COUNT);
    }
    for (i, info) in TABLE.iter().enumerate() {
        let expected = (i + 1) as u8;
        if info.value != expected {
            bail!("Entrée {} de la table porte la valeur {}", expected, info.value);
        }
        if info.head as usize >= HEAD_COUNT || info.tail as usize >= TAIL_COUNT {
            bail!("Tête/queue invalides pour {}", info.value);
        }
        if i >= 12 && TABLE[i - 12].zodiac != info.zodiac {
            bail!("Cycle zodiacal rompu entre {} et {}", info.value - 12, info.value);
        }
    }
    for zodiac in Zodiac::ALL {
        let n = values_of(zodiac).len();
        if !(4..=5).contains(&n) {
            bail!("Le signe {} couvre {} numéros", zodiac, n);
        }
    }
    let mut per_color = [0usize; 3];
    for info in TABLE.iter() {
        per_color[info.color.index()] += 1;
    }
    if per_color != [RED.len(), BLUE.len(), VALUE_COUNT - RED.len() - BLUE.len()] {
        bail!("Répartition des couleurs incohérente : {:?}", per_color);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_valid() {
        assert!(validate_table().is_ok());
    }

    #[test]
    fn test_total_over_range() {
        for v in 1..=49u8 {
            let info = category_of(v).unwrap();
            assert_eq!(info.value, v);
        }
        assert!(category_of(0).is_none());
        assert!(category_of(50).is_none());
        assert!(category_of(255).is_none());
    }

    #[test]
    fn test_zodiac_cycle() {
        assert_eq!(zodiac_of(1), Some(Zodiac::Snake));
        assert_eq!(zodiac_of(2), Some(Zodiac::Dragon));
        assert_eq!(zodiac_of(6), Some(Zodiac::Rat));
        assert_eq!(zodiac_of(7), Some(Zodiac::Pig));
        assert_eq!(zodiac_of(12), Some(Zodiac::Horse));
        assert_eq!(zodiac_of(13), Some(Zodiac::Snake));
        assert_eq!(zodiac_of(49), Some(Zodiac::Snake));
        assert_eq!(values_of(Zodiac::Snake), vec![1, 13, 25, 37, 49]);
        assert_eq!(values_of(Zodiac::Pig), vec![7, 19, 31, 43]);
    }

    #[test]
    fn test_colors() {
        assert_eq!(color_of(1), Some(ColorBand::Red));
        assert_eq!(color_of(3), Some(ColorBand::Blue));
        assert_eq!(color_of(5), Some(ColorBand::Green));
        assert_eq!(color_of(49), Some(ColorBand::Green));
        assert_eq!(color_of(48), Some(ColorBand::Blue));
    }

    #[test]
    fn test_head_tail_parity() {
        let info = category_of(37).unwrap();
        assert_eq!(info.head, 3);
        assert_eq!(info.tail, 7);
        assert_eq!(info.parity, Parity::Odd);
        assert_eq!(category_of(40).unwrap().parity, Parity::Even);
        assert_eq!(category_of(9).unwrap().head, 0);
    }
}
