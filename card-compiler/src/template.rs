//! Templates: named presets for layout and stat post-processing.

use std::fmt;
use std::str::FromStr;

use crate::card::{Align, CardLayout};

/// Name of the trading-card template.
pub const TCG_BASIC: &str = "tcg-basic";

/// Name used when no template is given.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Upper bound for attack and defense after normalisation.
pub const MAX_STAT: i64 = 4000;

/// A card template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Template {
    /// General-purpose portrait card.
    #[default]
    Default,
    /// Trading-card-game card with clamped stats and validated rarity.
    TcgBasic,
    /// Any other name. Behaves like [`Template::Default`] but keeps its name.
    Other(String),
}

impl Template {
    /// Resolve a template by name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            DEFAULT_TEMPLATE => Self::Default,
            TCG_BASIC => Self::TcgBasic,
            other => Self::Other(other.to_string()),
        }
    }

    /// Template name as written into `meta.template`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Default => DEFAULT_TEMPLATE,
            Self::TcgBasic => TCG_BASIC,
            Self::Other(name) => name,
        }
    }

    /// Whether this template post-processes card-game stats.
    #[must_use]
    pub fn is_tcg(&self) -> bool {
        matches!(self, Self::TcgBasic)
    }

    /// Layout used before any overrides.
    #[must_use]
    pub fn base_layout(&self) -> CardLayout {
        match self {
            Self::TcgBasic => CardLayout {
                width: 744,
                height: 1039,
                padding: 48,
                align: Align::Center,
            },
            Self::Default | Self::Other(_) => CardLayout::default(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Card rarity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rarity {
    /// Normal.
    N,
    /// Rare.
    R,
    /// Super rare.
    SR,
    /// Super-super rare.
    SSR,
    /// Ultra rare.
    UR,
}

impl Rarity {
    /// Rarity implied by a card's strongest stat.
    #[must_use]
    pub fn from_power(power: i64) -> Self {
        match power {
            p if p < 800 => Self::N,
            p if p < 1600 => Self::R,
            p if p < 2500 => Self::SR,
            p if p < 3200 => Self::SSR,
            _ => Self::UR,
        }
    }

    /// Rarity code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::R => "R",
            Self::SR => "SR",
            Self::SSR => "SSR",
            Self::UR => "UR",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "N" => Ok(Self::N),
            "R" => Ok(Self::R),
            "SR" => Ok(Self::SR),
            "SSR" => Ok(Self::SSR),
            "UR" => Ok(Self::UR),
            other => Err(format!("unknown rarity: {other}")),
        }
    }
}

/// Attack, defense and rarity after template post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcgStats {
    /// Attack in `[0, MAX_STAT]`.
    pub attack: i64,
    /// Defense in `[0, MAX_STAT]`.
    pub defense: i64,
    /// Rarity code.
    pub rarity: Rarity,
}

/// Clamp stats into range and make sure the rarity is a known code.
///
/// An unknown or empty rarity is replaced by the rarity implied by
/// `max(attack, defense)` after clamping.
#[must_use]
pub fn normalize_tcg_stats(attack: i64, defense: i64, rarity: &str) -> TcgStats {
    let attack = attack.clamp(0, MAX_STAT);
    let defense = defense.clamp(0, MAX_STAT);
    let rarity = if rarity.is_empty() { "N" } else { rarity };
    let rarity = rarity
        .parse()
        .unwrap_or_else(|_| Rarity::from_power(attack.max(defense)));
    TcgStats {
        attack,
        defense,
        rarity,
    }
}
