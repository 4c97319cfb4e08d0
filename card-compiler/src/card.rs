//! The `CardConfig` wire format consumed by the card preview.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A compiled card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Card identifier; the object-storage key of its image.
    pub id: String,
    /// Uploaded image.
    pub image: CardImage,
    /// Colours extracted from the image.
    pub colors: CardColors,
    /// Display text.
    pub text: CardTextBlock,
    /// Card layout.
    pub layout: CardLayout,
    /// Generation metadata and card-game fields.
    pub meta: CardMeta,
}

/// Location of the uploaded card image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    /// Public URL.
    pub url: String,
    /// Object-storage key.
    pub key: String,
}

/// Card colours as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardColors {
    /// Dominant colour.
    pub primary: String,
    /// Accent colour.
    pub secondary: String,
    /// Readable text colour over `primary`.
    pub text: String,
}

/// Display text shown on the card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardTextBlock {
    /// Headline.
    pub title: String,
    /// Optional second line; empty when absent.
    pub subtitle: String,
    /// Body copy.
    pub body: String,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Left aligned.
    Left,
    /// Centred.
    Center,
    /// Right aligned.
    Right,
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown alignment: {other}")),
        }
    }
}

/// Card dimensions and padding in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLayout {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Inner padding.
    pub padding: u32,
    /// Text alignment.
    pub align: Align,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            padding: 64,
            align: Align::Center,
        }
    }
}

/// Per-field layout overrides applied on top of a template's layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOverrides {
    /// Width override.
    pub width: Option<u32>,
    /// Height override.
    pub height: Option<u32>,
    /// Padding override.
    pub padding: Option<u32>,
    /// Alignment override.
    pub align: Option<Align>,
}

impl CardLayout {
    /// Apply overrides, keeping fields that are not overridden.
    #[must_use]
    pub fn with_overrides(self, overrides: LayoutOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            padding: overrides.padding.unwrap_or(self.padding),
            align: overrides.align.unwrap_or(self.align),
        }
    }
}

/// Metadata and card-game fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMeta {
    /// The intent the card was compiled for; empty if none was given.
    pub intent: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_at: String,
    /// Template name.
    pub template: String,
    /// Card name.
    pub name: String,
    /// Card category, e.g. "Fire Monster".
    #[serde(rename = "type")]
    pub kind: String,
    /// Rarity code.
    pub rarity: String,
    /// Attack value.
    pub attack: i64,
    /// Defense value.
    pub defense: i64,
    /// Effect text.
    pub effect: String,
    /// Flavor text.
    pub flavor_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_overrides() {
        let layout = CardLayout::default().with_overrides(LayoutOverrides {
            width: Some(500),
            align: Some(Align::Left),
            ..LayoutOverrides::default()
        });
        assert_eq!(layout.width, 500);
        assert_eq!(layout.height, 1920);
        assert_eq!(layout.padding, 64);
        assert_eq!(layout.align, Align::Left);
    }

    #[test]
    fn test_align_parse() {
        assert_eq!("CENTER".parse::<Align>(), Ok(Align::Center));
        assert_eq!("right".parse::<Align>(), Ok(Align::Right));
        assert!("middle".parse::<Align>().is_err());
    }

    #[test]
    fn test_meta_wire_names() {
        let meta = CardMeta {
            intent: String::new(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            template: "default".into(),
            name: "n".into(),
            kind: "t".into(),
            rarity: "N".into(),
            attack: 1,
            defense: 2,
            effect: "e".into(),
            flavor_text: "f".into(),
        };
        let json = serde_json::to_value(&meta).expect("serialize");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00.000Z");
        assert_eq!(json["type"], "t");
        assert_eq!(json["flavorText"], "f");
        assert_eq!(json["attack"], 1);
    }
}
