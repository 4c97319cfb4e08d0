//! Layers - the visual elements of a card.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a layer. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Full-card backdrop.
    Background,
    /// Main illustration.
    Subject,
    /// Overlay effect image.
    Effect,
    /// Card frame image.
    Frame,
    /// Literal text.
    Text,
}

impl LayerKind {
    /// Capitalised label used for default layer names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Subject => "Subject",
            Self::Effect => "Effect",
            Self::Frame => "Frame",
            Self::Text => "Text",
        }
    }

    /// Whether `content` holds literal text rather than an image reference.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Default font size for new text layers.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
/// Default font family for new text layers.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Default fill colour for new text layers.
pub const DEFAULT_FILL: &str = "#000000";
/// Default alignment for new text layers.
pub const DEFAULT_ALIGN: &str = "left";
/// Content given to text layers created without any.
pub const DEFAULT_TEXT_CONTENT: &str = "New Text";

/// One positioned, stylable visual element of a card.
///
/// `id` and `kind` are fixed for the lifetime of the layer. Everything else
/// is mutated through [`crate::LayerPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    id: LayerId,
    #[serde(rename = "type")]
    kind: LayerKind,
    /// Display label.
    pub name: String,
    /// Whether the layer is painted.
    pub visible: bool,
    /// Whether gestures may move or resize the layer.
    pub locked: bool,
    /// Image reference, or literal text for text layers.
    pub content: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Opacity, conceptually in `[0, 1]` but not clamped.
    pub opacity: f64,
    /// Stacking order; higher paints later.
    pub z_index: i32,
    /// Font size (text layers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font family (text layers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Fill colour as hex (text layers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Horizontal alignment (text layers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
}

impl Layer {
    /// Build a layer with the type-appropriate defaults.
    ///
    /// Only the document creates layers, so this stays crate-private.
    pub(crate) fn new(kind: LayerKind, name: String, content: Option<String>, z_index: i32) -> Self {
        let is_text = kind.is_text();
        let content = match content {
            Some(c) => c,
            None if is_text => DEFAULT_TEXT_CONTENT.to_string(),
            None => String::new(),
        };
        Self {
            id: LayerId::new(),
            kind,
            name,
            visible: true,
            locked: false,
            content,
            x: 50.0,
            y: 50.0,
            width: if is_text { 200.0 } else { 100.0 },
            height: if is_text { 50.0 } else { 100.0 },
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            z_index,
            font_size: is_text.then_some(DEFAULT_FONT_SIZE),
            font_family: is_text.then(|| DEFAULT_FONT_FAMILY.to_string()),
            fill: is_text.then(|| DEFAULT_FILL.to_string()),
            align: is_text.then(|| DEFAULT_ALIGN.to_string()),
        }
    }

    /// The full-canvas background every new document starts with.
    pub(crate) fn background(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(width),
            height: f64::from(height),
            ..Self::new(LayerKind::Background, "Background".to_string(), None, 0)
        }
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Layer kind.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_layer_defaults() {
        let layer = Layer::new(LayerKind::Text, "Text 2".into(), None, 1);
        assert_eq!(layer.content, "New Text");
        assert_eq!(layer.width, 200.0);
        assert_eq!(layer.height, 50.0);
        assert_eq!(layer.font_size, Some(24.0));
        assert_eq!(layer.font_family.as_deref(), Some("Arial"));
        assert_eq!(layer.fill.as_deref(), Some("#000000"));
        assert_eq!(layer.align.as_deref(), Some("left"));
    }

    #[test]
    fn test_image_layer_defaults() {
        let layer = Layer::new(LayerKind::Subject, "Subject 2".into(), Some("a.png".into()), 1);
        assert_eq!(layer.content, "a.png");
        assert_eq!((layer.x, layer.y), (50.0, 50.0));
        assert_eq!((layer.width, layer.height), (100.0, 100.0));
        assert!(layer.visible);
        assert!(!layer.locked);
        assert!(layer.font_size.is_none());
    }

    #[test]
    fn test_layer_serializes_camel_case() {
        let layer = Layer::new(LayerKind::Frame, "Frame 2".into(), None, 3);
        let json = serde_json::to_value(&layer).expect("serialize");
        assert_eq!(json["type"], "frame");
        assert_eq!(json["zIndex"], 3);
        assert_eq!(json["scaleX"], 1.0);
        assert!(json.get("fontSize").is_none());
    }
}
