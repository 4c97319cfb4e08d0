//! Per-pass paint list for a rendering surface.

use serde::Serialize;

use crate::layer::{DEFAULT_ALIGN, DEFAULT_FILL, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::{Document, Layer, LayerId, LayerKind};

/// Placeholder drawn for text layers with empty content.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "Double-click to edit";

/// What a renderer draws for one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaintContent {
    /// An image reference. Empty when no source has been set.
    Image {
        /// Image URL or opaque reference.
        src: String,
    },
    /// Resolved text run.
    Text {
        /// Text to draw.
        text: String,
        /// Font size.
        font_size: f64,
        /// Font family.
        font_family: String,
        /// Fill colour.
        fill: String,
        /// Horizontal alignment.
        align: String,
    },
}

/// One visible layer, in paint order, with its derived interaction flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintItem {
    /// Layer being drawn.
    pub id: LayerId,
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
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Opacity as stored.
    pub opacity: f64,
    /// Content to draw.
    pub content: PaintContent,
    /// Whether this layer is the current selection.
    pub selected: bool,
    /// Whether drag gestures are accepted.
    pub draggable: bool,
    /// Whether transform handles are attached. Text layers never get them.
    pub show_handles: bool,
}

impl PaintItem {
    fn from_layer(layer: &Layer, selected: bool) -> Self {
        let content = match layer.kind() {
            LayerKind::Text => PaintContent::Text {
                text: if layer.content.is_empty() {
                    EMPTY_TEXT_PLACEHOLDER.to_string()
                } else {
                    layer.content.clone()
                },
                font_size: layer.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                font_family: layer
                    .font_family
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
                fill: layer.fill.clone().unwrap_or_else(|| DEFAULT_FILL.to_string()),
                align: layer.align.clone().unwrap_or_else(|| DEFAULT_ALIGN.to_string()),
            },
            LayerKind::Background | LayerKind::Subject | LayerKind::Effect | LayerKind::Frame => {
                PaintContent::Image {
                    src: layer.content.clone(),
                }
            }
        };
        Self {
            id: layer.id(),
            x: layer.x,
            y: layer.y,
            width: layer.width,
            height: layer.height,
            rotation: layer.rotation,
            scale_x: layer.scale_x,
            scale_y: layer.scale_y,
            opacity: layer.opacity,
            content,
            selected,
            draggable: !layer.locked,
            show_handles: selected && !layer.locked && !layer.kind().is_text(),
        }
    }
}

/// Build the paint list for one render pass: visible layers, bottom first.
#[must_use]
pub fn paint_list(doc: &Document) -> Vec<PaintItem> {
    doc.display_order()
        .into_iter()
        .filter(|l| l.visible)
        .map(|l| PaintItem::from_layer(l, doc.is_selected(l.id())))
        .collect()
}
