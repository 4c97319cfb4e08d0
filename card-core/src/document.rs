//! The layer document: ordered layers, selection and canvas bounds.
//!
//! Every transition is total. Unknown ids make an operation a no-op, and each
//! mutating method reports whether the document actually changed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Layer, LayerId, LayerKind, LayerPatch};

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 400;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// A document mutation, as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Append a new layer on top and select it.
    AddLayer {
        /// Kind of the new layer.
        kind: LayerKind,
        /// Optional initial content.
        #[serde(default)]
        content: Option<String>,
    },
    /// Remove a layer.
    RemoveLayer {
        /// Layer to remove.
        id: LayerId,
    },
    /// Merge a patch into a layer.
    UpdateLayer {
        /// Layer to update.
        id: LayerId,
        /// Fields to change.
        patch: LayerPatch,
    },
    /// Change the selection.
    SelectLayer {
        /// New selection, or `None` to clear.
        id: Option<LayerId>,
    },
    /// Move a layer within the insertion list and renumber z-indices.
    ReorderLayer {
        /// Layer to move.
        id: LayerId,
        /// Target insertion-list index.
        index: usize,
    },
    /// Replace the canvas dimensions.
    SetCanvasSize {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

/// The editable card document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Layers in insertion order. Paint order comes from `z_index`.
    layers: Vec<Layer>,
    /// Currently selected layer, if any. May dangle; see [`Self::selected_layer`].
    selected_layer_id: Option<LayerId>,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with a default-sized canvas and one background layer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_canvas(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }

    /// Create a document with the given canvas size and a matching background layer.
    #[must_use]
    pub fn with_canvas(width: u32, height: u32) -> Self {
        Self {
            layers: vec![Layer::background(width, height)],
            selected_layer_id: None,
            canvas_width: width,
            canvas_height: height,
        }
    }

    /// Layers in insertion order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Get a layer by ID.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Insertion-list index of a layer.
    #[must_use]
    pub fn position_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Check if the document has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The raw selection, which may name a layer that no longer exists.
    #[must_use]
    pub fn selected_layer_id(&self) -> Option<LayerId> {
        self.selected_layer_id
    }

    /// The selected layer, or `None` if nothing is selected or the selection dangles.
    #[must_use]
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected_layer_id.and_then(|id| self.layer(id))
    }

    /// Whether `id` is the current selection.
    #[must_use]
    pub fn is_selected(&self, id: LayerId) -> bool {
        self.selected_layer_id == Some(id)
    }

    /// Layers in paint order: stable sort by `z_index` ascending, ties in
    /// insertion order.
    #[must_use]
    pub fn display_order(&self) -> Vec<&Layer> {
        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by_key(|l| l.z_index);
        ordered
    }

    /// Append a new layer on top and select it.
    pub fn add_layer(&mut self, kind: LayerKind, content: Option<String>) -> LayerId {
        let count = self.layers.len();
        let name = format!("{} {}", kind.label(), count + 1);
        let z_index = i32::try_from(count).unwrap_or(i32::MAX);
        let layer = Layer::new(kind, name, content, z_index);
        let id = layer.id();
        self.layers.push(layer);
        self.selected_layer_id = Some(id);
        tracing::debug!("Added {kind:?} layer {id} at z {z_index}");
        id
    }

    /// Remove a layer, clearing the selection if it pointed at it.
    ///
    /// Remaining z-indices are left as they are.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };
        self.layers.remove(pos);
        if self.selected_layer_id == Some(id) {
            self.selected_layer_id = None;
        }
        tracing::debug!("Removed layer {id}");
        true
    }

    /// Merge a patch into a layer.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id() == id) else {
            return false;
        };
        let before = layer.clone();
        patch.apply_to(layer);
        *layer != before
    }

    /// Set the selection without checking that the layer exists.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> bool {
        if self.selected_layer_id == id {
            return false;
        }
        self.selected_layer_id = id;
        true
    }

    /// Move a layer to `index` in the insertion list, then set every layer's
    /// `z_index` to its list position.
    ///
    /// `index` is an insertion-list position, not a display position. An
    /// index past the end appends.
    pub fn reorder_layer(&mut self, id: LayerId, index: usize) -> bool {
        let Some(old) = self.position_of(id) else {
            return false;
        };
        let before = self.clone();
        let layer = self.layers.remove(old);
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = i32::try_from(i).unwrap_or(i32::MAX);
        }
        tracing::debug!("Reordered layer {id} from {old} to {index}");
        *self != before
    }

    /// Replace the canvas dimensions.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> bool {
        if (self.canvas_width, self.canvas_height) == (width, height) {
            return false;
        }
        self.canvas_width = width;
        self.canvas_height = height;
        true
    }

    /// Apply an operation. Returns whether the document changed.
    pub fn apply(&mut self, op: &Operation) -> bool {
        match op {
            Operation::AddLayer { kind, content } => {
                self.add_layer(*kind, content.clone());
                true
            }
            Operation::RemoveLayer { id } => self.remove_layer(*id),
            Operation::UpdateLayer { id, patch } => self.update_layer(*id, patch),
            Operation::SelectLayer { id } => self.select_layer(*id),
            Operation::ReorderLayer { id, index } => self.reorder_layer(*id, *index),
            Operation::SetCanvasSize { width, height } => self.set_canvas_size(*width, *height),
        }
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails, or
    /// [`CoreError::DuplicateLayerId`] if two layers share an id.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let doc: Self = serde_json::from_str(json).map_err(CoreError::Serialization)?;
        let mut seen = HashSet::with_capacity(doc.layers.len());
        if let Some(dup) = doc.layers.iter().map(Layer::id).find(|id| !seen.insert(*id)) {
            return Err(CoreError::DuplicateLayerId(dup));
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z_indices(doc: &Document) -> Vec<i32> {
        doc.layers().iter().map(|l| l.z_index).collect()
    }

    #[test]
    fn test_initial_document() {
        let doc = Document::new();
        assert_eq!(doc.layer_count(), 1);
        assert_eq!((doc.canvas_width, doc.canvas_height), (400, 600));
        assert!(doc.selected_layer_id().is_none());

        let bg = &doc.layers()[0];
        assert_eq!(bg.kind(), LayerKind::Background);
        assert_eq!(bg.name, "Background");
        assert_eq!((bg.x, bg.y, bg.width, bg.height), (0.0, 0.0, 400.0, 600.0));
        assert_eq!(bg.z_index, 0);
        assert!(bg.content.is_empty());
    }

    #[test]
    fn test_add_layer_appends_on_top_and_selects() {
        let mut doc = Document::new();
        let text = doc.add_layer(LayerKind::Text, None);
        let subject = doc.add_layer(LayerKind::Subject, Some("https://x/y.png".into()));

        assert_eq!(doc.layer_count(), 3);
        assert_eq!(doc.selected_layer_id(), Some(subject));

        let text = doc.layer(text).expect("text layer");
        assert_eq!(text.name, "Text 2");
        assert_eq!(text.z_index, 1);

        let subject = doc.layer(subject).expect("subject layer");
        assert_eq!(subject.name, "Subject 3");
        assert_eq!(subject.z_index, 2);
        assert_eq!(subject.content, "https://x/y.png");
    }

    #[test]
    fn test_remove_layer_clears_selection() {
        let mut doc = Document::new();
        let a = doc.add_layer(LayerKind::Effect, None);
        assert!(doc.remove_layer(a));
        assert!(doc.selected_layer_id().is_none());
        assert!(doc.layer(a).is_none());
    }

    #[test]
    fn test_remove_unselected_keeps_selection_and_z() {
        let mut doc = Document::new();
        let a = doc.add_layer(LayerKind::Effect, None);
        let b = doc.add_layer(LayerKind::Frame, None);
        assert!(doc.remove_layer(a));
        assert_eq!(doc.selected_layer_id(), Some(b));
        assert_eq!(z_indices(&doc), vec![0, 2]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut doc = Document::new();
        let before = doc.clone();
        assert!(!doc.remove_layer(LayerId::new()));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut doc = Document::new();
        doc.add_layer(LayerKind::Text, None);
        let before = doc.clone();
        assert!(!doc.update_layer(LayerId::new(), &LayerPatch::position(1.0, 2.0)));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_select_is_lenient() {
        let mut doc = Document::new();
        let ghost = LayerId::new();
        assert!(doc.select_layer(Some(ghost)));
        assert_eq!(doc.selected_layer_id(), Some(ghost));
        assert!(doc.selected_layer().is_none());
        assert!(doc.select_layer(None));
        assert!(!doc.select_layer(None));
    }

    #[test]
    fn test_reorder_renumbers_by_list_position() {
        let mut doc = Document::new();
        let bg = doc.layers()[0].id();
        let a = doc.add_layer(LayerKind::Subject, None);
        let b = doc.add_layer(LayerKind::Text, None);

        assert!(doc.reorder_layer(b, 0));
        let order: Vec<LayerId> = doc.layers().iter().map(Layer::id).collect();
        assert_eq!(order, vec![b, bg, a]);
        assert_eq!(z_indices(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_past_end_appends() {
        let mut doc = Document::new();
        let bg = doc.layers()[0].id();
        doc.add_layer(LayerKind::Subject, None);
        assert!(doc.reorder_layer(bg, 99));
        assert_eq!(doc.layers().last().map(Layer::id), Some(bg));
        assert_eq!(doc.layer(bg).map(|l| l.z_index), Some(1));
    }

    #[test]
    fn test_reorder_fills_gaps_after_remove() {
        let mut doc = Document::new();
        let a = doc.add_layer(LayerKind::Subject, None);
        let b = doc.add_layer(LayerKind::Text, None);
        doc.remove_layer(a);
        assert_eq!(z_indices(&doc), vec![0, 2]);
        assert!(doc.reorder_layer(b, 1));
        assert_eq!(z_indices(&doc), vec![0, 1]);
    }

    #[test]
    fn test_display_order_is_stable_on_ties() {
        let mut doc = Document::new();
        let a = doc.add_layer(LayerKind::Subject, None);
        let b = doc.add_layer(LayerKind::Subject, None);
        doc.update_layer(a, &LayerPatch::new().with_z_index(5));
        doc.update_layer(b, &LayerPatch::new().with_z_index(5));

        let order: Vec<LayerId> = doc.display_order().iter().map(|l| l.id()).collect();
        assert_eq!(order[1..], [a, b]);
    }

    #[test]
    fn test_apply_operation() {
        let mut doc = Document::new();
        assert!(doc.apply(&Operation::SetCanvasSize {
            width: 744,
            height: 1039
        }));
        assert_eq!((doc.canvas_width, doc.canvas_height), (744, 1039));
        assert!(doc.apply(&Operation::AddLayer {
            kind: LayerKind::Frame,
            content: None
        }));
        assert_eq!(doc.layer_count(), 2);
    }

    #[test]
    fn test_json_roundtrip_preserves_document() {
        let mut doc = Document::new();
        doc.add_layer(LayerKind::Text, Some("Hello".into()));
        let json = doc.to_json().expect("serialize");
        assert!(json.contains("\"selectedLayerId\""));
        let restored = Document::from_json(&json).expect("deserialize");
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_from_json_rejects_duplicate_layer_ids() {
        let mut doc = Document::new();
        doc.add_layer(LayerKind::Subject, None);
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().expect("serialize")).expect("parse");
        let first = value["layers"][0]["id"].clone();
        value["layers"][1]["id"] = first;

        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateLayerId(id) if id == doc.layers()[0].id()));
    }

    #[test]
    fn test_operation_json_shape() {
        let op: Operation =
            serde_json::from_str(r#"{"op":"set_canvas_size","width":10,"height":20}"#)
                .expect("parse");
        assert_eq!(
            op,
            Operation::SetCanvasSize {
                width: 10,
                height: 20
            }
        );
    }
}
