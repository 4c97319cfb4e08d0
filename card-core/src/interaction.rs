//! Translating canvas gestures into store calls.
//!
//! This is the boundary where the lock flag and the minimum layer size are
//! enforced. Direct store calls bypass both.

use serde::{Deserialize, Serialize};

use crate::{DocumentStore, LayerId, LayerPatch};

/// Smallest width or height a resize gesture may produce.
pub const MIN_LAYER_SIZE: f64 = 5.0;

/// A completed user gesture on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    /// Click or tap on a layer.
    Select {
        /// Layer under the pointer.
        id: LayerId,
    },
    /// Pointer down on the bare canvas.
    ClickEmpty,
    /// End of a drag.
    DragEnd {
        /// Dragged layer.
        id: LayerId,
        /// New left edge.
        x: f64,
        /// New top edge.
        y: f64,
    },
    /// End of a resize/rotate through the transform handles.
    TransformEnd {
        /// Transformed layer.
        id: LayerId,
        /// New left edge.
        x: f64,
        /// New top edge.
        y: f64,
        /// New width, scale already folded in.
        width: f64,
        /// New height, scale already folded in.
        height: f64,
        /// New rotation in degrees.
        rotation: f64,
    },
    /// Inline text edit on a text layer.
    EditText {
        /// Edited layer.
        id: LayerId,
        /// Replacement text.
        text: String,
    },
}

/// A width/height pair proposed while a resize is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Resize guard for live transforms: keep `old` if `new` would be too small.
#[must_use]
pub fn bound_box(old: BoundBox, new: BoundBox) -> BoundBox {
    if new.width < MIN_LAYER_SIZE || new.height < MIN_LAYER_SIZE {
        old
    } else {
        new
    }
}

/// Apply a gesture to the store. Returns whether the document changed.
///
/// Drag and transform gestures on locked layers are ignored, as are
/// transforms on text layers. Gestures on unknown layers fall through to
/// the store, which treats them as no-ops.
pub fn apply_gesture(store: &mut DocumentStore, gesture: Gesture) -> bool {
    match gesture {
        Gesture::Select { id } => store.select_layer(Some(id)),
        Gesture::ClickEmpty => store.select_layer(None),
        Gesture::DragEnd { id, x, y } => {
            if is_locked(store, id) {
                tracing::debug!("Ignoring drag on locked layer {id}");
                return false;
            }
            store.update_layer(id, LayerPatch::position(x, y))
        }
        Gesture::TransformEnd {
            id,
            x,
            y,
            width,
            height,
            rotation,
        } => {
            if is_locked(store, id) {
                tracing::debug!("Ignoring transform on locked layer {id}");
                return false;
            }
            if is_text(store, id) {
                tracing::debug!("Ignoring transform on text layer {id}");
                return false;
            }
            let patch = LayerPatch::position(x, y)
                .with_size(width.max(MIN_LAYER_SIZE), height.max(MIN_LAYER_SIZE))
                .with_rotation(rotation);
            store.update_layer(id, patch)
        }
        Gesture::EditText { id, text } => {
            if !is_text(store, id) {
                return false;
            }
            store.update_layer(id, LayerPatch::new().with_content(text))
        }
    }
}

fn is_locked(store: &DocumentStore, id: LayerId) -> bool {
    store.document().layer(id).is_some_and(|l| l.locked)
}

fn is_text(store: &DocumentStore, id: LayerId) -> bool {
    store.document().layer(id).is_some_and(|l| l.kind().is_text())
}
