//! Layer list panel: rows in stacking order plus the panel's store calls.

use std::cmp::Reverse;

use serde::Serialize;

use crate::{Document, DocumentStore, LayerId, LayerKind, LayerPatch};

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    /// Layer shown by this row.
    pub id: LayerId,
    /// Display label.
    pub name: String,
    /// Layer kind.
    pub kind: LayerKind,
    /// Visibility flag.
    pub visible: bool,
    /// Lock flag.
    pub locked: bool,
    /// Whether the row is highlighted.
    pub selected: bool,
    /// Stacking index.
    pub z_index: i32,
}

/// Rows with the topmost layer first. Ties keep insertion order.
#[must_use]
pub fn rows(doc: &Document) -> Vec<PanelRow> {
    let mut layers: Vec<_> = doc.layers().iter().collect();
    layers.sort_by_key(|l| Reverse(l.z_index));
    layers
        .into_iter()
        .map(|l| PanelRow {
            id: l.id(),
            name: l.name.clone(),
            kind: l.kind(),
            visible: l.visible,
            locked: l.locked,
            selected: doc.is_selected(l.id()),
            z_index: l.z_index,
        })
        .collect()
}

/// Flip a layer's visibility.
pub fn toggle_visibility(store: &mut DocumentStore, id: LayerId) -> bool {
    let Some(visible) = store.document().layer(id).map(|l| l.visible) else {
        return false;
    };
    store.update_layer(id, LayerPatch::new().with_visible(!visible))
}

/// Flip a layer's lock.
pub fn toggle_lock(store: &mut DocumentStore, id: LayerId) -> bool {
    let Some(locked) = store.document().layer(id).map(|l| l.locked) else {
        return false;
    };
    store.update_layer(id, LayerPatch::new().with_locked(!locked))
}

/// Delete a layer from the panel.
pub fn delete(store: &mut DocumentStore, id: LayerId) -> bool {
    store.remove_layer(id)
}

/// "Add text" button.
pub fn add_text(store: &mut DocumentStore) -> LayerId {
    store.add_layer(LayerKind::Text, None)
}

/// "Add image" button. Creates an empty subject layer.
pub fn add_image(store: &mut DocumentStore) -> LayerId {
    store.add_layer(LayerKind::Subject, None)
}

/// Drop the `dragged` row onto the `target` row.
///
/// The dragged layer is moved to the target's *insertion-list* index, not its
/// row position. When insertion order and z-order have diverged, the layer
/// can land somewhere other than the row it was dropped on.
pub fn drop_onto(store: &mut DocumentStore, dragged: LayerId, target: LayerId) -> bool {
    if dragged == target {
        return false;
    }
    let Some(index) = store.document().position_of(target) else {
        return false;
    };
    store.reorder_layer(dragged, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_ids(store: &DocumentStore) -> Vec<LayerId> {
        rows(store.document()).into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_rows_top_first() {
        let mut store = DocumentStore::new();
        let bg = store.document().layers()[0].id();
        let a = add_image(&mut store);
        let b = add_text(&mut store);
        assert_eq!(row_ids(&store), vec![b, a, bg]);

        let rows = rows(store.document());
        assert!(rows[0].selected);
        assert_eq!(rows[0].name, "Text 3");
    }

    #[test]
    fn test_toggles() {
        let mut store = DocumentStore::new();
        let a = add_image(&mut store);
        assert!(toggle_visibility(&mut store, a));
        assert!(toggle_lock(&mut store, a));
        let layer = store.document().layer(a).expect("layer");
        assert!(!layer.visible);
        assert!(layer.locked);
        assert!(!toggle_lock(&mut store, LayerId::new()));
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut store = DocumentStore::new();
        let a = add_image(&mut store);
        assert!(delete(&mut store, a));
        assert!(store.document().selected_layer_id().is_none());
    }

    #[test]
    fn test_drop_when_orders_agree() {
        let mut store = DocumentStore::new();
        let bg = store.document().layers()[0].id();
        let a = add_image(&mut store);
        let b = add_text(&mut store);

        // Drag the top row onto the bottom row.
        assert!(drop_onto(&mut store, b, bg));
        assert_eq!(row_ids(&store), vec![a, bg, b]);
    }

    #[test]
    fn test_drop_uses_insertion_index_when_orders_diverge() {
        let mut store = DocumentStore::new();
        let bg = store.document().layers()[0].id();
        let a = add_image(&mut store);
        let b = add_text(&mut store);

        // Raise the background to the top without touching insertion order.
        store.update_layer(bg, LayerPatch::new().with_z_index(10));
        assert_eq!(row_ids(&store), vec![bg, b, a]);

        // Dropping `a` onto the top row moves it to the background's
        // insertion index (0), which is the bottom of the stack.
        assert!(drop_onto(&mut store, a, bg));
        assert_eq!(row_ids(&store), vec![b, bg, a]);
        let z: Vec<i32> = store.document().layers().iter().map(|l| l.z_index).collect();
        assert_eq!(z, vec![0, 1, 2]);
    }

    #[test]
    fn test_drop_onto_self_or_unknown_is_noop() {
        let mut store = DocumentStore::new();
        let a = add_image(&mut store);
        assert!(!drop_onto(&mut store, a, a));
        assert!(!drop_onto(&mut store, a, LayerId::new()));
    }
}
