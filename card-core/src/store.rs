//! Observable document store.
//!
//! [`DocumentStore`] owns the current [`Document`] snapshot. Each mutation
//! builds a new snapshot from the old one, swaps it in, and notifies
//! subscribers. Subscribers only ever see complete snapshots.

use std::sync::Arc;

use crate::{Document, LayerId, LayerKind, LayerPatch, Operation};

/// Callback type for document change notifications.
pub type OnChangeCallback = Box<dyn Fn(&Arc<Document>) + Send + Sync>;

/// Handle returned by [`DocumentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Single-owner state container for one editing session.
///
/// # Example
///
/// ```
/// use card_core::{DocumentStore, LayerKind, LayerPatch};
///
/// let mut store = DocumentStore::new();
/// let id = store.add_layer(LayerKind::Text, None);
/// store.update_layer(id, LayerPatch::new().with_content("Hello"));
///
/// assert_eq!(store.snapshot().layer(id).map(|l| l.content.as_str()), Some("Hello"));
/// ```
pub struct DocumentStore {
    current: Arc<Document>,
    subscribers: Vec<(SubscriptionId, OnChangeCallback)>,
    next_subscription: u64,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a store holding a fresh document with one background layer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a store around an existing document.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self {
            current: Arc::new(document),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current snapshot. Cheap to clone and never mutated in place.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.current)
    }

    /// Borrow the current document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.current
    }

    /// Register a callback invoked with every new snapshot.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<Document>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply an operation and publish the result if the document changed.
    pub fn dispatch(&mut self, op: &Operation) -> bool {
        self.transition(|doc| doc.apply(op))
    }

    /// Append a new layer on top and select it.
    pub fn add_layer(&mut self, kind: LayerKind, content: Option<String>) -> LayerId {
        let mut next = (*self.current).clone();
        let id = next.add_layer(kind, content);
        self.publish(next);
        id
    }

    /// Remove a layer; clears the selection if it was selected.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        self.transition(|doc| doc.remove_layer(id))
    }

    /// Merge `patch` into a layer. No validation is performed.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> bool {
        self.transition(|doc| doc.update_layer(id, &patch))
    }

    /// Set the selection. The id is not checked against the live layers.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> bool {
        self.transition(|doc| doc.select_layer(id))
    }

    /// Move a layer to an insertion-list index and renumber z-indices.
    pub fn reorder_layer(&mut self, id: LayerId, index: usize) -> bool {
        self.transition(|doc| doc.reorder_layer(id, index))
    }

    /// Replace the canvas dimensions.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> bool {
        self.transition(|doc| doc.set_canvas_size(width, height))
    }

    fn transition<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let mut next = (*self.current).clone();
        if !f(&mut next) {
            return false;
        }
        self.publish(next);
        true
    }

    fn publish(&mut self, next: Document) {
        self.current = Arc::new(next);
        tracing::debug!(
            "Publishing snapshot with {} layers to {} subscribers",
            self.current.layer_count(),
            self.subscribers.len()
        );
        for (_, callback) in &self.subscribers {
            callback(&self.current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_snapshots_are_immutable() {
        let mut store = DocumentStore::new();
        let before = store.snapshot();
        store.add_layer(LayerKind::Text, None);
        assert_eq!(before.layer_count(), 1);
        assert_eq!(store.snapshot().layer_count(), 2);
    }

    #[test]
    fn test_subscribers_see_each_change() {
        let mut store = DocumentStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |doc| {
            sink.lock().expect("lock").push(doc.layer_count());
        });

        let id = store.add_layer(LayerKind::Subject, None);
        store.add_layer(LayerKind::Text, None);
        store.remove_layer(id);

        assert_eq!(*seen.lock().expect("lock"), vec![2, 3, 2]);
    }

    #[test]
    fn test_noop_does_not_notify() {
        let mut store = DocumentStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let ghost = LayerId::new();
        assert!(!store.remove_layer(ghost));
        assert!(!store.update_layer(ghost, LayerPatch::position(0.0, 0.0)));
        assert!(!store.reorder_layer(ghost, 0));
        assert!(!store.set_canvas_size(400, 600));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = DocumentStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set_canvas_size(800, 800);
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.set_canvas_size(100, 100);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_dispatch_matches_direct_calls() {
        let mut store = DocumentStore::new();
        let id = store.add_layer(LayerKind::Frame, None);
        assert!(store.dispatch(&Operation::UpdateLayer {
            id,
            patch: LayerPatch::new().with_locked(true),
        }));
        assert!(store.document().layer(id).is_some_and(|l| l.locked));
        assert!(store.dispatch(&Operation::SelectLayer { id: None }));
        assert!(store.document().selected_layer_id().is_none());
    }
}
