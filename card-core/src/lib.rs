//! # Card Core
//!
//! Layer-document model for the card editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  DocumentStore           │
//! │  - Layers        │  - Snapshots (Arc)       │
//! │  - Selection     │  - Subscribers           │
//! │  - Canvas size   │  - Operation dispatch    │
//! ├─────────────────────────────────────────────┤
//! │  view            │  interaction / panel     │
//! │  - Paint order   │  - Gestures -> store     │
//! │  - Handles       │  - Toggles, drop reorder │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The store is the single source of truth. Adapters read snapshots and
//! call store operations; they never keep state of their own.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod interaction;
pub mod layer;
pub mod panel;
pub mod patch;
pub mod store;
pub mod view;

pub use document::{Document, Operation, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
pub use error::{CoreError, CoreResult};
pub use interaction::{apply_gesture, bound_box, BoundBox, Gesture, MIN_LAYER_SIZE};
pub use layer::{Layer, LayerId, LayerKind};
pub use panel::PanelRow;
pub use patch::LayerPatch;
pub use store::{DocumentStore, OnChangeCallback, SubscriptionId};
pub use view::{paint_list, PaintContent, PaintItem};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
