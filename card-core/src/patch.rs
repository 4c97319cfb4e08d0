//! Partial layer updates.

use serde::{Deserialize, Serialize};

use crate::Layer;

/// A set of optional field changes for one layer.
///
/// Each `Some` field overwrites the matching layer field; `None` leaves it
/// alone. Values are not validated or clamped. `id` and `kind` are absent
/// because they never change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    /// New display name.
    pub name: Option<String>,
    /// New visibility flag.
    pub visible: Option<bool>,
    /// New lock flag.
    pub locked: Option<bool>,
    /// New content.
    pub content: Option<String>,
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
    /// New horizontal scale.
    pub scale_x: Option<f64>,
    /// New vertical scale.
    pub scale_y: Option<f64>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// New z-index.
    pub z_index: Option<i32>,
    /// New font size.
    pub font_size: Option<f64>,
    /// New font family.
    pub font_family: Option<String>,
    /// New fill colour.
    pub fill: Option<String>,
    /// New alignment.
    pub align: Option<String>,
}

impl LayerPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to a new position.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Set the lock flag.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set width and height.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every set field to `layer`.
    pub fn apply_to(&self, layer: &mut Layer) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        set(&mut layer.name, self.name.as_ref());
        set(&mut layer.visible, self.visible.as_ref());
        set(&mut layer.locked, self.locked.as_ref());
        set(&mut layer.content, self.content.as_ref());
        set(&mut layer.x, self.x.as_ref());
        set(&mut layer.y, self.y.as_ref());
        set(&mut layer.width, self.width.as_ref());
        set(&mut layer.height, self.height.as_ref());
        set(&mut layer.rotation, self.rotation.as_ref());
        set(&mut layer.scale_x, self.scale_x.as_ref());
        set(&mut layer.scale_y, self.scale_y.as_ref());
        set(&mut layer.opacity, self.opacity.as_ref());
        set(&mut layer.z_index, self.z_index.as_ref());
        set_opt(&mut layer.font_size, self.font_size.as_ref());
        set_opt(&mut layer.font_family, self.font_family.as_ref());
        set_opt(&mut layer.fill, self.fill.as_ref());
        set_opt(&mut layer.align, self.align.as_ref());
    }
}
