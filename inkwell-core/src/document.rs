//! # Document
//!
//! The layer store: an ordered stack of layers (bottom first), the background, the surface texture,
//! and which layer is active. Every operation here either succeeds or leaves the document untouched,
//! so the invariants below hold between any two calls:
//!
//! * There is at least one layer, and at most [`Document::max_layers`].
//! * The active layer ID always resolves.
//! * All layer surfaces share the document's dimensions.

use crate::{
    blend::BlendMode,
    color::Color,
    layer::{Layer, LayerID, LayerInfo},
    noise::{TextureId, TextureSettings},
    raster::RasterSurface,
};

/// Default layer cap.
pub const MAX_LAYERS: usize = 10;

/// What shows through where no layer has paint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Background {
    Solid(Color),
    /// Shown as a checkerboard on screen, exported as real transparency.
    Transparent,
}
impl Default for Background {
    fn default() -> Self {
        Self::Solid(Color::WHITE)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer limit of {0} reached")]
    LayerLimit(usize),
    #[error("can't remove the last layer")]
    LastLayer,
    #[error("no such layer")]
    UnknownLayer,
    #[error("position out of bounds")]
    OutOfBounds,
    #[error("value is not finite")]
    NotFinite,
}

pub struct Document {
    width: u32,
    height: u32,
    max_layers: usize,
    /// Bottom to top.
    layers: Vec<Layer>,
    active: LayerID,
    pub background: Background,
    pub texture: TextureSettings,
    /// Source of default layer names, never reused.
    next_name: usize,
}

impl Document {
    /// New document with a single empty layer.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Background) -> Self {
        Self::with_max_layers(width, height, background, MAX_LAYERS)
    }
    /// New document with a single empty layer and a custom layer cap (at least one).
    #[must_use]
    pub fn with_max_layers(
        width: u32,
        height: u32,
        background: Background,
        max_layers: usize,
    ) -> Self {
        let first = Layer::new("Layer 1", width, height);
        Self {
            width,
            height,
            max_layers: max_layers.max(1),
            active: first.id(),
            layers: vec![first],
            background,
            texture: TextureSettings::default(),
            next_name: 2,
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn max_layers(&self) -> usize {
        self.max_layers
    }
    /// Layers, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    #[must_use]
    pub fn layer(&self, id: LayerID) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }
    pub fn layer_mut(&mut self, id: LayerID) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id() == id)
    }
    #[must_use]
    pub fn position(&self, id: LayerID) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }
    #[must_use]
    pub fn active(&self) -> LayerID {
        self.active
    }
    #[must_use]
    pub fn active_layer(&self) -> &Layer {
        let idx = self.position(self.active).unwrap_or_default();
        &self.layers[idx]
    }
    /// The active layer's pixels, for painting.
    pub fn active_surface_mut(&mut self) -> &mut RasterSurface {
        let idx = self.position(self.active).unwrap_or_default();
        self.layers[idx].surface_mut()
    }
    pub fn set_active(&mut self, id: LayerID) -> Result<(), LayerError> {
        self.check_layer(id)?;
        self.active = id;
        Ok(())
    }

    /// Check that [`Self::add_layer`] would succeed.
    pub fn check_add(&self) -> Result<(), LayerError> {
        if self.layers.len() >= self.max_layers {
            Err(LayerError::LayerLimit(self.max_layers))
        } else {
            Ok(())
        }
    }
    /// Check that [`Self::delete_layer`] would succeed.
    pub fn check_delete(&self, id: LayerID) -> Result<(), LayerError> {
        self.check_layer(id)?;
        if self.layers.len() <= 1 {
            Err(LayerError::LastLayer)
        } else {
            Ok(())
        }
    }
    /// Check that [`Self::duplicate_layer`] would succeed.
    pub fn check_duplicate(&self, id: LayerID) -> Result<(), LayerError> {
        self.check_layer(id)?;
        self.check_add()
    }
    pub fn check_layer(&self, id: LayerID) -> Result<(), LayerError> {
        self.position(id).map(|_| ()).ok_or(LayerError::UnknownLayer)
    }
    /// Check that [`Self::move_layer`] would succeed.
    pub fn check_move(&self, id: LayerID, to: usize) -> Result<(), LayerError> {
        self.check_layer(id)?;
        if to >= self.layers.len() {
            Err(LayerError::OutOfBounds)
        } else {
            Ok(())
        }
    }

    /// Add an empty layer on top of the stack and make it active.
    pub fn add_layer(&mut self) -> Result<LayerID, LayerError> {
        self.check_add()?;
        let name = self.next_layer_name();
        let layer = Layer::new(name, self.width, self.height);
        let id = layer.id();
        self.layers.push(layer);
        self.active = id;
        log::info!("Added {id}");
        Ok(id)
    }
    /// Remove a layer. If it was active, the topmost remaining layer becomes active.
    pub fn delete_layer(&mut self, id: LayerID) -> Result<(), LayerError> {
        self.check_delete(id)?;
        if let Some(idx) = self.position(id) {
            self.layers.remove(idx);
        }
        if self.active == id {
            if let Some(top) = self.layers.last() {
                self.active = top.id();
            }
        }
        log::info!("Deleted {id}");
        Ok(())
    }
    /// Deep copy a layer, placing the copy directly above the original and making it active.
    pub fn duplicate_layer(&mut self, id: LayerID) -> Result<LayerID, LayerError> {
        self.check_duplicate(id)?;
        let idx = self.position(id).ok_or(LayerError::UnknownLayer)?;
        let source = &self.layers[idx];
        let copy = source.duplicate(format!("{} copy", source.name));
        let new_id = copy.id();
        self.layers.insert(idx + 1, copy);
        self.active = new_id;
        log::info!("Duplicated {id} as {new_id}");
        Ok(new_id)
    }
    /// Move a layer to stack position `to`, `0` being the bottom.
    pub fn move_layer(&mut self, id: LayerID, to: usize) -> Result<(), LayerError> {
        self.check_move(id, to)?;
        let from = self.position(id).ok_or(LayerError::UnknownLayer)?;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }
    /// Flip visibility, returning the new state.
    pub fn toggle_visibility(&mut self, id: LayerID) -> Result<bool, LayerError> {
        let layer = self.layer_mut(id).ok_or(LayerError::UnknownLayer)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }
    pub fn set_visible(&mut self, id: LayerID, visible: bool) -> Result<(), LayerError> {
        self.layer_mut(id).ok_or(LayerError::UnknownLayer)?.visible = visible;
        Ok(())
    }
    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: LayerID, opacity: f32) -> Result<(), LayerError> {
        Self::check_opacity(opacity)?;
        self.layer_mut(id).ok_or(LayerError::UnknownLayer)?.blend.opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }
    pub fn check_opacity(opacity: f32) -> Result<(), LayerError> {
        if opacity.is_nan() {
            Err(LayerError::NotFinite)
        } else {
            Ok(())
        }
    }
    pub fn set_blend_mode(&mut self, id: LayerID, mode: BlendMode) -> Result<(), LayerError> {
        self.layer_mut(id).ok_or(LayerError::UnknownLayer)?.blend.mode = mode;
        Ok(())
    }
    pub fn rename(&mut self, id: LayerID, name: impl Into<String>) -> Result<(), LayerError> {
        self.layer_mut(id).ok_or(LayerError::UnknownLayer)?.name = name.into();
        Ok(())
    }
    pub fn set_texture(&mut self, texture: TextureId, intensity: f32) {
        self.texture.texture = texture;
        self.texture.intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn next_layer_name(&mut self) -> String {
        let name = format!("Layer {}", self.next_name);
        self.next_name += 1;
        name
    }

    /// Take the layer stack out, to rebuild it from history while reusing its buffers.
    /// Must be followed by [`Self::replace_layers`] before the document is used again.
    pub(crate) fn take_layers(&mut self) -> Vec<Layer> {
        std::mem::take(&mut self.layers)
    }
    /// Put a layer stack back. The caller has already validated it against the document invariants.
    pub(crate) fn replace_layers(&mut self, layers: Vec<Layer>, active: LayerID) {
        debug_assert!(!layers.is_empty() && layers.len() <= self.max_layers);
        debug_assert!(layers.iter().any(|layer| layer.id() == active));
        self.layers = layers;
        self.active = active;
    }
    /// Metadata of every layer, bottom first.
    #[must_use]
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.layers.iter().map(Layer::info).collect()
    }
}
