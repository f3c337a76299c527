use crate::{
    blend::{Blend, BlendMode},
    raster::RasterSurface,
};

pub type LayerID = crate::Id<Layer>;

/// One independently blended pixel buffer in a [`crate::document::Document`].
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerID,
    pub name: String,
    pub visible: bool,
    pub blend: Blend,
    surface: RasterSurface,
}

/// Everything about a layer except its pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerInfo {
    pub id: LayerID,
    pub name: String,
    pub visible: bool,
    pub blend: Blend,
}

impl Layer {
    /// New transparent, visible, fully opaque Normal layer.
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: LayerID::new(),
            name: name.into(),
            visible: true,
            blend: Blend::default(),
            surface: RasterSurface::new(width, height),
        }
    }
    /// Rebuild a layer from history, keeping its identity.
    pub(crate) fn from_parts(info: LayerInfo, surface: RasterSurface) -> Self {
        Self {
            id: info.id,
            name: info.name,
            visible: info.visible,
            blend: info.blend,
            surface,
        }
    }
    /// Deep copy under a new ID.
    #[must_use]
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            id: LayerID::new(),
            name: name.into(),
            ..self.clone()
        }
    }
    #[must_use]
    pub fn id(&self) -> LayerID {
        self.id
    }
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.blend.opacity
    }
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend.mode
    }
    #[must_use]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }
    pub fn surface_mut(&mut self) -> &mut RasterSurface {
        &mut self.surface
    }
    pub(crate) fn into_surface(self) -> RasterSurface {
        self.surface
    }
    #[must_use]
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            id: self.id,
            name: self.name.clone(),
            visible: self.visible,
            blend: self.blend,
        }
    }
}
