//! # Raster surfaces
//!
//! The engine's only pixel storage. A [`RasterSurface`] is a fixed-size, row-major buffer of
//! straight-alpha [`Color`]s owned by exactly one layer (or by a compositor output).
//!
//! Every mutable access to the pixels moves the surface to a fresh [`RevisionID`], which lets history
//! share the buffers of layers that did not change between snapshots.

pub mod shape;

use std::sync::Arc;

use az::CheckedAs;

use crate::{blend, color::Color};

/// Marker for surface revision [`crate::Id`]s.
pub enum Revision {}
pub type RevisionID = crate::Id<Revision>;

#[derive(Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    revision: RevisionID,
}

impl RasterSurface {
    /// Create a fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![color; len],
            revision: RevisionID::new(),
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
    pub fn dimensions(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    /// Identifies the current contents. Two surfaces (or one surface at two points in time) with the
    /// same revision hold the same pixels.
    #[must_use]
    pub fn revision(&self) -> RevisionID {
        self.revision
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    /// Mutable access to every pixel. Moves the surface to a new revision.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        self.revision = RevisionID::new();
        &mut self.pixels
    }
    /// The tightly packed RGBA8 bytes of this surface, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        bytemuck::cast_vec(self.pixels)
    }
    /// Row-major index of the pixel at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        index_of(self.width, self.height, x, y)
    }
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index_of(x, y).map(|idx| self.pixels[idx])
    }
    /// Get a [`Painter`] for stamping into this surface. Moves the surface to a new revision.
    pub fn painter(&mut self) -> Painter<'_> {
        let (width, height) = (self.width, self.height);
        Painter {
            width,
            height,
            pixels: self.pixels_mut(),
        }
    }
    /// Shared copy of the pixels, for history.
    pub(crate) fn share(&self) -> Arc<[Color]> {
        Arc::from(self.pixels.as_slice())
    }
    /// Overwrite the contents with a previously shared copy, and take on the revision it was shared
    /// at. Returns `false` and does nothing if the length doesn't match.
    pub(crate) fn restore(&mut self, pixels: &[Color], revision: RevisionID) -> bool {
        if pixels.len() != self.pixels.len() {
            return false;
        }
        if self.revision != revision {
            self.pixels.copy_from_slice(pixels);
            self.revision = revision;
        }
        true
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

fn index_of(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    let x: u32 = x.checked_as()?;
    let y: u32 = y.checked_as()?;
    if x >= width || y >= height {
        return None;
    }
    Some(y as usize * width as usize + x as usize)
}

/// How a stamp combines with the pixels under it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintOp {
    SourceOver,
    /// Source over using the multiply blend, darkening toward the brush color.
    Multiply,
    /// Removes coverage. The stamp color is ignored.
    DestinationOut,
}

/// Writes stamps into a surface. All writes are bounds-checked, out-of-bounds pixels are silently
/// skipped so shapes may freely overhang the edges.
pub struct Painter<'a> {
    width: u32,
    height: u32,
    pixels: &'a mut [Color],
}
impl Painter<'_> {
    #[must_use]
    pub fn bounds(&self) -> shape::Bounds {
        shape::Bounds {
            width: self.width,
            height: self.height,
        }
    }
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        index_of(self.width, self.height, x, y).map(|idx| self.pixels[idx])
    }
    pub fn paint(&mut self, x: i32, y: i32, color: Color, alpha: f32, op: PaintOp) {
        if alpha <= 0.0 {
            return;
        }
        let Some(idx) = index_of(self.width, self.height, x, y) else {
            return;
        };
        let dst = &mut self.pixels[idx];
        *dst = match op {
            PaintOp::SourceOver => blend::source_over(*dst, color, alpha, blend::BlendMode::Normal),
            PaintOp::Multiply => blend::source_over(*dst, color, alpha, blend::BlendMode::Multiply),
            PaintOp::DestinationOut => blend::destination_out(*dst, alpha),
        };
    }
}
