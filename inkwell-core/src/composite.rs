//! # Compositor
//!
//! Flattens a document into a single surface: background, then the surface texture, then each
//! visible layer bottom to top with its opacity and blend mode. Reads layers only, the output is a
//! fresh buffer owned by the caller.

use rayon::prelude::*;

use crate::{
    blend::{self, Blend},
    color::Color,
    document::{Background, Document},
    noise::TextureCache,
    raster::RasterSurface,
};

/// Edge length of one checkerboard cell, in pixels.
pub const CHECKER_SIZE: u32 = 8;
const CHECKER_LIGHT: Color = Color::WHITE;
const CHECKER_DARK: Color = Color::rgb(204, 204, 204);

/// What the composite is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Target {
    /// On-screen. A transparent background is drawn as a checkerboard.
    #[default]
    Display,
    /// Handed out of the engine. A transparent background stays transparent.
    Export,
}

#[must_use]
pub fn composite(document: &Document, textures: &mut TextureCache, target: Target) -> RasterSurface {
    let (width, height) = (document.width(), document.height());
    let mut out = match (document.background, target) {
        (Background::Solid(color), _) => RasterSurface::filled(width, height, color),
        (Background::Transparent, Target::Display) => checkerboard(width, height),
        (Background::Transparent, Target::Export) => RasterSurface::new(width, height),
    };
    textures.overlay(&mut out, document.texture);
    for layer in document
        .layers()
        .iter()
        .filter(|layer| layer.visible && layer.opacity() > 0.0)
    {
        blend_onto(&mut out, layer.surface(), layer.blend);
    }
    out
}

/// Composite all of `src` over `dst`. Both must share dimensions, a mismatched `src` is skipped.
pub fn blend_onto(dst: &mut RasterSurface, src: &RasterSurface, blend: Blend) {
    if dst.dimensions() != src.dimensions() {
        log::warn!(
            "Skipping blend of mismatched surfaces, {:?} onto {:?}",
            src.dimensions(),
            dst.dimensions()
        );
        return;
    }
    let width = dst.width() as usize;
    if width == 0 {
        return;
    }
    dst.pixels_mut()
        .par_chunks_mut(width)
        .zip(src.pixels().par_chunks(width))
        .for_each(|(dst_row, src_row)| {
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                // Skip the float math on empty source pixels, the common case.
                if s.a != 0 {
                    *d = blend::source_over(*d, s, blend.opacity, blend.mode);
                }
            }
        });
}

#[must_use]
pub fn checkerboard(width: u32, height: u32) -> RasterSurface {
    let mut surface = RasterSurface::new(width, height);
    let row_len = width as usize;
    if row_len == 0 {
        return surface;
    }
    for (y, row) in (0u32..).zip(surface.pixels_mut().chunks_mut(row_len)) {
        for (x, pixel) in (0u32..).zip(row.iter_mut()) {
            let dark = (x / CHECKER_SIZE + y / CHECKER_SIZE) % 2 == 1;
            *pixel = if dark { CHECKER_DARK } else { CHECKER_LIGHT };
        }
    }
    surface
}
