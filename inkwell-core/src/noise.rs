//! # Procedural surface textures
//!
//! Greyscale tiles of paper grain and canvas weave, laid multiplicatively over the background at
//! composite time. Tiles are a pure function of texture, seed and size, built from fractal value noise
//! whose lattice wraps at the tile period so tiles repeat without seams.

use rayon::prelude::*;

use crate::{
    raster::RasterSurface,
    util::{hash2, lerp, smoothstep},
};

/// Default tile edge length, in pixels.
pub const TILE_SIZE: u32 = 256;
/// Width of the coarsest noise cell, in pixels.
const BASE_CELL: u32 = 32;
const OCTAVES: u32 = 5;

#[derive(
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
)]
#[strum(serialize_all = "snake_case")]
pub enum TextureId {
    #[default]
    None,
    SmoothPaper,
    RoughPaper,
    Canvas,
}
impl TextureId {
    /// Brightness range the normalized noise is mapped into.
    #[must_use]
    pub fn brightness(self) -> Option<(f32, f32)> {
        match self {
            Self::None => None,
            Self::SmoothPaper => Some((0.85, 1.0)),
            Self::RoughPaper => Some((0.35, 0.75)),
            Self::Canvas => Some((0.6, 0.95)),
        }
    }
}

/// The document's active texture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureSettings {
    pub texture: TextureId,
    /// Overlay strength, `[0, 1]`.
    pub intensity: f32,
    pub seed: u32,
}
impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            texture: TextureId::None,
            intensity: 0.5,
            seed: 0,
        }
    }
}

/// A square greyscale texture tile.
#[derive(Clone, PartialEq, Eq)]
pub struct Tile {
    texture: TextureId,
    seed: u32,
    size: u32,
    data: Vec<u8>,
}
impl Tile {
    #[must_use]
    pub fn texture(&self) -> TextureId {
        self.texture
    }
    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    /// Sample with wrapping, so any coordinate is valid.
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> u8 {
        let (x, y) = (x % self.size, y % self.size);
        self.data[y as usize * self.size as usize + x as usize]
    }
}
impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("texture", &self.texture)
            .field("seed", &self.seed)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Generate a [`TILE_SIZE`] tile. `None` for [`TextureId::None`].
#[must_use]
pub fn generate_tile(texture: TextureId, seed: u32) -> Option<Tile> {
    generate_tile_sized(texture, seed, TILE_SIZE)
}

/// Generate a tile of arbitrary edge length. `None` for [`TextureId::None`] or a zero size.
#[must_use]
pub fn generate_tile_sized(texture: TextureId, seed: u32, size: u32) -> Option<Tile> {
    let (lo, hi) = texture.brightness()?;
    if size == 0 {
        return None;
    }
    let mut data = vec![0u8; size as usize * size as usize];
    data.par_chunks_mut(size as usize)
        .enumerate()
        .for_each(|(y, row)| {
            #[allow(clippy::cast_precision_loss)]
            let py = y as f32;
            for (x, out) in row.iter_mut().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let px = x as f32;
                let mut n = fbm(px, py, size, seed);
                if texture == TextureId::Canvas {
                    n = 0.6 * weave(px, py) + 0.4 * n;
                }
                *out = crate::util::unit_to_u8(lerp(lo, hi, n));
            }
        });
    Some(Tile {
        texture,
        seed,
        size,
        data,
    })
}

/// Over/under thread pattern with a four pixel period, in `[0, 1]`.
fn weave(x: f32, y: f32) -> f32 {
    use std::f32::consts::TAU;
    let u = (x * TAU / 4.0).sin();
    let v = (y * TAU / 4.0).sin();
    0.5 + 0.25 * (u + v)
}

/// Fractal Brownian motion over value noise, normalized to `[0, 1]`, periodic in `size` on both axes.
#[must_use]
pub fn fbm(x: f32, y: f32, size: u32, seed: u32) -> f32 {
    let mut period = (size / BASE_CELL).max(1);
    #[allow(clippy::cast_precision_loss)]
    let mut frequency = period as f32 / size.max(1) as f32;
    let mut amplitude = 1.0;
    let (mut sum, mut total) = (0.0, 0.0);
    for octave in 0..OCTAVES {
        sum += amplitude * value_noise(x * frequency, y * frequency, period, seed.wrapping_add(octave));
        total += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
        period = period.saturating_mul(2);
    }
    sum / total
}

/// Smoothly interpolated lattice noise in `[0, 1]`. The lattice wraps every `period` cells.
#[must_use]
pub fn value_noise(x: f32, y: f32, period: u32, seed: u32) -> f32 {
    let period = i32::try_from(period.max(1)).unwrap_or(i32::MAX);
    let (x0, y0) = (x.floor(), y.floor());
    let (tx, ty) = (smoothstep(x - x0), smoothstep(y - y0));
    #[allow(clippy::cast_possible_truncation)]
    let (ix, iy) = (x0 as i32, y0 as i32);
    let corner = |dx: i32, dy: i32| {
        let h = hash2(
            ix.wrapping_add(dx).rem_euclid(period),
            iy.wrapping_add(dy).rem_euclid(period),
            seed,
        );
        #[allow(clippy::cast_precision_loss)]
        let v = h as f32 / u32::MAX as f32;
        v
    };
    lerp(
        lerp(corner(0, 0), corner(1, 0), tx),
        lerp(corner(0, 1), corner(1, 1), tx),
        ty,
    )
}

/// Multiply `dest`'s color channels by the tiled texture at `intensity`. Alpha is untouched.
pub fn apply_overlay(dest: &mut RasterSurface, tile: &Tile, intensity: f32) {
    let intensity = intensity.min(1.0);
    if intensity.is_nan() || intensity <= 0.0 {
        return;
    }
    let width = dest.width() as usize;
    if width == 0 {
        return;
    }
    dest.pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            #[allow(clippy::cast_possible_truncation)]
            let y = y as u32;
            for (x, pixel) in (0u32..).zip(row.iter_mut()) {
                let grain = f32::from(tile.at(x, y)) / 255.0;
                let factor = 1.0 - intensity * (1.0 - grain);
                let scale = |c: u8| crate::util::unit_to_u8(f32::from(c) / 255.0 * factor);
                pixel.r = scale(pixel.r);
                pixel.g = scale(pixel.g);
                pixel.b = scale(pixel.b);
            }
        });
}

/// Generated tiles, keyed by texture. A tile is regenerated when requested with a different seed.
pub struct TextureCache {
    tile_size: u32,
    tiles: hashbrown::HashMap<TextureId, Tile>,
}
impl Default for TextureCache {
    fn default() -> Self {
        Self::new(TILE_SIZE)
    }
}
impl TextureCache {
    #[must_use]
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            tiles: hashbrown::HashMap::new(),
        }
    }
    /// Get a cached tile without generating.
    #[must_use]
    pub fn get(&self, texture: TextureId) -> Option<&Tile> {
        self.tiles.get(&texture)
    }
    pub fn get_or_generate(&mut self, texture: TextureId, seed: u32) -> Option<&Tile> {
        if texture == TextureId::None {
            return None;
        }
        let stale = self.tiles.get(&texture).is_some_and(|tile| tile.seed != seed);
        if stale {
            log::debug!("Texture {texture} seed changed, regenerating");
            self.tiles.remove(&texture);
        }
        if !self.tiles.contains_key(&texture) {
            let tile = generate_tile_sized(texture, seed, self.tile_size)?;
            let size = self.tile_size;
            log::debug!("Generated {texture} tile {size}x{size} seed {seed}");
            self.tiles.insert(texture, tile);
        }
        self.tiles.get(&texture)
    }
    pub fn invalidate(&mut self, texture: TextureId) {
        self.tiles.remove(&texture);
    }
    /// Apply the document's texture onto `dest`, generating the tile if needed.
    pub fn overlay(&mut self, dest: &mut RasterSurface, settings: TextureSettings) {
        if settings.intensity <= 0.0 {
            return;
        }
        if let Some(tile) = self.get_or_generate(settings.texture, settings.seed) {
            apply_overlay(dest, tile, settings.intensity);
        }
    }
}
