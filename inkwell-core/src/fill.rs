//! Bucket fill.

use bitvec::prelude::*;

use crate::{color::Color, raster::RasterSurface};

/// Fill the 4-connected region around `(x, y)` whose colors are within `tolerance` of the seed
/// color, measured as the sum of per-channel absolute differences (RGBA, `0..=1020`).
///
/// Returns the number of pixels filled. Out-of-bounds seeds, and seeds already exactly the fill
/// color, fill nothing and leave the surface (and its revision) untouched.
pub fn flood_fill(surface: &mut RasterSurface, x: i32, y: i32, fill: Color, tolerance: u32) -> usize {
    let Some(seed_idx) = surface.index_of(x, y) else {
        log::debug!("Fill seed ({x}, {y}) out of bounds");
        return 0;
    };
    let target = surface.pixels()[seed_idx];
    if target == fill {
        return 0;
    }

    let width = surface.width() as usize;
    let height = surface.height() as usize;
    let pixels = surface.pixels_mut();
    let mut visited = bitvec![0; pixels.len()];
    let mut stack = vec![seed_idx];
    visited.set(seed_idx, true);
    let mut filled = 0;

    while let Some(idx) = stack.pop() {
        if pixels[idx].distance(target) > tolerance {
            continue;
        }
        pixels[idx] = fill;
        filled += 1;

        let (px, py) = (idx % width, idx / width);
        let neighbors = [
            (px > 0).then(|| idx - 1),
            (px + 1 < width).then(|| idx + 1),
            (py > 0).then(|| idx - width),
            (py + 1 < height).then(|| idx + width),
        ];
        for next in neighbors.into_iter().flatten() {
            if !visited[next] {
                visited.set(next, true);
                stack.push(next);
            }
        }
    }
    log::trace!("Filled {filled} px from ({x}, {y})");
    filled
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn fills_empty_canvas() {
        let mut surface = RasterSurface::new(64, 64);
        assert_eq!(flood_fill(&mut surface, 0, 0, RED, 0), 64 * 64);
        assert!(surface.pixels().iter().all(|&p| p == RED));
    }
    #[test]
    fn stops_at_boundary() {
        let mut surface = RasterSurface::filled(9, 9, Color::WHITE);
        // Vertical wall at x = 4.
        for y in 0..9 {
            let idx = surface.index_of(4, y).unwrap();
            surface.pixels_mut()[idx] = Color::BLACK;
        }
        assert_eq!(flood_fill(&mut surface, 0, 0, RED, 0), 4 * 9);
        assert_eq!(surface.get(3, 8), Some(RED));
        assert_eq!(surface.get(4, 0), Some(Color::BLACK));
        assert_eq!(surface.get(5, 0), Some(Color::WHITE));
    }
    #[test]
    fn tolerance_includes_near_colors() {
        let mut surface = RasterSurface::filled(4, 1, Color::WHITE);
        let idx = surface.index_of(2, 0).unwrap();
        surface.pixels_mut()[idx] = Color::rgb(250, 250, 250);
        // Distance 15.
        let mut strict = surface.clone();
        assert_eq!(flood_fill(&mut strict, 0, 0, RED, 14), 2);
        assert_eq!(flood_fill(&mut surface, 0, 0, RED, 15), 4);
    }
    #[test]
    fn noops() {
        let mut surface = RasterSurface::filled(4, 4, RED);
        let revision = surface.revision();
        assert_eq!(flood_fill(&mut surface, 1, 1, RED, 0), 0);
        assert_eq!(flood_fill(&mut surface, -1, 1, Color::BLACK, 0), 0);
        assert_eq!(flood_fill(&mut surface, 1, 4, Color::BLACK, 0), 0);
        assert_eq!(surface.revision(), revision);
    }

    proptest! {
        #[test]
        fn idempotent(
            cells in proptest::collection::vec(0..3u8, 64),
            x in 0..8i32,
            y in 0..8i32,
            tolerance in 0..600u32,
        ) {
            let palette = [Color::WHITE, Color::BLACK, Color::rgb(90, 140, 200)];
            let mut surface = RasterSurface::new(8, 8);
            for (px, cell) in surface.pixels_mut().iter_mut().zip(&cells) {
                *px = palette[usize::from(*cell)];
            }
            flood_fill(&mut surface, x, y, RED, tolerance);
            let once = surface.pixels().to_vec();
            prop_assert_eq!(flood_fill(&mut surface, x, y, RED, tolerance), 0);
            prop_assert_eq!(surface.pixels(), once.as_slice());
        }
    }
}
