//! Catmull-Rom smoothing of raw pointer samples.

use smallvec::SmallVec;

use super::PointerSample;

/// Upper bound on sub-samples per segment, regardless of length.
pub const MAX_SUBDIVISIONS: usize = 4096;

/// A point on the smoothed path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

/// Uniform Catmull-Rom between `p1` (`t = 0`) and `p2` (`t = 1`).
#[must_use]
pub fn catmull_rom(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], t: f32) -> [f32; 2] {
    let t2 = t * t;
    let t3 = t2 * t;
    let axis = |i: usize| {
        0.5 * (2.0 * p1[i]
            + (p2[i] - p0[i]) * t
            + (2.0 * p0[i] - 5.0 * p1[i] + 4.0 * p2[i] - p3[i]) * t2
            + (3.0 * p1[i] - p0[i] - 3.0 * p2[i] + p3[i]) * t3)
    };
    [axis(0), axis(1)]
}

/// Sub-sample the middle segment of `window`, `window[1] → window[2]`.
///
/// The number of sub-samples is proportional to the chord length over `spacing`. The start point
/// is excluded and the end point is included, so consecutive segments chain without duplicates.
/// Pressure is interpolated linearly.
#[must_use]
pub fn subdivide(window: [&PointerSample; 4], spacing: f32) -> SmallVec<[PathPoint; 16]> {
    let [p0, p1, p2, p3] = window.map(PointerSample::position);
    let chord = (p2[0] - p1[0]).hypot(p2[1] - p1[1]);
    let ratio = (chord / spacing.max(1.0) * 2.0).ceil();
    // Saturating cast, NaN becomes 0 and gets clamped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (ratio as usize).clamp(1, MAX_SUBDIVISIONS);

    let (from, to) = (window[1].pressure, window[2].pressure);
    (1..=count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / count as f32;
            let [x, y] = catmull_rom(p0, p1, p2, p3, t);
            PathPoint {
                x,
                y,
                pressure: crate::util::lerp(from, to, t),
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interpolates_endpoints() {
        let (a, b, c, d) = ([0.0, 0.0], [1.0, 2.0], [5.0, 3.0], [6.0, 0.0]);
        assert_eq!(catmull_rom(a, b, c, d, 0.0), b);
        let end = catmull_rom(a, b, c, d, 1.0);
        assert!((end[0] - c[0]).abs() < 1e-5 && (end[1] - c[1]).abs() < 1e-5);
    }
    #[test]
    fn duplicated_ends_stay_on_line() {
        let a = PointerSample::new(0.0, 10.0, 0.0);
        let b = PointerSample::new(40.0, 10.0, 1.0);
        let points = subdivide([&a, &a, &b, &b], 1.0);
        assert_eq!(points.len(), 80);
        let mut last_x = 0.0;
        for p in &points {
            assert!((p.y - 10.0).abs() < 1e-5);
            // Monotonic, never overshoots.
            assert!(p.x > last_x && p.x <= 40.0 + 1e-4);
            last_x = p.x;
        }
        let end = points.last().unwrap();
        assert!((end.x - 40.0).abs() < 1e-4);
        assert!((end.pressure - 1.0).abs() < 1e-6);
    }
    #[test]
    fn degenerate_segment() {
        let a = PointerSample::new(3.0, 3.0, 0.5);
        let points = subdivide([&a, &a, &a, &a], 1.0);
        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0],
            PathPoint {
                x: 3.0,
                y: 3.0,
                pressure: 0.5
            }
        );
    }
    #[test]
    fn bounded() {
        let a = PointerSample::new(0.0, 0.0, 1.0);
        let b = PointerSample::new(1.0e9, 0.0, 1.0);
        assert_eq!(subdivide([&a, &a, &b, &b], 1.0).len(), MAX_SUBDIVISIONS);
    }
}
