//! Antialiased coverage rasterization for the primitive shapes stamps are built from.
//!
//! Shapes don't write anything themselves, they report each covered pixel to a callback, which
//! decides what to paint. Pixel centers lie at `+0.5`, edges get a one-pixel linear ramp.

/// Clip rectangle, `[0, width) x [0, height)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

/// One covered pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coverage {
    pub x: i32,
    pub y: i32,
    /// Edge coverage in `(0, 1]`.
    pub alpha: f32,
    /// Normalized distance from the shape center, `0` at the center and `1` at the rim.
    /// Shapes without a meaningful center report `0`.
    pub t: f32,
}

// Saturating float->int is intended, the ranges are clipped against bounds anyway.
#[allow(clippy::cast_possible_truncation)]
fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<i32> {
    let limit = i32::try_from(limit).unwrap_or(i32::MAX);
    let lo = (lo.floor() as i32).max(0);
    let hi = (hi.ceil() as i32).min(limit);
    lo..hi.max(lo)
}

fn for_each_in(
    bounds: Bounds,
    [x0, y0]: [f32; 2],
    [x1, y1]: [f32; 2],
    mut f: impl FnMut(i32, i32, f32, f32),
) {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return;
    }
    let xs = span(x0, x1, bounds.width);
    for y in span(y0, y1, bounds.height) {
        #[allow(clippy::cast_precision_loss)]
        let py = y as f32 + 0.5;
        for x in xs.clone() {
            #[allow(clippy::cast_precision_loss)]
            let px = x as f32 + 0.5;
            f(x, y, px, py);
        }
    }
}

/// Filled circle of `radius` around `(cx, cy)`.
pub fn disc(bounds: Bounds, [cx, cy]: [f32; 2], radius: f32, mut f: impl FnMut(Coverage)) {
    if radius <= 0.0 {
        return;
    }
    let reach = radius + 1.0;
    for_each_in(
        bounds,
        [cx - reach, cy - reach],
        [cx + reach, cy + reach],
        |x, y, px, py| {
            let d = (px - cx).hypot(py - cy);
            let alpha = (radius - d + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                f(Coverage {
                    x,
                    y,
                    alpha,
                    t: (d / radius).min(1.0),
                });
            }
        },
    );
}

/// Filled ellipse with semi-axes `rx` along `angle` (radians) and `ry` perpendicular to it.
pub fn ellipse(
    bounds: Bounds,
    [cx, cy]: [f32; 2],
    [rx, ry]: [f32; 2],
    angle: f32,
    mut f: impl FnMut(Coverage),
) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let (sin, cos) = angle.sin_cos();
    let reach = rx.max(ry) + 1.0;
    let min_axis = rx.min(ry);
    for_each_in(
        bounds,
        [cx - reach, cy - reach],
        [cx + reach, cy + reach],
        |x, y, px, py| {
            let (dx, dy) = (px - cx, py - cy);
            // Into the ellipse's frame.
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            let q = (u / rx).hypot(v / ry);
            // Approximate pixel distance to the rim, exact along the minor axis.
            let alpha = ((1.0 - q) * min_axis + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                f(Coverage {
                    x,
                    y,
                    alpha,
                    t: q.min(1.0),
                });
            }
        },
    );
}

/// Filled convex polygon. Winding may be either direction, degenerate polygons cover nothing.
pub fn convex_polygon(bounds: Bounds, points: &[[f32; 2]], mut f: impl FnMut(Coverage)) {
    if points.len() < 3 {
        return;
    }
    // Shoelace, to learn the winding.
    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum();
    if twice_area.abs() < 1e-4 {
        return;
    }
    let sign = twice_area.signum();

    let (mut min, mut max) = ([f32::INFINITY; 2], [f32::NEG_INFINITY; 2]);
    for p in points {
        min = [min[0].min(p[0]), min[1].min(p[1])];
        max = [max[0].max(p[0]), max[1].max(p[1])];
    }
    for_each_in(
        bounds,
        [min[0] - 1.0, min[1] - 1.0],
        [max[0] + 1.0, max[1] + 1.0],
        |x, y, px, py| {
            // Signed distance to the nearest edge, positive inside.
            let inside = points
                .iter()
                .zip(points.iter().cycle().skip(1))
                .filter_map(|(a, b)| {
                    let (ex, ey) = (b[0] - a[0], b[1] - a[1]);
                    let len = ex.hypot(ey);
                    (len > 1e-6).then(|| sign * (ex * (py - a[1]) - ey * (px - a[0])) / len)
                })
                .fold(f32::INFINITY, f32::min);
            let alpha = (inside + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                f(Coverage {
                    x,
                    y,
                    alpha,
                    t: 0.0,
                });
            }
        },
    );
}

/// Round-capped line segment of the given `width`.
pub fn line(bounds: Bounds, a: [f32; 2], b: [f32; 2], width: f32, mut f: impl FnMut(Coverage)) {
    let radius = width * 0.5;
    if radius <= 0.0 {
        return;
    }
    let (ex, ey) = (b[0] - a[0], b[1] - a[1]);
    let len_sq = ex * ex + ey * ey;
    let reach = radius + 1.0;
    for_each_in(
        bounds,
        [a[0].min(b[0]) - reach, a[1].min(b[1]) - reach],
        [a[0].max(b[0]) + reach, a[1].max(b[1]) + reach],
        |x, y, px, py| {
            let s = if len_sq > 0.0 {
                (((px - a[0]) * ex + (py - a[1]) * ey) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let d = (px - (a[0] + ex * s)).hypot(py - (a[1] + ey * s));
            let alpha = (radius - d + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                f(Coverage {
                    x,
                    y,
                    alpha,
                    t: (d / radius).min(1.0),
                });
            }
        },
    );
}

#[cfg(test)]
mod test {
    use super::*;
    const BOUNDS: Bounds = Bounds {
        width: 64,
        height: 64,
    };

    fn collect(shape: impl FnOnce(&mut dyn FnMut(Coverage))) -> Vec<Coverage> {
        let mut out = vec![];
        shape(&mut |c| out.push(c));
        out
    }

    #[test]
    fn disc_rows() {
        let covered = collect(|f| disc(BOUNDS, [32.0, 32.0], 5.0, f));
        let min_y = covered.iter().map(|c| c.y).min();
        let max_y = covered.iter().map(|c| c.y).max();
        assert_eq!(min_y, Some(27));
        assert_eq!(max_y, Some(36));
        let center = covered.iter().find(|c| c.x == 32 && c.y == 32);
        assert_eq!(center.map(|c| c.alpha), Some(1.0));
    }
    #[test]
    fn clipped_to_bounds() {
        let covered = collect(|f| disc(BOUNDS, [0.0, 63.0], 10.0, f));
        assert!(!covered.is_empty());
        assert!(covered
            .iter()
            .all(|c| (0..64).contains(&c.x) && (0..64).contains(&c.y)));
        assert!(collect(|f| disc(BOUNDS, [-100.0, -100.0], 10.0, f)).is_empty());
        assert!(collect(|f| disc(BOUNDS, [f32::NAN, 0.0], 10.0, f)).is_empty());
    }
    #[test]
    fn polygon_winding_agnostic() {
        let square = [[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0]];
        let mut reversed = square;
        reversed.reverse();
        let a = collect(|f| convex_polygon(BOUNDS, &square, f));
        let b = collect(|f| convex_polygon(BOUNDS, &reversed, f));
        assert_eq!(a, b);
        // Edges fall exactly between pixel centers.
        let full = a.iter().filter(|c| c.alpha >= 1.0).count();
        assert_eq!(full, 100);
    }
    #[test]
    fn degenerate_polygon() {
        let flat = [[0.0, 0.0], [10.0, 10.0], [20.0, 20.0]];
        assert!(collect(|f| convex_polygon(BOUNDS, &flat, f)).is_empty());
    }
    #[test]
    fn rotated_ellipse() {
        // Long axis vertical.
        let covered = collect(|f| {
            ellipse(
                BOUNDS,
                [32.0, 32.0],
                [10.0, 2.0],
                std::f32::consts::FRAC_PI_2,
                f,
            );
        });
        let tall = covered.iter().any(|c| c.x == 32 && c.y == 24);
        let wide = covered.iter().any(|c| c.x == 40 && c.y == 32);
        assert!(tall && !wide);
    }
    #[test]
    fn line_covers_endpoints() {
        let covered = collect(|f| line(BOUNDS, [5.0, 5.0], [30.0, 5.0], 2.0, f));
        assert!(covered.iter().any(|c| c.x == 5 && c.y == 4));
        assert!(covered.iter().any(|c| c.x == 29 && c.y == 4));
        assert!(!covered.iter().any(|c| c.y > 6));
    }
}
