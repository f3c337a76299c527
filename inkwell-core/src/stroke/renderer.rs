//! Incremental stroke rendering.
//!
//! Each new sample renders only the newest segment of the stroke. The smoothed path is walked by
//! arc length, emitting a stamp every time the walked distance crosses the brush spacing. Distance
//! left over at the end of a segment carries into the next, so stamp placement doesn't depend on how
//! the host happened to batch its samples.

use super::{spline, PointerSample};
use crate::{
    brush::{BrushKind, BrushSettings, StampPoint, StrokeState},
    raster::{shape::Bounds, Painter, RasterSurface},
};

pub struct StrokeRenderer {
    brush: BrushKind,
    settings: BrushSettings,
    spacing: f32,
    points: Vec<PointerSample>,
    state: StrokeState,
    /// Distance walked since the last stamp.
    carry: f32,
    /// End of the path walked so far.
    cursor: Option<spline::PathPoint>,
    /// Direction of the first segment with any length.
    heading: Option<f32>,
    stamps: usize,
}
impl Default for StrokeRenderer {
    fn default() -> Self {
        let brush = BrushKind::default();
        let settings = brush.default_settings();
        Self {
            brush,
            settings,
            spacing: brush.spacing(settings.size),
            points: Vec::new(),
            state: StrokeState::default(),
            carry: 0.0,
            cursor: None,
            heading: None,
            stamps: 0,
        }
    }
}
impl StrokeRenderer {
    /// Start a new stroke, discarding any previous one.
    pub fn begin(&mut self, brush: BrushKind, settings: BrushSettings) {
        let settings = settings.sanitized();
        self.brush = brush;
        self.settings = settings;
        self.spacing = brush.spacing(settings.size);
        self.points.clear();
        self.state.reset();
        self.carry = 0.0;
        self.cursor = None;
        self.heading = None;
        self.stamps = 0;
    }
    /// Raw samples of the current stroke.
    #[must_use]
    pub fn points(&self) -> &[PointerSample] {
        &self.points
    }
    #[must_use]
    pub fn brush(&self) -> BrushKind {
        self.brush
    }
    /// Stamps emitted so far this stroke.
    #[must_use]
    pub fn stamps(&self) -> usize {
        self.stamps
    }
    /// End the stroke, handing back its raw samples.
    pub fn finish(&mut self) -> Vec<PointerSample> {
        log::trace!(
            "Stroke finished: {} samples, {} stamps",
            self.points.len(),
            self.stamps
        );
        self.cursor = None;
        self.state.reset();
        std::mem::take(&mut self.points)
    }
    /// Add a sample and render the segment it completes. Returns the number of stamps emitted.
    ///
    /// Only samples seen so far are known, so the newest segment is smoothed with its end point
    /// duplicated. Samples with a non-finite position are dropped.
    pub fn push(&mut self, surface: &mut RasterSurface, sample: PointerSample) -> usize {
        if !sample.is_finite() {
            log::trace!("Dropping non-finite sample {sample:?}");
            return 0;
        }
        self.points.push(sample);
        let before = self.stamps;
        let mut painter = surface.painter();

        let n = self.points.len();
        if n == 1 {
            self.start(&mut painter, sample);
        } else {
            self.segment(&mut painter, [n.saturating_sub(3), n - 2, n - 1, n - 1]);
        }
        self.stamps - before
    }
    /// Stamp the first sample of the stroke. Its direction isn't known yet.
    fn start(&mut self, painter: &mut Painter<'_>, sample: PointerSample) {
        let start = spline::PathPoint {
            x: sample.x,
            y: sample.y,
            pressure: sample.pressure,
        };
        self.emit(painter, start, 0.0);
        self.cursor = Some(start);
        self.heading = None;
    }
    /// Smooth and walk the segment `points[window[1]] → points[window[2]]`.
    fn segment(&mut self, painter: &mut Painter<'_>, window: [usize; 4]) {
        let path = spline::subdivide(window.map(|i| &self.points[i]), self.spacing);
        for next in path {
            self.walk_to(painter, next);
        }
    }
    #[allow(clippy::cast_possible_truncation)]
    fn walk_to(&mut self, painter: &mut Painter<'_>, next: spline::PathPoint) {
        let Some(from) = self.cursor else {
            self.cursor = Some(next);
            return;
        };
        self.cursor = Some(next);
        let (dx, dy) = (next.x - from.x, next.y - from.y);
        let len = f64::from(dx).hypot(f64::from(dy));
        if len <= f64::from(f32::EPSILON) {
            return;
        }
        let direction = dy.atan2(dx);
        if self.heading.is_none() {
            // The opening stamp went down facing nowhere in particular.
            self.state.face(direction);
            self.heading = Some(direction);
        }

        // Stamps land at `first + k * spacing` along the sub-segment.
        let spacing = f64::from(self.spacing);
        let first = spacing - f64::from(self.carry);
        if first > len {
            self.carry = (len + f64::from(self.carry)) as f32;
            return;
        }
        let last_k = ((len - first) / spacing).floor();
        self.carry = (len - (first + last_k * spacing)) as f32;

        // Only the stretch that can reach the surface is stamped.
        let unit = [f64::from(dx) / len, f64::from(dy) / len];
        let origin = [f64::from(from.x), f64::from(from.y)];
        let margin = f64::from(self.settings.size) * 1.5 + 2.0;
        let Some((near, far)) = visible_span(origin, unit, len, painter.bounds(), margin) else {
            return;
        };
        let k_lo = ((near - first) / spacing).ceil().max(0.0);
        let k_hi = ((far - first) / spacing).floor().min(last_k);
        if k_lo > k_hi {
            return;
        }
        // Both are small, non-negative integers after clipping to the surface.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (k_lo, k_hi) = (k_lo as u64, k_hi as u64);
        for k in k_lo..=k_hi {
            #[allow(clippy::cast_precision_loss)]
            let d = first + k as f64 * spacing;
            let t = d / len;
            let at = spline::PathPoint {
                x: (origin[0] + unit[0] * d) as f32,
                y: (origin[1] + unit[1] * d) as f32,
                pressure: crate::util::lerp(from.pressure, next.pressure, t as f32),
            };
            self.emit(painter, at, direction);
        }
    }
    fn emit(&mut self, painter: &mut Painter<'_>, at: spline::PathPoint, direction: f32) {
        let point = StampPoint::new(at.x, at.y, at.pressure, direction);
        self.brush
            .stamp(painter, point, &self.settings, &mut self.state);
        self.stamps += 1;
    }
}

/// Distances `d ∈ [0, len]` along `origin + unit * d` that lie within `margin` of `bounds`.
fn visible_span(
    origin: [f64; 2],
    unit: [f64; 2],
    len: f64,
    bounds: Bounds,
    margin: f64,
) -> Option<(f64, f64)> {
    let mut near = 0.0f64;
    let mut far = len;
    let limits = [
        (origin[0], unit[0], f64::from(bounds.width)),
        (origin[1], unit[1], f64::from(bounds.height)),
    ];
    for (start, step, extent) in limits {
        let (min, max) = (-margin, extent + margin);
        if step.abs() <= f64::EPSILON {
            if start < min || start > max {
                return None;
            }
            continue;
        }
        let (a, b) = ((min - start) / step, (max - start) / step);
        near = near.max(a.min(b));
        far = far.min(a.max(b));
    }
    (near <= far).then_some((near, far))
}

/// Render a whole stroke in one go, returning the number of stamps.
///
/// Unlike live rendering every segment can see the sample after it, so each is smoothed over its
/// true neighbors with points only duplicated at the ends of the path.
pub fn render_stroke(
    surface: &mut RasterSurface,
    points: &[PointerSample],
    brush: BrushKind,
    settings: BrushSettings,
) -> usize {
    let mut renderer = StrokeRenderer::default();
    renderer.begin(brush, settings);
    renderer.points = points
        .iter()
        .copied()
        .filter(PointerSample::is_finite)
        .collect();
    let Some(&first) = renderer.points.first() else {
        return 0;
    };
    let mut painter = surface.painter();
    renderer.start(&mut painter, first);
    let last = renderer.points.len() - 1;
    for i in 1..=last {
        renderer.segment(
            &mut painter,
            [i.saturating_sub(2), i - 1, i, (i + 1).min(last)],
        );
    }
    renderer.finish();
    renderer.stamps
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color;

    fn ink(size: f32) -> BrushSettings {
        BrushSettings {
            size,
            ..BrushKind::InkPen.default_settings()
        }
    }
    #[allow(clippy::cast_precision_loss)]
    fn line(samples: usize) -> Vec<PointerSample> {
        (0..samples)
            .map(|i| {
                let t = i as f32 / (samples - 1) as f32;
                PointerSample::new(8.0 + 48.0 * t, 32.0, 0.7)
            })
            .collect()
    }
    fn painted_rows(surface: &RasterSurface, x: i32) -> Vec<i32> {
        (0..64)
            .filter(|&y| surface.get(x, y).is_some_and(|c| c.a > 0))
            .collect()
    }

    #[test]
    fn constant_band_independent_of_sampling() {
        let mut sparse = RasterSurface::new(64, 64);
        let mut dense = RasterSurface::new(64, 64);
        render_stroke(&mut sparse, &line(2), BrushKind::InkPen, ink(10.0));
        render_stroke(&mut dense, &line(7), BrushKind::InkPen, ink(10.0));
        let band: Vec<i32> = (27..=36).collect();
        for x in 14..50 {
            assert_eq!(painted_rows(&sparse, x), band, "sparse column {x}");
            assert_eq!(painted_rows(&dense, x), band, "dense column {x}");
        }
    }
    #[test]
    fn stamp_count_follows_spacing() {
        let mut surface = RasterSurface::new(64, 64);
        // Spacing 1px over a 48px line, plus the initial stamp.
        let stamps = render_stroke(&mut surface, &line(5), BrushKind::InkPen, ink(10.0));
        assert!((48..=50).contains(&stamps), "{stamps}");
    }
    #[test]
    fn carry_across_pushes() {
        // Spacing 10px, segments of 4px never individually reach it.
        let settings = ink(100.0);
        let mut surface = RasterSurface::new(64, 64);
        let mut renderer = StrokeRenderer::default();
        renderer.begin(BrushKind::InkPen, settings);
        let mut total = 0;
        for i in 0..=11u8 {
            total += renderer.push(
                &mut surface,
                PointerSample::new(f32::from(i) * 4.0, 0.0, 1.0),
            );
        }
        // 44px walked: the first stamp, then one every 10px.
        assert_eq!(total, 5);
        assert_eq!(renderer.finish().len(), 12);
        assert!(renderer.points().is_empty());
    }
    #[test]
    fn whole_path_smooths_through_neighbors() {
        let points = [
            PointerSample::new(10.0, 10.0, 1.0),
            PointerSample::new(30.0, 10.0, 1.0),
            PointerSample::new(30.0, 50.0, 1.0),
        ];
        let mut surface = RasterSurface::new(64, 64);
        render_stroke(&mut surface, &points, BrushKind::InkPen, ink(2.0));
        let [p0, p1, p2] = points.map(|p| p.position());
        for t in [0.25, 0.5, 0.75] {
            // First segment, only its start is duplicated.
            let [x, y] = spline::catmull_rom(p0, p0, p1, p2, t);
            #[allow(clippy::cast_possible_truncation)]
            let (x, y) = (x.floor() as i32, y.floor() as i32);
            assert!(surface.get(x, y).is_some_and(|c| c.a > 0), "({x}, {y})");
        }
        // The curve bows away from the straight chord before turning the corner.
        let [mx, my] = spline::catmull_rom(p0, p0, p1, p2, 0.5);
        assert!((mx - 20.0).abs() < 1e-3 && (my - 7.5).abs() < 1e-3);
        assert!(!painted_rows(&surface, 20).contains(&10));
    }
    #[test]
    fn far_sample_stamps_only_near_surface() {
        let mut surface = RasterSurface::new(64, 64);
        let stamps = render_stroke(
            &mut surface,
            &[
                PointerSample::new(0.0, 0.0, 1.0),
                PointerSample::new(1.0e12, 0.0, 1.0),
            ],
            BrushKind::InkPen,
            ink(1.0),
        );
        assert!(stamps < 100, "{stamps}");
        assert!(surface.get(30, 0).is_some_and(|c| c.a > 0));

        // Entirely off the canvas, only the opening stamp is counted and nothing is painted.
        let mut surface = RasterSurface::new(64, 64);
        let stamps = render_stroke(
            &mut surface,
            &[
                PointerSample::new(1.0e6, 1.0e6, 1.0),
                PointerSample::new(-1.0e6, 1.0e6, 1.0),
            ],
            BrushKind::InkPen,
            ink(1.0),
        );
        assert_eq!(stamps, 1);
        assert!(surface.pixels().iter().all(|&c| c == Color::TRANSPARENT));
    }
    #[test]
    fn flat_brush_starts_facing_travel() {
        let mut surface = RasterSurface::new(64, 64);
        let mut renderer = StrokeRenderer::default();
        renderer.begin(BrushKind::FlatBrush, BrushKind::FlatBrush.default_settings());
        renderer.push(&mut surface, PointerSample::new(32.0, 8.0, 1.0));
        renderer.push(&mut surface, PointerSample::new(32.0, 40.0, 1.0));
        let edge = renderer.state.flat.expect("flat brush should record its edge");
        assert!((edge.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4, "{}", edge.angle);
        // Tip is across the direction of travel, horizontal.
        assert!((edge.left[1] - edge.right[1]).abs() < 1e-3);
    }
    #[test]
    fn single_point_stamps() {
        let mut surface = RasterSurface::new(16, 16);
        let stamps = render_stroke(
            &mut surface,
            &[PointerSample::new(8.0, 8.0, 1.0)],
            BrushKind::InkPen,
            ink(4.0),
        );
        assert_eq!(stamps, 1);
        assert_eq!(surface.get(8, 8), Some(Color::BLACK));
    }
    #[test]
    fn drops_non_finite() {
        let mut surface = RasterSurface::new(16, 16);
        let mut renderer = StrokeRenderer::default();
        renderer.begin(BrushKind::InkPen, ink(4.0));
        assert_eq!(
            renderer.push(&mut surface, PointerSample::new(f32::NAN, 0.0, 1.0)),
            0
        );
        assert!(renderer.points().is_empty());
    }
}
