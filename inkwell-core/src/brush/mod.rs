//! # Brush
//!
//! The stamp library. Each [`BrushKind`] knows how to paint one stamp into a layer given a sample
//! point along the stroke, the brush settings, and the per-stroke [`StrokeState`].
//!
//! Stamps are deterministic: any randomness comes from a [`crate::util::StampRng`] seeded from the
//! stamp position, so replaying a stroke reproduces it exactly.

mod dry;
mod eraser;
mod ink;
mod paint;
mod wash;

pub use eraser::EraserMode;

use crate::{color::Color, raster::Painter};

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
pub enum BrushKind {
    Pencil,
    #[default]
    InkPen,
    Ballpoint,
    FlatBrush,
    RoundBrush,
    Watercolor,
    OilBrush,
    Charcoal,
    Airbrush,
    Eraser,
}

impl BrushKind {
    /// Distance between stamps, as a fraction of brush size.
    #[must_use]
    pub fn spacing_factor(self) -> f32 {
        match self {
            Self::Pencil | Self::FlatBrush => 0.15,
            Self::InkPen | Self::Ballpoint | Self::Airbrush | Self::Eraser => 0.1,
            Self::RoundBrush | Self::OilBrush | Self::Charcoal => 0.2,
            Self::Watercolor => 0.25,
        }
    }
    /// Distance between stamps in pixels for a brush of this `size`. Never less than one pixel.
    #[must_use]
    pub fn spacing(self, size: f32) -> f32 {
        let spacing = self.spacing_factor() * size;
        if spacing.is_finite() {
            spacing.max(1.0)
        } else {
            1.0
        }
    }
    #[must_use]
    pub fn default_settings(self) -> BrushSettings {
        let (size, opacity, hardness, flow) = match self {
            Self::Pencil => (4.0, 0.9, 0.8, 1.0),
            Self::InkPen => (6.0, 1.0, 1.0, 1.0),
            Self::Ballpoint => (3.0, 0.9, 1.0, 1.0),
            Self::FlatBrush => (18.0, 0.8, 0.9, 1.0),
            Self::RoundBrush => (14.0, 0.8, 0.7, 1.0),
            Self::Watercolor => (30.0, 0.4, 0.2, 0.6),
            Self::OilBrush => (20.0, 0.9, 0.8, 1.0),
            Self::Charcoal => (12.0, 0.7, 0.5, 1.0),
            Self::Airbrush => (40.0, 1.0, 0.0, 0.5),
            Self::Eraser => (20.0, 1.0, 1.0, 1.0),
        };
        BrushSettings {
            size,
            opacity,
            hardness,
            flow,
            color: Color::BLACK,
        }
    }
    /// Whether this brush removes paint rather than adding it.
    #[must_use]
    pub fn is_eraser(self) -> bool {
        self == Self::Eraser
    }
    /// Paint one stamp.
    pub fn stamp(
        self,
        painter: &mut Painter<'_>,
        point: StampPoint,
        settings: &BrushSettings,
        state: &mut StrokeState,
    ) {
        match self {
            Self::Pencil => dry::pencil(painter, point, settings),
            Self::InkPen => ink::ink_pen(painter, point, settings),
            Self::Ballpoint => ink::ballpoint(painter, point, settings),
            Self::FlatBrush => paint::flat(painter, point, settings, state),
            Self::RoundBrush => paint::round(painter, point, settings),
            Self::Watercolor => wash::watercolor(painter, point, settings),
            Self::OilBrush => paint::oil(painter, point, settings),
            Self::Charcoal => dry::charcoal(painter, point, settings),
            Self::Airbrush => wash::airbrush(painter, point, settings),
            Self::Eraser => eraser::erase(painter, point, settings),
        }
    }
}

/// Per-stroke brush parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BrushSettings {
    /// Diameter, in pixels.
    pub size: f32,
    /// `[0, 1]`
    pub opacity: f32,
    /// `[0, 1]`. How much of the tip radius is solid before falloff begins.
    pub hardness: f32,
    /// `[0, 1]`. Paint deposit rate, for brushes that build up.
    pub flow: f32,
    pub color: Color,
}
impl Default for BrushSettings {
    fn default() -> Self {
        BrushKind::default().default_settings()
    }
}
impl BrushSettings {
    /// Clamp everything into range. Non-finite values fall back to the defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let unit = |v: f32, default: f32| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                default
            }
        };
        Self {
            size: if self.size.is_finite() {
                self.size.max(0.0)
            } else {
                defaults.size
            },
            opacity: unit(self.opacity, defaults.opacity),
            hardness: unit(self.hardness, defaults.hardness),
            flow: unit(self.flow, defaults.flow),
            color: self.color,
        }
    }
}

/// A position along the smoothed stroke where a stamp lands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StampPoint {
    pub x: f32,
    pub y: f32,
    /// `[0, 1]`
    pub pressure: f32,
    /// Direction of travel, radians.
    pub direction: f32,
}
impl StampPoint {
    /// Pressure is clamped to `[0, 1]`, with non-finite pressure treated as full.
    #[must_use]
    pub fn new(x: f32, y: f32, pressure: f32, direction: f32) -> Self {
        let pressure = if pressure.is_finite() {
            pressure.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let direction = if direction.is_finite() {
            direction
        } else {
            0.0
        };
        Self {
            x,
            y,
            pressure,
            direction,
        }
    }
    #[must_use]
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// Tip edge remembered between flat brush stamps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatEdge {
    /// Smoothed tip angle, radians.
    pub angle: f32,
    pub left: [f32; 2],
    pub right: [f32; 2],
}

/// Brush memory carried from stamp to stamp within one stroke.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeState {
    pub flat: Option<FlatEdge>,
}
impl StrokeState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
    /// Turn the remembered tip to face `direction` about its center, as if the last stamp had
    /// already been travelling that way.
    pub fn face(&mut self, direction: f32) {
        if let Some(edge) = &mut self.flat {
            let center = [
                (edge.left[0] + edge.right[0]) * 0.5,
                (edge.left[1] + edge.right[1]) * 0.5,
            ];
            let half_width = (edge.left[0] - edge.right[0]).hypot(edge.left[1] - edge.right[1]) * 0.5;
            let (across_sin, across_cos) = (direction + std::f32::consts::FRAC_PI_2).sin_cos();
            *edge = FlatEdge {
                angle: direction,
                left: [
                    center[0] + across_cos * half_width,
                    center[1] + across_sin * half_width,
                ],
                right: [
                    center[0] - across_cos * half_width,
                    center[1] - across_sin * half_width,
                ],
            };
        }
    }
}

/// Alpha multiplier at normalized distance `t` from a tip center. Solid out to `hardness`, then a
/// smooth falloff reaching zero at the rim.
#[must_use]
pub fn falloff(t: f32, hardness: f32) -> f32 {
    let hardness = hardness.clamp(0.0, 1.0);
    if t <= hardness {
        return 1.0;
    }
    if hardness >= 1.0 {
        return 0.0;
    }
    1.0 - crate::util::smoothstep((t - hardness) / (1.0 - hardness))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::raster::RasterSurface;
    use strum::IntoEnumIterator;

    fn stamp_once(kind: BrushKind, background: Color, pressure: f32) -> RasterSurface {
        let mut surface = RasterSurface::filled(64, 64, background);
        let mut settings = kind.default_settings();
        settings.size = 16.0;
        settings.color = Color::rgb(200, 30, 30);
        let mut state = StrokeState::default();
        kind.stamp(
            &mut surface.painter(),
            StampPoint::new(32.0, 32.0, pressure, 0.0),
            &settings,
            &mut state,
        );
        surface
    }

    #[test]
    fn every_brush_marks_center() {
        for kind in BrushKind::iter() {
            let background = if kind.is_eraser() {
                Color::WHITE
            } else {
                Color::TRANSPARENT
            };
            let surface = stamp_once(kind, background, 0.8);
            let center = surface.get(32, 32);
            assert_ne!(center, Some(background), "{kind} left the center untouched");
            // Nothing reaches the corners.
            assert_eq!(surface.get(0, 0), Some(background), "{kind}");
        }
    }
    #[test]
    fn stamps_deterministic() {
        for kind in BrushKind::iter() {
            let a = stamp_once(kind, Color::WHITE, 0.5);
            let b = stamp_once(kind, Color::WHITE, 0.5);
            assert_eq!(a.pixels(), b.pixels(), "{kind}");
        }
    }
    #[test]
    fn ink_ignores_pressure() {
        let a = stamp_once(BrushKind::InkPen, Color::TRANSPARENT, 0.1);
        let b = stamp_once(BrushKind::InkPen, Color::TRANSPARENT, 1.0);
        assert_eq!(a.pixels(), b.pixels());
    }
    #[test]
    fn hard_eraser_clears() {
        let mut surface = RasterSurface::filled(64, 64, Color::rgb(10, 200, 10));
        let settings = BrushSettings {
            size: 10.0,
            ..BrushKind::Eraser.default_settings()
        };
        BrushKind::Eraser.stamp(
            &mut surface.painter(),
            StampPoint::new(32.0, 32.0, 1.0, 0.0),
            &settings,
            &mut StrokeState::default(),
        );
        assert_eq!(surface.get(32, 32).map(|c| c.a), Some(0));
        assert_eq!(surface.get(32, 20).map(|c| c.a), Some(255));
    }
    #[test]
    fn flat_brush_remembers_edge() {
        let mut surface = RasterSurface::new(64, 64);
        let settings = BrushKind::FlatBrush.default_settings();
        let mut state = StrokeState::default();
        let mut painter = surface.painter();
        BrushKind::FlatBrush.stamp(
            &mut painter,
            StampPoint::new(20.0, 32.0, 1.0, 0.0),
            &settings,
            &mut state,
        );
        let first = state.flat.expect("flat brush should record its edge");
        BrushKind::FlatBrush.stamp(
            &mut painter,
            StampPoint::new(24.0, 32.0, 1.0, 1.0),
            &settings,
            &mut state,
        );
        let second = state.flat.expect("flat brush should record its edge");
        // Exponentially smoothed toward the new direction.
        assert!((second.angle - first.angle - 0.3).abs() < 1e-5);
        state.reset();
        assert_eq!(state.flat, None);
    }
    #[test]
    fn oil_picks_up_color() {
        let mut settings = BrushKind::OilBrush.default_settings();
        settings.color = Color::BLACK;
        settings.opacity = 1.0;
        let mut surface = RasterSurface::filled(64, 64, Color::WHITE);
        BrushKind::OilBrush.stamp(
            &mut surface.painter(),
            StampPoint::new(32.0, 32.0, 1.0, 0.0),
            &settings,
            &mut StrokeState::default(),
        );
        // 20% of the way from black to white.
        assert_eq!(surface.get(32, 32), Some(Color::rgb(51, 51, 51)));
    }
    #[test]
    fn spacing_minimum() {
        assert_eq!(BrushKind::InkPen.spacing(2.0), 1.0);
        assert_eq!(BrushKind::Watercolor.spacing(40.0), 10.0);
        assert_eq!(BrushKind::Pencil.spacing(f32::NAN), 1.0);
    }
    #[test]
    fn falloff_shape() {
        assert_eq!(falloff(0.3, 0.5), 1.0);
        assert_eq!(falloff(1.0, 0.5), 0.0);
        assert_eq!(falloff(1.0, 1.0), 1.0);
        assert!(falloff(0.75, 0.5) > 0.0 && falloff(0.75, 0.5) < 1.0);
    }
    #[test]
    fn pressure_clamped() {
        assert_eq!(StampPoint::new(0.0, 0.0, 4.0, 0.0).pressure, 1.0);
        assert_eq!(StampPoint::new(0.0, 0.0, -1.0, 0.0).pressure, 0.0);
        assert_eq!(StampPoint::new(0.0, 0.0, f32::NAN, 0.0).pressure, 1.0);
    }
    fn stamp_on(
        surface: &mut RasterSurface,
        kind: BrushKind,
        settings: &BrushSettings,
        pressure: f32,
    ) {
        kind.stamp(
            &mut surface.painter(),
            StampPoint::new(32.0, 32.0, pressure, 0.0),
            settings,
            &mut StrokeState::default(),
        );
    }
    #[allow(clippy::cast_possible_truncation)]
    fn painted_within(surface: &RasterSurface, radius: f32) -> Vec<Color> {
        let r = radius.ceil() as i32;
        let mut out = Vec::new();
        for y in 32 - r..=32 + r {
            for x in 32 - r..=32 + r {
                #[allow(clippy::cast_precision_loss)]
                let d = (x as f32 + 0.5 - 32.0).hypot(y as f32 + 0.5 - 32.0);
                if d <= radius {
                    out.extend(surface.get(x, y));
                }
            }
        }
        out
    }
    #[test]
    fn round_brush_solid_under_pressure() {
        let heavy = stamp_once(BrushKind::RoundBrush, Color::TRANSPARENT, 0.9);
        let center = heavy.get(32, 32).unwrap();
        assert_eq!((center.r, center.g, center.b), (200, 30, 30));
        assert!(painted_within(&heavy, 6.0).iter().all(|&c| c == center));

        // Light pressure splits into bristles, covering less.
        let light = stamp_once(BrushKind::RoundBrush, Color::TRANSPARENT, 0.3);
        let count = |s: &RasterSurface| s.pixels().iter().filter(|c| c.a > 0).count();
        assert!(count(&light) > 0);
        assert!(count(&light) < count(&heavy));
        // Every bristle stays within the tip.
        assert_eq!(light.get(32 + 8, 32), Some(Color::TRANSPARENT));
        assert_eq!(light.get(32, 32 - 9), Some(Color::TRANSPARENT));
    }
    #[test]
    fn watercolor_builds_up() {
        let mut settings = BrushKind::Watercolor.default_settings();
        settings.size = 16.0;
        let mut surface = RasterSurface::new(64, 64);
        stamp_on(&mut surface, BrushKind::Watercolor, &settings, 0.8);
        let once = surface.get(32, 32).unwrap().a;
        stamp_on(&mut surface, BrushKind::Watercolor, &settings, 0.8);
        let twice = surface.get(32, 32).unwrap().a;
        assert!(once > 0 && once < 64, "{once}");
        assert!(twice > once, "{twice} <= {once}");
    }
    #[test]
    fn soft_eraser_fades_out() {
        let settings = BrushSettings {
            size: 16.0,
            hardness: 0.2,
            ..BrushKind::Eraser.default_settings()
        };
        let mut surface = RasterSurface::filled(64, 64, Color::WHITE);
        stamp_on(&mut surface, BrushKind::Eraser, &settings, 0.5);
        let center = surface.get(32, 32).unwrap().a;
        let outer = surface.get(37, 32).unwrap().a;
        // Half pressure removes about half at the core.
        assert!(center > 100 && center < 160, "{center}");
        assert!(outer > center && outer < 255, "{outer}");
        assert_eq!(surface.get(32, 44).map(|c| c.a), Some(255));
    }
    #[test]
    fn airbrush_scales_with_flow_and_pressure() {
        let mut settings = BrushKind::Airbrush.default_settings();
        settings.size = 16.0;
        settings.flow = 1.0;
        let mut full = RasterSurface::new(64, 64);
        stamp_on(&mut full, BrushKind::Airbrush, &settings, 1.0);
        settings.flow = 0.5;
        let mut quarter = RasterSurface::new(64, 64);
        stamp_on(&mut quarter, BrushKind::Airbrush, &settings, 0.5);

        let full = full.get(32, 32).unwrap().a;
        let quarter = quarter.get(32, 32).unwrap().a;
        assert!(full > 20 && full < 30, "{full}");
        assert!(quarter > 0 && quarter * 3 < full, "{quarter}");
    }
    #[test]
    fn dry_media_multiply() {
        let paper = Color::rgb(200, 200, 50);
        for kind in [BrushKind::Pencil, BrushKind::Charcoal] {
            let surface = stamp_once(kind, paper, 0.8);
            let c = surface.get(32, 32).unwrap();
            assert_eq!(c.a, 255, "{kind}");
            // Normal painting would leave red alone, the brush color is red too.
            assert!(c.r < paper.r, "{kind}: {c:?}");
            assert!(c.g < paper.g, "{kind}: {c:?}");
            assert!(c.b <= paper.b, "{kind}: {c:?}");
        }
    }
    #[test]
    fn face_turns_about_center() {
        let mut state = StrokeState {
            flat: Some(FlatEdge {
                angle: 0.0,
                left: [10.0, 14.0],
                right: [10.0, 6.0],
            }),
        };
        state.face(std::f32::consts::FRAC_PI_2);
        let edge = state.flat.unwrap();
        assert!((edge.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((edge.left[0] - 6.0).abs() < 1e-4 && (edge.left[1] - 10.0).abs() < 1e-4);
        assert!((edge.right[0] - 14.0).abs() < 1e-4 && (edge.right[1] - 10.0).abs() < 1e-4);

        // Nothing to turn before the first stamp.
        let mut empty = StrokeState::default();
        empty.face(1.0);
        assert_eq!(empty.flat, None);
    }
}
