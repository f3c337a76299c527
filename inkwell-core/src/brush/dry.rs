//! Dry media. Both darken what's beneath them rather than covering it.

use super::{BrushSettings, StampPoint};
use crate::{
    raster::{shape, PaintOp, Painter},
    util::{hash2, StampRng},
};

const CHARCOAL_GRAIN_SEED: u32 = 0xc4a2_c0a1;

/// Elliptical graphite tip laid along the direction of travel.
pub fn pencil(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    // Sub-linear, light pressure still leaves a mark.
    let p = point.pressure.powf(0.6);
    let rx = settings.size * 0.5 * (0.5 + 0.5 * p);
    let ry = rx * 0.6;
    let alpha = settings.opacity * (0.3 + 0.7 * p);
    let mut rng = StampRng::at(point.x, point.y);
    let bounds = painter.bounds();
    shape::ellipse(bounds, point.position(), [rx, ry], point.direction, |c| {
        let grain = rng.range(0.75, 1.0);
        // Broken, sparse edge.
        let edge = if c.t > 0.7 {
            if rng.next_f32() < 0.5 {
                return;
            }
            rng.range(0.4, 1.0)
        } else {
            1.0
        };
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * grain * edge,
            PaintOp::Multiply,
        );
    });
}

/// Wide tip biased toward 45°, with texture fixed to the paper rather than the stroke, plus a faint
/// scatter of dust around it.
pub fn charcoal(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let p = point.pressure;
    let rx = settings.size * 0.5 * (0.6 + 0.4 * p);
    let ry = rx * 0.5;
    let angle = std::f32::consts::FRAC_PI_4 + 0.2 * point.direction;
    let alpha = settings.opacity * (0.4 + 0.6 * p);
    let mut rng = StampRng::at(point.x, point.y);
    let bounds = painter.bounds();

    shape::ellipse(bounds, point.position(), [rx, ry], angle, |c| {
        #[allow(clippy::cast_precision_loss)]
        let grain = hash2(c.x, c.y, CHARCOAL_GRAIN_SEED) as f32 / u32::MAX as f32;
        // Solid core, increasingly broken toward the rim.
        if grain < 0.6 * (c.t - 0.3).max(0.0) {
            return;
        }
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * rng.range(0.6, 1.0),
            PaintOp::Multiply,
        );
    });

    let reach = settings.size * 0.8;
    // Saturating cast, a NaN size just yields no dust.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let particles = (settings.size * 0.8) as u32;
    for _ in 0..particles {
        let r = reach * rng.next_f32().sqrt();
        let (sin, cos) = rng.range(0.0, std::f32::consts::TAU).sin_cos();
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (
            (point.x + cos * r).floor() as i32,
            (point.y + sin * r).floor() as i32,
        );
        painter.paint(x, y, settings.color, alpha * 0.15, PaintOp::Multiply);
    }
}
