//! Bristle brushes.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::{BrushSettings, FlatEdge, StampPoint, StrokeState};
use crate::{
    raster::{shape, PaintOp, Painter},
    util::StampRng,
};

/// How far the flat tip turns toward the direction of travel each stamp.
const FLAT_ANGLE_SMOOTHING: f32 = 0.3;
/// Bristles in a light-pressure round brush stamp.
const ROUND_BRISTLES: usize = 10;
const OIL_BRISTLES: usize = 4;
/// How much an oil stamp takes on the color already on the canvas.
const OIL_PICKUP: f32 = 0.2;

/// Move `from` toward `to` by `factor`, the short way around the circle.
fn smooth_angle(from: f32, to: f32, factor: f32) -> f32 {
    let mut delta = (to - from) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    from + delta * factor
}

/// A chisel tip held perpendicular to travel. Consecutive stamps are bridged with a quad so fast
/// strokes stay continuous.
pub fn flat(
    painter: &mut Painter<'_>,
    point: StampPoint,
    settings: &BrushSettings,
    state: &mut StrokeState,
) {
    let half_width = settings.size * 0.5 * (0.5 + 0.5 * point.pressure);
    let angle = match state.flat {
        Some(prev) => smooth_angle(prev.angle, point.direction, FLAT_ANGLE_SMOOTHING),
        None => point.direction,
    };
    let (along_sin, along_cos) = angle.sin_cos();
    let (across_sin, across_cos) = (angle + FRAC_PI_2).sin_cos();
    let [x, y] = point.position();
    let left = [x + across_cos * half_width, y + across_sin * half_width];
    let right = [x - across_cos * half_width, y - across_sin * half_width];

    let half_thickness = (settings.size * 0.075).max(0.5);
    let (tx, ty) = (along_cos * half_thickness, along_sin * half_thickness);
    let tip = [
        [left[0] - tx, left[1] - ty],
        [left[0] + tx, left[1] + ty],
        [right[0] + tx, right[1] + ty],
        [right[0] - tx, right[1] - ty],
    ];

    // Tip and bridge overlap, take the max so each pixel is only painted once per stamp.
    let mut coverage = hashbrown::HashMap::<(i32, i32), f32>::new();
    let mut accumulate = |c: shape::Coverage| {
        let slot = coverage.entry((c.x, c.y)).or_insert(0.0);
        *slot = slot.max(c.alpha);
    };
    let bounds = painter.bounds();
    shape::convex_polygon(bounds, &tip, &mut accumulate);
    if let Some(prev) = state.flat {
        shape::convex_polygon(bounds, &[prev.left, left, right, prev.right], &mut accumulate);
    }
    for ((px, py), alpha) in coverage {
        painter.paint(
            px,
            py,
            settings.color,
            alpha * settings.opacity,
            PaintOp::SourceOver,
        );
    }

    state.flat = Some(FlatEdge { angle, left, right });
}

/// Full pressure lays a solid disc, lighter pressure splits into individual bristles.
pub fn round(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let p = point.pressure;
    let radius = settings.size * 0.5;
    let bounds = painter.bounds();
    if p > 0.6 {
        shape::disc(bounds, point.position(), radius, |c| {
            painter.paint(
                c.x,
                c.y,
                settings.color,
                c.alpha * settings.opacity,
                PaintOp::SourceOver,
            );
        });
        return;
    }

    let mut rng = StampRng::at(point.x, point.y);
    let bristle = settings.size * 0.12 * (0.5 + p);
    for _ in 0..ROUND_BRISTLES {
        let r = radius * 0.7 * rng.next_f32().sqrt();
        let (sin, cos) = rng.range(0.0, TAU).sin_cos();
        let center = [point.x + cos * r, point.y + sin * r];
        // Truncation of a small float is intended.
        #[allow(clippy::cast_possible_truncation)]
        let jitter = [
            rng.signed(12.0) as i16,
            rng.signed(12.0) as i16,
            rng.signed(12.0) as i16,
        ];
        let color = settings.color.offset(jitter);
        let alpha = settings.opacity * (0.5 + 0.5 * p) * rng.range(0.6, 1.0);
        shape::ellipse(
            bounds,
            center,
            [bristle, bristle * 0.5],
            point.direction,
            |c| painter.paint(c.x, c.y, color, c.alpha * alpha, PaintOp::SourceOver),
        );
    }
}

/// Picks up some of the wet paint under it, then drags bristle streaks along the direction of travel.
pub fn oil(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let radius = settings.size * 0.5 * (0.6 + 0.4 * point.pressure);
    // Saturating cast, off-canvas centers just sample nothing.
    #[allow(clippy::cast_possible_truncation)]
    let under = painter.get(point.x.floor() as i32, point.y.floor() as i32);
    let color = match under {
        Some(under) if under.a > 0 => settings.color.lerp(under, OIL_PICKUP),
        _ => settings.color,
    };
    let bounds = painter.bounds();
    shape::disc(bounds, point.position(), radius, |c| {
        painter.paint(
            c.x,
            c.y,
            color,
            c.alpha * settings.opacity,
            PaintOp::SourceOver,
        );
    });

    let (along_sin, along_cos) = point.direction.sin_cos();
    let (across_sin, across_cos) = (point.direction + FRAC_PI_2).sin_cos();
    let half_length = radius * 0.6;
    let width = (settings.size * 0.06).max(1.0);
    let streak = color.offset([-25, -25, -25]);
    for i in 0..OIL_BRISTLES {
        // Evenly across the tip, -0.75r ..= 0.75r
        #[allow(clippy::cast_precision_loss)]
        let offset = radius * (-0.75 + 1.5 * i as f32 / (OIL_BRISTLES - 1) as f32);
        let mid = [point.x + across_cos * offset, point.y + across_sin * offset];
        let a = [mid[0] - along_cos * half_length, mid[1] - along_sin * half_length];
        let b = [mid[0] + along_cos * half_length, mid[1] + along_sin * half_length];
        shape::line(bounds, a, b, width, |c| {
            painter.paint(
                c.x,
                c.y,
                streak,
                c.alpha * settings.opacity * 0.5,
                PaintOp::SourceOver,
            );
        });
    }
}
