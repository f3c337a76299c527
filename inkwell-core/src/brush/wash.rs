//! Low-alpha brushes that build up over repeated passes.

use super::{falloff, BrushSettings, StampPoint};
use crate::raster::{shape, PaintOp, Painter};

pub fn watercolor(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let radius = settings.size * 0.5 * (0.7 + 0.3 * point.pressure);
    let alpha = settings.opacity * settings.flow * 0.3 * (0.5 + 0.5 * point.pressure);
    let bounds = painter.bounds();
    // Halo first, so the core sits on top of it.
    shape::disc(bounds, point.position(), radius * 1.2, |c| {
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * 0.4 * (1.0 - c.t),
            PaintOp::SourceOver,
        );
    });
    shape::disc(bounds, point.position(), radius * 0.6, |c| {
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * (1.0 - c.t),
            PaintOp::SourceOver,
        );
    });
}

pub fn airbrush(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let alpha = settings.flow * point.pressure * settings.opacity * 0.1;
    let bounds = painter.bounds();
    shape::disc(bounds, point.position(), settings.size * 0.5, |c| {
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * falloff(c.t, settings.hardness),
            PaintOp::SourceOver,
        );
    });
}
