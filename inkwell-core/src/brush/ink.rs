use super::{BrushSettings, StampPoint};
use crate::{
    raster::{shape, PaintOp, Painter},
    util::StampRng,
};

/// Solid disc at fixed opacity. Ignores pressure entirely.
pub fn ink_pen(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let bounds = painter.bounds();
    shape::disc(bounds, point.position(), settings.size * 0.5, |c| {
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * settings.opacity,
            PaintOp::SourceOver,
        );
    });
}

/// Pressure scales both width and opacity, with a light speckle where the ball skips.
pub fn ballpoint(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let p = point.pressure;
    let radius = settings.size * 0.5 * (0.4 + 0.6 * p);
    let alpha = settings.opacity * (0.5 + 0.5 * p);
    let mut rng = StampRng::at(point.x, point.y);
    let bounds = painter.bounds();
    shape::disc(bounds, point.position(), radius, |c| {
        let speckle = 1.0 - 0.15 * rng.next_f32();
        painter.paint(
            c.x,
            c.y,
            settings.color,
            c.alpha * alpha * speckle,
            PaintOp::SourceOver,
        );
    });
}
