use super::{falloff, BrushSettings, StampPoint};
use crate::raster::{shape, PaintOp, Painter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EraserMode {
    /// Pressure-scaled disc with a crisp edge.
    Hard,
    /// Radial falloff from the center.
    Soft,
}
impl EraserMode {
    #[must_use]
    pub fn from_hardness(hardness: f32) -> Self {
        if hardness >= 0.5 {
            Self::Hard
        } else {
            Self::Soft
        }
    }
}

pub fn erase(painter: &mut Painter<'_>, point: StampPoint, settings: &BrushSettings) {
    let bounds = painter.bounds();
    let p = point.pressure;
    match EraserMode::from_hardness(settings.hardness) {
        EraserMode::Hard => {
            let radius = settings.size * 0.5 * (0.5 + 0.5 * p);
            shape::disc(bounds, point.position(), radius, |c| {
                painter.paint(
                    c.x,
                    c.y,
                    settings.color,
                    c.alpha * settings.opacity,
                    PaintOp::DestinationOut,
                );
            });
        }
        EraserMode::Soft => {
            let alpha = settings.opacity * p;
            shape::disc(bounds, point.position(), settings.size * 0.5, |c| {
                painter.paint(
                    c.x,
                    c.y,
                    settings.color,
                    c.alpha * alpha * falloff(c.t, settings.hardness),
                    PaintOp::DestinationOut,
                );
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::EraserMode;
    #[test]
    fn mode_threshold() {
        assert_eq!(EraserMode::from_hardness(0.5), EraserMode::Hard);
        assert_eq!(EraserMode::from_hardness(0.49), EraserMode::Soft);
        assert_eq!(EraserMode::from_hardness(f32::NAN), EraserMode::Soft);
    }
}
