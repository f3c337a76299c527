//! # Strokes
//!
//! Raw pointer input for one continuous gesture, and the machinery turning it into stamps:
//! [`spline`] smooths the samples, [`renderer`] walks the smoothed path at the brush's spacing.

pub mod renderer;
pub mod spline;

pub use renderer::{render_stroke, StrokeRenderer};

/// Host timestamp. Only ordering matters to the engine.
#[derive(
    bytemuck::Pod,
    bytemuck::Zeroable,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Default,
)]
#[repr(transparent)]
pub struct Microseconds(pub u64);
impl Microseconds {
    #[must_use]
    pub fn from_millis(millis: f64) -> Self {
        // Saturating, negative and NaN become zero.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let micros = (millis * 1000.0) as u64;
        Self(micros)
    }
}

/// One pointer sample, in raster coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// `[0, 1]`. Devices without pressure report `1.0`.
    pub pressure: f32,
    pub time: Microseconds,
}
impl PointerSample {
    #[must_use]
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure,
            time: Microseconds::default(),
        }
    }
    #[must_use]
    pub fn at(self, time: Microseconds) -> Self {
        Self { time, ..self }
    }
    #[must_use]
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }
    /// Whether the position is usable. Pressure is sanitized later and never rejects a sample.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
