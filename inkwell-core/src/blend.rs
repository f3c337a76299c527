//! # Blending
//!
//! Layers are combined with separable blend modes over straight alpha, following the usual
//! source-over formulation: the blended color is only fully expressed where both source and backdrop
//! are opaque, and falls back to the plain source color over transparent backdrops.

use crate::color::Color;

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
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
}
impl BlendMode {
    /// The separable blend function `B(backdrop, source)` on unit channel values.
    #[must_use]
    pub fn apply(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Normal => cs,
            Self::Multiply => cb * cs,
            Self::Screen => cb + cs - cb * cs,
            // Hard light with the arguments swapped.
            Self::Overlay => {
                if cb <= 0.5 {
                    2.0 * cb * cs
                } else {
                    1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
                }
            }
        }
    }
}

/// Blend mode for a layer, including a mode and opacity modulate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Blend {
    pub mode: BlendMode,
    /// Opacity, `[0, 1]`.
    pub opacity: f32,
}
impl Default for Blend {
    fn default() -> Self {
        Self {
            mode: BlendMode::default(),
            opacity: 1.0,
        }
    }
}

/// Composite `src` over `dst`, with `src`'s alpha additionally scaled by `alpha`.
#[must_use]
pub fn source_over(dst: Color, src: Color, alpha: f32, mode: BlendMode) -> Color {
    let a_s = src.alpha() * alpha.clamp(0.0, 1.0);
    if a_s <= 0.0 {
        return dst;
    }
    let a_b = dst.alpha();
    let a_o = a_s + a_b * (1.0 - a_s);
    let channel = |cb: u8, cs: u8| {
        let cb = f32::from(cb) / 255.0;
        let cs = f32::from(cs) / 255.0;
        let mixed = (1.0 - a_b) * cs + a_b * mode.apply(cb, cs);
        let co = (a_s * mixed + (1.0 - a_s) * a_b * cb) / a_o;
        crate::util::unit_to_u8(co)
    };
    Color::new(
        channel(dst.r, src.r),
        channel(dst.g, src.g),
        channel(dst.b, src.b),
        crate::util::unit_to_u8(a_o),
    )
}

/// Remove `alpha` worth of coverage from `dst`. Color is kept, fully erased pixels become
/// [`Color::TRANSPARENT`].
#[must_use]
pub fn destination_out(dst: Color, alpha: f32) -> Color {
    let a = dst.alpha() * (1.0 - alpha.clamp(0.0, 1.0));
    let a = crate::util::unit_to_u8(a);
    if a == 0 {
        Color::TRANSPARENT
    } else {
        dst.with_alpha(a)
    }
}
