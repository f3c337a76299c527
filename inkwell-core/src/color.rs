/// An 8-bit-per-channel, straight (non-premultiplied) alpha sRGB color.
///
/// This is also the pixel format of every [`crate::raster::RasterSurface`], so a slice of these casts
/// directly to the tightly packed RGBA8 byte layout hosts expect.
#[repr(C)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    /// Fully opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
    #[must_use]
    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
    /// Alpha as a `[0, 1]` float.
    #[must_use]
    pub fn alpha(self) -> f32 {
        f32::from(self.a) / 255.0
    }
    /// Mix the color channels toward `other` by `t`, keeping `self`'s alpha.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
            self.a,
        )
    }
    /// Offset each color channel by the given signed amounts, saturating.
    #[must_use]
    pub fn offset(self, [dr, dg, db]: [i16; 3]) -> Self {
        let channel = |c: u8, d: i16| (i16::from(c) + d).clamp(0, 255) as u8;
        Self::new(
            channel(self.r, dr),
            channel(self.g, dg),
            channel(self.b, db),
            self.a,
        )
    }
    /// Sum of per-channel absolute differences, alpha included. Ranges `0..=1020`.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        self.to_array()
            .into_iter()
            .zip(other.to_array())
            .map(|(a, b)| u32::from(a.abs_diff(b)))
            .sum()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("expected 3, 6 or 8 hex digits, found {0}")]
    BadLength(usize),
    #[error("invalid hex digit")]
    BadDigit,
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;
    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').ok_or(ColorParseError::MissingHash)?;
        if !hex.is_ascii() {
            return Err(ColorParseError::BadDigit);
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError::BadDigit)
        };
        match hex.len() {
            3 => {
                let mut out = [255u8; 4];
                for (slot, digit) in out.iter_mut().zip(hex.chars()) {
                    let v = digit.to_digit(16).ok_or(ColorParseError::BadDigit)? as u8;
                    *slot = v * 17;
                }
                Ok(Self::from_array(out))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            len => Err(ColorParseError::BadLength(len)),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}
