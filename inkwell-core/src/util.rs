//! Utility types and math, used throughout the crate.

/// Hash two integer coordinates and a seed into a well-mixed `u32`.
///
/// Used for positional noise and for seeding per-stamp randomness, so that the same stroke painted
/// twice produces exactly the same pixels.
#[must_use]
pub fn hash2(x: i32, y: i32, seed: u32) -> u32 {
    // Bit reinterpretation of the coords is intended.
    #[allow(clippy::cast_sign_loss)]
    let mut h = (x as u32)
        .wrapping_mul(0x8da6_b343)
        .wrapping_add((y as u32).wrapping_mul(0xd816_3841))
        .wrapping_add(seed.wrapping_mul(0xcb1a_b31f));
    // murmur3 fmix32
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Small local xorshift generator. Every stamp creates its own from the stamp position, there is no
/// shared random state anywhere in the engine.
#[derive(Clone, Debug)]
pub struct StampRng(u32);
impl StampRng {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        Self(if seed == 0 { 0x9e37_79b9 } else { seed })
    }
    /// Seed from a (sub-pixel) stamp position.
    // Quarter-pixel resolution, saturating casts are fine for this.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(hash2((x * 4.0) as i32, (y * 4.0) as i32, 0x5eed))
    }
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits, exactly representable.
        #[allow(clippy::cast_precision_loss)]
        let v = (self.next_u32() >> 8) as f32;
        v / (1u32 << 24) as f32
    }
    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
    /// Uniform in `[-amplitude, amplitude)`.
    pub fn signed(&mut self, amplitude: f32) -> f32 {
        self.range(-amplitude, amplitude)
    }
}

#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep over `[0, 1]`.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Convert a `[0, 1]` float to a rounded `u8`. Out of range values saturate.
#[must_use]
pub fn unit_to_u8(v: f32) -> u8 {
    // `as` saturates float->int.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let v = (v * 255.0).round() as u8;
    v
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn rng_reproducible() {
        let a: Vec<_> = std::iter::repeat_with({
            let mut rng = StampRng::at(10.25, 3.0);
            move || rng.next_u32()
        })
        .take(16)
        .collect();
        let mut rng = StampRng::at(10.25, 3.0);
        for v in a {
            assert_eq!(v, rng.next_u32());
        }
    }
    #[test]
    fn rng_unit_range() {
        let mut rng = StampRng::new(0);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }
    #[test]
    fn hash_differs() {
        assert_ne!(hash2(0, 0, 0), hash2(1, 0, 0));
        assert_ne!(hash2(0, 0, 0), hash2(0, 1, 0));
        assert_ne!(hash2(0, 0, 0), hash2(0, 0, 1));
    }
    #[test]
    fn unit_to_u8_saturates() {
        assert_eq!(unit_to_u8(-1.0), 0);
        assert_eq!(unit_to_u8(0.5), 128);
        assert_eq!(unit_to_u8(2.0), 255);
    }
}
