const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Hashes `text` to a signed 32-bit seed.
///
/// The classic `h = h * 31 + unit` rolling hash over UTF-16 code units,
/// computed as `(h << 5) - h + unit` with 32-bit wraparound at every step.
/// For text inside the Basic Multilingual Plane the code units are the
/// code points; astral characters contribute their surrogate pair.
pub fn hash_to_seed(text: &str) -> i32 {
    text.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// The mulberry32 generator: 32 bits of state, one float per step.
///
/// Not suitable for anything security related. Cloning captures the
/// current position, so a clone replays the same continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: i32) -> Self {
        Self {
            // Reinterpret the bits; negative seeds wrap into the upper half.
            state: seed as u32,
        }
    }

    /// Shorthand for `Mulberry32::new(hash_to_seed(text))`.
    pub fn from_text(text: &str) -> Self {
        Self::new(hash_to_seed(text))
    }

    /// Advances the state and returns the next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`. Every output is an exact multiple of 2^-32.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }
}

impl Iterator for Mulberry32 {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
