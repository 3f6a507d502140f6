//! Deterministic pseudo-random layout for shareable writing cards.
//!
//! A card's look is a pure function of its slug: the slug is hashed to a
//! seed, the seed drives a [`Mulberry32`] stream, and the stream places the
//! decorative shapes and keys the styled words. Rendering the same slug
//! twice yields the same card without persisting any layout state.
//!
//! ```rust
//! use footfall_seeded::Mulberry32;
//!
//! let mut a = Mulberry32::from_text("hello");
//! let mut b = Mulberry32::from_text("hello");
//! assert_eq!(a.next_f64(), b.next_f64());
//! ```

pub mod card;
pub mod decoration;
pub mod mulberry;
pub mod social;
pub mod text;

pub use card::{CardLayout, CardOptions, Theme, ThemeParseError};
pub use decoration::{Decoration, DECORATION_COUNT};
pub use mulberry::{hash_to_seed, Mulberry32};
pub use social::{SocialLayout, Span, SpanLine, SpanWord};
pub use text::{
    prepare_social_writing, prepare_writing, style_lines, FontFamily, PreparedWriting, StyledLine,
    StyledWord,
};

/// A source of uniformly distributed values in `[0, 1)`.
///
/// Layout code draws through this trait so tests can feed a scripted
/// sequence and assert exactly which value landed where.
pub trait Draw {
    fn draw(&mut self) -> f64;
}

impl Draw for Mulberry32 {
    fn draw(&mut self) -> f64 {
        self.next_f64()
    }
}

/// Formats a render key the way the card keys its elements: a prefix
/// followed by a scaled draw.
///
/// Scaled values below 1e-6 use exponent notation (`2.3283064365386963e-7`),
/// the way browsers print such numbers; everything else prints as a plain
/// decimal.
pub(crate) fn jitter_key(prefix: &str, draw: f64) -> String {
    let scaled = draw * 1000.0;
    if scaled != 0.0 && scaled.abs() < 1e-6 {
        format!("{prefix}-{scaled:e}")
    } else {
        format!("{prefix}-{scaled}")
    }
}
