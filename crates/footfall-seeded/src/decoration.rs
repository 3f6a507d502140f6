use crate::{jitter_key, Draw};
use serde::Serialize;

/// Number of outlined squares scattered behind a card.
pub const DECORATION_COUNT: usize = 20;

pub const DECORATION_OPACITY: f64 = 0.25;

/// One outlined shape in the card background. Lengths are in pixels,
/// rotation in degrees; the shape is rotated first, then translated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoration {
    pub key: String,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub opacity: f64,
}

impl Decoration {
    /// Draws one decoration. Consumes exactly six values: the five
    /// geometry values in declaration order, then the key.
    pub fn draw<D: Draw + ?Sized>(index: usize, rng: &mut D) -> Self {
        let width = rng.draw() * 100.0 + 50.0;
        let height = rng.draw() * 100.0 + 50.0;
        let rotation = rng.draw() * 360.0;
        let translate_x = rng.draw() * 1000.0 - 500.0;
        let translate_y = rng.draw() * 600.0 - 300.0;
        let key = jitter_key(&format!("decoration-{index}"), rng.draw());

        Self {
            key,
            width,
            height,
            rotation,
            translate_x,
            translate_y,
            opacity: DECORATION_OPACITY,
        }
    }

    /// CSS transform for this shape.
    pub fn transform(&self) -> String {
        format!(
            "rotate({}deg) translate({}px, {}px)",
            self.rotation, self.translate_x, self.translate_y
        )
    }
}

/// Draws the full background set.
pub fn scatter<D: Draw + ?Sized>(rng: &mut D) -> Vec<Decoration> {
    (0..DECORATION_COUNT)
        .map(|index| Decoration::draw(index, rng))
        .collect()
}
