use crate::decoration::{scatter, Decoration};
use crate::text::{style_lines, PreparedWriting, StyledLine};
use crate::Mulberry32;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use typed_builder::TypedBuilder;

pub const DEFAULT_CARD_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn background(self) -> &'static str {
        match self {
            Theme::Dark => "#000",
            Theme::Light => "#fff",
        }
    }

    /// Colour of the title and of bold words.
    pub fn emphasis(self) -> &'static str {
        match self {
            Theme::Dark => "#ffffff",
            Theme::Light => "#000",
        }
    }

    pub fn decoration_border(self) -> &'static str {
        match self {
            Theme::Dark => "#ffffff75",
            Theme::Light => "#00000075",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown theme '{0}', expected 'dark' or 'light'")]
pub struct ThemeParseError(String);

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => f.write_str("dark"),
            Theme::Light => f.write_str("light"),
        }
    }
}

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CardOptions {
    #[builder(default)]
    pub theme: Theme,
    #[builder(default = DEFAULT_CARD_SIZE)]
    pub width: u32,
    #[builder(default = DEFAULT_CARD_SIZE)]
    pub height: u32,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Everything an image renderer needs to paint a writing card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub slug: String,
    pub title: Option<String>,
    pub theme: Theme,
    pub width: u32,
    pub height: u32,
    pub background: &'static str,
    pub emphasis: &'static str,
    pub decoration_border: &'static str,
    pub lines: Vec<StyledLine>,
    pub decorations: Vec<Decoration>,
}

impl CardLayout {
    /// Lays out a card for `slug`. The generator is seeded from the slug,
    /// so the result depends only on the inputs.
    pub fn build(writing: &PreparedWriting, slug: &str, options: CardOptions) -> Self {
        let mut rng = Mulberry32::from_text(slug);

        // Text keys are drawn before the background.
        let lines = style_lines(&writing.body, &mut rng);
        let decorations = scatter(&mut rng);

        Self {
            slug: slug.to_string(),
            title: writing.title.clone(),
            theme: options.theme,
            width: options.width,
            height: options.height,
            background: options.theme.background(),
            emphasis: options.theme.emphasis(),
            decoration_border: options.theme.decoration_border(),
            lines,
            decorations,
        }
    }
}
