//! Turning a markdown writing into the styled word runs drawn on a card.
//!
//! Only the emphasis that survives on a card is kept: blockquotes become
//! curly-quoted italic runs, links and `**strong**` spans become bold runs.
//! Everything else is rendered as light body text.

use crate::{jitter_key, Draw};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

pub(crate) const BOLD_OPEN: &str = "{{bold}}";
pub(crate) const BOLD_CLOSE: &str = "{{/bold}}";
const QUOTE_OPEN: char = '“';
pub(crate) const QUOTE_CLOSE: char = '”';
const UNTITLED: &str = "Untitled";

static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>[^\n]+(?:\n>[^\n]+)*").expect("valid regex"));
static QUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^> ?").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\([^)]+\)").expect("valid regex"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*").expect("valid regex"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n+").expect("valid regex"));

/// A writing reduced to what a card displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedWriting {
    pub title: Option<String>,
    pub body: String,
}

/// Parses a `---` delimited document into a title and card-ready body.
///
/// The title comes from the first frontmatter line starting with
/// `title:`, falling back to "Untitled". A document that does not split
/// into frontmatter and body keeps its raw text as the body.
///
/// A quote line holding only `>` continues the surrounding quotation.
pub fn prepare_writing(source: &str) -> PreparedWriting {
    prepare(source, true)
}

/// Like [`prepare_writing`], except that a quote line holding only `>`
/// ends the quotation, as the square social template renders it.
pub fn prepare_social_writing(source: &str) -> PreparedWriting {
    prepare(source, false)
}

fn prepare(source: &str, join_bare_quote_lines: bool) -> PreparedWriting {
    let parts: Vec<&str> = source.split("---").collect();

    let Some(frontmatter) = parts.get(1) else {
        return PreparedWriting {
            title: None,
            body: source.to_string(),
        };
    };

    let title = frontmatter
        .trim()
        .split('\n')
        .find(|line| line.starts_with("title:"))
        .map(|line| line.replacen("title:", "", 1).trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string());

    let Some(body) = parts.get(2) else {
        return PreparedWriting {
            title: Some(title),
            body: source.to_string(),
        };
    };

    PreparedWriting {
        title: Some(title),
        body: markup_emphasis(body.trim(), join_bare_quote_lines),
    }
}

fn markup_emphasis(body: &str, join_bare_quote_lines: bool) -> String {
    let body = if join_bare_quote_lines {
        body.replace(">\n", "> \n")
    } else {
        body.to_string()
    };
    let body = BLOCKQUOTE.replace_all(&body, |caps: &Captures<'_>| {
        let inner = QUOTE_MARKER.replace_all(&caps[0], "");
        format!("{QUOTE_OPEN}{}{QUOTE_CLOSE}", inner.trim())
    });
    let body = LINK.replace_all(&body, "{{bold}}${1}{{/bold}}");
    let body = STRONG.replace_all(&body, "{{bold}}${1}{{/bold}}");
    let body = body.replace("\r\n", "\n");
    BLANK_RUN.replace_all(&body, "\n\n").trim().to_string()
}

/// Typeface a word is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontFamily {
    #[serde(rename = "Inter Light")]
    Light,
    #[serde(rename = "Inter Italics")]
    Italic,
    #[serde(rename = "Inter Medium")]
    Medium,
    #[serde(rename = "Inter Medium Italics")]
    MediumItalic,
}

impl FontFamily {
    fn for_style(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => Self::MediumItalic,
            (true, false) => Self::Medium,
            (false, true) => Self::Italic,
            (false, false) => Self::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledWord {
    pub key: String,
    /// Key of the inner styled span, present for bold or italic words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_key: Option<String>,
    /// Key of the trailing closing-quote span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_key: Option<String>,
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// The word ends a quotation; the closing mark is set separately in italics.
    pub closes_quote: bool,
    pub font: FontFamily,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledLine {
    pub key: String,
    pub words: Vec<StyledWord>,
}

/// Emphasis carried from one word to the next.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub(crate) italic: bool,
    pub(crate) bold: bool,
}

impl RunState {
    pub(crate) fn advance(&mut self, word: &str) {
        if word.starts_with(QUOTE_OPEN) {
            self.italic = true;
        }
        if word.ends_with(QUOTE_CLOSE) {
            self.italic = false;
        }
        if word.starts_with(BOLD_OPEN) {
            self.bold = true;
        }
        if word.ends_with(BOLD_CLOSE) {
            self.bold = false;
        }
    }
}

/// Splits a prepared body into lines of styled words.
///
/// Emphasis runs may span words and lines. Keys are drawn from `rng`
/// inner span first, then the word, and each line's key after its words.
pub fn style_lines<D: Draw + ?Sized>(body: &str, rng: &mut D) -> Vec<StyledLine> {
    let mut state = RunState::default();

    body.split('\n')
        .enumerate()
        .map(|(line_index, line)| {
            let words = line
                .split(' ')
                .enumerate()
                .map(|(word_index, word)| {
                    state.advance(word);
                    style_word(word, line_index, word_index, &state, rng)
                })
                .collect();
            let key = jitter_key(&format!("line-{line_index}"), rng.draw());
            StyledLine { key, words }
        })
        .collect()
}

fn style_word<D: Draw + ?Sized>(
    word: &str,
    line_index: usize,
    word_index: usize,
    state: &RunState,
    rng: &mut D,
) -> StyledWord {
    let closes_quote = word.ends_with(QUOTE_CLOSE);
    let closes_bold = word.ends_with(BOLD_CLOSE);
    let text = word
        .replacen(BOLD_OPEN, "", 1)
        .replacen(BOLD_CLOSE, "", 1)
        .replacen(QUOTE_CLOSE, "", 1);
    let position = format!("{line_index}-{word_index}");

    let bold = state.bold || closes_bold;
    let italic = state.italic || closes_quote;

    if !(bold || italic) {
        return StyledWord {
            key: jitter_key(&format!("word-{position}"), rng.draw()),
            style_key: None,
            quote_key: None,
            text,
            bold: false,
            italic: false,
            closes_quote: false,
            font: FontFamily::Light,
        };
    }

    let style_key = jitter_key(&format!("styled-{position}"), rng.draw());
    let quote_key =
        closes_quote.then(|| jitter_key(&format!("quote-{position}"), rng.draw()));
    let key = jitter_key(&format!("word-{position}"), rng.draw());

    StyledWord {
        key,
        style_key: Some(style_key),
        quote_key,
        text,
        bold,
        italic,
        closes_quote,
        font: FontFamily::for_style(bold, italic),
    }
}
