//! The square, dark-only layout shared on social feeds.
//!
//! It uses the same seed as the writing card but a different draw order:
//! the background decorations come first, then the text. Each word is
//! rendered as one or more spans, each carrying its own key.

use crate::decoration::{scatter, Decoration};
use crate::text::{FontFamily, PreparedWriting, RunState, BOLD_CLOSE, BOLD_OPEN, QUOTE_CLOSE};
use crate::{jitter_key, Draw, Mulberry32, Theme};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const SOCIAL_SIZE: u32 = 1024;

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{bold\}\}.*?\{\{/bold\}\}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub key: String,
    pub text: String,
    pub font: FontFamily,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanWord {
    pub key: String,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanLine {
    pub key: String,
    pub words: Vec<SpanWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLayout {
    pub slug: String,
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub background: &'static str,
    pub emphasis: &'static str,
    pub decoration_border: &'static str,
    pub decorations: Vec<Decoration>,
    pub lines: Vec<SpanLine>,
}

impl SocialLayout {
    pub fn build(writing: &PreparedWriting, slug: &str) -> Self {
        let mut rng = Mulberry32::from_text(slug);

        let decorations = scatter(&mut rng);
        let lines = span_lines(&writing.body, &mut rng);

        let theme = Theme::Dark;
        Self {
            slug: slug.to_string(),
            title: writing.title.clone(),
            width: SOCIAL_SIZE,
            height: SOCIAL_SIZE,
            background: theme.background(),
            emphasis: theme.emphasis(),
            decoration_border: theme.decoration_border(),
            decorations,
            lines,
        }
    }
}

/// Splits a prepared body into lines of span-rendered words.
///
/// Each word draws its inner span keys, then its own key; each line draws
/// its key after its words.
pub fn span_lines<D: Draw + ?Sized>(body: &str, rng: &mut D) -> Vec<SpanLine> {
    let mut state = RunState::default();

    body.split('\n')
        .enumerate()
        .map(|(line_index, line)| {
            let words = line
                .split(' ')
                .enumerate()
                .map(|(word_index, word)| {
                    state.advance(word);
                    let position = format!("{line_index}-{word_index}");
                    let spans = word_spans(word, &position, &state, rng);
                    let key = jitter_key(&format!("word-{position}"), rng.draw());
                    SpanWord { key, spans }
                })
                .collect();
            let key = jitter_key(&format!("line-{line_index}"), rng.draw());
            SpanLine { key, words }
        })
        .collect()
}

fn strip_bold_markers(word: &str) -> String {
    word.replacen(BOLD_OPEN, "", 1).replacen(BOLD_CLOSE, "", 1)
}

fn word_spans<D: Draw + ?Sized>(
    word: &str,
    position: &str,
    state: &RunState,
    rng: &mut D,
) -> Vec<Span> {
    // The word is a single part, hence the fixed `-0` part index.
    let part = format!("{position}-0");
    let closes_quote = word.ends_with(QUOTE_CLOSE);

    if state.bold && (state.italic || closes_quote) {
        return bold_in_italic(&strip_bold_markers(word), &part, rng);
    }

    if state.bold || word.ends_with(BOLD_CLOSE) {
        return vec![Span {
            key: jitter_key(&format!("bold-{part}"), rng.draw()),
            text: strip_bold_markers(word),
            font: FontFamily::Medium,
        }];
    }

    let (prefix, font) = if state.italic || closes_quote {
        ("italic", FontFamily::Italic)
    } else {
        ("text", FontFamily::Light)
    };
    vec![Span {
        key: jitter_key(&format!("{prefix}-{part}"), rng.draw()),
        text: word.to_string(),
        font,
    }]
}

/// Splits `text` around any remaining bold runs and sets every piece in
/// medium italics. A piece ending the quotation has its closing mark set
/// separately.
fn bold_in_italic<D: Draw + ?Sized>(text: &str, part: &str, rng: &mut D) -> Vec<Span> {
    let mut spans = Vec::new();

    for (index, piece) in split_keeping_bold_runs(text).into_iter().enumerate() {
        let closes_quote = piece.ends_with(QUOTE_CLOSE);
        spans.push(Span {
            key: jitter_key(&format!("bold-{part}-{index}"), rng.draw()),
            text: piece.replacen(QUOTE_CLOSE, "", 1),
            font: FontFamily::MediumItalic,
        });
        if closes_quote {
            spans.push(Span {
                key: jitter_key(&format!("italic-{part}-{index}"), rng.draw()),
                text: QUOTE_CLOSE.to_string(),
                font: FontFamily::Italic,
            });
        }
    }

    spans
}

/// Splits around bold runs, keeping the runs and any empty edge pieces.
fn split_keeping_bold_runs(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for run in BOLD_SPAN.find_iter(text) {
        pieces.push(&text[last..run.start()]);
        pieces.push(run.as_str());
        last = run.end();
    }
    pieces.push(&text[last..]);
    pieces
}
