//! Line classification for the board grammar.
//!
//! Each line is classified on its own, with no knowledge of the lines around
//! it. Deciding what a line *means* (a description, a preamble line, a dropped
//! line) is the job of [`crate::parser::BoardBuilder`].

use regex::Regex;
use std::sync::OnceLock;

/// Literal token marking a column as auto-completing
pub const AUTO_COMPLETE_TOKEN: &str = "[auto-complete]";

/// Literal token disabling thumbnails for the whole board
pub const NO_THUMBNAILS_TOKEN: &str = "[no-thumbnails]";

/// Minimum indentation for a description continuation line
pub const DESCRIPTION_INDENT: &str = "  ";

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^##\s+(.+)$").expect("invalid heading regex"))
}

fn task_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-\s+\[([ xX])\]\s+(.*)$").expect("invalid task regex"))
}

fn auto_complete_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[auto-complete\]").expect("invalid token regex"))
}

pub(crate) fn no_thumbnails_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[no-thumbnails\]").expect("invalid token regex"))
}

/// What a single line looks like in isolation
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// `## Title` with the settings token already removed from the title
    ColumnHeading { title: String, auto_complete: bool },
    /// `- [ ] text` / `- [x] text`
    Task { completed: bool, text: &'a str },
    /// Non-blank line indented by at least two spaces, indent removed
    Indented { content: &'a str },
    /// Empty or whitespace-only line
    Blank,
    /// Anything else
    Text { raw: &'a str },
}

/// A classified line together with its original text
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    pub raw: &'a str,
    pub kind: LineKind<'a>,
}

/// Split text into lines and classify each one
pub fn tokenize(source: &str) -> Vec<Line<'_>> {
    source
        .split('\n')
        .map(|raw| {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            Line {
                raw,
                kind: classify_line(raw),
            }
        })
        .collect()
}

/// Classify one line (without its terminator)
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = heading_re().captures(line) {
        let (title, auto_complete) = split_column_title(&caps[1]);
        return LineKind::ColumnHeading {
            title,
            auto_complete,
        };
    }

    if let Some(caps) = task_re().captures(line) {
        let completed = caps[1].eq_ignore_ascii_case("x");
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        return LineKind::Task { completed, text };
    }

    if let Some(content) = line.strip_prefix(DESCRIPTION_INDENT) {
        return LineKind::Indented { content };
    }

    LineKind::Text { raw: line }
}

/// Strip the auto-complete token from a heading, returning the clean title
pub fn split_column_title(raw: &str) -> (String, bool) {
    let re = auto_complete_re();
    if re.is_match(raw) {
        (re.replace_all(raw, "").trim().to_string(), true)
    } else {
        (raw.trim().to_string(), false)
    }
}
