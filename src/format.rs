//! Display helpers for article cards

use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

/// Shown for missing or unparsable timestamps
pub const DATE_UNAVAILABLE: &str = "Not available";

/// Shown for an article whose body strips down to nothing
pub const NO_CONTENT: &str = "No content";

#[allow(clippy::expect_used)]
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("literal pattern"));

#[allow(clippy::expect_used)]
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").expect("literal pattern"));

#[allow(clippy::expect_used)]
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("literal pattern"));

#[allow(clippy::expect_used)]
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]+\)").expect("literal pattern"));

#[allow(clippy::expect_used)]
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_~>#-]").expect("literal pattern"));

#[allow(clippy::expect_used)]
static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("literal pattern"));

/// Plain-text rendition of a Markdown body for one-line previews
///
/// Code blocks, inline code, images and links are dropped entirely; emphasis
/// and heading markers are removed; line breaks collapse into spaces.
pub fn strip_markdown(markdown: &str) -> String {
    let text = FENCED_CODE.replace_all(markdown, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "");
    let text = MARKUP.replace_all(&text, "");
    let text = NEWLINES.replace_all(&text, " ");
    text.trim().to_string()
}

/// Stripped body cut to `max_chars` characters, or [`NO_CONTENT`]
pub fn excerpt(content: Option<&str>, max_chars: usize) -> String {
    let text = strip_markdown(content.unwrap_or_default());
    if text.is_empty() {
        return NO_CONTENT.to_string();
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text,
    }
}

/// `12 Mar 2024 | 10:15` in the timestamp's own zone, or [`DATE_UNAVAILABLE`]
///
/// Convert with `with_timezone(&chrono::Local)` first to show local time.
pub fn format_date_time<Tz>(value: Option<&DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match value {
        Some(t) => t.format("%d %b %Y | %H:%M").to_string(),
        None => DATE_UNAVAILABLE.to_string(),
    }
}
