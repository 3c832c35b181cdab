//! Plain-text previews for content cards

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEADING_MARKS: Regex = Regex::new(r"(?m)^#+[ \t]+").unwrap();
    static ref EMPHASIS_MARKS: Regex = Regex::new(r"\*+").unwrap();
    static ref IMAGES: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINKS: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref QUOTE_MARKS: Regex = Regex::new(r"(?m)^>+[ \t]*").unwrap();
    static ref LIST_MARKS: Regex = Regex::new(r"(?m)^(?:-+|\d+\.)(?:[ \t]+|$)").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)*").unwrap();
}

/// Strip markdown markers and truncate to at most `max_chars` characters
/// (plus a `...` suffix when truncated).
///
/// The result is plain text; callers escape it before embedding in markup.
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let text = markdown.replace("\r\n", "\n");
    let text = HEADING_MARKS.replace_all(&text, "");
    let text = IMAGES.replace_all(&text, "");
    let text = LINKS.replace_all(&text, "${1}");
    let text = EMPHASIS_MARKS.replace_all(&text, "");
    let text = QUOTE_MARKS.replace_all(&text, "");
    let text = LIST_MARKS.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = text.trim();

    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    } else {
        text.to_string()
    }
}
