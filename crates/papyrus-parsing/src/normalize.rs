use once_cell::sync::Lazy;
use regex::Regex;

/// Superscript-style symbols PDFs attach to author names (corresponding
/// author, equal contribution, affiliations).
pub(crate) const MARKER_SYMBOLS: &[char] = &['∗', '†', '‡', '§', '¶'];

/// Clean raw text-layer output into the canonical form every other stage
/// works on.
///
/// Removes form feeds, NULs and U+FFFD, `Page N` stamps and lines holding
/// only a page number, then collapses horizontal whitespace, trims space
/// around line breaks, limits blank-line runs to one blank line and trims
/// the result. Total and idempotent.
pub fn normalize(raw: &str) -> String {
    static CONTROL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x00\x0C\u{FFFD}]").unwrap());
    static PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpage[^\S\n]*\d+").unwrap());
    static DIGIT_LINE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^[^\S\n]*\d+[^\S\n]*(?:\n|$)").unwrap());
    static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]{2,}").unwrap());
    static LINE_EDGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]*\n[^\S\n]*").unwrap());
    static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

    let mut text = CONTROL_RE.replace_all(raw, "").into_owned();

    // Removing one stamp can butt a word against the next one ("Page 1Page 2").
    while PAGE_RE.is_match(&text) {
        text = PAGE_RE.replace_all(&text, "").into_owned();
    }

    let text = DIGIT_LINE_RE.replace_all(&text, "");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text = LINE_EDGE_RE.replace_all(&text, "\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Split normalized text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
