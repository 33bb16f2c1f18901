use once_cell::sync::Lazy;
use regex::Regex;

use papyrus_core::UNKNOWN_TITLE;

use crate::normalize::MARKER_SYMBOLS;

/// A provisional title with its heuristic score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCandidate<'a> {
    pub text: &'a str,
    pub line_index: usize,
    pub score: i32,
}

type TitleStrategy = fn(&[&str], &str) -> Option<String>;

/// Title strategies in the order they are tried.
static STRATEGIES: [(&str, TitleStrategy); 5] = [
    ("merged_first_line", merged_first_line),
    ("arxiv_anchored", arxiv_anchored),
    ("before_abstract", before_abstract),
    ("pattern_in_text", pattern_in_text),
    ("heuristic_on_lines", heuristic_on_lines),
];

/// Recover the paper title from the first page.
///
/// Tries each strategy in order and returns the first hit, normalized with
/// [`normalize_title`]. Falls back to `"Unknown Title"`.
pub fn extract_title(lines: &[&str], full_text: &str) -> String {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let title = strategy(lines, full_text)?;
            tracing::debug!(strategy = *name, title = %title, "title strategy matched");
            Some(title)
        })
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

// ───────────────── Strategies ─────────────────

/// Strategy 1: the first line often holds "Title Author1 Author2∗".
fn merged_first_line(lines: &[&str], _full_text: &str) -> Option<String> {
    let first = *lines.first()?;
    title_from_merged_line(first)
}

fn title_from_merged_line(line: &str) -> Option<String> {
    if line.chars().count() < 10 {
        return None;
    }

    static AUTHOR_SPLIT_PATTERNS: Lazy<Vec<(Regex, usize)>> = Lazy::new(|| {
        vec![
            // Name followed by a marker symbol or superscript affiliations: "Tom B. Brown∗", "Ann Lee1,2"
            (
                Regex::new(r"^(.+?)\s+\p{Lu}\p{Ll}+\s+(?:\p{Lu}\.?\s+)?\p{Lu}\p{Ll}+\s*(?:[∗†‡§¶*]|\d\s*,\s*\d)").unwrap(),
                10,
            ),
            // Name with a middle initial: "John Q. Smith"
            (
                Regex::new(r"^(.+?)\s+\p{Lu}\p{Ll}+\s+\p{Lu}\.?\s+\p{Lu}\p{Ll}+").unwrap(),
                10,
            ),
            // Two or more ALL-CAPS tokens: "JOHN SMITH"
            (Regex::new(r"^(.+?)(?:\s+\p{Lu}{2,}\b){2,}").unwrap(), 15),
        ]
    });

    for (re, min_len) in AUTHOR_SPLIT_PATTERNS.iter() {
        if let Some(caps) = re.captures(line) {
            let candidate = caps[1].trim();
            let len = candidate.chars().count();
            if (*min_len..=200).contains(&len) {
                return non_empty(normalize_title(candidate));
            }
        }
    }

    if line.chars().count() > 100 {
        return truncated_prefix(line);
    }
    None
}

/// Long merged lines without a recognizable author: take the longest word
/// prefix (15 down to 4 words) that reads like a title.
fn truncated_prefix(line: &str) -> Option<String> {
    static STRUCTURAL_START: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^(?:Figure|Table|Contents|Abstract|Introduction|\d+)").unwrap());
    const STOPWORDS: &[&str] = &["the", "a", "an", "of", "in", "on", "at", "to"];

    let words: Vec<&str> = line.split_whitespace().collect();
    for word_count in (4..=15.min(words.len())).rev() {
        let candidate = words[..word_count].join(" ");
        if STRUCTURAL_START.is_match(&candidate) {
            continue;
        }
        if !(20..=150).contains(&candidate.chars().count()) {
            continue;
        }
        let last = words[word_count - 1].to_lowercase();
        if STOPWORDS.contains(&last.as_str()) {
            continue;
        }
        return non_empty(normalize_title(&candidate));
    }
    None
}

/// Strategy 2: the title usually sits shortly after the arXiv stamp.
fn arxiv_anchored(lines: &[&str], _full_text: &str) -> Option<String> {
    static ARXIV_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\.\d{4,5}").unwrap());

    let arxiv_index = lines
        .iter()
        .position(|l| l.to_lowercase().contains("arxiv") || ARXIV_ID.is_match(l))?;
    let abstract_index = lines.iter().position(|l| is_abstract_line(l))?;
    if abstract_index <= arxiv_index {
        return None;
    }

    let search_end = (arxiv_index + 10).min(abstract_index);
    lines[arxiv_index + 1..search_end]
        .iter()
        .find(|l| is_valid_title_candidate(l))
        .and_then(|l| non_empty(normalize_title(l)))
}

/// Strategy 3: best-scoring line among the first 30 above "Abstract".
fn before_abstract(lines: &[&str], _full_text: &str) -> Option<String> {
    let abstract_index = lines.iter().position(|l| is_abstract_line(l))?;
    let scan_limit = abstract_index.min(30);
    best_candidate(&lines[..scan_limit]).and_then(|c| non_empty(normalize_title(c.text)))
}

/// Strategy 4: the first non-empty line after an arXiv identifier in the
/// raw text. Blank lines between the stamp and the title are skipped.
fn pattern_in_text(_lines: &[&str], full_text: &str) -> Option<String> {
    static ARXIV_THEN_LINE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)(?:arXiv:\d{4}\.\d{4,5}|arXiv preprint)\s*(?:v\d+)?\s*\n\s*([^\n]+)")
            .unwrap()
    });

    let caps = ARXIV_THEN_LINE.captures(full_text)?;
    let candidate = caps[1].trim();
    if (10..=200).contains(&candidate.chars().count()) {
        non_empty(normalize_title(candidate))
    } else {
        None
    }
}

/// Strategy 5: best-scoring line among the first 40, no anchor required.
fn heuristic_on_lines(lines: &[&str], _full_text: &str) -> Option<String> {
    let scan_limit = lines.len().min(40);
    best_candidate(&lines[..scan_limit]).and_then(|c| non_empty(normalize_title(c.text)))
}

// ───────────────── Candidate validation & scoring ─────────────────

/// Score every valid line and return the highest. Ties go to the earliest line.
pub fn best_candidate<'a>(lines: &[&'a str]) -> Option<TitleCandidate<'a>> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            let valid = is_valid_title_candidate(l);
            if !valid {
                tracing::trace!(line = %l, "rejected title candidate");
            }
            valid
        })
        .map(|(i, l)| TitleCandidate {
            text: *l,
            line_index: i,
            score: score_title_candidate(l, i),
        })
        .fold(None, |best: Option<TitleCandidate<'a>>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
}

/// Whether a line could plausibly be a title at all.
pub fn is_valid_title_candidate(line: &str) -> bool {
    static REJECT_PREFIX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)^(?:arxiv|preprint|proceedings|copyright|vol\.|volume|pp\.|pages|doi:|isbn|issn|published|accepted|received|revised|contents|[ivx]+\.|january|february|march|april|may|june|july|august|september|october|november|december|figure\s+\d|table\s+\d|section\s+\d|appendix)",
        )
        .unwrap()
    });
    static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());
    const COMMON_HEADERS: &[&str] = &[
        "abstract",
        "introduction",
        "keywords",
        "references",
        "acknowledgments",
    ];

    let trimmed = line.trim();
    if REJECT_PREFIX.is_match(line) || BARE_YEAR.is_match(trimmed) {
        return false;
    }
    if line.contains('@') || line.contains("http") {
        return false;
    }
    if COMMON_HEADERS.contains(&trimmed.to_lowercase().as_str()) {
        return false;
    }
    let len = line.chars().count();
    if !(10..=500).contains(&len) {
        return false;
    }
    if !line.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    line.split_whitespace().count() >= 2
}

/// Additive title score for a line at `line_index` (0-based).
pub fn score_title_candidate(line: &str, line_index: usize) -> i32 {
    static ACADEMIC_TERMS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)\b(?:analysis|study|approach|method|system|model|framework|algorithm|survey|review|learning|neural|network|deep|machine|data|training|using|based|via|through|toward|towards|efficient|novel|improved|enhanced|robust)\b",
        )
        .unwrap()
    });
    static INITIALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]\.\s*[A-Z]\.").unwrap());
    static FIRST_INITIAL_LAST: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\.\s+\p{Lu}\p{Ll}+").unwrap());

    let len = line.chars().count();
    let word_count = line.split_whitespace().count();
    let mut score = 0;

    score += match len {
        20..=100 => 40,
        15..=150 => 25,
        10..=200 => 10,
        _ => 0,
    };

    score += match word_count {
        4..=12 => 30,
        3..=20 => 15,
        _ => 0,
    };

    score += match line_index {
        0 => 50,
        1..=3 => 30,
        4..=10 => 15,
        _ => 0,
    };

    if line.chars().any(char::is_lowercase) && line.chars().any(char::is_uppercase) {
        score += 15;
    }
    if line.contains(':') {
        score += 10;
    }
    if ACADEMIC_TERMS.is_match(line) {
        score += 15;
    }

    let digits = line.chars().filter(char::is_ascii_digit).count();
    if digits as f64 > len as f64 * 0.15 {
        score -= 20;
    }
    if line.contains(MARKER_SYMBOLS) {
        score -= 30;
    }
    if INITIALS.is_match(line) {
        score -= 15;
    }
    if FIRST_INITIAL_LAST.is_match(line) {
        score -= 20;
    }

    score
}

// ───────────────── Title cleaning helpers ─────────────────

/// Clean up a raw title candidate.
///
/// Drops marker symbols and edge punctuation, title-cases SHOUTED titles,
/// collapses whitespace and caps the length at 200 characters.
pub fn normalize_title(title: &str) -> String {
    static EDGE_PUNCT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[.\-–—:;,]+|[.\-–—:;,]+$").unwrap());
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let without_markers: String = title.chars().filter(|c| !MARKER_SYMBOLS.contains(c)).collect();
    let stripped = EDGE_PUNCT.replace_all(without_markers.trim(), "");
    let stripped = stripped.trim();

    let cased = if stripped == stripped.to_uppercase() && stripped.chars().count() > 5 {
        to_title_case(stripped)
    } else {
        stripped.to_string()
    };

    let collapsed = WS_RE.replace_all(&cased, " ").trim().to_string();
    if collapsed.chars().count() > 200 {
        let head: String = collapsed.chars().take(197).collect();
        format!("{head}...")
    } else {
        collapsed
    }
}

fn to_title_case(s: &str) -> String {
    const SMALL_WORDS: &[&str] = &[
        "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by", "of",
        "in",
    ];

    s.to_lowercase()
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && SMALL_WORDS.contains(&word) {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"abstract"` on its own or followed by punctuation/text (`"Abstract—We ..."`),
/// but not words like "Abstractive".
pub(crate) fn is_abstract_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    match lower.strip_prefix("abstract") {
        Some(rest) => !rest.chars().next().is_some_and(char::is_alphabetic),
        None => false,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
