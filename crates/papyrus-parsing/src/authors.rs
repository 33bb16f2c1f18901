use once_cell::sync::Lazy;
use regex::Regex;

use papyrus_core::Author;

use crate::config::ExtractionConfig;
use crate::normalize::MARKER_SYMBOLS;

/// Lines containing any of these (case-insensitive) are affiliations, not
/// names. Short purely alphabetic entries only match whole words.
pub const DEFAULT_AFFILIATION_KEYWORDS: &[&str] = &[
    "university",
    "institute",
    "college",
    "school",
    "department",
    "laboratory",
    "lab",
    "center",
    "centre",
    "research",
    "corporation",
    "company",
    "inc",
    "ltd",
    "llc",
    "email",
    "@",
    "http",
    "www",
    "equal contribution",
    "these authors",
    "openai",
    "deepmind",
    "google",
    "microsoft",
    "meta ai",
    "nvidia",
    "ibm",
    "china",
    "usa",
    "japan",
    "germany",
    "france",
    "uk",
    "canada",
    "india",
    "korea",
    "singapore",
    "switzerland",
    "israel",
    "italy",
    "spain",
    "netherlands",
    "australia",
];

/// Terms that can never be (part of) an author name.
pub const DEFAULT_NAME_STOPWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "university",
    "institute",
    "department",
    "college",
    "school",
    "laboratory",
    "center",
    "email",
    "corresponding",
    "author",
    "authors",
    "et al",
    "equal contribution",
    "these authors",
    "table",
    "figure",
    "equation",
    "section",
    "chapter",
    "appendix",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "preprint",
    "arxiv",
    "published",
    "accepted",
    "received",
    "revised",
    "research",
    "qualcomm",
    "openai",
    "microsoft",
    "google",
    "meta",
    "natural",
    "english",
    "chinese",
    "code",
    "mixed",
    "generation",
    "early",
    "experiments",
    "evaluating",
    "modal",
    "mathematical",
    "reasoning",
    "vision",
    "language",
    "models",
];

const CONTENT_SECTIONS: &[&str] = &[
    "abstract",
    "introduction",
    "background",
    "related work",
    "methodology",
    "methods",
    "results",
    "discussion",
    "conclusion",
    "conclusions",
    "references",
    "acknowledgment",
    "acknowledgement",
    "appendix",
];

/// Extract the author list that follows `title` on the first page.
///
/// Tries, in order, one-author-per-line, a single comma/"and" separated line
/// and space-separated name runs; the first strategy producing any author
/// wins. Names are deduplicated by exact match, kept in first-seen order and
/// capped at 30.
pub fn extract_authors(lines: &[&str], title: &str) -> Vec<Author> {
    extract_authors_with_config(lines, title, &ExtractionConfig::default())
}

/// Config-aware version of [`extract_authors`].
pub(crate) fn extract_authors_with_config(
    lines: &[&str],
    title: &str,
    config: &ExtractionConfig,
) -> Vec<Author> {
    type AuthorStrategy = fn(&[&str], &AuthorRules) -> AuthorList;
    const STRATEGIES: [(&str, AuthorStrategy); 3] = [
        ("multi_line", multi_line),
        ("single_line", single_line),
        ("space_separated", space_separated),
    ];

    let rules = AuthorRules::from_config(config);
    let start = author_start_index(lines, title, &rules);
    let window = &lines[start..];

    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let found = strategy(window, &rules);
            if found.is_empty() {
                return None;
            }
            tracing::debug!(strategy = *name, count = found.len(), "author strategy matched");
            Some(found.into_vec())
        })
        .unwrap_or_default()
}

// ───────────────── Author accumulator ─────────────────

/// Ordered, deduplicated, bounded author list.
#[derive(Debug, Clone)]
pub struct AuthorList {
    authors: Vec<Author>,
    cap: usize,
}

impl AuthorList {
    pub fn new(cap: usize) -> Self {
        Self {
            authors: Vec::new(),
            cap,
        }
    }

    /// Append `name` unless it is empty, already present, or the list is full.
    /// Returns whether the name was added.
    pub fn push(&mut self, name: String) -> bool {
        if name.is_empty() || self.is_full() || self.contains(&name) {
            return false;
        }
        self.authors.push(Author::new(name));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.authors.iter().any(|a| a.author_name == name)
    }

    pub fn is_full(&self) -> bool {
        self.authors.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn into_vec(self) -> Vec<Author> {
        self.authors
    }
}

/// Keyword lists resolved from [`ExtractionConfig`].
struct AuthorRules {
    affiliation_keywords: Vec<String>,
    name_stopwords: Vec<String>,
    max_authors: usize,
}

impl AuthorRules {
    fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            affiliation_keywords: config
                .affiliation_keywords
                .resolve(&owned(DEFAULT_AFFILIATION_KEYWORDS)),
            name_stopwords: config.name_stopwords.resolve(&owned(DEFAULT_NAME_STOPWORDS)),
            max_authors: config.max_authors,
        }
    }

    fn new_list(&self) -> AuthorList {
        AuthorList::new(self.max_authors)
    }

    fn is_affiliation(&self, line: &str) -> bool {
        matches_affiliation(line, &self.affiliation_keywords)
    }

    fn is_valid_name(&self, name: &str) -> bool {
        valid_name_with_stopwords(name, &self.name_stopwords)
    }

    /// Whether the whole line, once cleaned, is exactly one author name.
    fn is_single_name(&self, line: &str) -> bool {
        let name = clean_author_name(line);
        let len = name.chars().count();
        if !(3..=50).contains(&len) {
            return false;
        }
        if len > 5 && name == name.to_uppercase() {
            return false;
        }
        let words: Vec<&str> = name.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) {
            return false;
        }
        if !words.iter().all(|w| is_initial(w) || is_name_word(w)) {
            return false;
        }
        self.is_valid_name(&name)
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ───────────────── Anchor ─────────────────

/// Index of the first line after the title and any subtitle lines.
fn author_start_index(lines: &[&str], title: &str, rules: &AuthorRules) -> usize {
    static ALL_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{Lu}\s:]+$").unwrap());
    static TWO_CAP_WORDS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+").unwrap());

    let title_index = if title.is_empty() {
        None
    } else {
        let prefix: String = title.chars().take(30).collect();
        lines
            .iter()
            .position(|l| *l == title)
            .or_else(|| lines.iter().position(|l| l.contains(prefix.as_str())))
    };

    let mut start = title_index.map_or(0, |i| i + 1);
    while let Some(line) = lines.get(start) {
        if line.chars().count() <= 10
            || looks_like_author_line(line)
            || rules.is_single_name(line)
            || is_content_section(line)
        {
            break;
        }
        if ALL_CAPS.is_match(line) || TWO_CAP_WORDS.is_match(line) {
            break;
        }
        // Subtitle continuation
        start += 1;
    }
    start
}

// ───────────────── Strategies ─────────────────

/// Strategy 1: one author (or one run of names) per line.
fn multi_line(lines: &[&str], rules: &AuthorRules) -> AuthorList {
    static SYMBOL_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[∗†‡§¶*,`\s]+$").unwrap());

    let mut authors = rules.new_list();
    let mut last_was_name = false;

    for line in lines.iter().take(50) {
        let line = line.trim();
        if is_content_section(line) {
            break;
        }
        if line.is_empty() || SYMBOL_ONLY.is_match(line) {
            continue;
        }

        let cleaned = line.trim_start_matches(|c: char| c == ',' || c.is_whitespace());

        if rules.is_affiliation(cleaned) {
            if authors.len() >= 2 {
                break;
            }
            continue;
        }

        if rules.is_single_name(cleaned) {
            authors.push(clean_author_name(cleaned));
            last_was_name = true;
        } else if has_multiple_names(cleaned) {
            push_space_separated_names(cleaned, &mut authors, rules);
            last_was_name = true;
        } else if has_comma_separated_names(cleaned) {
            push_names_from_line(cleaned, &mut authors, rules);
            last_was_name = true;
        } else {
            if authors.len() >= 3 && last_was_name {
                break;
            }
            last_was_name = false;
        }

        if authors.is_full() {
            break;
        }
    }
    authors
}

/// Strategy 2: the first line that reads like a comma/"and" separated author list.
fn single_line(lines: &[&str], rules: &AuthorRules) -> AuthorList {
    let mut authors = rules.new_list();
    for line in lines.iter().take(20) {
        if is_content_section(line) {
            break;
        }
        if looks_like_author_line(line) {
            push_names_from_line(line, &mut authors, rules);
            if !authors.is_empty() {
                break;
            }
        }
    }
    authors
}

/// Strategy 3: runs of "First [M.] Last" names without separators.
fn space_separated(lines: &[&str], rules: &AuthorRules) -> AuthorList {
    let mut authors = rules.new_list();
    for line in lines.iter().take(10) {
        if is_content_section(line) || rules.is_affiliation(line) {
            break;
        }
        if has_multiple_names(line) {
            push_space_separated_names(line, &mut authors, rules);
            if authors.len() >= 2 {
                break;
            }
        }
    }
    authors
}

// ───────────────── Line decomposition ─────────────────

/// Greedy left-to-right decomposition of "Prafulla Dhariwal Arvind Neelakantan
/// Tom B. Brown∗" into names, preferring `First M. Last` over `First Last`.
fn push_space_separated_names(line: &str, authors: &mut AuthorList, rules: &AuthorRules) {
    static FIRST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}+$").unwrap());
    static MIDDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}\.$").unwrap());
    static LAST: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?$").unwrap());

    let words: Vec<String> = line
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| !MARKER_SYMBOLS.contains(c) && *c != '*' && *c != ',' && !c.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let mut i = 0;
    while i < words.len() && !authors.is_full() {
        if i + 2 < words.len()
            && FIRST.is_match(&words[i])
            && MIDDLE.is_match(&words[i + 1])
            && LAST.is_match(&words[i + 2])
        {
            let name = format!("{} {} {}", words[i], words[i + 1], words[i + 2]);
            if rules.is_valid_name(&name) {
                authors.push(name);
            }
            i += 3;
        } else if i + 1 < words.len() && FIRST.is_match(&words[i]) && LAST.is_match(&words[i + 1]) {
            let name = format!("{} {}", words[i], words[i + 1]);
            if rules.is_valid_name(&name) {
                authors.push(name);
            }
            i += 2;
        } else {
            i += 1;
        }
    }
}

/// Split a comma/"and" separated author line and keep the valid names.
fn push_names_from_line(line: &str, authors: &mut AuthorList, rules: &AuthorRules) {
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
    static MULTI_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

    let without_markers: String = line
        .chars()
        .filter(|c| !MARKER_SYMBOLS.contains(c) && *c != '*')
        .collect();
    let without_digits = DIGITS.replace_all(&without_markers, "");
    let clean_line = MULTI_WS.replace_all(&without_digits, " ");

    for part in split_author_line(clean_line.trim()) {
        let name = clean_author_name(part);
        if rules.is_valid_name(&name) {
            authors.push(name);
        } else if !name.is_empty() {
            tracing::trace!(candidate = %name, "rejected author candidate");
        }
        if authors.is_full() {
            break;
        }
    }
}

/// Split an author line on commas and the word "and".
pub fn split_author_line(line: &str) -> Vec<&str> {
    static COMMA_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),\s*(?:and\s+)?").unwrap());
    static AND_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());
    static AND_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\band\b").unwrap());

    let parts: Vec<&str> = if line.contains(',') {
        COMMA_SEP
            .split(line)
            .flat_map(|part| {
                if AND_WORD.is_match(part) {
                    AND_SEP.split(part).collect::<Vec<_>>()
                } else {
                    vec![part]
                }
            })
            .collect()
    } else if AND_WORD.is_match(line) {
        AND_SEP.split(line).collect()
    } else {
        vec![line]
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

// ───────────────── Line classification ─────────────────

/// Whether a line is a section heading that ends the author block.
pub fn is_content_section(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    CONTENT_SECTIONS.iter().any(|section| match lower.strip_prefix(section) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('—'),
        None => false,
    })
}

/// Whether a line names an organization rather than a person, using the
/// built-in keyword list.
pub fn is_affiliation(line: &str) -> bool {
    matches_affiliation(line, &owned(DEFAULT_AFFILIATION_KEYWORDS))
}

fn matches_affiliation(line: &str, keywords: &[String]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.as_str();
        if keyword.len() <= 3 && keyword.chars().all(|c| c.is_ascii_alphabetic()) {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == keyword)
        } else {
            lower.contains(keyword)
        }
    })
}

/// Heuristic for "this whole line is an author list".
pub fn looks_like_author_line(line: &str) -> bool {
    static STRONG: Lazy<Vec<Regex>> = Lazy::new(|| {
        vec![
            Regex::new(r"[∗†‡§¶]").unwrap(),
            Regex::new(r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\.\s+\p{Lu}\p{Ll}+").unwrap(),
            Regex::new(r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+(?:\s*,\s*\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+){2,}")
                .unwrap(),
        ]
    });
    static AND_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\band\b").unwrap());
    static CAP_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+").unwrap());

    let len = line.chars().count();
    if !(5..=500).contains(&len) {
        return false;
    }
    if STRONG.iter().any(|re| re.is_match(line)) {
        return true;
    }

    let mut indicators = 0;
    if line.contains(',') && !line.contains('@') {
        indicators += 1;
    }
    if AND_WORD.is_match(line) {
        indicators += 1;
    }
    if CAP_WORD.find_iter(line).count() >= 4 {
        indicators += 1;
    }
    indicators >= 2
}

fn has_multiple_names(line: &str) -> bool {
    static NAME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b\p{Lu}\p{Ll}+\s+(?:\p{Lu}\.?\s+)?\p{Lu}\p{Ll}+").unwrap()
    });
    NAME.find_iter(line).count() >= 2
}

fn has_comma_separated_names(line: &str) -> bool {
    static CAP_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Lu}\p{Ll}+").unwrap());
    line.contains(',') && !line.contains('@') && CAP_WORD.is_match(line)
}

// ───────────────── Name cleaning & validation ─────────────────

/// Strip markers, affiliation digits, parentheticals and trailing
/// affiliation clauses from a raw name.
pub fn clean_author_name(name: &str) -> String {
    static PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
    static AFFILIATION_CLAUSE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i),?\s*\b(?:University|Institute|College|Department|Lab|Center|School)\b.*$")
            .unwrap()
    });
    static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static EDGE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[,.\-–—:;]+|[,.\-–—:;]+$").unwrap());
    static ACUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"´\s*").unwrap());

    let clean: String = name
        .chars()
        .filter(|c| !MARKER_SYMBOLS.contains(c) && *c != '*')
        .collect();
    let clean = PARENS.replace_all(&clean, "");
    let clean = DIGITS.replace_all(&clean, "");
    let clean = AFFILIATION_CLAUSE.replace(&clean, "");
    let clean = WS.replace_all(&clean, " ");
    let clean = EDGE_PUNCT.replace_all(clean.trim(), "");
    let clean = ACUTE.replace_all(clean.trim(), "'");
    clean.trim().to_string()
}

/// Whether `name` is a plausible personal name, using the built-in stoplist.
pub fn is_valid_author_name(name: &str) -> bool {
    valid_name_with_stopwords(name, &owned(DEFAULT_NAME_STOPWORDS))
}

fn valid_name_with_stopwords(name: &str, stopwords: &[String]) -> bool {
    static INVALID_CHARS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[0-9@#$%^&*()+=\[\]{}\\|<>?/]").unwrap());

    let len = name.chars().count();
    if !(3..=50).contains(&len) {
        return false;
    }
    if !name.chars().any(char::is_alphabetic) {
        return false;
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    if !(2..=5).contains(&words.len()) {
        return false;
    }
    let words_ok = words.iter().all(|word| {
        let short = word.chars().count() == 1 || (word.chars().count() == 2 && word.ends_with('.'));
        if short {
            word.chars().next().is_some_and(char::is_uppercase)
        } else {
            is_name_word(word)
        }
    });
    if !words_ok || INVALID_CHARS.is_match(name) {
        return false;
    }

    let lower = name.to_lowercase();
    let padded = format!(" {lower} ");
    !stopwords
        .iter()
        .any(|word| lower == *word || padded.contains(&format!(" {word} ")))
}

/// "Smith", "Smith-Jones", "D'Angelo", "O'Brien".
fn is_name_word(word: &str) -> bool {
    static NAME_WORD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+|'\p{Lu}?\p{Ll}+)?|\p{Lu}'\p{Lu}\p{Ll}+)$")
            .unwrap()
    });
    NAME_WORD.is_match(word)
}

fn is_initial(word: &str) -> bool {
    static INITIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}\.?$").unwrap());
    INITIAL.is_match(word)
}
