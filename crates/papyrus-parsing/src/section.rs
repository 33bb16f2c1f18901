use papyrus_core::{SectionMap, SectionName};

/// Marker substrings in the order they are searched for.
const SECTION_MARKERS: [(SectionName, &str); 5] = [
    (SectionName::Abstract, "abstract"),
    (SectionName::Introduction, "introduction"),
    (SectionName::Methodology, "method"),
    (SectionName::Results, "result"),
    (SectionName::Conclusion, "conclusion"),
];

/// Byte range of one section within the text it was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub name: SectionName,
    pub start: usize,
    pub end: usize,
}

/// Locate section boundaries in the document text.
///
/// Each marker is matched at its first case-insensitive occurrence. Found
/// markers are ordered by position and each span runs up to the next marker
/// (or the end of the text), so spans are disjoint and contiguous.
pub fn section_spans(text: &str) -> Vec<SectionSpan> {
    let mut found: Vec<(SectionName, usize)> = SECTION_MARKERS
        .iter()
        .filter_map(|(name, marker)| find_ascii_case_insensitive(text, marker).map(|i| (*name, i)))
        .collect();
    found.sort_by_key(|(_, start)| *start);

    found
        .iter()
        .enumerate()
        .map(|(i, (name, start))| SectionSpan {
            name: *name,
            start: *start,
            end: found.get(i + 1).map_or(text.len(), |(_, next)| *next),
        })
        .collect()
}

/// Slice the text into named sections, in document order.
///
/// Falls back to a single `full_text` section holding the whole input when
/// no marker is found.
pub fn extract_sections(text: &str) -> SectionMap {
    let spans = section_spans(text);
    let mut sections = SectionMap::new();

    if spans.is_empty() {
        tracing::debug!("no section markers found, using full text");
        sections.insert(SectionName::FullText, text);
        return sections;
    }

    for span in &spans {
        sections.insert(span.name, &text[span.start..span.end]);
    }
    tracing::debug!(sections = ?sections.names(), "sections extracted");
    sections
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
///
/// `needle` must be ASCII, which keeps every returned offset on a char
/// boundary.
fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    h.windows(n.len()).position(|w| w.eq_ignore_ascii_case(n))
}
