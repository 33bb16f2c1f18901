use papyrus_core::{Chunk, SectionMap};

/// Tag each chunk with the first section (in map order) whose text contains
/// the chunk's first `prefix_chars` characters. Chunks with no match get
/// `None`.
///
/// This is a containment heuristic: boilerplate repeated across sections
/// resolves to whichever of those sections comes first.
pub fn align_chunks(chunks: &mut [Chunk], sections: &SectionMap, prefix_chars: usize) {
    for chunk in chunks.iter_mut() {
        let prefix = char_prefix(&chunk.chunk_text, prefix_chars);
        chunk.section_name = sections
            .iter()
            .find(|(_, text)| text.contains(prefix))
            .map(|(name, _)| name);
    }

    let unmatched = chunks.iter().filter(|c| c.section_name.is_none()).count();
    if unmatched > 0 {
        tracing::debug!(unmatched, total = chunks.len(), "chunks without a section");
    }
}

fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_core::SectionName;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            chunk_index: index,
            chunk_text: text.to_string(),
            section_name: None,
        }
    }

    #[test]
    fn test_assigns_containing_section() {
        let mut sections = SectionMap::new();
        sections.insert(SectionName::Abstract, "Abstract we study graphs");
        sections.insert(SectionName::Results, "Results graphs are big");

        let mut chunks = vec![chunk(0, "we study graphs and more"), chunk(1, "Results graphs")];
        align_chunks(&mut chunks, &sections, 10);
        assert_eq!(chunks[0].section_name, Some(SectionName::Abstract));
        assert_eq!(chunks[1].section_name, Some(SectionName::Results));
    }

    #[test]
    fn test_first_section_in_map_order_wins() {
        let mut sections = SectionMap::new();
        sections.insert(SectionName::Introduction, "boilerplate text one");
        sections.insert(SectionName::Conclusion, "boilerplate text two");

        let mut chunks = vec![chunk(0, "boilerplate text")];
        align_chunks(&mut chunks, &sections, 50);
        assert_eq!(chunks[0].section_name, Some(SectionName::Introduction));
    }

    #[test]
    fn test_unmatched_chunk_is_none() {
        let mut sections = SectionMap::new();
        sections.insert(SectionName::Abstract, "short");
        let mut chunks = vec![chunk(0, "something else entirely")];
        chunks[0].section_name = Some(SectionName::Results);
        align_chunks(&mut chunks, &sections, 50);
        assert_eq!(chunks[0].section_name, None);
    }

    #[test]
    fn test_prefix_counts_chars_not_bytes() {
        assert_eq!(char_prefix("äöü", 2), "äö");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_prefix("abc", 0), "");
    }
}
