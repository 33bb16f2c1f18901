use std::ops::Range;

use papyrus_core::Chunk;

use crate::config::{ConfigError, ExtractionConfig};

/// Fixed-size overlapping word windows.
///
/// Words are the pieces between single spaces, so newlines stay inside the
/// words they touch and runs of spaces yield empty words. `overlap < size`
/// is guaranteed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if size == 0 || overlap >= size {
            return Err(ConfigError::InvalidChunkWindow { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Chunker for an already validated configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            size: config.chunk_size,
            overlap: config.chunk_overlap,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Word ranges of every window over `word_count` words.
    pub fn windows(&self, word_count: usize) -> Vec<Range<usize>> {
        let step = self.size - self.overlap;
        (0..word_count)
            .step_by(step)
            .map(|start| start..(start + self.size).min(word_count))
            .collect()
    }

    /// Split `text` into chunks with dense indices starting at 0.
    /// Section names are left unset.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split(' ').collect();
        self.windows(words.len())
            .into_iter()
            .enumerate()
            .map(|(chunk_index, range)| Chunk {
                chunk_index,
                chunk_text: words[range].join(" "),
                section_name: None,
            })
            .collect()
    }
}

/// Chunk `text` with an ad-hoc window. An invalid window (`overlap >= size`)
/// produces no chunks rather than looping forever.
pub fn chunk_words(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    match Chunker::new(size, overlap) {
        Ok(chunker) => chunker.chunk(text),
        Err(e) => {
            tracing::warn!(error = %e, "refusing to chunk with invalid window");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_default_window_coverage() {
        let chunker = Chunker::from_config(&ExtractionConfig::default());
        let ranges = chunker.windows(2000);
        assert_eq!(ranges, vec![0..700, 600..1300, 1200..1900, 1800..2000]);

        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(2000));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 100);
        }
    }

    #[test]
    fn test_chunk_indices_dense() {
        let chunker = Chunker::new(5, 2).unwrap();
        let chunks = chunker.chunk(&words(12));
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(chunks[0].chunk_text, "w0 w1 w2 w3 w4");
        assert_eq!(chunks[1].chunk_text, "w3 w4 w5 w6 w7");
        assert_eq!(chunks[3].chunk_text, "w9 w10 w11");
        assert!(chunks.iter().all(|c| c.section_name.is_none()));
    }

    #[test]
    fn test_trailing_window_may_be_fully_overlapped() {
        // Windows start at every multiple of the step below the word count.
        let chunker = Chunker::new(5, 2).unwrap();
        assert_eq!(chunker.windows(10), vec![0..5, 3..8, 6..10, 9..10]);
    }

    #[test]
    fn test_short_and_empty_text() {
        let chunker = Chunker::new(700, 100).unwrap();
        let chunks = chunker.chunk("only three words");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_text, "only three words");

        let empty = chunker.chunk("");
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].chunk_text, "");
    }

    #[test]
    fn test_splits_on_single_spaces_only() {
        let chunker = Chunker::new(2, 0).unwrap();
        let chunks = chunker.chunk("a\nb c  d");
        let texts: Vec<&str> = chunks.iter().map(|c| c.chunk_text.as_str()).collect();
        assert_eq!(texts, vec!["a\nb c", " d"]);
    }

    #[test]
    fn test_invalid_window() {
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(chunk_words("a b c", 3, 5).is_empty());
        assert_eq!(chunk_words("a b c", 2, 1).len(), 3);
    }
}
