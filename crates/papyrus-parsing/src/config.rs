use regex::Regex;
use thiserror::Error;

use papyrus_core::config_file::ConfigFile;

/// Words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 700;
/// Words shared by consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
/// Upper bound on the author list of one paper.
pub const DEFAULT_MAX_AUTHORS: usize = 30;
/// Leading characters of a chunk used to find its section.
pub const DEFAULT_ALIGN_PREFIX_CHARS: usize = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    InvalidChunkWindow { size: usize, overlap: usize },
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Configuration for the extraction pipeline.
///
/// Use [`ExtractionConfigBuilder`] to construct anything other than the
/// defaults; the builder enforces `overlap < size` so the chunker always
/// advances.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    // ── chunker.rs ──
    pub(crate) chunk_size: usize,
    pub(crate) chunk_overlap: usize,

    // ── align.rs ──
    pub(crate) align_prefix_chars: usize,

    // ── authors.rs ──
    pub(crate) max_authors: usize,
    /// Substrings (or whole words, for short alphabetic entries) marking an
    /// affiliation line.
    pub(crate) affiliation_keywords: ListOverride<String>,
    /// Terms that disqualify a candidate author name.
    pub(crate) name_stopwords: ListOverride<String>,

    // ── source.rs ──
    /// Pattern for arXiv identifiers. `None` means the built-in default.
    pub(crate) arxiv_id_re: Option<Regex>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            align_prefix_chars: DEFAULT_ALIGN_PREFIX_CHARS,
            max_authors: DEFAULT_MAX_AUTHORS,
            affiliation_keywords: ListOverride::Default,
            name_stopwords: ListOverride::Default,
            arxiv_id_re: None,
        }
    }
}

impl ExtractionConfig {
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn max_authors(&self) -> usize {
        self.max_authors
    }

    pub fn align_prefix_chars(&self) -> usize {
        self.align_prefix_chars
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    align_prefix_chars: Option<usize>,
    max_authors: Option<usize>,
    affiliation_keywords: ListOverride<String>,
    name_stopwords: ListOverride<String>,
    arxiv_id_re: Option<String>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Chunking ──

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = Some(overlap);
        self
    }

    pub fn align_prefix_chars(mut self, n: usize) -> Self {
        self.align_prefix_chars = Some(n);
        self
    }

    // ── Authors ──

    pub fn max_authors(mut self, n: usize) -> Self {
        self.max_authors = Some(n);
        self
    }

    pub fn set_affiliation_keywords(mut self, keywords: Vec<String>) -> Self {
        self.affiliation_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_affiliation_keyword(mut self, keyword: String) -> Self {
        self.affiliation_keywords.push(keyword);
        self
    }

    pub fn set_name_stopwords(mut self, words: Vec<String>) -> Self {
        self.name_stopwords = ListOverride::Replace(words);
        self
    }

    pub fn add_name_stopword(mut self, word: String) -> Self {
        self.name_stopwords.push(word);
        self
    }

    // ── Source ──

    pub fn arxiv_id_regex(mut self, pattern: &str) -> Self {
        self.arxiv_id_re = Some(pattern.to_string());
        self
    }

    /// Layer the values of an on-disk config file over this builder.
    pub fn apply_config_file(mut self, file: &ConfigFile) -> Self {
        if let Some(chunking) = &file.chunking {
            if let Some(size) = chunking.size {
                self = self.chunk_size(size);
            }
            if let Some(overlap) = chunking.overlap {
                self = self.chunk_overlap(overlap);
            }
        }
        if let Some(authors) = &file.authors {
            if let Some(n) = authors.max_authors {
                self = self.max_authors(n);
            }
            for keyword in authors.extra_affiliation_keywords.iter().flatten() {
                self = self.add_affiliation_keyword(keyword.to_lowercase());
            }
            for word in authors.extra_stopwords.iter().flatten() {
                self = self.add_name_stopword(word.to_lowercase());
            }
        }
        self
    }

    /// Validate the chunk window, compile patterns and produce an
    /// [`ExtractionConfig`].
    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        let overlap = self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP);
        if size == 0 || overlap >= size {
            return Err(ConfigError::InvalidChunkWindow { size, overlap });
        }

        Ok(ExtractionConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            align_prefix_chars: self
                .align_prefix_chars
                .unwrap_or(DEFAULT_ALIGN_PREFIX_CHARS),
            max_authors: self.max_authors.unwrap_or(DEFAULT_MAX_AUTHORS),
            affiliation_keywords: self.affiliation_keywords,
            name_stopwords: self.name_stopwords,
            arxiv_id_re: self.arxiv_id_re.map(|p| Regex::new(&p)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_core::config_file::{AuthorsConfig, ChunkingConfig};

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.chunk_size, 700);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.max_authors, 30);
        assert_eq!(config.align_prefix_chars, 50);
    }

    #[test]
    fn test_builder_basic() {
        let config = ExtractionConfigBuilder::new()
            .chunk_size(300)
            .chunk_overlap(30)
            .max_authors(10)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size(), 300);
        assert_eq!(config.chunk_overlap(), 30);
        assert_eq!(config.max_authors(), 10);
    }

    #[test]
    fn test_builder_rejects_overlap_not_below_size() {
        let err = ExtractionConfigBuilder::new()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidChunkWindow {
                size: 100,
                overlap: 100
            }
        ));

        assert!(ExtractionConfigBuilder::new().chunk_size(0).chunk_overlap(0).build().is_err());
        // Overlap only has to be below the *configured* size.
        assert!(ExtractionConfigBuilder::new().chunk_overlap(699).build().is_ok());
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ExtractionConfigBuilder::new()
            .arxiv_id_regex(r"(\d{4}")
            .build();
        assert!(matches!(result, Err(ConfigError::Regex(_))));
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_apply_config_file() {
        let file = ConfigFile {
            chunking: Some(ChunkingConfig {
                size: Some(200),
                overlap: Some(20),
            }),
            authors: Some(AuthorsConfig {
                max_authors: Some(5),
                extra_affiliation_keywords: Some(vec!["Consortium".into()]),
                extra_stopwords: None,
            }),
            output: None,
        };
        let config = ExtractionConfigBuilder::new()
            .apply_config_file(&file)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size(), 200);
        assert_eq!(config.chunk_overlap(), 20);
        assert_eq!(config.max_authors(), 5);
        let keywords = config.affiliation_keywords.resolve(&[]);
        assert_eq!(keywords, vec!["consortium".to_string()]);
    }
}
