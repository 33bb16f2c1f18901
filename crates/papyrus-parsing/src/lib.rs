use std::path::Path;

use thiserror::Error;

pub mod align;
pub mod authors;
pub mod chunker;
pub mod config;
pub mod extractor;
pub mod normalize;
pub mod section;
pub mod source;
pub mod title;
pub mod year;

pub use align::align_chunks;
pub use authors::{AuthorList, clean_author_name, extract_authors, is_valid_author_name};
pub use chunker::{Chunker, chunk_words};
pub use config::{ConfigError, ExtractionConfig, ExtractionConfigBuilder, ListOverride};
pub use extractor::{PaperExtractor, PaperMetadata};
pub use normalize::{normalize, split_lines};
pub use section::{SectionSpan, extract_sections, section_spans};
pub use source::extract_source;
pub use title::{TitleCandidate, extract_title, normalize_title};
pub use year::extract_year;
// Re-export domain types from core (canonical definitions live there)
pub use papyrus_core::{
    Author, BackendError, Chunk, PaperRecord, RawDocument, RecordError, SectionMap, SectionName,
    Source, SourceName, TextBackend,
};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
}

/// Extract a paper record from a document file using the given backend for
/// text extraction.
///
/// Pipeline:
/// 1. Pull the text layer via `backend`
/// 2. Normalize whitespace and strip page artifacts
/// 3. Recover title, authors, year and source
/// 4. Slice sections at their first marker
/// 5. Chunk into overlapping word windows and tag chunks with sections
/// 6. Fill defaults and validate the record
pub fn extract_paper(path: &Path, backend: &dyn TextBackend) -> Result<PaperRecord, ExtractError> {
    PaperExtractor::new().extract_file(path, backend)
}
