use std::path::Path;

use papyrus_core::{
    Author, Chunk, PaperDraft, PaperRecord, RawDocument, RecordError, SectionMap, Source,
    TextBackend,
};

use crate::chunker::Chunker;
use crate::config::ExtractionConfig;
use crate::{ExtractError, align, authors, normalize, section, source, title, year};

/// Title, authors, year and source of one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<Author>,
    pub year: Option<u16>,
    pub source: Source,
}

/// A configurable paper extraction pipeline.
///
/// Holds an [`ExtractionConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`PaperExtractor::with_config`] to change chunking or keyword lists.
pub struct PaperExtractor {
    config: ExtractionConfig,
}

impl Default for PaperExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Clean raw text (step 1).
    pub fn normalize(&self, raw: &str) -> String {
        normalize::normalize(raw)
    }

    /// Recover title, authors, year and source from normalized text (step 2).
    pub fn extract_metadata(&self, text: &str, file_name: &str) -> PaperMetadata {
        let lines = normalize::split_lines(text);
        let title = title::extract_title(&lines, text);
        let authors = authors::extract_authors_with_config(&lines, &title, &self.config);
        PaperMetadata {
            year: year::extract_year(text),
            source: source::extract_source_with_config(text, file_name, &self.config),
            title,
            authors,
        }
    }

    /// Split normalized text into named sections (step 3).
    pub fn extract_sections(&self, text: &str) -> SectionMap {
        section::extract_sections(text)
    }

    /// Chunk normalized text and tag each chunk with its section (step 4).
    pub fn chunk(&self, text: &str, sections: &SectionMap) -> Vec<Chunk> {
        let mut chunks = Chunker::from_config(&self.config).chunk(text);
        align::align_chunks(&mut chunks, sections, self.config.align_prefix_chars);
        chunks
    }

    /// Run the full pipeline on an in-memory document.
    ///
    /// Only structural validation can fail; every extraction stage falls
    /// back to a default instead.
    pub fn extract(&self, document: &RawDocument) -> Result<PaperRecord, RecordError> {
        let text = self.normalize(&document.text);
        let metadata = self.extract_metadata(&text, &document.file_name);
        let sections = self.extract_sections(&text);
        let chunks = self.chunk(&text, &sections);

        let record = PaperDraft {
            title: Some(metadata.title),
            year: metadata.year,
            source: Some(metadata.source),
            authors: Some(metadata.authors),
            sections: Some(sections),
            chunks: Some(chunks),
            full_text_length: Some(text.chars().count()),
            ..PaperDraft::new(document.file_name.as_str())
        }
        .into_record();

        record.validate()?;
        tracing::debug!(
            paper_id = %record.paper_id,
            authors = record.authors.len(),
            sections = record.sections.len(),
            chunks = record.chunks.len(),
            "paper extracted"
        );
        Ok(record)
    }

    /// Pull the text layer of `path` through `backend`, then run [`Self::extract`].
    pub fn extract_file(
        &self,
        path: &Path,
        backend: &dyn TextBackend,
    ) -> Result<PaperRecord, ExtractError> {
        let text = backend.extract_text(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.extract(&RawDocument::new(text, file_name))?)
    }
}
