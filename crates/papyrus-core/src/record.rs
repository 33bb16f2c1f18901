use std::path::Path;

use serde_json::Value;

use crate::{Author, Chunk, PaperRecord, RecordError, SectionMap, Source, SourceName};

/// Title used when no extraction strategy produced one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// File name without directories and without its final extension.
///
/// `"papers/2005.14165.pdf"` → `"2005.14165"`.
pub fn file_base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

/// `lower(source name) + "_" + file base name`, or `None` when the file name
/// has no usable stem.
pub fn derive_paper_id(source: SourceName, file_name: &str) -> Option<String> {
    let base = file_base_name(file_name);
    if base.trim().is_empty() {
        return None;
    }
    Some(format!("{}_{}", source.as_str().to_lowercase(), base))
}

/// A partially filled record, as produced by the extraction stages before
/// defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct PaperDraft {
    pub file_name: String,
    pub paper_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<u16>,
    pub source: Option<Source>,
    pub authors: Option<Vec<Author>>,
    pub sections: Option<SectionMap>,
    pub chunks: Option<Vec<Chunk>>,
    pub full_text_length: Option<usize>,
}

impl PaperDraft {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Fill every absent field with its default.
    ///
    /// A missing `paper_id` is derived from the source and file name; if that
    /// is impossible the id is left empty and [`PaperRecord::validate`]
    /// rejects the record.
    pub fn into_record(self) -> PaperRecord {
        let source = self.source.unwrap_or_default();
        let paper_id = self
            .paper_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| derive_paper_id(source.source_name, &self.file_name))
            .unwrap_or_default();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        PaperRecord {
            paper_id,
            title,
            year: self.year,
            source,
            authors: self.authors.unwrap_or_default(),
            sections: self.sections.unwrap_or_default(),
            chunks: self.chunks.unwrap_or_default(),
            full_text_length: self.full_text_length.unwrap_or(0),
        }
    }
}

impl PaperRecord {
    /// Structural validation.
    ///
    /// The typed record cannot carry a non-numeric length, so this checks the
    /// id and that chunk indices run densely from zero.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.paper_id.trim().is_empty() {
            return Err(RecordError::MissingPaperId);
        }
        let dense = self
            .chunks
            .iter()
            .enumerate()
            .all(|(i, c)| c.chunk_index == i);
        if !dense {
            return Err(RecordError::ChunksNotSequence);
        }
        Ok(())
    }
}

/// Validate a record that arrived as loosely typed JSON.
pub fn validate_record_value(record: &Value) -> Result<(), RecordError> {
    let has_id = record
        .get("paperId")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty());
    if !has_id {
        return Err(RecordError::MissingPaperId);
    }
    if !record.get("chunks").is_some_and(Value::is_array) {
        return Err(RecordError::ChunksNotSequence);
    }
    if !record.get("fullTextLength").is_some_and(Value::is_number) {
        return Err(RecordError::FullTextLengthNotNumeric);
    }
    Ok(())
}
