use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod record;

// Re-export for convenience
pub use backend::{BackendError, PlainTextBackend, TextBackend};
pub use record::{PaperDraft, UNKNOWN_TITLE, derive_paper_id, file_base_name, validate_record_value};

/// Text layer of one document plus the name of the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub text: String,
    pub file_name: String,
}

impl RawDocument {
    pub fn new(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file_name: file_name.into(),
        }
    }
}

/// Venue a paper was classified as coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "arXiv")]
    Arxiv,
    #[serde(rename = "IEEE")]
    Ieee,
    #[serde(rename = "ACM")]
    Acm,
    #[default]
    #[serde(rename = "manual")]
    Manual,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arxiv => "arXiv",
            Self::Ieee => "IEEE",
            Self::Acm => "ACM",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Originating venue plus a canonical URL when one can be derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub source_name: SourceName,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
}

impl Source {
    pub fn new(source_name: SourceName, source_url: Option<String>) -> Self {
        Self {
            source_name,
            source_url,
        }
    }
}

/// A paper author. `author_name` is unique within a record's author list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub author_name: String,
    pub affiliation: Option<String>,
}

impl Author {
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            affiliation: None,
        }
    }
}

/// Canonical section names. `FullText` is only produced when no section
/// marker is found anywhere in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Abstract,
    Introduction,
    Methodology,
    Results,
    Conclusion,
    FullText,
}

impl SectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Introduction => "introduction",
            Self::Methodology => "methodology",
            Self::Results => "results",
            Self::Conclusion => "conclusion",
            Self::FullText => "full_text",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "abstract" => Some(Self::Abstract),
            "introduction" => Some(Self::Introduction),
            "methodology" => Some(Self::Methodology),
            "results" => Some(Self::Results),
            "conclusion" => Some(Self::Conclusion),
            "full_text" => Some(Self::FullText),
            _ => None,
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered section-name → section-text map.
///
/// Iteration order is insertion order, which the section extractor makes
/// equal to document (marker) order. Serializes as a JSON object with the
/// keys in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(SectionName, String)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a section. A replaced section keeps its position.
    pub fn insert(&mut self, name: SectionName, text: impl Into<String>) {
        let text = text.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((name, text)),
        }
    }

    pub fn get(&self, name: SectionName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionName, &str)> {
        self.entries.iter().map(|(n, t)| (*n, t.as_str()))
    }

    pub fn names(&self) -> Vec<SectionName> {
        self.entries.iter().map(|(n, _)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, text) in &self.entries {
            map.serialize_entry(name.as_str(), text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of section name to section text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SectionMap, A::Error> {
                let mut sections = SectionMap::new();
                while let Some((key, text)) = access.next_entry::<String, String>()? {
                    let name = SectionName::parse(&key).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown section name: {key}"))
                    })?;
                    sections.insert(name, text);
                }
                Ok(sections)
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

/// A fixed-size word window over the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub chunk_index: usize,
    pub chunk_text: String,
    pub section_name: Option<SectionName>,
}

/// The structured record produced for one input document.
///
/// `paper_id` is the identity downstream consumers join on; `chunk_index`
/// values are dense `0..chunks.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub paper_id: String,
    pub title: String,
    pub year: Option<u16>,
    pub source: Source,
    pub authors: Vec<Author>,
    pub sections: SectionMap,
    pub chunks: Vec<Chunk>,
    pub full_text_length: usize,
}

/// Structural problems that make a record unusable downstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("paperId is missing")]
    MissingPaperId,
    #[error("chunks must be an ordered sequence")]
    ChunksNotSequence,
    #[error("fullTextLength must be a number")]
    FullTextLengthNotNumeric,
}
