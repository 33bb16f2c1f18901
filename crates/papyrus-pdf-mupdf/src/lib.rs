use std::path::Path;

use mupdf::{Document, TextPageFlags};

use papyrus_core::{BackendError, TextBackend};

/// Vertical distance (in points) within which two text lines are treated as
/// one visual line.
const SAME_LINE_TOLERANCE: f32 = 2.0;

/// MuPDF-based implementation of [`TextBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the workspace does not
/// transitively depend on it.
///
/// Text fragments sharing a baseline are joined left to right into one line,
/// so title/author lines that PDFs emit as several spans come out whole.
/// By default the bottom 3% of each page (page numbers, running footers) is
/// dropped; headers are kept because first pages carry the title there.
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            footer_exclusion_ratio: Some(0.03),
            header_exclusion_ratio: None,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }
}

impl TextBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            let mut fragments = Vec::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                // Skip blocks entirely within the header region
                if header_threshold.is_some_and(|t| block_bounds.y1 <= t) {
                    continue;
                }
                // Skip blocks whose top edge is in the footer region
                if footer_threshold.is_some_and(|t| block_bounds.y0 >= t) {
                    continue;
                }

                for line in block.lines() {
                    let bounds = line.bounds();
                    let text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    fragments.push(Fragment {
                        x: bounds.x0,
                        y: bounds.y1,
                        text,
                    });
                }
            }
            pages_text.push(join_fragments(fragments));
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted text layer");
        Ok(pages_text.join("\n"))
    }
}

/// One positioned run of text on a page.
#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    x: f32,
    y: f32,
    text: String,
}

/// Merge consecutive fragments on the same baseline (within
/// [`SAME_LINE_TOLERANCE`]) into lines, ordering each line left to right.
/// Blank lines are dropped.
fn join_fragments(fragments: Vec<Fragment>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<Fragment> = Vec::new();

    let mut flush = |current: &mut Vec<Fragment>| {
        current.sort_by(|a, b| a.x.total_cmp(&b.x));
        let line = current
            .drain(..)
            .map(|f| f.text)
            .collect::<Vec<_>>()
            .join(" ");
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    };

    for fragment in fragments {
        let starts_new_line = current
            .first()
            .is_some_and(|first| (fragment.y - first.y).abs() > SAME_LINE_TOLERANCE);
        if starts_new_line {
            flush(&mut current);
        }
        current.push(fragment);
    }
    flush(&mut current);

    lines.join("\n")
}
