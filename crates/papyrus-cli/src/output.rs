use std::io::Write;

use owo_colors::OwoColorize;
use papyrus_core::PaperRecord;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Per-run tallies printed at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub written: usize,
    pub skipped_short: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn total(&self) -> usize {
        self.written + self.skipped_short + self.failed
    }
}

fn label(w: &mut dyn Write, name: &str, value: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "  {} {}", format!("{name}:").bold(), value)
    } else {
        writeln!(w, "  {}: {}", name, value)
    }
}

/// Print the extracted metadata of one record instead of writing it.
pub fn print_dry_run(
    w: &mut dyn Write,
    file_name: &str,
    record: &PaperRecord,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", file_name.cyan().bold())?;
    } else {
        writeln!(w, "{}", file_name)?;
    }

    label(w, "paperId", &record.paper_id, color)?;
    label(w, "title", &record.title, color)?;

    let authors = if record.authors.is_empty() {
        "(none)".to_string()
    } else {
        record
            .authors
            .iter()
            .map(|a| a.author_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    label(w, "authors", &authors, color)?;

    let year = record
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "(unknown)".to_string());
    label(w, "year", &year, color)?;

    let source = match &record.source.source_url {
        Some(url) => format!("{} ({})", record.source.source_name, url),
        None => record.source.source_name.to_string(),
    };
    label(w, "source", &source, color)?;

    let sections = record
        .sections
        .names()
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    label(w, "sections", &sections, color)?;
    label(w, "chunks", &record.chunks.len().to_string(), color)?;
    writeln!(w)?;
    Ok(())
}

/// Print the end-of-batch summary.
pub fn print_summary(w: &mut dyn Write, stats: &BatchStats, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  Documents: {}", stats.total())?;
    if color.enabled() {
        writeln!(w, "  {} {}", "Extracted:".green(), stats.written)?;
    } else {
        writeln!(w, "  Extracted: {}", stats.written)?;
    }
    if stats.skipped_short > 0 {
        let msg = format!("Skipped (too little text): {}", stats.skipped_short);
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    if stats.failed > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Failed:".red(), stats.failed)?;
        } else {
            writeln!(w, "  Failed: {}", stats.failed)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_core::{Author, PaperDraft};

    fn render_dry_run(record: &PaperRecord) -> String {
        let mut buf = Vec::new();
        print_dry_run(&mut buf, "paper.txt", record, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_dry_run_defaults() {
        let record = PaperDraft::new("paper.txt").into_record();
        let out = render_dry_run(&record);
        assert!(out.starts_with("paper.txt\n"));
        assert!(out.contains("  title: Unknown Title\n"));
        assert!(out.contains("  authors: (none)\n"));
        assert!(out.contains("  year: (unknown)\n"));
        assert!(out.contains("  source: manual\n"));
        assert!(out.contains("  chunks: 0\n"));
    }

    #[test]
    fn test_dry_run_lists_authors() {
        let mut record = PaperDraft::new("paper.txt").into_record();
        record.authors = vec![Author::new("Ada Lovelace"), Author::new("Alan Turing")];
        record.year = Some(1950);
        let out = render_dry_run(&record);
        assert!(out.contains("  authors: Ada Lovelace, Alan Turing\n"));
        assert!(out.contains("  year: 1950\n"));
    }

    #[test]
    fn test_summary_counts() {
        let stats = BatchStats {
            written: 3,
            skipped_short: 1,
            failed: 2,
        };
        assert_eq!(stats.total(), 6);

        let mut buf = Vec::new();
        print_summary(&mut buf, &stats, ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("  Documents: 6\n"));
        assert!(out.contains("  Extracted: 3\n"));
        assert!(out.contains("  Skipped (too little text): 1\n"));
        assert!(out.contains("  Failed: 2\n"));
    }

    #[test]
    fn test_summary_omits_zero_lines() {
        let mut buf = Vec::new();
        print_summary(&mut buf, &BatchStats::default(), ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(!out.contains("Failed"));
        assert!(!out.contains("Skipped"));
    }
}
