use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use papyrus_core::config_file::{self, ConfigFile};
use papyrus_core::{PlainTextBackend, RawDocument, TextBackend};
use papyrus_parsing::{ExtractionConfig, ExtractionConfigBuilder, PaperExtractor};

mod output;
mod sink;

use output::{BatchStats, ColorMode};
use sink::JsonDirSink;

/// Documents with less raw text than this are not worth extracting.
const DEFAULT_MIN_TEXT_CHARS: usize = 500;

/// Papyrus - Turn research paper text layers into structured JSON records
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract metadata, sections and chunks from one or more documents
    Extract {
        /// Text files (or PDFs, when built with the `pdf` feature)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory receiving one `<stem>.json` per document
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Print the extracted metadata instead of writing JSON
        #[arg(long)]
        dry_run: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Words per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Words shared by consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Skip documents whose raw text is shorter than this
        #[arg(long)]
        min_text_chars: Option<usize>,

        /// Write single-line JSON
        #[arg(long)]
        compact: bool,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
struct Flags {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    min_text_chars: Option<usize>,
    compact: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
struct RunSettings {
    config: ExtractionConfig,
    min_text_chars: usize,
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            files,
            output_dir,
            dry_run,
            no_color,
            chunk_size,
            chunk_overlap,
            min_text_chars,
            compact,
            verbose,
        } => {
            init_tracing(verbose);
            let flags = Flags {
                chunk_size,
                chunk_overlap,
                min_text_chars,
                compact,
            };
            let settings = resolve_settings(
                &flags,
                |key| std::env::var(key).ok(),
                &config_file::load_config(),
            )?;
            extract(&files, &output_dir, dry_run, ColorMode(!no_color), &settings)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn env_usize(env: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<usize>> {
    env(key)
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .with_context(|| format!("{key} must be a non-negative integer, got {v:?}"))
        })
        .transpose()
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_settings(
    flags: &Flags,
    env: impl Fn(&str) -> Option<String>,
    file: &ConfigFile,
) -> anyhow::Result<RunSettings> {
    let mut builder = ExtractionConfigBuilder::new().apply_config_file(file);

    // A flag wins outright; the env var is only read when the flag is absent.
    let chunk_size = match flags.chunk_size {
        Some(size) => Some(size),
        None => env_usize(&env, "PAPYRUS_CHUNK_SIZE")?,
    };
    if let Some(size) = chunk_size {
        builder = builder.chunk_size(size);
    }
    let chunk_overlap = match flags.chunk_overlap {
        Some(overlap) => Some(overlap),
        None => env_usize(&env, "PAPYRUS_CHUNK_OVERLAP")?,
    };
    if let Some(overlap) = chunk_overlap {
        builder = builder.chunk_overlap(overlap);
    }
    let config = builder.build()?;

    let output = file.output.clone().unwrap_or_default();
    let min_text_chars = flags
        .min_text_chars
        .or(output.min_text_chars)
        .unwrap_or(DEFAULT_MIN_TEXT_CHARS);
    let pretty = !flags.compact && output.pretty.unwrap_or(true);

    Ok(RunSettings {
        config,
        min_text_chars,
        pretty,
    })
}

/// Text backends, opened once per run and chosen per file by extension.
#[derive(Default)]
struct Backends {
    text: PlainTextBackend,
    #[cfg(feature = "pdf")]
    pdf: papyrus_pdf_mupdf::MupdfBackend,
}

impl Backends {
    fn for_path(&self, path: &Path) -> anyhow::Result<&dyn TextBackend> {
        let is_pdf = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Ok(&self.text);
        }
        #[cfg(feature = "pdf")]
        {
            Ok(&self.pdf)
        }
        #[cfg(not(feature = "pdf"))]
        {
            anyhow::bail!("PDF input requires building papyrus with the `pdf` feature")
        }
    }
}

/// What happened to one input document.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Written(PathBuf),
    Printed,
    SkippedShort(usize),
}

/// Run one document through the pipeline.
///
/// With a sink the record is written as JSON; without one it is printed.
fn process_file(
    path: &Path,
    backends: &Backends,
    extractor: &PaperExtractor,
    sink: Option<&JsonDirSink>,
    settings: &RunSettings,
    w: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<Outcome> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let backend = backends.for_path(path)?;
    let text = backend.extract_text(path)?;

    let chars = text.chars().count();
    if chars < settings.min_text_chars {
        return Ok(Outcome::SkippedShort(chars));
    }

    let record = extractor.extract(&RawDocument::new(text, file_name.as_str()))?;

    match sink {
        Some(sink) => {
            let written = sink
                .write(&file_name, &record)
                .with_context(|| format!("failed to write record for {file_name}"))?;
            Ok(Outcome::Written(written))
        }
        None => {
            output::print_dry_run(w, &file_name, &record, color)?;
            Ok(Outcome::Printed)
        }
    }
}

fn extract(
    files: &[PathBuf],
    output_dir: &Path,
    dry_run: bool,
    color: ColorMode,
    settings: &RunSettings,
) -> anyhow::Result<()> {
    let backends = Backends::default();
    let extractor = PaperExtractor::with_config(settings.config.clone());
    let sink = if dry_run {
        None
    } else {
        Some(
            JsonDirSink::open(output_dir, settings.pretty).with_context(|| {
                format!("failed to create output directory {}", output_dir.display())
            })?,
        )
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut stats = BatchStats::default();

    for path in files {
        match process_file(
            path,
            &backends,
            &extractor,
            sink.as_ref(),
            settings,
            &mut out,
            color,
        ) {
            Ok(Outcome::Written(written)) => {
                stats.written += 1;
                tracing::info!(file = %path.display(), output = %written.display(), "wrote record");
            }
            Ok(Outcome::Printed) => stats.written += 1,
            Ok(Outcome::SkippedShort(chars)) => {
                stats.skipped_short += 1;
                tracing::warn!(
                    file = %path.display(),
                    chars,
                    min = settings.min_text_chars,
                    "skipping document with too little text"
                );
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!(file = %path.display(), error = %format!("{e:#}"), "extraction failed");
            }
        }
    }

    output::print_summary(&mut out, &stats, color)?;
    out.flush()?;

    if stats.failed > 0 {
        anyhow::bail!("{} of {} documents failed", stats.failed, stats.total());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_core::config_file::{ChunkingConfig, OutputConfig};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn paper_text() -> String {
        let body = (0..300)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Attention Is All You Need\n\
             Ashish Vaswani, Noam Shazeer, Niki Parmar\n\
             Google Brain\n\
             Abstract\n\
             We propose the Transformer in 2017.\n\
             1 Introduction\n\
             {body}\n"
        )
    }

    #[test]
    fn test_cli_parses_extract() {
        let cli = Cli::try_parse_from([
            "papyrus",
            "extract",
            "a.txt",
            "b.txt",
            "-o",
            "out",
            "--chunk-size",
            "300",
            "--dry-run",
        ])
        .unwrap();
        let Command::Extract {
            files,
            output_dir,
            chunk_size,
            dry_run,
            compact,
            ..
        } = cli.command;
        assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert_eq!(output_dir, PathBuf::from("out"));
        assert_eq!(chunk_size, Some(300));
        assert!(dry_run);
        assert!(!compact);

        assert!(Cli::try_parse_from(["papyrus", "extract"]).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        assert_eq!(settings.config.chunk_size(), 700);
        assert_eq!(settings.config.chunk_overlap(), 100);
        assert_eq!(settings.min_text_chars, DEFAULT_MIN_TEXT_CHARS);
        assert!(settings.pretty);
    }

    #[test]
    fn test_settings_precedence() {
        let file = ConfigFile {
            chunking: Some(ChunkingConfig {
                size: Some(400),
                overlap: Some(40),
            }),
            output: Some(OutputConfig {
                pretty: Some(true),
                min_text_chars: Some(100),
            }),
            ..Default::default()
        };
        let env = |key: &str| match key {
            "PAPYRUS_CHUNK_SIZE" => Some("500".to_string()),
            "PAPYRUS_CHUNK_OVERLAP" => Some("50".to_string()),
            _ => None,
        };

        // env beats the config file
        let settings = resolve_settings(&Flags::default(), env, &file).unwrap();
        assert_eq!(settings.config.chunk_size(), 500);
        assert_eq!(settings.config.chunk_overlap(), 50);
        assert_eq!(settings.min_text_chars, 100);

        // flags beat env
        let flags = Flags {
            chunk_size: Some(600),
            compact: true,
            min_text_chars: Some(0),
            ..Default::default()
        };
        let settings = resolve_settings(&flags, env, &file).unwrap();
        assert_eq!(settings.config.chunk_size(), 600);
        assert_eq!(settings.config.chunk_overlap(), 50);
        assert_eq!(settings.min_text_chars, 0);
        assert!(!settings.pretty);
    }

    #[test]
    fn test_settings_reject_bad_values() {
        let env = |key: &str| (key == "PAPYRUS_CHUNK_SIZE").then(|| "many".to_string());
        assert!(resolve_settings(&Flags::default(), env, &ConfigFile::default()).is_err());

        let flags = Flags {
            chunk_size: Some(50),
            chunk_overlap: Some(50),
            ..Default::default()
        };
        assert!(resolve_settings(&flags, no_env, &ConfigFile::default()).is_err());
    }

    #[test]
    fn test_flag_shadows_malformed_env() {
        let env = |key: &str| match key {
            "PAPYRUS_CHUNK_SIZE" => Some("many".to_string()),
            "PAPYRUS_CHUNK_OVERLAP" => Some("lots".to_string()),
            _ => None,
        };
        let flags = Flags {
            chunk_size: Some(600),
            chunk_overlap: Some(60),
            ..Default::default()
        };
        let settings = resolve_settings(&flags, env, &ConfigFile::default()).unwrap();
        assert_eq!(settings.config.chunk_size(), 600);
        assert_eq!(settings.config.chunk_overlap(), 60);

        let flags = Flags {
            chunk_size: Some(600),
            ..Default::default()
        };
        assert!(resolve_settings(&flags, env, &ConfigFile::default()).is_err());
    }

    #[test]
    fn test_process_file_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("1706.03762.txt");
        std::fs::write(&input, paper_text()).unwrap();

        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        let sink = JsonDirSink::open(&dir.path().join("out"), settings.pretty).unwrap();
        let mut out = Vec::new();
        let outcome = process_file(
            &input,
            &Backends::default(),
            &PaperExtractor::with_config(settings.config.clone()),
            Some(&sink),
            &settings,
            &mut out,
            ColorMode(false),
        )
        .unwrap();

        let expected = dir.path().join("out").join("1706.03762.json");
        assert_eq!(outcome, Outcome::Written(expected.clone()));
        assert!(out.is_empty());

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(expected).unwrap()).unwrap();
        assert_eq!(value["paperId"], "arxiv_1706.03762");
        assert_eq!(value["title"], "Attention Is All You Need");
        assert_eq!(value["year"], 2017);
        papyrus_core::validate_record_value(&value).unwrap();
    }

    #[test]
    fn test_process_file_dry_run_prints() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.txt");
        std::fs::write(&input, paper_text()).unwrap();

        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        let mut out = Vec::new();
        let outcome = process_file(
            &input,
            &Backends::default(),
            &PaperExtractor::new(),
            None,
            &settings,
            &mut out,
            ColorMode(false),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Printed);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("paper.txt\n"));
        assert!(printed.contains("  title: Attention Is All You Need\n"));
    }

    #[test]
    fn test_process_file_skips_short_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stub.txt");
        std::fs::write(&input, "Too short to be a paper.").unwrap();

        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        let mut out = Vec::new();
        let outcome = process_file(
            &input,
            &Backends::default(),
            &PaperExtractor::new(),
            None,
            &settings,
            &mut out,
            ColorMode(false),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::SkippedShort(24));
        assert!(out.is_empty());
    }

    #[test]
    fn test_process_file_missing_input_is_error() {
        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        let mut out = Vec::new();
        let result = process_file(
            Path::new("/definitely/not/here.txt"),
            &Backends::default(),
            &PaperExtractor::new(),
            None,
            &settings,
            &mut out,
            ColorMode(false),
        );
        assert!(result.is_err());
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_pdf_needs_feature() {
        let backends = Backends::default();
        assert!(backends.for_path(Path::new("paper.PDF")).is_err());
        assert!(backends.for_path(Path::new("paper.txt")).is_ok());
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, paper_text()).unwrap();
        let missing = dir.path().join("missing.txt");
        let out_dir = dir.path().join("out");

        let settings = resolve_settings(&Flags::default(), no_env, &ConfigFile::default()).unwrap();
        let result = extract(
            &[missing, good],
            &out_dir,
            false,
            ColorMode(false),
            &settings,
        );
        assert!(result.is_err());
        assert!(out_dir.join("good.json").is_file());
    }
}
