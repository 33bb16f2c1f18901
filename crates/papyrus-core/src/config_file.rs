use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub chunking: Option<ChunkingConfig>,
    pub authors: Option<AuthorsConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub size: Option<usize>,
    pub overlap: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorsConfig {
    pub max_authors: Option<usize>,
    pub extra_affiliation_keywords: Option<Vec<String>>,
    pub extra_stopwords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub pretty: Option<bool>,
    /// Documents whose raw text is shorter than this are skipped.
    pub min_text_chars: Option<usize>,
}

/// Platform config directory path: `<config_dir>/papyrus/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("papyrus").join("config.toml"))
}

/// Load config by cascading CWD `.papyrus.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".papyrus.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_chunking = base.chunking.unwrap_or_default();
    let over_chunking = overlay.chunking.unwrap_or_default();
    let base_authors = base.authors.unwrap_or_default();
    let over_authors = overlay.authors.unwrap_or_default();
    let base_output = base.output.unwrap_or_default();
    let over_output = overlay.output.unwrap_or_default();

    ConfigFile {
        chunking: Some(ChunkingConfig {
            size: over_chunking.size.or(base_chunking.size),
            overlap: over_chunking.overlap.or(base_chunking.overlap),
        }),
        authors: Some(AuthorsConfig {
            max_authors: over_authors.max_authors.or(base_authors.max_authors),
            extra_affiliation_keywords: over_authors
                .extra_affiliation_keywords
                .or(base_authors.extra_affiliation_keywords),
            extra_stopwords: over_authors
                .extra_stopwords
                .or(base_authors.extra_stopwords),
        }),
        output: Some(OutputConfig {
            pretty: over_output.pretty.or(base_output.pretty),
            min_text_chars: over_output.min_text_chars.or(base_output.min_text_chars),
        }),
    }
}
