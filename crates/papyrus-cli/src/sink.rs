use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use papyrus_core::{PaperRecord, file_base_name};

/// Writes one JSON file per record into a directory.
///
/// Opened once per run and handed to every document explicitly.
#[derive(Debug)]
pub struct JsonDirSink {
    dir: PathBuf,
    pretty: bool,
}

impl JsonDirSink {
    /// Create the output directory if needed.
    pub fn open(dir: &Path, pretty: bool) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            pretty,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `record` as `<dir>/<stem of file_name>.json`, replacing any
    /// previous output for the same input.
    pub fn write(&self, file_name: &str, record: &PaperRecord) -> io::Result<PathBuf> {
        let path = self.dir.join(format!("{}.json", file_base_name(file_name)));
        let json = if self.pretty {
            serde_json::to_string_pretty(record)
        } else {
            serde_json::to_string(record)
        }
        .map_err(io::Error::other)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_core::PaperDraft;

    #[test]
    fn test_writes_named_after_input_stem() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let sink = JsonDirSink::open(&out, true).unwrap();
        assert!(sink.dir().is_dir());

        let record = PaperDraft::new("2005.14165.pdf").into_record();
        let path = sink.write("2005.14165.pdf", &record).unwrap();
        assert_eq!(path, out.join("2005.14165.json"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["paperId"], "manual_2005.14165");
    }

    #[test]
    fn test_compact_output() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonDirSink::open(dir.path(), false).unwrap();
        let record = PaperDraft::new("paper.txt").into_record();
        let path = sink.write("paper.txt", &record).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert!(!written.contains('\n'));
    }
}
