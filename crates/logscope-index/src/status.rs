//! Index status detection.

use std::path::{Path, PathBuf};

use tantivy::Index;

use crate::{IndexError, location::stale_shard_dirs, tracker::indexed_file_count};

/// Marker file Tantivy writes for every committed index.
const META_FILE: &str = "meta.json";

/// State of the log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// No index has been created.
    Missing,
    /// An index exists but holds no documents.
    Empty,
    /// An index with documents exists.
    Ready,
}

impl IndexStatus {
    /// Returns a human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::Ready => "ready",
        }
    }
}

/// Status plus the numbers shown by `logscope status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    /// Overall state.
    pub status: IndexStatus,
    /// Live documents (log lines).
    pub documents: u64,
    /// Distinct indexed files.
    pub files: usize,
    /// Shard directories left behind by an interrupted build.
    pub stale_shards: Vec<PathBuf>,
}

/// Checks if an index exists at the given path.
pub fn index_exists(index_dir: &Path) -> bool {
    index_dir.join(META_FILE).is_file()
}

/// Inspects the index at `index_dir`.
///
/// A missing index is not an error. An index that exists but cannot be opened is.
pub fn summarize_index(index_dir: &Path) -> Result<IndexSummary, IndexError> {
    let stale_shards = stale_shard_dirs(index_dir);
    if !index_exists(index_dir) {
        return Ok(IndexSummary {
            status: IndexStatus::Missing,
            documents: 0,
            files: 0,
            stale_shards,
        });
    }

    let index = Index::open_in_dir(index_dir)
        .map_err(|e| IndexError::open_index(index_dir.to_path_buf(), &e))?;
    let reader = index
        .reader()
        .map_err(|e| IndexError::open_index(index_dir.to_path_buf(), &e))?;
    let documents = reader.searcher().num_docs();
    let files = if documents == 0 {
        0
    } else {
        indexed_file_count(index_dir)?
    };

    Ok(IndexSummary {
        status: if documents == 0 {
            IndexStatus::Empty
        } else {
            IndexStatus::Ready
        },
        documents,
        files,
        stale_shards,
    })
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        record::IndexRecord,
        writer::{LogIndexWriter, WriterOptions},
    };

    #[test]
    fn status_description() {
        assert_eq!(IndexStatus::Missing.description(), "missing");
        assert_eq!(IndexStatus::Empty.description(), "empty");
        assert_eq!(IndexStatus::Ready.description(), "ready");
    }

    #[test]
    fn index_exists_checks_meta_json() {
        let temp = TempDir::new().unwrap();
        let index_dir = temp.path().join("index");

        assert!(!index_exists(&index_dir));

        fs::create_dir_all(&index_dir).unwrap();
        assert!(!index_exists(&index_dir));

        fs::write(index_dir.join("meta.json"), "{}").unwrap();
        assert!(index_exists(&index_dir));
    }

    #[test]
    fn missing_index_summary() {
        let temp = TempDir::new().unwrap();
        let summary = summarize_index(&temp.path().join("index")).unwrap();
        assert_eq!(summary.status, IndexStatus::Missing);
        assert_eq!(summary.documents, 0);
        assert!(summary.stale_shards.is_empty());
    }

    #[test]
    fn empty_index_summary() {
        let temp = TempDir::new().unwrap();
        LogIndexWriter::open(temp.path(), &WriterOptions::default()).unwrap();
        fs::create_dir(temp.path().join("temp_0")).unwrap();

        let summary = summarize_index(temp.path()).unwrap();

        assert_eq!(summary.status, IndexStatus::Empty);
        assert_eq!(summary.stale_shards, vec![temp.path().join("temp_0")]);
    }

    #[test]
    fn ready_index_summary() {
        let temp = TempDir::new().unwrap();
        let mut writer = LogIndexWriter::open(temp.path(), &WriterOptions::default()).unwrap();
        for (path, line) in [("/a.log", 0), ("/a.log", 1), ("/b.log", 0)] {
            writer
                .add_record(&IndexRecord {
                    file_name: "x".into(),
                    file_path: path.into(),
                    line_number: line,
                    content: "text".into(),
                    file_date: "20250101".into(),
                    log_timestamp: String::new(),
                })
                .unwrap();
        }
        writer.commit().unwrap();

        let summary = summarize_index(temp.path()).unwrap();

        assert_eq!(summary.status, IndexStatus::Ready);
        assert_eq!(summary.documents, 3);
        assert_eq!(summary.files, 2);
    }
}
