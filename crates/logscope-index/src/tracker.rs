//! Finds the files an existing index already covers.
//!
//! Distinct `file_path` values are read from each segment's term dictionary, which
//! costs one step per indexed file rather than one per indexed line. Indexes whose
//! `file_path` field is stored but not indexed are read document by document instead.

use std::{collections::HashSet, path::Path, str};

use tantivy::{
    DocAddress, DocSet, Index, IndexReader, InvertedIndexReader, ReloadPolicy, Searcher,
    TERMINATED, TantivyDocument,
    fastfield::AliveBitSet,
    postings::TermInfo,
    schema::{Field, IndexRecordOption, Value},
};
use tracing::{debug, warn};

use crate::{
    IndexError,
    progress::{Progress, ProgressReporter, SilentReporter},
    schema::{LogSchema, names},
    status::index_exists,
};

/// Distinct paths between progress events while scanning terms.
const TERM_PROGRESS_EVERY: usize = 1_000;

/// Documents between progress events on the document fallback path.
const DOC_PROGRESS_EVERY: usize = 50_000;

/// What reading an existing index found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexScan {
    /// No index at the location yet.
    Missing,
    /// Paths of every file with live documents.
    Indexed(HashSet<String>),
    /// An index is there but cannot be opened or was not built by logscope.
    Unreadable(String),
}

impl IndexScan {
    /// Indexed paths, empty unless the index was read.
    pub fn into_paths(self) -> HashSet<String> {
        match self {
            Self::Indexed(paths) => paths,
            Self::Missing | Self::Unreadable(_) => HashSet::new(),
        }
    }
}

/// Reads the index at `index_dir` to find the files it already covers.
pub fn scan_index(index_dir: &Path, reporter: &dyn ProgressReporter) -> IndexScan {
    if !index_exists(index_dir) {
        return IndexScan::Missing;
    }
    match read_indexed_paths(index_dir, reporter) {
        Ok(paths) => IndexScan::Indexed(paths),
        Err(e) => {
            warn!(index = %index_dir.display(), error = %e, "cannot read existing index");
            IndexScan::Unreadable(e.to_string())
        }
    }
}

/// Returns the paths of every file with live documents in the index at `index_dir`.
///
/// A missing or unreadable index yields an empty set.
pub fn collect_indexed_paths(
    index_dir: &Path,
    reporter: &dyn ProgressReporter,
) -> HashSet<String> {
    scan_index(index_dir, reporter).into_paths()
}

/// Opens the index read-only and collects its file paths.
fn read_indexed_paths(
    index_dir: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<HashSet<String>, IndexError> {
    let index = Index::open_in_dir(index_dir)
        .map_err(|e| IndexError::open_index(index_dir.to_path_buf(), &e))?;
    let reader: IndexReader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()
        .map_err(|e| IndexError::open_index(index_dir.to_path_buf(), &e))?;
    let searcher = reader.searcher();

    let schema = index.schema();
    if LogSchema::from_schema(&schema).is_none() {
        return Err(IndexError::OpenIndex {
            path: index_dir.to_path_buf(),
            message: String::from("index was not created by logscope"),
        });
    }
    let field = schema
        .get_field(names::FILE_PATH)
        .map_err(|e| IndexError::open_index(index_dir.to_path_buf(), &e))?;

    let paths = if schema.get_field_entry(field).is_indexed() {
        paths_from_terms(&searcher, field, reporter)?
    } else {
        debug!("file_path is not indexed, scanning stored documents");
        paths_from_documents(&searcher, field, reporter)?
    };

    reporter.report(&Progress::ScanningIndex { paths: paths.len() });
    Ok(paths)
}

/// Walks the `file_path` term dictionary of every segment.
fn paths_from_terms(
    searcher: &Searcher,
    field: Field,
    reporter: &dyn ProgressReporter,
) -> Result<HashSet<String>, IndexError> {
    let mut paths = HashSet::new();
    let mut next_report = TERM_PROGRESS_EVERY;

    for segment_reader in searcher.segment_readers() {
        let inverted = segment_reader
            .inverted_index(field)
            .map_err(|e| IndexError::query(&e))?;
        let alive = segment_reader.alive_bitset();
        let mut terms = inverted.terms().stream()?;

        while terms.advance() {
            if let Some(alive) = alive
                && !has_live_doc(&inverted, terms.value(), alive)?
            {
                continue;
            }
            let Ok(path) = str::from_utf8(terms.key()) else {
                continue;
            };
            if paths.insert(path.to_string()) && paths.len() >= next_report {
                reporter.report(&Progress::ScanningIndex { paths: paths.len() });
                next_report += TERM_PROGRESS_EVERY;
            }
        }
    }

    Ok(paths)
}

/// Returns true if any document carrying the term is still alive.
///
/// Deleted documents keep their terms until segments merge, so the dictionary
/// alone can name files whose lines were all deleted.
fn has_live_doc(
    inverted: &InvertedIndexReader,
    term_info: &TermInfo,
    alive: &AliveBitSet,
) -> Result<bool, IndexError> {
    let mut postings =
        inverted.read_postings_from_terminfo(term_info, IndexRecordOption::Basic)?;
    let mut doc = postings.doc();
    while doc != TERMINATED {
        if alive.is_alive(doc) {
            return Ok(true);
        }
        doc = postings.advance();
    }
    Ok(false)
}

/// Loads the stored `file_path` of every live document.
fn paths_from_documents(
    searcher: &Searcher,
    field: Field,
    reporter: &dyn ProgressReporter,
) -> Result<HashSet<String>, IndexError> {
    let mut paths = HashSet::new();
    let mut seen = 0usize;

    for (segment_ord, segment_reader) in (0u32..).zip(searcher.segment_readers()) {
        for doc_id in segment_reader.doc_ids_alive() {
            let doc: TantivyDocument = searcher
                .doc(DocAddress::new(segment_ord, doc_id))
                .map_err(|e| IndexError::query(&e))?;
            if let Some(path) = doc.get_first(field).and_then(|v| v.as_str()) {
                paths.insert(path.to_string());
            }
            seen += 1;
            if seen % DOC_PROGRESS_EVERY == 0 {
                reporter.report(&Progress::ScanningIndex { paths: paths.len() });
            }
        }
    }

    Ok(paths)
}

/// Counts distinct indexed files, for status display.
pub fn indexed_file_count(index_dir: &Path) -> Result<usize, IndexError> {
    if !index_exists(index_dir) {
        return Ok(0);
    }
    read_indexed_paths(index_dir, &SilentReporter).map(|paths| paths.len())
}
