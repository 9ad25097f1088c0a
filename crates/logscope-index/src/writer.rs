//! Index writer for log records.

use std::{collections::HashSet, fs, path::Path, sync::Arc};

use tantivy::{
    DocId, Index, IndexWriter as TantivyIndexWriter, Score, SegmentId, SegmentReader,
    TantivyError, Term,
    directory::MmapDirectory,
    query::{EmptyScorer, EnableScoring, Explanation, Query, Scorer, TermQuery, Weight},
    schema::IndexRecordOption,
};

use crate::{
    analyzer::register_analyzer, error::IndexError, record::IndexRecord, schema::LogSchema,
};

/// Smallest heap Tantivy accepts per indexing thread (15 MB).
pub const MIN_HEAP_PER_THREAD: usize = 15_000_000;

/// Options for opening a [`LogIndexWriter`].
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Writer heap in bytes. Raised to [`MIN_HEAP_PER_THREAD`] × `threads` if lower.
    pub heap_bytes: usize,
    /// Indexing threads inside this writer.
    pub threads: usize,
    /// Stemming language for the log analyzer.
    pub stemmer: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            heap_bytes: 50_000_000,
            threads: 1,
            stemmer: None,
        }
    }
}

/// Opens the index at `path`, creating the directory and an empty index when missing.
///
/// The log analyzer is registered on the returned index.
pub fn open_or_create_index(path: &Path, stemmer: Option<&str>) -> Result<Index, IndexError> {
    fs::create_dir_all(path)?;

    let dir = MmapDirectory::open(path).map_err(|e| {
        let err: TantivyError = e.into();
        IndexError::open_index(path.to_path_buf(), &err)
    })?;

    let schema = LogSchema::new();
    let index = Index::open_or_create(dir, schema.schema().clone())
        .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;
    register_analyzer(&index, stemmer)?;
    Ok(index)
}

/// Writes log records to a Tantivy index.
pub struct LogIndexWriter {
    /// The Tantivy index.
    index: Index,
    /// The underlying Tantivy writer.
    writer: TantivyIndexWriter,
    /// Schema with field handles.
    schema: LogSchema,
}

impl LogIndexWriter {
    /// Opens or creates an index at `path` and starts a writer on it.
    pub fn open(path: &Path, options: &WriterOptions) -> Result<Self, IndexError> {
        let index = open_or_create_index(path, options.stemmer.as_deref())?;
        let schema = LogSchema::from_schema(&index.schema()).ok_or_else(|| {
            IndexError::OpenIndex {
                path: path.to_path_buf(),
                message: String::from("index was not created by logscope"),
            }
        })?;

        let threads = options.threads.max(1);
        let heap = options.heap_bytes.max(MIN_HEAP_PER_THREAD * threads);
        let writer = index
            .writer_with_num_threads(threads, heap)
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        Ok(Self {
            index,
            writer,
            schema,
        })
    }

    /// Stages a record. It becomes visible after [`commit`](Self::commit).
    pub fn add_record(&self, record: &IndexRecord) -> Result<(), IndexError> {
        self.writer
            .add_document(record.to_document(&self.schema))
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Stages deletion of every line of the file at `file_path`.
    ///
    /// Segments listed in `keep` are left alone, so freshly appended lines of a
    /// rescanned file survive the delete of its older copy.
    pub fn delete_file(
        &self,
        file_path: &str,
        keep: &[SegmentId],
    ) -> Result<(), IndexError> {
        let term = Term::from_field_text(self.schema.file_path, file_path);
        let query = OutsideSegments {
            inner: TermQuery::new(term, IndexRecordOption::Basic),
            keep: Arc::new(keep.iter().copied().collect()),
        };
        self.writer
            .delete_query(Box::new(query))
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Stages deletion of every document.
    pub fn delete_all(&mut self) -> Result<(), IndexError> {
        self.writer
            .delete_all_documents()
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Commits all pending changes and returns the commit opstamp.
    pub fn commit(&mut self) -> Result<u64, IndexError> {
        self.writer.commit().map_err(|e| IndexError::commit(&e))
    }

    /// Returns the number of committed live documents.
    pub fn num_docs(&self) -> Result<u64, IndexError> {
        let reader = self.index.reader().map_err(|e| IndexError::write(&e))?;
        Ok(reader.searcher().num_docs())
    }

    /// Stops the writer, waiting for background merges, and releases the writer lock.
    pub fn finish(self) -> Result<(), IndexError> {
        self.writer
            .wait_merging_threads()
            .map_err(|e| IndexError::commit(&e))
    }
}

/// A term query that matches nothing inside the `keep` segments.
#[derive(Debug, Clone)]
struct OutsideSegments {
    /// Query applied to every other segment.
    inner: TermQuery,
    /// Segments left untouched.
    keep: Arc<HashSet<SegmentId>>,
}

impl Query for OutsideSegments {
    fn weight(
        &self,
        enable_scoring: EnableScoring<'_>,
    ) -> Result<Box<dyn Weight>, TantivyError> {
        Ok(Box::new(OutsideSegmentsWeight {
            inner: self.inner.weight(enable_scoring)?,
            keep: Arc::clone(&self.keep),
        }))
    }
}

/// Weight of [`OutsideSegments`].
struct OutsideSegmentsWeight {
    /// Weight of the term query.
    inner: Box<dyn Weight>,
    /// Segments left untouched.
    keep: Arc<HashSet<SegmentId>>,
}

impl Weight for OutsideSegmentsWeight {
    fn scorer(
        &self,
        reader: &SegmentReader,
        boost: Score,
    ) -> Result<Box<dyn Scorer>, TantivyError> {
        if self.keep.contains(&reader.segment_id()) {
            return Ok(Box::new(EmptyScorer));
        }
        self.inner.scorer(reader, boost)
    }

    fn explain(&self, reader: &SegmentReader, doc: DocId) -> Result<Explanation, TantivyError> {
        if self.keep.contains(&reader.segment_id()) {
            return Err(TantivyError::InvalidArgument(format!(
                "document {doc} is in a kept segment"
            )));
        }
        self.inner.explain(reader, doc)
    }
}
