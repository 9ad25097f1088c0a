//! Keyword and date range search over the log index.
//!
//! [`SearchEngine`] opens the index lazily and keeps the reader between calls.
//! Every search compares the committed generation on disk with the one the
//! cached reader was opened at and reloads only when they differ. The check and
//! the swap happen under one mutex; the search itself runs on a cloned
//! `Searcher` snapshot outside the lock.

use std::{
    ops::Bound,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::NaiveDate;
use serde::Serialize;
use tantivy::{
    DocAddress, Index, IndexReader, ReloadPolicy, Searcher, SegmentId, SegmentMeta,
    TantivyDocument,
    collector::{Count, TopDocs},
    query::{BooleanQuery, Occur, Query, QueryParser, RangeQuery},
    schema::{Field, Value},
};
use tracing::debug;

use crate::{
    IndexError,
    analyzer::register_analyzer,
    date::{MAX_FILE_DATE, MIN_FILE_DATE, date_from_timestamp, parse_file_date, to_file_date},
    schema::{LogSchema, names},
    status::index_exists,
};

/// A matching log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// File name without directory.
    pub file_name: String,
    /// Absolute file path.
    pub file_path: String,
    /// 0-based line number.
    pub line_number: u64,
    /// Raw line text.
    pub content: String,
    /// Date of the file, or of the line's timestamp when the stored date is unusable.
    pub file_date: Option<NaiveDate>,
    /// Timestamp carried to this line, possibly empty.
    pub log_timestamp: String,
    /// Relevance score.
    pub score: f32,
}

/// Order of returned results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest score first, as returned by the engine.
    #[default]
    Relevance,
    /// Newest file date first; undated results last.
    DateDescending,
}

/// Parameters for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Result cap. Uses the engine default when unset.
    pub limit: Option<usize>,
    /// First file date included.
    pub from: Option<NaiveDate>,
    /// Last file date included.
    pub to: Option<NaiveDate>,
    /// Result order.
    pub order: SortOrder,
}

/// Results of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// At most `limit` results.
    pub results: Vec<SearchResult>,
    /// Every matching line, not just those returned.
    pub total_hits: usize,
}

/// Identifies a committed state of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Generation {
    /// Opstamp of the last commit.
    opstamp: u64,
    /// Searchable segments, sorted.
    segments: Vec<SegmentId>,
}

impl Generation {
    /// Reads the generation currently published in `meta.json`.
    fn current(index: &Index) -> Result<Self, IndexError> {
        let meta = index.load_metas().map_err(|e| IndexError::query(&e))?;
        let mut segments: Vec<SegmentId> = meta.segments.iter().map(SegmentMeta::id).collect();
        segments.sort();
        Ok(Self {
            opstamp: meta.opstamp,
            segments,
        })
    }
}

/// The cached reader and everything built once per opened index.
struct OpenIndex {
    /// The index, with the log analyzer registered.
    index: Index,
    /// Manually reloaded reader.
    reader: IndexReader,
    /// Keyword parser over the analyzed content field.
    parser: QueryParser,
    /// Field handles.
    schema: LogSchema,
    /// Generation the reader was last reloaded at.
    generation: Generation,
}

/// Read-only search over the log index.
pub struct SearchEngine {
    /// Index directory.
    index_dir: PathBuf,
    /// Stemming language, matching the one used at build time.
    stemmer: Option<String>,
    /// Result cap when a search sets none.
    default_limit: usize,
    /// Lazily opened reader.
    state: Mutex<Option<OpenIndex>>,
}

impl SearchEngine {
    /// Creates an engine for the index at `index_dir`. Nothing is opened yet.
    pub fn new(index_dir: PathBuf, stemmer: Option<String>, default_limit: usize) -> Self {
        Self {
            index_dir,
            stemmer,
            default_limit,
            state: Mutex::new(None),
        }
    }

    /// Returns the index directory.
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Searches for lines containing every term of `keyword`.
    ///
    /// A blank keyword returns nothing without touching the index, and so does
    /// a missing index. Keyword syntax errors are returned.
    pub fn search(
        &self,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults, IndexError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(SearchResults::default());
        }
        let Some((searcher, parser, schema)) = self.snapshot()? else {
            return Ok(SearchResults::default());
        };

        let query = build_query(&parser, keyword, options.from, options.to)?;
        let limit = options.limit.unwrap_or(self.default_limit);
        let (top_docs, total_hits) = if limit == 0 {
            let count = searcher
                .search(&*query, &Count)
                .map_err(|e| IndexError::query(&e))?;
            (Vec::new(), count)
        } else {
            searcher
                .search(&*query, &(TopDocs::with_limit(limit), Count))
                .map_err(|e| IndexError::query(&e))?
        };

        let mut results = top_docs
            .into_iter()
            .map(|(score, address)| hydrate(&searcher, &schema, address, score))
            .collect::<Result<Vec<_>, _>>()?;
        if options.order == SortOrder::DateDescending {
            sort_by_date(&mut results);
        }
        debug!(keyword, returned = results.len(), total_hits, "search finished");
        Ok(SearchResults {
            results,
            total_hits,
        })
    }

    /// Releases the cached reader. Safe to call repeatedly; a later search
    /// opens the index again.
    pub fn close(&self) {
        self.lock().take();
    }

    /// Returns a searcher on the latest committed generation, or `None` when
    /// there is no index.
    fn snapshot(&self) -> Result<Option<(Searcher, QueryParser, LogSchema)>, IndexError> {
        let mut state = self.lock();
        if !index_exists(&self.index_dir) {
            *state = None;
            return Ok(None);
        }

        if let Some(open) = state.as_mut() {
            let generation = Generation::current(&open.index)?;
            if generation != open.generation {
                debug!(opstamp = generation.opstamp, "index changed, reloading reader");
                open.reader.reload().map_err(|e| IndexError::query(&e))?;
                open.generation = generation;
            }
        } else {
            *state = Some(self.open()?);
        }

        Ok(state
            .as_ref()
            .map(|open| (open.reader.searcher(), open.parser.clone(), open.schema.clone())))
    }

    /// Opens the index and builds the reader and query parser.
    fn open(&self) -> Result<OpenIndex, IndexError> {
        let index = Index::open_in_dir(&self.index_dir)
            .map_err(|e| IndexError::open_index(self.index_dir.clone(), &e))?;
        register_analyzer(&index, self.stemmer.as_deref())?;
        let schema =
            LogSchema::from_schema(&index.schema()).ok_or_else(|| IndexError::OpenIndex {
                path: self.index_dir.clone(),
                message: String::from("index was not created by logscope"),
            })?;
        let generation = Generation::current(&index)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index(self.index_dir.clone(), &e))?;

        let mut parser = QueryParser::for_index(&index, vec![schema.tokenized_content]);
        parser.set_conjunction_by_default();

        Ok(OpenIndex {
            index,
            reader,
            parser,
            schema,
            generation,
        })
    }

    /// Locks the cached state, recovering from a panicked holder.
    fn lock(&self) -> MutexGuard<'_, Option<OpenIndex>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parses the keyword and adds a `file_date` range when either bound is set.
fn build_query(
    parser: &QueryParser,
    keyword: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Box<dyn Query>, IndexError> {
    let keyword_query = parser
        .parse_query(keyword)
        .map_err(|e| IndexError::parse(&e))?;
    if from.is_none() && to.is_none() {
        return Ok(keyword_query);
    }

    let lower = from.map_or_else(|| MIN_FILE_DATE.to_string(), to_file_date);
    let upper = to.map_or_else(|| MAX_FILE_DATE.to_string(), to_file_date);
    let range = RangeQuery::new_str_bounds(
        names::FILE_DATE.to_string(),
        Bound::Included(lower.as_str()),
        Bound::Included(upper.as_str()),
    );
    Ok(Box::new(BooleanQuery::new(vec![
        (Occur::Must, keyword_query),
        (Occur::Must, Box::new(range)),
    ])))
}

/// Loads the stored fields of a hit.
fn hydrate(
    searcher: &Searcher,
    schema: &LogSchema,
    address: DocAddress,
    score: f32,
) -> Result<SearchResult, IndexError> {
    let doc: TantivyDocument = searcher.doc(address).map_err(|e| IndexError::query(&e))?;
    let log_timestamp = text(&doc, schema.log_timestamp);
    let file_date = parse_file_date(&text(&doc, schema.file_date))
        .or_else(|| date_from_timestamp(&log_timestamp));

    Ok(SearchResult {
        file_name: text(&doc, schema.file_name),
        file_path: text(&doc, schema.file_path),
        line_number: doc
            .get_first(schema.line_number)
            .and_then(|v| v.as_u64())
            .unwrap_or_default(),
        content: text(&doc, schema.content),
        file_date,
        log_timestamp,
        score,
    })
}

/// Reads a stored text field, empty when absent.
fn text(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Stable sort: newest date first, undated last, then by file and line.
fn sort_by_date(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.file_date
            .cmp(&a.file_date)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.line_number.cmp(&b.line_number))
    });
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        record::IndexRecord,
        writer::{LogIndexWriter, WriterOptions},
    };

    fn record(path: &str, line: u64, content: &str, date: &str, ts: &str) -> IndexRecord {
        IndexRecord {
            file_name: Path::new(path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
            file_path: path.into(),
            line_number: line,
            content: content.into(),
            file_date: date.into(),
            log_timestamp: ts.into(),
        }
    }

    fn write(dir: &Path, records: &[IndexRecord]) {
        let mut writer = LogIndexWriter::open(dir, &WriterOptions::default()).unwrap();
        for r in records {
            writer.add_record(r).unwrap();
        }
        writer.commit().unwrap();
        writer.finish().unwrap();
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(dir: &Path) {
        write(
            dir,
            &[
                record("/l/app.log20250101", 0, "start service", "20250101", ""),
                record("/l/app.log20250101", 2, "error disk full", "20250101", ""),
                record("/l/app.log20250102", 0, "start again", "20250102", ""),
                record("/l/app.log20250103", 5, "error network", "20250103", ""),
                record("/l/app.log20250103", 6, "電梯 故障", "20250103", ""),
            ],
        );
    }

    fn engine(dir: &Path) -> SearchEngine {
        SearchEngine::new(dir.to_path_buf(), None, 100)
    }

    #[test]
    fn blank_keyword_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp.path().join("missing"));

        let found = engine.search("   ", &SearchOptions::default()).unwrap();

        assert_eq!(found, SearchResults::default());
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn missing_index_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp.path().join("missing"));

        let found = engine.search("error", &SearchOptions::default()).unwrap();

        assert_eq!(found.total_hits, 0);
        assert!(found.results.is_empty());
    }

    #[test]
    fn finds_keyword_and_hydrates_fields() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());

        let found = engine(temp.path())
            .search("DISK", &SearchOptions::default())
            .unwrap();

        assert_eq!(found.total_hits, 1);
        let hit = &found.results[0];
        assert_eq!(hit.file_name, "app.log20250101");
        assert_eq!(hit.file_path, "/l/app.log20250101");
        assert_eq!(hit.line_number, 2);
        assert_eq!(hit.content, "error disk full");
        assert_eq!(hit.file_date, Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn all_terms_must_match() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());

        let found = engine(temp.path())
            .search("error network", &SearchOptions::default())
            .unwrap();

        assert_eq!(found.total_hits, 1);
        assert_eq!(found.results[0].line_number, 5);
    }

    #[test]
    fn cjk_keyword_matches_substring() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());

        let found = engine(temp.path())
            .search("電梯", &SearchOptions::default())
            .unwrap();

        assert_eq!(found.total_hits, 1);
        assert_eq!(found.results[0].content, "電梯 故障");
    }

    #[test]
    fn date_range_limits_total_hits() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());
        let engine = engine(temp.path());

        let day = SearchOptions {
            from: Some(ymd(2025, 1, 1)),
            to: Some(ymd(2025, 1, 1)),
            ..SearchOptions::default()
        };
        assert_eq!(engine.search("error", &day).unwrap().total_hits, 1);

        let from = SearchOptions {
            from: Some(ymd(2025, 1, 2)),
            ..SearchOptions::default()
        };
        assert_eq!(engine.search("error", &from).unwrap().total_hits, 1);

        let until = SearchOptions {
            to: Some(ymd(2025, 1, 2)),
            ..SearchOptions::default()
        };
        assert_eq!(engine.search("start", &until).unwrap().total_hits, 2);
    }

    #[test]
    fn limit_caps_results_but_not_total() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());
        let engine = engine(temp.path());

        let one = SearchOptions {
            limit: Some(1),
            ..SearchOptions::default()
        };
        let found = engine.search("error", &one).unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.total_hits, 2);

        let none = SearchOptions {
            limit: Some(0),
            ..SearchOptions::default()
        };
        let found = engine.search("error", &none).unwrap();
        assert!(found.results.is_empty());
        assert_eq!(found.total_hits, 2);
    }

    #[test]
    fn date_descending_order() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());

        let options = SearchOptions {
            order: SortOrder::DateDescending,
            ..SearchOptions::default()
        };
        let found = engine(temp.path()).search("start", &options).unwrap();

        let dates: Vec<_> = found.results.iter().map(|r| r.file_date).collect();
        assert_eq!(dates, vec![Some(ymd(2025, 1, 2)), Some(ymd(2025, 1, 1))]);
    }

    #[test]
    fn undated_results_sort_last() {
        let mut results = vec![
            SearchResult {
                file_name: "a".into(),
                file_path: "/a".into(),
                line_number: 0,
                content: String::new(),
                file_date: None,
                log_timestamp: String::new(),
                score: 1.0,
            },
            SearchResult {
                file_name: "b".into(),
                file_path: "/b".into(),
                line_number: 3,
                content: String::new(),
                file_date: Some(ymd(2024, 1, 1)),
                log_timestamp: String::new(),
                score: 0.5,
            },
        ];
        sort_by_date(&mut results);
        assert_eq!(results[0].file_path, "/b");
        assert_eq!(results[1].file_path, "/a");
    }

    #[test]
    fn falls_back_to_timestamp_date() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            &[record("/l/x.log", 0, "odd line", "bogus", "2024/12/31 23:59:59")],
        );

        let found = engine(temp.path())
            .search("odd", &SearchOptions::default())
            .unwrap();

        assert_eq!(found.results[0].file_date, Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn sees_new_commits_after_first_search() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());
        let engine = engine(temp.path());
        assert_eq!(
            engine
                .search("error", &SearchOptions::default())
                .unwrap()
                .total_hits,
            2
        );

        write(
            temp.path(),
            &[record("/l/app.log20250104", 0, "error again", "20250104", "")],
        );

        assert_eq!(
            engine
                .search("error", &SearchOptions::default())
                .unwrap()
                .total_hits,
            3
        );
    }

    #[test]
    fn bad_syntax_is_reported() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());

        let result = engine(temp.path()).search("nosuchfield:error", &SearchOptions::default());

        assert!(matches!(result, Err(IndexError::Query(_))));
    }

    #[test]
    fn close_is_idempotent() {
        let temp = TempDir::new().unwrap();
        sample(temp.path());
        let engine = engine(temp.path());
        engine.search("error", &SearchOptions::default()).unwrap();

        engine.close();
        engine.close();

        assert_eq!(
            engine
                .search("error", &SearchOptions::default())
                .unwrap()
                .total_hits,
            2
        );
    }
}
