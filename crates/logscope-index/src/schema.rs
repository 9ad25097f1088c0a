//! Index schema for log lines.
//!
//! One document per non-blank line:
//! - `file_name`: file name (string, stored)
//! - `file_path`: absolute path, identity key (string, stored)
//! - `line_number`: 0-based line (u64, stored)
//! - `content`: raw line (stored only)
//! - `tokenized_content`: analyzed line text (not stored)
//! - `file_date`: `yyyyMMdd` string for range queries (string, stored)
//! - `log_timestamp`: carried timestamp (stored only)

use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};

use crate::analyzer::LOG_TOKENIZER;

/// Field names, shared by schema construction and query parsing.
pub mod names {
    /// File name field.
    pub const FILE_NAME: &str = "file_name";
    /// Absolute file path field.
    pub const FILE_PATH: &str = "file_path";
    /// Line number field.
    pub const LINE_NUMBER: &str = "line_number";
    /// Raw line field.
    pub const CONTENT: &str = "content";
    /// Analyzed line field.
    pub const TOKENIZED_CONTENT: &str = "tokenized_content";
    /// File date field.
    pub const FILE_DATE: &str = "file_date";
    /// Log timestamp field.
    pub const LOG_TIMESTAMP: &str = "log_timestamp";
}

/// Handles to all fields in the log schema.
#[derive(Debug, Clone)]
pub struct LogSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// File name without directory.
    pub file_name: Field,
    /// Absolute file path.
    pub file_path: Field,
    /// 0-based line number.
    pub line_number: Field,
    /// Raw line text.
    pub content: Field,
    /// Line text run through the log analyzer.
    pub tokenized_content: Field,
    /// `yyyyMMdd` date attributed to the file.
    pub file_date: Field,
    /// Timestamp carried to this line, possibly empty.
    pub log_timestamp: Field,
}

impl LogSchema {
    /// Creates the schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let file_name = builder.add_text_field(names::FILE_NAME, STRING | STORED);
        let file_path = builder.add_text_field(names::FILE_PATH, STRING | STORED);
        let line_number = builder.add_u64_field(names::LINE_NUMBER, STORED);
        let content = builder.add_text_field(names::CONTENT, STORED);

        // Positions are needed so multi-token CJK keywords become phrase queries
        let tokenized_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(LOG_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let tokenized_content =
            builder.add_text_field(names::TOKENIZED_CONTENT, tokenized_options);

        let file_date = builder.add_text_field(names::FILE_DATE, STRING | STORED);
        let log_timestamp = builder.add_text_field(names::LOG_TIMESTAMP, STORED);

        let schema = builder.build();

        Self {
            schema,
            file_name,
            file_path,
            line_number,
            content,
            tokenized_content,
            file_date,
            log_timestamp,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Looks up field handles on the schema of an existing index.
    ///
    /// Returns `None` when the index was built with a different layout.
    pub fn from_schema(schema: &Schema) -> Option<Self> {
        Some(Self {
            schema: schema.clone(),
            file_name: schema.get_field(names::FILE_NAME).ok()?,
            file_path: schema.get_field(names::FILE_PATH).ok()?,
            line_number: schema.get_field(names::LINE_NUMBER).ok()?,
            content: schema.get_field(names::CONTENT).ok()?,
            tokenized_content: schema.get_field(names::TOKENIZED_CONTENT).ok()?,
            file_date: schema.get_field(names::FILE_DATE).ok()?,
            log_timestamp: schema.get_field(names::LOG_TIMESTAMP).ok()?,
        })
    }
}

impl Default for LogSchema {
    fn default() -> Self {
        Self::new()
    }
}
