//! The per-line index record.

use tantivy::{TantivyDocument, doc};

use crate::schema::LogSchema;

/// One non-blank log line, ready to be written to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// File name without directory.
    pub file_name: String,
    /// Absolute file path; identifies the file across builds.
    pub file_path: String,
    /// 0-based line number in the file.
    pub line_number: u64,
    /// Raw line text.
    pub content: String,
    /// File date as `yyyyMMdd`. Always populated.
    pub file_date: String,
    /// Timestamp carried to this line. Empty when none has been seen yet.
    pub log_timestamp: String,
}

impl IndexRecord {
    /// Converts the record to a Tantivy document.
    ///
    /// The line text goes into both the stored and the analyzed field.
    pub fn to_document(&self, schema: &LogSchema) -> TantivyDocument {
        doc!(
            schema.file_name => self.file_name.as_str(),
            schema.file_path => self.file_path.as_str(),
            schema.line_number => self.line_number,
            schema.content => self.content.as_str(),
            schema.tokenized_content => self.content.as_str(),
            schema.file_date => self.file_date.as_str(),
            schema.log_timestamp => self.log_timestamp.as_str(),
        )
    }
}
