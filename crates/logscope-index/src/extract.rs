//! Streams a log file into per-line index records.

use std::{
    fs::{self, File},
    io::{BufReader, Read},
    iter, mem,
    path::Path,
    time::SystemTime,
};

use chrono::NaiveDate;
use encoding_rs::Encoding;
use tracing::debug;

use crate::{
    IndexError,
    date::{date_from_system_time, extract_timestamp, parse_date_from_file_name, to_file_date},
    record::IndexRecord,
};

/// Read buffer size for log files.
const READ_BUFFER_SIZE: usize = 1 << 20;

/// Turns log files into [`IndexRecord`]s using a fixed text encoding.
#[derive(Debug, Clone, Copy)]
pub struct DocumentExtractor {
    /// Encoding used to decode file contents.
    encoding: &'static Encoding,
}

impl DocumentExtractor {
    /// Creates an extractor decoding files with `encoding`.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Returns the encoding in use.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Extracts one record per non-blank line of the file at `path`.
    ///
    /// The file date comes from `file_name`, or from the file's modification time
    /// when the name carries none.
    pub fn extract_records(
        &self,
        path: &Path,
        file_name: &str,
    ) -> Result<Vec<IndexRecord>, IndexError> {
        let file_date = match parse_date_from_file_name(file_name) {
            Some(date) => date,
            None => {
                let mtime = fs::metadata(path)?
                    .modified()
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                date_from_system_time(mtime)
            }
        };
        self.extract_with_date(path, file_name, file_date)
    }

    /// Extracts records using an already resolved file date.
    pub fn extract_with_date(
        &self,
        path: &Path,
        file_name: &str,
        file_date: NaiveDate,
    ) -> Result<Vec<IndexRecord>, IndexError> {
        let mut bytes = Vec::new();
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, File::open(path)?);
        reader.read_to_end(&mut bytes)?;

        let (text, _, had_errors) = self.encoding.decode(&bytes);
        if had_errors {
            debug!(
                path = %path.display(),
                encoding = self.encoding.name(),
                "malformed sequences replaced while decoding"
            );
        }

        Ok(lines_to_records(
            &text,
            file_name,
            &path.to_string_lossy(),
            &to_file_date(file_date),
        ))
    }
}

/// Splits decoded text into records.
///
/// Blank lines keep their line number slot but produce no record. Lines without
/// their own timestamp inherit the most recent one seen earlier in the file.
fn lines_to_records(
    text: &str,
    file_name: &str,
    file_path: &str,
    file_date: &str,
) -> Vec<IndexRecord> {
    let mut records = Vec::new();
    let mut last_timestamp = String::new();

    for (line_number, line) in (0u64..).zip(split_lines(text)) {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(timestamp) = extract_timestamp(line) {
            timestamp.clone_into(&mut last_timestamp);
        }
        records.push(IndexRecord {
            file_name: file_name.to_string(),
            file_path: file_path.to_string(),
            line_number,
            content: line.to_string(),
            file_date: file_date.to_string(),
            log_timestamp: last_timestamp.clone(),
        });
    }

    records
}

/// Splits on `\n`, `\r\n` and a lone `\r`. A final terminator adds no empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\r', '\n']) else {
            return Some(mem::take(&mut rest));
        };
        let (line, tail) = rest.split_at(end);
        rest = tail
            .strip_prefix("\r\n")
            .or_else(|| tail.strip_prefix(['\r', '\n']))
            .unwrap_or_default();
        Some(line)
    })
}
