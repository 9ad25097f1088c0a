//! Text analysis pipeline for log lines.
//!
//! The pipeline is:
//! 1. `LogTokenizer` - alphanumeric runs, single CJK characters
//! 2. `LowerCaser` - converts tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 64 bytes
//! 4. `Stemmer` - optional, only when `index.stemmer` is configured

use tantivy::{
    Index,
    tokenizer::{Language, LowerCaser, RemoveLongFilter, Stemmer, TextAnalyzer},
};

use crate::{IndexError, tokenizer::LogTokenizer};

/// Name of the custom analyzer registered with Tantivy.
pub const LOG_TOKENIZER: &str = "log_text";

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 64;

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(IndexError::InvalidLanguage(other.to_string())),
    }
}

/// Builds the log text analyzer, with stemming when a language is given.
pub fn build_analyzer(language: Option<Language>) -> TextAnalyzer {
    let builder = TextAnalyzer::builder(LogTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH));
    match language {
        Some(language) => builder.filter(Stemmer::new(language)).build(),
        None => builder.build(),
    }
}

/// Registers the log analyzer on an index under [`LOG_TOKENIZER`].
///
/// Called once for every opened index, reader or writer side.
pub fn register_analyzer(index: &Index, stemmer: Option<&str>) -> Result<(), IndexError> {
    let language = stemmer.map(parse_language).transpose()?;
    index
        .tokenizers()
        .register(LOG_TOKENIZER, build_analyzer(language));
    Ok(())
}
