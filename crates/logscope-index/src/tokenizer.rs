//! Tokenizer for mixed Latin and CJK log text.
//!
//! Runs of alphanumeric characters become one token each, as with Tantivy's
//! `SimpleTokenizer`. Han ideographs, kana and hangul syllables are emitted as
//! single-character tokens instead, so a multi-character CJK keyword is searched
//! as a phrase of adjacent characters.

use std::{iter::Peekable, str::CharIndices};

use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

/// Splits log text into alphanumeric runs and single CJK characters.
#[derive(Clone, Default)]
pub struct LogTokenizer {
    /// Token reused across streams.
    token: Token,
}

/// Token stream produced by [`LogTokenizer`].
pub struct LogTokenStream<'a> {
    /// Text being tokenized.
    text: &'a str,
    /// Remaining characters with their byte offsets.
    chars: Peekable<CharIndices<'a>>,
    /// Current token.
    token: &'a mut Token,
}

impl Tokenizer for LogTokenizer {
    type TokenStream<'a> = LogTokenStream<'a>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> LogTokenStream<'a> {
        self.token.reset();
        LogTokenStream {
            text,
            chars: text.char_indices().peekable(),
            token: &mut self.token,
        }
    }
}

impl LogTokenStream<'_> {
    /// Consumes the rest of an alphanumeric run and returns its end offset.
    ///
    /// The run stops before a CJK character without consuming it.
    fn run_end(&mut self) -> usize {
        while let Some(&(offset, c)) = self.chars.peek() {
            if !c.is_alphanumeric() || is_cjk(c) {
                return offset;
            }
            self.chars.next();
        }
        self.text.len()
    }

    /// Points the current token at `text[from..to]`.
    fn emit(&mut self, from: usize, to: usize) {
        self.token.offset_from = from;
        self.token.offset_to = to;
        self.token.text.push_str(&self.text[from..to]);
    }
}

impl TokenStream for LogTokenStream<'_> {
    fn advance(&mut self) -> bool {
        self.token.text.clear();
        self.token.position = self.token.position.wrapping_add(1);
        while let Some((offset, c)) = self.chars.next() {
            if is_cjk(c) {
                self.emit(offset, offset + c.len_utf8());
                return true;
            }
            if c.is_alphanumeric() {
                let end = self.run_end();
                self.emit(offset, end);
                return true;
            }
        }
        false
    }

    fn token(&self) -> &Token {
        self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        self.token
    }
}

/// Returns true for characters indexed one at a time.
fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x3040..=0x30FF     // hiragana, katakana
            | 0x3400..=0x4DBF   // extension A
            | 0x4E00..=0x9FFF   // unified ideographs
            | 0xAC00..=0xD7AF   // hangul syllables
            | 0xF900..=0xFAFF   // compatibility ideographs
            | 0xFF66..=0xFF9F   // halfwidth katakana
            | 0x20000..=0x2FFFF
    )
}
