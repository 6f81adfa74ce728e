//! MML stream tokenizer.
//!
//! The stream is split on whitespace and each piece is parsed on its own, so
//! a bad token never affects its neighbours. Every piece comes back with its
//! own `Result`; callers decide what to do with the error branch.

mod token;

pub use token::{parse_token, TokenError};

use crate::ast::Token;
use crate::feedback::{FeedbackCollector, ParseResult};

/// A token together with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceToken<'a> {
    /// Zero-based position in the stream
    pub index: usize,
    /// Byte offset of the token text in the stream
    pub offset: usize,
    pub text: &'a str,
    pub token: Result<Token, TokenError>,
}

/// Split an MML stream into individually parsed tokens.
pub fn tokenize(mml: &str) -> impl Iterator<Item = SourceToken<'_>> {
    let base = mml.as_ptr() as usize;
    mml.split_whitespace()
        .enumerate()
        .map(move |(index, text)| SourceToken {
            index,
            offset: text.as_ptr() as usize - base,
            text,
            token: parse_token(text),
        })
}

/// Parse a whole stream, keeping the valid tokens and reporting the rest.
pub fn parse(mml: &str) -> ParseResult<Vec<Token>> {
    let mut collector = FeedbackCollector::new();
    let mut tokens = Vec::new();

    for source in tokenize(mml) {
        match source.token {
            Ok(token) => tokens.push(token),
            Err(err) => {
                collector.set_position(source.index, source.offset, source.text);
                match err.suggestion() {
                    Some(hint) => collector.warning_with_suggestion(err.to_string(), hint),
                    None => collector.warning(err.to_string()),
                }
            }
        }
    }

    ParseResult::new(tokens, collector.into_feedback())
}
