//! Text to MML transducers.
//!
//! Both strategies share the same outer loop: a fixed prelude, then one
//! tempo token per non-empty line followed by whatever the strategy makes of
//! the line's characters. They differ only in how characters become notes.

mod pair;
mod repetition;

pub use pair::PairTransducer;
pub use repetition::RepetitionTransducer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{render, Length, Token};
use crate::classify::classify;
use crate::scale::pitch_class;
use crate::Error;

/// Lines longer than this many characters are played slower
pub const DENSE_LINE_CHARS: usize = 20;
pub const DENSE_LINE_TEMPO: u32 = 100;
pub const SPARSE_LINE_TEMPO: u32 = 180;

/// A rule set turning one line of text into MML tokens.
pub trait Transducer {
    /// Append tokens for a trimmed, non-empty line. The line tempo has
    /// already been emitted.
    fn transduce_line(&self, line: &str, out: &mut Vec<Token>);

    /// Append tokens for a blank line.
    fn empty_line(&self, out: &mut Vec<Token>);
}

/// Which transducer to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Runs of identical characters become one longer note
    #[default]
    Repetition,
    /// Characters are read in pairs: pitch from the first, rhythm from the second
    Pair,
}

static REPETITION: RepetitionTransducer = RepetitionTransducer;
static PAIR: PairTransducer = PairTransducer;

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Repetition, Mode::Pair];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Repetition => "repetition",
            Mode::Pair => "pair",
        }
    }

    pub fn transducer(self) -> &'static dyn Transducer {
        match self {
            Mode::Repetition => &REPETITION,
            Mode::Pair => &PAIR,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repetition" | "a" => Ok(Mode::Repetition),
            "pair" | "b" => Ok(Mode::Pair),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// Global settings every stream starts with: tempo 120, volume 10, instrument reset.
pub fn prelude() -> Vec<Token> {
    vec![Token::Tempo(120), Token::Volume(10), Token::Program(0)]
}

/// Tempo for a trimmed line of `chars` characters.
pub fn line_tempo(chars: usize) -> u32 {
    if chars > DENSE_LINE_CHARS {
        DENSE_LINE_TEMPO
    } else {
        SPARSE_LINE_TEMPO
    }
}

/// Octave and note tokens for a character sung at `length`.
pub(crate) fn voiced(c: char, length: Length) -> [Token; 2] {
    let (name, accidental) = pitch_class(c);
    [
        Token::Octave(classify(c).octave() as u32),
        Token::note(name, accidental, length),
    ]
}

/// Run a transducer over a block of text.
pub fn transduce_with(text: &str, transducer: &dyn Transducer) -> Vec<Token> {
    let mut tokens = prelude();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            transducer.empty_line(&mut tokens);
            continue;
        }

        let chars = line.chars().count();
        tokens.push(Token::Tempo(line_tempo(chars)));

        let before = tokens.len();
        transducer.transduce_line(line, &mut tokens);
        debug!(
            line = line_no + 1,
            chars,
            tokens = tokens.len() - before,
            "transduced line"
        );
    }

    tokens
}

/// Convert text to MML tokens using the given mode.
pub fn transduce_tokens(text: &str, mode: Mode) -> Vec<Token> {
    transduce_with(text, mode.transducer())
}

/// Convert text to a space-separated MML string using the given mode.
pub fn transduce(text: &str, mode: Mode) -> String {
    render(&transduce_tokens(text, mode))
}
