//! Text to MML transducer and MML to MIDI interpreter.
//!
//! Two stages, run in sequence:
//!
//! - **Transducer**: text in, MML out. Each character's code point, script
//!   (hiragana, katakana, kanji, other) and neighbours decide pitch, octave
//!   and length. Two rule sets are available, see [`Mode`].
//! - **Interpreter**: MML in, timed note events out. Tokens it cannot read
//!   are skipped and reported, never fatal.
//!
//! # Example
//!
//! ```
//! use mml::{interpret, to_midi, transduce, Instrument, MidiParams, Mode};
//!
//! let mml = transduce("ああ", Mode::Repetition);
//! assert_eq!(mml, "t120 v10 @0 t180 o5 f+4");
//!
//! let result = interpret(&mml, Instrument::Piano);
//! assert!(!result.has_warnings());
//! assert_eq!(result.value.notes.len(), 1);
//!
//! let bytes = to_midi(&result.value, &MidiParams::default()).unwrap();
//! assert_eq!(&bytes[0..4], b"MThd");
//! ```

pub mod ast;
pub mod classify;
pub mod feedback;
pub mod instrument;
pub mod interpret;
pub mod midi;
pub mod parser;
pub mod scale;
pub mod transducer;

use std::path::PathBuf;

pub use ast::{render, Accidental, Length, NoteName, Token};
pub use classify::{classify, ScriptClass};
pub use feedback::{Feedback, FeedbackLevel, ParseResult};
pub use instrument::Instrument;
pub use interpret::{interpret, interpret_tokens, Interpreter, NoteEvent, Performance, TempoChange};
pub use midi::{to_midi, to_smf, write_midi, MidiParams};
pub use parser::{parse, tokenize, TokenError};
pub use transducer::{transduce, transduce_tokens, Mode, Transducer};

/// Errors from configuration and MIDI output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown instrument '{0}' (expected one of: piano, chiptune, strings, flute, guitar, lead)")]
    UnknownInstrument(String),

    #[error("unknown transducer mode '{0}' (expected repetition or pair)")]
    UnknownMode(String),

    #[error("failed to write MIDI file {path}: {source}")]
    MidiWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode MIDI: {0}")]
    Encode(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
