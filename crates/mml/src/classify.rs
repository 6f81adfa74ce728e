//! Script classification for Japanese text.
//!
//! Each character falls into exactly one class; the class decides which
//! octave the transducers place its note in.

use serde::{Deserialize, Serialize};

/// Script category of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptClass {
    Hiragana,
    Katakana,
    Kanji,
    Other,
}

impl ScriptClass {
    /// Octave a note sung on this script lands in.
    pub fn octave(self) -> u8 {
        match self {
            ScriptClass::Hiragana => 5,
            ScriptClass::Katakana => 4,
            ScriptClass::Kanji => 3,
            ScriptClass::Other => 4,
        }
    }
}

/// Classify a character by code point range.
///
/// Hiragana U+3040–U+309F, Katakana U+30A0–U+30FF, common CJK ideographs
/// U+4E00–U+9FFF. Everything else is `Other`.
pub fn classify(c: char) -> ScriptClass {
    match c {
        '\u{3040}'..='\u{309F}' => ScriptClass::Hiragana,
        '\u{30A0}'..='\u{30FF}' => ScriptClass::Katakana,
        '\u{4E00}'..='\u{9FFF}' => ScriptClass::Kanji,
        _ => ScriptClass::Other,
    }
}
