//! MML token types.
//!
//! A token is one whitespace-delimited command. Tokens render back to the
//! exact text the transducers emit, so `Token::to_string` is the MML writer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// Semitone offset from C within an octave
    pub fn semitone(self) -> u8 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Lowercase MML letter
    pub fn letter(self) -> char {
        match self {
            NoteName::C => 'c',
            NoteName::D => 'd',
            NoteName::E => 'e',
            NoteName::F => 'f',
            NoteName::G => 'g',
            NoteName::A => 'a',
            NoteName::B => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'c' => Some(NoteName::C),
            'd' => Some(NoteName::D),
            'e' => Some(NoteName::E),
            'f' => Some(NoteName::F),
            'g' => Some(NoteName::G),
            'a' => Some(NoteName::A),
            'b' => Some(NoteName::B),
            _ => None,
        }
    }
}

/// Accidental following a note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    /// `+` or `#`
    Sharp,
    /// `-`. Played as the natural note.
    Flat,
}

/// Explicit duration: a denominator of a whole note plus augmentation dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Length {
    /// 1 = whole, 4 = quarter, 8 = eighth. Never zero.
    pub denominator: u32,
    pub dots: u8,
}

impl Length {
    pub fn new(denominator: u32) -> Self {
        Length {
            denominator,
            dots: 0,
        }
    }

    pub fn dotted(denominator: u32) -> Self {
        Length {
            denominator,
            dots: 1,
        }
    }

    /// Duration in quarter-note beats: `4 / denominator`, each dot adding
    /// half of the previous increment.
    pub fn beats(&self) -> f64 {
        let base = 4.0 / self.denominator as f64;
        let mut total = base;
        let mut add = base;
        for _ in 0..self.dots {
            add /= 2.0;
            total += add;
        }
        total
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.denominator)?;
        for _ in 0..self.dots {
            f.write_str(".")?;
        }
        Ok(())
    }
}

/// One MML command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// `t<bpm>`
    Tempo(u32),
    /// `v<level>`, MML scale 0-15
    Volume(u32),
    /// `o<octave>`
    Octave(u32),
    /// `l<length>`, default length for notes and rests without one
    DefaultLength(Length),
    /// `@<n>`, instrument reset marker
    Program(u32),
    /// `r[length]`
    Rest(Option<Length>),
    /// `<letter>[+#-][length]`
    Note {
        name: NoteName,
        accidental: Option<Accidental>,
        length: Option<Length>,
    },
}

impl Token {
    pub fn note(name: NoteName, accidental: Option<Accidental>, length: Length) -> Self {
        Token::Note {
            name,
            accidental,
            length: Some(length),
        }
    }

    pub fn rest(length: Length) -> Self {
        Token::Rest(Some(length))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Tempo(bpm) => write!(f, "t{}", bpm),
            Token::Volume(level) => write!(f, "v{}", level),
            Token::Octave(octave) => write!(f, "o{}", octave),
            Token::DefaultLength(length) => write!(f, "l{}", length),
            Token::Program(n) => write!(f, "@{}", n),
            Token::Rest(length) => {
                f.write_str("r")?;
                if let Some(length) = length {
                    write!(f, "{}", length)?;
                }
                Ok(())
            }
            Token::Note {
                name,
                accidental,
                length,
            } => {
                write!(f, "{}", name.letter())?;
                match accidental {
                    Some(Accidental::Sharp) => f.write_str("+")?,
                    Some(Accidental::Flat) => f.write_str("-")?,
                    None => {}
                }
                if let Some(length) = length {
                    write!(f, "{}", length)?;
                }
                Ok(())
            }
        }
    }
}

/// Join tokens into a single space-separated MML line.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
