//! Pair-driven rules: characters are read two at a time. The first picks
//! the pitch and octave, the second picks the rhythm. Blank lines become a
//! quarter rest.

use crate::ast::{Length, Token};

use super::{voiced, Transducer};

#[derive(Debug, Clone, Copy, Default)]
pub struct PairTransducer;

/// Rhythm chosen by the second character of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rhythm {
    Note(Length),
    Rest(Length),
}

/// Rhythm for a character: its code point mod 8.
pub fn rhythm(c: char) -> Rhythm {
    match c as u32 % 8 {
        0 => Rhythm::Note(Length::new(16)),
        1 | 2 => Rhythm::Note(Length::new(8)),
        3 => Rhythm::Note(Length::new(4)),
        4 => Rhythm::Note(Length::new(2)),
        5 => Rhythm::Note(Length::dotted(8)),
        6 => Rhythm::Rest(Length::new(8)),
        _ => Rhythm::Rest(Length::new(4)),
    }
}

impl Transducer for PairTransducer {
    fn transduce_line(&self, line: &str, out: &mut Vec<Token>) {
        let chars: Vec<char> = line.chars().collect();

        for pair in chars.chunks(2) {
            match *pair {
                [first, second] => match rhythm(second) {
                    Rhythm::Note(length) => out.extend(voiced(first, length)),
                    Rhythm::Rest(length) => out.push(Token::rest(length)),
                },
                [single] => out.extend(voiced(single, Length::new(4))),
                _ => {}
            }
        }
    }

    fn empty_line(&self, out: &mut Vec<Token>) {
        out.push(Token::rest(Length::new(4)));
    }
}
