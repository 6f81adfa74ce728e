//! Repetition-driven rules: a run of identical characters is one note whose
//! length grows with the run. Punctuation becomes rests. Blank lines are
//! skipped.

use crate::ast::{Length, Token};

use super::{voiced, Transducer};

/// Commas: a short breath
const SHORT_PAUSE: [char; 3] = ['、', '，', ','];
/// Sentence ends: a full beat of silence
const LONG_PAUSE: [char; 7] = ['。', '．', '.', '！', '!', '？', '?'];

#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionTransducer;

/// Note denominator for a run of `run` identical characters.
pub fn run_denominator(run: usize) -> u32 {
    match run {
        0 | 1 => 8,
        2 => 4,
        3 => 2,
        _ => 1,
    }
}

impl Transducer for RepetitionTransducer {
    fn transduce_line(&self, line: &str, out: &mut Vec<Token>) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if SHORT_PAUSE.contains(&c) {
                out.push(Token::rest(Length::new(16)));
                i += 1;
                continue;
            }
            if LONG_PAUSE.contains(&c) {
                out.push(Token::rest(Length::new(4)));
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&next| next == c).count();
            out.extend(voiced(c, Length::new(run_denominator(run))));
            i += run;
        }
    }

    fn empty_line(&self, _out: &mut Vec<Token>) {}
}
