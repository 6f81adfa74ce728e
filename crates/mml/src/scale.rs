//! Chromatic scale lookup and MIDI pitch arithmetic.

use crate::ast::{Accidental, NoteName};

/// The twelve pitch classes starting at C, spelled with sharps.
pub const CHROMATIC: [(NoteName, Option<Accidental>); 12] = [
    (NoteName::C, None),
    (NoteName::C, Some(Accidental::Sharp)),
    (NoteName::D, None),
    (NoteName::D, Some(Accidental::Sharp)),
    (NoteName::E, None),
    (NoteName::F, None),
    (NoteName::F, Some(Accidental::Sharp)),
    (NoteName::G, None),
    (NoteName::G, Some(Accidental::Sharp)),
    (NoteName::A, None),
    (NoteName::A, Some(Accidental::Sharp)),
    (NoteName::B, None),
];

const SPELLING: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch class of a character: its code point mod 12.
pub fn pitch_class(c: char) -> (NoteName, Option<Accidental>) {
    CHROMATIC[(c as u32 % 12) as usize]
}

/// Semitone within the octave, always in `0..12`.
///
/// Sharps wrap (`b+` is C of the same octave). Flats are played natural.
pub fn semitone(name: NoteName, accidental: Option<Accidental>) -> u8 {
    match accidental {
        Some(Accidental::Sharp) => (name.semitone() + 1) % 12,
        Some(Accidental::Flat) | None => name.semitone(),
    }
}

/// MIDI note number for a semitone in an MML octave, with C4 = 60.
///
/// Returns `None` when the result falls outside 0-127.
pub fn midi_pitch(octave: u32, semitone: u8) -> Option<u8> {
    let pitch = (octave as u64 + 1) * 12 + semitone as u64;
    u8::try_from(pitch).ok().filter(|p| *p <= 127)
}

/// Scientific pitch name for a MIDI note number, e.g. 61 -> "C#4".
pub fn spell(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", SPELLING[(pitch % 12) as usize], octave)
}
