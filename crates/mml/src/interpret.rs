//! MML interpreter.
//!
//! Walks the token stream once, left to right, keeping the playback state
//! (octave, default length, volume, playhead) and collecting timed note
//! events plus tempo markers. Tokens that fail to parse are reported and
//! dropped; they never change state or stop the walk.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ast::{Accidental, Length, Token};
use crate::feedback::{FeedbackCollector, ParseResult};
use crate::instrument::Instrument;
use crate::parser::{tokenize, SourceToken};
use crate::scale;

pub const DEFAULT_OCTAVE: u32 = 4;
pub const DEFAULT_LENGTH: Length = Length {
    denominator: 8,
    dots: 0,
};
pub const DEFAULT_VOLUME: u32 = 10;
/// Tempo in effect before the first tempo marker
pub const DEFAULT_TEMPO: u32 = 120;

/// Highest MML volume level; levels above it saturate the velocity.
pub const MAX_VOLUME: u32 = 15;

/// Scale an MML volume level (0-15) to a MIDI velocity (0-127).
pub fn volume_to_velocity(level: u32) -> u8 {
    let scaled = (level as f64 * 127.0 / MAX_VOLUME as f64).round();
    scaled.min(127.0) as u8
}

/// A sounding note. Times are in quarter-note beats from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start: f64,
    pub duration: f64,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Scientific pitch name, e.g. "C#4"
    pub fn name(&self) -> String {
        scale::spell(self.pitch)
    }
}

/// Tempo marker at a point on the playhead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub beat: f64,
    pub bpm: u32,
}

/// Mutable state carried from token to token
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub octave: u32,
    pub length: Length,
    pub volume: u32,
    pub velocity: u8,
    /// Playhead in beats. Only ever moves forward.
    pub time: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            octave: DEFAULT_OCTAVE,
            length: DEFAULT_LENGTH,
            volume: DEFAULT_VOLUME,
            velocity: volume_to_velocity(DEFAULT_VOLUME),
            time: 0.0,
        }
    }
}

/// Everything a MIDI writer needs: program, tempo map and notes in time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub program: Instrument,
    pub tempo_changes: Vec<TempoChange>,
    pub notes: Vec<NoteEvent>,
    /// Playhead position after the last token
    pub end_beat: f64,
}

impl Performance {
    pub fn new(program: Instrument) -> Self {
        Performance {
            program,
            tempo_changes: Vec::new(),
            notes: Vec::new(),
            end_beat: 0.0,
        }
    }

    /// Tempo in effect at `beat`
    pub fn tempo_at(&self, beat: f64) -> u32 {
        self.tempo_changes
            .iter()
            .rev()
            .find(|tc| tc.beat <= beat)
            .map(|tc| tc.bpm)
            .unwrap_or(DEFAULT_TEMPO)
    }

    /// Wall-clock seconds from the start to `beat`, following the tempo map.
    pub fn seconds_at(&self, beat: f64) -> f64 {
        let mut seconds = 0.0;
        let mut last_beat = 0.0;
        let mut bpm = DEFAULT_TEMPO as f64;

        for change in &self.tempo_changes {
            if change.beat >= beat {
                break;
            }
            seconds += (change.beat - last_beat) * 60.0 / bpm;
            last_beat = change.beat;
            bpm = change.bpm as f64;
        }

        seconds + (beat - last_beat) * 60.0 / bpm
    }

    pub fn duration_seconds(&self) -> f64 {
        self.seconds_at(self.end_beat)
    }
}

/// Single-pass MML state machine
#[derive(Debug)]
pub struct Interpreter {
    state: PlaybackState,
    performance: Performance,
    collector: FeedbackCollector,
}

impl Interpreter {
    pub fn new(program: Instrument) -> Self {
        Interpreter {
            state: PlaybackState::default(),
            performance: Performance::new(program),
            collector: FeedbackCollector::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Process one token from the source stream. Parse failures are
    /// recorded and otherwise ignored.
    pub fn feed(&mut self, source: SourceToken<'_>) {
        self.collector
            .set_position(source.index, source.offset, source.text);

        match source.token {
            Ok(token) => self.apply(&token),
            Err(err) => {
                debug!(token = source.text, error = %err, "skipping token");
                match err.suggestion() {
                    Some(hint) => self.collector.warning_with_suggestion(err.to_string(), hint),
                    None => self.collector.warning(err.to_string()),
                }
            }
        }
    }

    /// Apply a well-formed token to the playback state.
    pub fn apply(&mut self, token: &Token) {
        match token {
            Token::Tempo(bpm) => self.tempo(*bpm),
            Token::Octave(octave) => self.state.octave = *octave,
            Token::DefaultLength(length) => self.state.length = *length,
            Token::Volume(level) => {
                self.state.volume = *level;
                self.state.velocity = volume_to_velocity(*level);
            }
            Token::Program(_) => {}
            Token::Rest(length) => {
                let length = length.unwrap_or(self.state.length);
                self.state.time += length.beats();
            }
            Token::Note {
                name,
                accidental,
                length,
            } => {
                let length = length.unwrap_or(self.state.length);
                let duration = length.beats();

                if *accidental == Some(Accidental::Flat) {
                    self.collector.info("Flats are played as the natural note");
                }

                let semitone = scale::semitone(*name, *accidental);
                match scale::midi_pitch(self.state.octave, semitone) {
                    Some(pitch) => self.performance.notes.push(NoteEvent {
                        pitch,
                        start: self.state.time,
                        duration,
                        velocity: self.state.velocity,
                    }),
                    None => {
                        warn!(
                            octave = self.state.octave,
                            semitone, "note outside MIDI range, treating as rest"
                        );
                        self.collector.warning_with_suggestion(
                            "Note is outside the MIDI range and was played as a rest",
                            "Keep octaves between 0 and 9",
                        );
                    }
                }

                self.state.time += duration;
            }
        }
    }

    /// At most one marker per instant: a later tempo at the same beat wins.
    fn tempo(&mut self, bpm: u32) {
        let now = self.state.time;
        match self.performance.tempo_changes.last_mut() {
            Some(last) if last.beat == now => last.bpm = bpm,
            _ => self
                .performance
                .tempo_changes
                .push(TempoChange { beat: now, bpm }),
        }
    }

    pub fn finish(mut self) -> ParseResult<Performance> {
        self.performance.end_beat = self.state.time;
        ParseResult::new(self.performance, self.collector.into_feedback())
    }
}

/// Interpret an MML string for the given instrument.
pub fn interpret(mml: &str, program: Instrument) -> ParseResult<Performance> {
    let mut interpreter = Interpreter::new(program);
    for source in tokenize(mml) {
        interpreter.feed(source);
    }
    interpreter.finish()
}

/// Interpret already-parsed tokens.
pub fn interpret_tokens(tokens: &[Token], program: Instrument) -> ParseResult<Performance> {
    let mut interpreter = Interpreter::new(program);
    for (index, token) in tokens.iter().enumerate() {
        interpreter
            .collector
            .set_position(index, 0, &token.to_string());
        interpreter.apply(token);
    }
    interpreter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackLevel;
    use pretty_assertions::assert_eq;

    fn perform(mml: &str) -> Performance {
        interpret(mml, Instrument::Piano).value
    }

    #[test]
    fn test_middle_c_quarter() {
        let perf = perform("o4 c4");
        assert_eq!(
            perf.notes,
            vec![NoteEvent {
                pitch: 60,
                start: 0.0,
                duration: 1.0,
                velocity: 85,
            }]
        );
        assert_eq!(perf.end_beat, 1.0);
    }

    #[test]
    fn test_defaults() {
        let state = PlaybackState::default();
        assert_eq!(state.octave, 4);
        assert_eq!(state.length.denominator, 8);
        assert_eq!(state.volume, 10);
        assert_eq!(state.velocity, 85);

        // Default length is an eighth
        let perf = perform("c");
        assert_eq!(perf.notes[0].duration, 0.5);
    }

    #[test]
    fn test_volume_scaling() {
        assert_eq!(volume_to_velocity(0), 0);
        assert_eq!(volume_to_velocity(10), 85);
        assert_eq!(volume_to_velocity(15), 127);
        assert_eq!(volume_to_velocity(16), 127);
        assert_eq!(volume_to_velocity(u32::MAX), 127);

        let perf = perform("v15 c v3 c");
        assert_eq!(perf.notes[0].velocity, 127);
        assert_eq!(perf.notes[1].velocity, 25);
    }

    #[test]
    fn test_octave_and_sharps() {
        let perf = perform("o5 a4 o3 c+ o4 b+");
        let pitches: Vec<u8> = perf.notes.iter().map(|n| n.pitch).collect();
        // b+ wraps to C of the same octave
        assert_eq!(pitches, vec![81, 49, 60]);
    }

    #[test]
    fn test_flat_is_natural() {
        let result = interpret("e-4", Instrument::Piano);
        assert_eq!(result.value.notes[0].pitch, 64);
        assert_eq!(result.feedback[0].level, FeedbackLevel::Info);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_default_length_command() {
        let perf = perform("l4 c d l16 e r");
        let starts: Vec<f64> = perf.notes.iter().map(|n| n.start).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
        assert_eq!(perf.notes[2].duration, 0.25);
        assert_eq!(perf.end_beat, 2.5);
    }

    #[test]
    fn test_rests_advance_without_events() {
        let perf = perform("r4 c8 r2 d1");
        assert_eq!(perf.notes.len(), 2);
        assert_eq!(perf.notes[0].start, 1.0);
        assert_eq!(perf.notes[1].start, 3.5);
        assert_eq!(perf.end_beat, 7.5);
    }

    #[test]
    fn test_total_beats_is_sum_of_lengths() {
        let mml = "c4 r8 d16 e2 r1 f+32 g8. r16 a b1";
        let expected: f64 = [1.0, 0.5, 0.25, 2.0, 4.0, 0.125, 0.75, 0.25, 0.5, 4.0]
            .iter()
            .sum();
        assert_eq!(perform(mml).end_beat, expected);
    }

    #[test]
    fn test_playhead_never_moves_back() {
        let perf = perform("t120 o4 c4 t90 d8 v3 r4 e16 o9 g1");
        for pair in perf.notes.windows(2) {
            assert!(pair[1].start >= pair[0].end());
        }
        for pair in perf.tempo_changes.windows(2) {
            assert!(pair[1].beat >= pair[0].beat);
        }
    }

    #[test]
    fn test_unknown_command_is_inert() {
        let with = interpret("o5 v3 c4 z99 d4", Instrument::Piano);
        let without = interpret("o5 v3 c4 d4", Instrument::Piano);

        assert_eq!(with.value, without.value);
        assert_eq!(with.feedback.len(), 1);
        assert_eq!(with.feedback[0].token.as_deref(), Some("z99"));
        assert_eq!(with.feedback[0].token_index, 3);
    }

    #[test]
    fn test_garbage_does_not_halt() {
        let perf = perform("c4 ??? t0 c0 l0 o q c4x rr v- @ c4");
        assert_eq!(perf.notes.len(), 2);
        assert_eq!(perf.notes[1].start, 1.0);
        assert_eq!(perf.end_beat, 2.0);
        assert!(perf.tempo_changes.is_empty());
    }

    #[test]
    fn test_tempo_markers() {
        let perf = perform("t120 v10 @0 t180 c4 t100 d4");
        assert_eq!(
            perf.tempo_changes,
            vec![
                TempoChange {
                    beat: 0.0,
                    bpm: 180
                },
                TempoChange {
                    beat: 1.0,
                    bpm: 100
                },
            ]
        );
        assert_eq!(perf.tempo_at(0.5), 180);
        assert_eq!(perf.tempo_at(1.0), 100);
    }

    #[test]
    fn test_seconds_follow_tempo_map() {
        // No markers: 120 BPM, half a second per beat
        assert_eq!(perform("c4 c4").duration_seconds(), 1.0);

        // One beat at 60 BPM, then two at 120
        let perf = perform("t60 c4 t120 c4 c4");
        assert_eq!(perf.seconds_at(1.0), 1.0);
        assert_eq!(perf.duration_seconds(), 2.0);
    }

    #[test]
    fn test_out_of_range_note_is_a_rest() {
        let result = interpret("o10 c4 o4 c4", Instrument::Piano);
        assert_eq!(result.value.notes.len(), 1);
        assert_eq!(result.value.notes[0].start, 1.0);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_interpret_tokens_matches_string() {
        let parsed = crate::parser::parse("t150 o3 g4 r8 a+");
        let from_tokens = interpret_tokens(&parsed.value, Instrument::Flute);
        let from_text = interpret("t150 o3 g4 r8 a+", Instrument::Flute);
        assert_eq!(from_tokens.value, from_text.value);
        assert_eq!(from_tokens.value.program, Instrument::Flute);
    }

    #[test]
    fn test_note_names() {
        let perf = perform("o4 c+4 o5 a");
        let names: Vec<String> = perf.notes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["C#4", "A5"]);
    }
}
