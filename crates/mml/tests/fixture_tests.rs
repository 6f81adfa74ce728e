//! Fixture-based tests for text transduction and MIDI generation.
//!
//! Each .txt file in tests/fixtures/ is transduced in both modes and compared
//! against the matching `.repetition.mml` / `.pair.mml` file, then rendered
//! to MIDI.

use mml::{interpret, to_midi, transduce, Instrument, MidiParams, Mode};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(file)
}

fn read_fixture(file: &str) -> String {
    fs::read_to_string(fixture_path(file))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", file, e))
}

fn test_fixture(name: &str) {
    let text = read_fixture(&format!("{}.txt", name));

    for mode in Mode::ALL {
        let expected = read_fixture(&format!("{}.{}.mml", name, mode));
        let mml = transduce(&text, mode);
        assert_eq!(mml, expected.trim_end(), "Fixture {} in {} mode", name, mode);

        // Transducer output always reads back cleanly
        let result = interpret(&mml, Instrument::Piano);
        assert!(
            !result.has_warnings(),
            "Fixture {} ({}) produced warnings: {:?}",
            name,
            mode,
            result.feedback
        );

        let midi = to_midi(&result.value, &MidiParams::default()).unwrap();
        assert_eq!(
            &midi[0..4],
            b"MThd",
            "Fixture {} produced invalid MIDI header",
            name
        );
        assert!(
            midi.len() > 20,
            "Fixture {} produced suspiciously short MIDI: {} bytes",
            name,
            midi.len()
        );

        println!(
            "Fixture {} ({}): {} notes, {:.2}s, {} bytes MIDI",
            name,
            mode,
            result.value.notes.len(),
            result.value.duration_seconds(),
            midi.len()
        );
    }
}

#[test]
fn test_fixture_greeting() {
    test_fixture("greeting");
}

#[test]
fn test_fixture_repeats() {
    test_fixture("repeats");
}

#[test]
fn test_fixture_latin() {
    test_fixture("latin");
}

#[test]
fn test_transduce_then_interpret_beats() {
    // ああ -> one quarter note; 。 -> quarter rest
    let mml = transduce("ああ。", Mode::Repetition);
    let perf = interpret(&mml, Instrument::Piano).value;

    assert_eq!(perf.notes.len(), 1);
    assert_eq!(perf.notes[0].pitch, 78); // o5 f+
    assert_eq!(perf.notes[0].duration, 1.0);
    assert_eq!(perf.end_beat, 2.0);
    // t180 at beat 0 replaces the prelude's t120
    assert_eq!(perf.tempo_at(0.0), 180);
}

#[test]
fn test_instrument_reaches_program_change() {
    let mml = transduce("ねこ", Mode::Pair);
    for instrument in Instrument::ALL {
        let perf = interpret(&mml, instrument).value;
        let bytes = to_midi(&perf, &MidiParams::default()).unwrap();
        let smf = midly::Smf::parse(&bytes).unwrap();

        let program = smf.tracks[0].iter().find_map(|e| match e.kind {
            midly::TrackEventKind::Midi {
                message: midly::MidiMessage::ProgramChange { program },
                ..
            } => Some(program.as_int()),
            _ => None,
        });
        assert_eq!(program, Some(instrument.gm_program() - 1));
    }
}
