//! MIDI rendering of an interpreted performance.
//!
//! Produces a Standard MIDI File, format 0 (single track), using `midly`.
//! Beats are converted to ticks at the configured resolution; everything
//! else (chunk layout, delta times, running status) is left to `midly`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use midly::num::{u15, u24, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use tracing::info;

use crate::interpret::{Performance, DEFAULT_TEMPO};
use crate::{Error, Result};

pub const TRACK_NAME: &str = "TextToMML Track";

/// Parameters for MIDI generation
#[derive(Debug, Clone)]
pub struct MidiParams {
    /// Ticks per quarter note (1-32767)
    pub ticks_per_beat: u16,
    /// MIDI channel (0-15)
    pub channel: u8,
    pub track_name: String,
}

impl Default for MidiParams {
    fn default() -> Self {
        MidiParams {
            ticks_per_beat: 480,
            channel: 0,
            track_name: TRACK_NAME.to_string(),
        }
    }
}

/// Largest delta a single track event can carry (28-bit variable length).
pub const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Convert a beat position to ticks
pub fn beat_to_tick(beat: f64, ticks_per_beat: u16) -> u64 {
    (beat * ticks_per_beat as f64).round() as u64
}

/// Microseconds per quarter note for a tempo, clamped to what a tempo meta event holds.
pub fn tempo_micros(bpm: u32) -> u32 {
    (60_000_000 / bpm.max(1)).min(0xFF_FFFF)
}

/// Sort rank for events sharing a tick: setup first, then note-offs before note-ons
/// so a repeated pitch is released before it is struck again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Name,
    Tempo,
    Program,
    NoteOff,
    NoteOn,
}

/// Build an in-memory SMF for a performance.
pub fn to_smf<'a>(performance: &Performance, params: &'a MidiParams) -> Smf<'a> {
    let ticks_per_beat = params.ticks_per_beat.clamp(1, 0x7FFF);
    let channel = u4::new(params.channel & 0x0F);

    let mut events: Vec<(u64, Rank, TrackEventKind<'a>)> = Vec::new();

    events.push((
        0,
        Rank::Name,
        TrackEventKind::Meta(MetaMessage::TrackName(params.track_name.as_bytes())),
    ));

    let starts_with_tempo = performance
        .tempo_changes
        .first()
        .is_some_and(|tc| tc.beat == 0.0);
    if !starts_with_tempo {
        events.push((
            0,
            Rank::Tempo,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_micros(DEFAULT_TEMPO)))),
        ));
    }
    for change in &performance.tempo_changes {
        events.push((
            beat_to_tick(change.beat, ticks_per_beat),
            Rank::Tempo,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_micros(change.bpm)))),
        ));
    }

    events.push((
        0,
        Rank::Program,
        TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(performance.program.wire_program()),
            },
        },
    ));

    for note in &performance.notes {
        let start = beat_to_tick(note.start, ticks_per_beat);
        // A note always sounds for at least one tick
        let end = beat_to_tick(note.end(), ticks_per_beat).max(start.saturating_add(1));
        let key = u7::new(note.pitch);

        events.push((
            start,
            Rank::NoteOn,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity),
                },
            },
        ));
        events.push((
            end,
            Rank::NoteOff,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        ));
    }

    events.sort_by_key(|(tick, rank, _)| (*tick, *rank));

    let mut track: Track<'a> = Vec::with_capacity(events.len() + 1);
    let mut last_tick = 0u64;
    for (tick, _, kind) in events {
        push_at(&mut track, &mut last_tick, tick, kind);
    }

    // Trailing rests still count toward the length of the piece
    let end_tick = beat_to_tick(performance.end_beat, ticks_per_beat).max(last_tick);
    push_at(
        &mut track,
        &mut last_tick,
        end_tick,
        TrackEventKind::Meta(MetaMessage::EndOfTrack),
    );

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(ticks_per_beat)),
    ));
    smf.tracks.push(track);
    smf
}

/// Append `kind` at absolute `tick`. Gaps wider than one delta can hold are
/// bridged with empty markers.
fn push_at<'a>(track: &mut Track<'a>, last_tick: &mut u64, tick: u64, kind: TrackEventKind<'a>) {
    let mut delta = tick - *last_tick;
    while delta > MAX_DELTA {
        track.push(TrackEvent {
            delta: u28::new(MAX_DELTA as u32),
            kind: TrackEventKind::Meta(MetaMessage::Marker(b"")),
        });
        delta -= MAX_DELTA;
    }
    track.push(TrackEvent {
        delta: u28::new(delta as u32),
        kind,
    });
    *last_tick = tick;
}

/// Encode a performance as SMF bytes.
pub fn to_midi(performance: &Performance, params: &MidiParams) -> Result<Vec<u8>> {
    let smf = to_smf(performance, params);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Write a performance to a MIDI file. The file handle is released before
/// returning, whether or not the write succeeded.
pub fn write_midi(performance: &Performance, params: &MidiParams, path: &Path) -> Result<()> {
    let smf = to_smf(performance, params);
    let to_error = |source| Error::MidiWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    smf.write_std(&mut writer).map_err(to_error)?;
    writer.flush().map_err(to_error)?;

    info!(
        path = %path.display(),
        notes = performance.notes.len(),
        program = performance.program.gm_program(),
        "wrote MIDI file"
    );
    Ok(())
}
