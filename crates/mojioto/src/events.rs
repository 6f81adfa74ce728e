//! JSON dump of an interpreted performance (`--events`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mml::{Instrument, Mode, Performance, TempoChange};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EventsDump<'a> {
    pub mode: Mode,
    pub instrument: Instrument,
    /// 1-based General MIDI program
    pub program: u8,
    pub mml: &'a str,
    pub end_beat: f64,
    pub duration_seconds: f64,
    pub tempo_changes: &'a [TempoChange],
    pub notes: Vec<NamedNote>,
}

/// A note event with its spelled pitch and wall-clock start.
#[derive(Debug, Serialize)]
pub struct NamedNote {
    pub name: String,
    pub pitch: u8,
    pub start: f64,
    pub duration: f64,
    pub velocity: u8,
    pub start_seconds: f64,
}

impl<'a> EventsDump<'a> {
    pub fn new(mode: Mode, mml: &'a str, performance: &'a Performance) -> Self {
        let notes = performance
            .notes
            .iter()
            .map(|note| NamedNote {
                name: note.name(),
                pitch: note.pitch,
                start: note.start,
                duration: note.duration,
                velocity: note.velocity,
                start_seconds: performance.seconds_at(note.start),
            })
            .collect();

        Self {
            mode,
            instrument: performance.program,
            program: performance.program.gm_program(),
            mml,
            end_beat: performance.end_beat,
            duration_seconds: performance.duration_seconds(),
            tempo_changes: &performance.tempo_changes,
            notes,
        }
    }
}

pub fn write_events(dump: &EventsDump<'_>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(dump).context("serializing events")?;
    fs::write(path, json).with_context(|| format!("writing events to {}", path.display()))?;
    Ok(())
}
