//! mojioto - turn text into MML, and optionally into a MIDI file
//!
//! Reads a text file (or piped stdin), prints the MML on stdout and, with
//! `--midi`, renders it to a Standard MIDI File. Logs go to stderr.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mml::{
    interpret, transduce, write_midi, Instrument, MidiParams, Mode, ParseResult, Performance,
};
use mojiconf::MojiConfig;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod events;

#[derive(Parser, Debug)]
#[command(name = "mojioto")]
#[command(about = "Convert text to MML and optionally MIDI")]
#[command(version)]
struct Cli {
    /// Input text file (reads piped stdin when omitted)
    file: Option<PathBuf>,

    /// Output MIDI file path
    #[arg(short, long, value_name = "PATH")]
    midi: Option<PathBuf>,

    /// Instrument: piano, chiptune, strings, flute, guitar, lead
    #[arg(short, long)]
    instrument: Option<String>,

    /// Transducer: repetition or pair
    #[arg(long)]
    mode: Option<String>,

    /// Config file to use instead of ./mojioto.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the interpreted note events as JSON
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,

    /// Print note count and duration to stderr
    #[arg(long)]
    summary: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Surface every interpreter warning, returning how many there were.
fn log_feedback(result: &ParseResult<Performance>) -> usize {
    let mut count = 0;
    for feedback in result.warnings() {
        warn!(?feedback, "interpreter skipped a token");
        count += 1;
    }
    count
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => anyhow!("File '{}' not found", path.display()),
            io::ErrorKind::InvalidData => {
                anyhow!("File '{}' is not valid UTF-8 text", path.display())
            }
            _ => anyhow::Error::new(e).context(format!("reading '{}'", path.display())),
        }),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "Please provide a file path or pipe text to stdin.",
                    )
                    .exit();
            }
            let mut text = String::new();
            stdin
                .lock()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = MojiConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.telemetry.log_level);

    if cli.print_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    // Names are checked before any input is read
    let instrument: Instrument = cli
        .instrument
        .as_deref()
        .unwrap_or(&config.defaults.instrument)
        .parse()?;
    let mode: Mode = cli
        .mode
        .as_deref()
        .unwrap_or(&config.defaults.mode)
        .parse()?;

    let text = read_input(cli.file.as_deref())?;
    if text.is_empty() {
        debug!("empty input, nothing to do");
        return Ok(());
    }

    let mml = transduce(&text, mode);
    let result = interpret(&mml, instrument);
    log_feedback(&result);
    let performance = result.value;

    println!("{}", mml);

    if let Some(path) = &cli.midi {
        let params = MidiParams {
            ticks_per_beat: config.midi.ticks_per_beat,
            track_name: config.midi.track_name.clone(),
            ..MidiParams::default()
        };
        write_midi(&performance, &params, path)?;
        eprintln!("MIDI saved to {}", path.display());
    }

    if let Some(path) = &cli.events {
        events::write_events(&events::EventsDump::new(mode, &mml, &performance), path)?;
    }

    if cli.summary {
        eprintln!(
            "{} notes, {} beats, {:.2}s ({}, {})",
            performance.notes.len(),
            performance.end_beat,
            performance.duration_seconds(),
            instrument,
            mode
        );
    }

    Ok(())
}
