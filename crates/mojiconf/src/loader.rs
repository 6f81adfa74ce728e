//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, DefaultsConfig, MidiConfig, MojiConfig, TelemetryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// A `cli_path` replaces the local `mojioto.toml` and is returned even when
/// missing, so that loading it reports the read failure.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/mojioto/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("mojioto/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("mojioto.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<MojiConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from TOML string. Unknown keys and values of the wrong type
/// are ignored; only broken TOML and impossible numbers are errors.
fn parse_toml(contents: &str, path: &Path) -> Result<MojiConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config = MojiConfig::default();

    if let Some(defaults) = table.get("defaults").and_then(|v| v.as_table()) {
        if let Some(v) = defaults.get("instrument").and_then(|v| v.as_str()) {
            config.defaults.instrument = v.to_string();
        }
        if let Some(v) = defaults.get("mode").and_then(|v| v.as_str()) {
            config.defaults.mode = v.to_string();
        }
    }

    if let Some(midi) = table.get("midi").and_then(|v| v.as_table()) {
        if let Some(v) = midi.get("ticks_per_beat").and_then(|v| v.as_integer()) {
            config.midi.ticks_per_beat = parse_ticks(v).ok_or_else(|| ConfigError::Parse {
                path: path.to_path_buf(),
                message: format!("midi.ticks_per_beat must be 1-32767, got {}", v),
            })?;
        }
        if let Some(v) = midi.get("track_name").and_then(|v| v.as_str()) {
            config.midi.track_name = v.to_string();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(config)
}

/// SMF division holds 15 bits.
fn parse_ticks(v: i64) -> Option<u16> {
    u16::try_from(v).ok().filter(|t| (1..=0x7FFF).contains(t))
}

/// Merge two configs, with `overlay` taking precedence wherever it differs
/// from the defaults.
pub fn merge_configs(base: MojiConfig, overlay: MojiConfig) -> MojiConfig {
    let defaults = DefaultsConfig::default();
    let midi = MidiConfig::default();
    let telemetry = TelemetryConfig::default();

    MojiConfig {
        defaults: DefaultsConfig {
            instrument: if overlay.defaults.instrument != defaults.instrument {
                overlay.defaults.instrument
            } else {
                base.defaults.instrument
            },
            mode: if overlay.defaults.mode != defaults.mode {
                overlay.defaults.mode
            } else {
                base.defaults.mode
            },
        },
        midi: MidiConfig {
            ticks_per_beat: if overlay.midi.ticks_per_beat != midi.ticks_per_beat {
                overlay.midi.ticks_per_beat
            } else {
                base.midi.ticks_per_beat
            },
            track_name: if overlay.midi.track_name != midi.track_name {
                overlay.midi.track_name
            } else {
                base.midi.track_name
            },
        },
        telemetry: TelemetryConfig {
            log_level: if overlay.telemetry.log_level != telemetry.log_level {
                overlay.telemetry.log_level
            } else {
                base.telemetry.log_level
            },
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut MojiConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from any key lookup. Split out so tests need not touch
/// the process environment.
fn apply_overrides_from<F>(config: &mut MojiConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("MOJIOTO_INSTRUMENT") {
        config.defaults.instrument = v;
        sources.env_overrides.push("MOJIOTO_INSTRUMENT".to_string());
    }
    if let Some(v) = lookup("MOJIOTO_MODE") {
        config.defaults.mode = v;
        sources.env_overrides.push("MOJIOTO_MODE".to_string());
    }

    if let Some(v) = lookup("MOJIOTO_TICKS_PER_BEAT") {
        if let Some(ticks) = v.trim().parse::<i64>().ok().and_then(parse_ticks) {
            config.midi.ticks_per_beat = ticks;
            sources.env_overrides.push("MOJIOTO_TICKS_PER_BEAT".to_string());
        }
    }
    if let Some(v) = lookup("MOJIOTO_TRACK_NAME") {
        config.midi.track_name = v;
        sources.env_overrides.push("MOJIOTO_TRACK_NAME".to_string());
    }

    if let Some(v) = lookup("MOJIOTO_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("MOJIOTO_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over everything
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}
