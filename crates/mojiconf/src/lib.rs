//! Minimal configuration loading for mojioto.
//!
//! The only musical choice exposed to users is the instrument; the rest of
//! the file covers which transducer to run, MIDI resolution and logging.
//! Names are kept as strings here and validated by the caller, so this
//! crate stays free of the music code.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/mojioto/config.toml` (system)
//! 2. `~/.config/mojioto/config.toml` (user)
//! 3. `./mojioto.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`MOJIOTO_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [defaults]
//! instrument = "flute"
//! mode = "pair"
//!
//! [midi]
//! ticks_per_beat = 960
//! track_name = "Haiku"
//!
//! [telemetry]
//! log_level = "debug"
//! ```

pub mod loader;

pub use loader::{discover_config_files, discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// What to play when the command line doesn't say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Instrument name (piano, chiptune, strings, flute, guitar, lead)
    #[serde(default = "DefaultsConfig::default_instrument")]
    pub instrument: String,

    /// Transducer rule set (repetition or pair)
    #[serde(default = "DefaultsConfig::default_mode")]
    pub mode: String,
}

impl DefaultsConfig {
    fn default_instrument() -> String {
        "piano".to_string()
    }

    fn default_mode() -> String {
        "repetition".to_string()
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            instrument: Self::default_instrument(),
            mode: Self::default_mode(),
        }
    }
}

/// MIDI file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiConfig {
    #[serde(default = "MidiConfig::default_ticks_per_beat")]
    pub ticks_per_beat: u16,

    #[serde(default = "MidiConfig::default_track_name")]
    pub track_name: String,
}

impl MidiConfig {
    fn default_ticks_per_beat() -> u16 {
        480
    }

    fn default_track_name() -> String {
        "TextToMML Track".to_string()
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            ticks_per_beat: Self::default_ticks_per_beat(),
            track_name: Self::default_track_name(),
        }
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. "warn" or "mml=debug"
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Complete mojioto configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MojiConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub midi: MidiConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl MojiConfig {
    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` stand in for `./mojioto.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables were applied.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = MojiConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# mojioto configuration\n\n");

        output.push_str("[defaults]\n");
        output.push_str(&format!("instrument = {}\n", quoted(&self.defaults.instrument)));
        output.push_str(&format!("mode = {}\n", quoted(&self.defaults.mode)));

        output.push_str("\n[midi]\n");
        output.push_str(&format!("ticks_per_beat = {}\n", self.midi.ticks_per_beat));
        output.push_str(&format!("track_name = {}\n", quoted(&self.midi.track_name)));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = {}\n", quoted(&self.telemetry.log_level)));

        output
    }
}

/// A TOML basic or literal string holding `value`, escaped as needed.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MojiConfig::default();
        assert_eq!(config.defaults.instrument, "piano");
        assert_eq!(config.defaults.mode, "repetition");
        assert_eq!(config.midi.ticks_per_beat, 480);
        assert_eq!(config.midi.track_name, "TextToMML Track");
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = MojiConfig::default();
        config.defaults.instrument = "lead".to_string();
        config.midi.ticks_per_beat = 96;

        let text = config.to_toml();
        assert!(text.contains("[defaults]"));
        assert!(text.contains("[midi]"));
        assert!(text.contains("[telemetry]"));

        let parsed: MojiConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_toml_escapes_strings() {
        let mut config = MojiConfig::default();
        config.midi.track_name = r#"Say "hi" C:\x"#.to_string();
        config.telemetry.log_level = "mml=debug,\"odd\"".to_string();
        config.defaults.instrument = "it's\ttabbed".to_string();

        let parsed: MojiConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_serde_fills_missing_sections() {
        let parsed: MojiConfig = toml::from_str("[defaults]\nmode = \"pair\"\n").unwrap();
        assert_eq!(parsed.defaults.mode, "pair");
        assert_eq!(parsed.defaults.instrument, "piano");
        assert_eq!(parsed.midi, MidiConfig::default());
    }

    #[test]
    fn test_load_with_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[midi]\ntrack_name = \"Custom\"\n").unwrap();

        let (config, sources) = MojiConfig::load_with_sources_from(Some(&path)).unwrap();
        assert_eq!(config.midi.track_name, "Custom");
        assert!(sources.files.contains(&path));
    }
}
