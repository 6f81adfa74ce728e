//! Named instrument table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The closed set of instruments a rendering may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Piano,
    Chiptune,
    Strings,
    Flute,
    Guitar,
    Lead,
}

impl Instrument {
    pub const ALL: [Instrument; 6] = [
        Instrument::Piano,
        Instrument::Chiptune,
        Instrument::Strings,
        Instrument::Flute,
        Instrument::Guitar,
        Instrument::Lead,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Chiptune => "chiptune",
            Instrument::Strings => "strings",
            Instrument::Flute => "flute",
            Instrument::Guitar => "guitar",
            Instrument::Lead => "lead",
        }
    }

    /// General MIDI program number, 1-based as printed in the GM tables.
    pub fn gm_program(self) -> u8 {
        match self {
            Instrument::Piano => 1,     // Acoustic Grand Piano
            Instrument::Chiptune => 81, // Lead 1 (square)
            Instrument::Strings => 49,  // String Ensemble 1
            Instrument::Flute => 74,    // Flute
            Instrument::Guitar => 25,   // Acoustic Guitar (nylon)
            Instrument::Lead => 82,     // Lead 2 (sawtooth)
        }
    }

    /// Program byte sent in a MIDI program change (0-based).
    pub fn wire_program(self) -> u8 {
        self.gm_program() - 1
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.name() == wanted)
            .ok_or_else(|| Error::UnknownInstrument(s.to_string()))
    }
}
