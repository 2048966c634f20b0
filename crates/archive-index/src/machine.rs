//! Machine Type Vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four machine types of the MIMII dataset.
///
/// The token appears in archive filenames (`6_dB_fan.zip`) and selects the
/// trained model artifact and its feature columns at prediction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineType {
    Fan,
    Pump,
    Slider,
    Valve,
}

impl MachineType {
    /// All supported machine types
    pub const ALL: [MachineType; 4] = [
        MachineType::Fan,
        MachineType::Pump,
        MachineType::Slider,
        MachineType::Valve,
    ];

    /// Lowercase token as used in archive and model filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::Fan => "fan",
            MachineType::Pump => "pump",
            MachineType::Slider => "slider",
            MachineType::Valve => "valve",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fan" => Ok(MachineType::Fan),
            "pump" => Ok(MachineType::Pump),
            "slider" => Ok(MachineType::Slider),
            "valve" => Ok(MachineType::Valve),
            _ => Err(()),
        }
    }
}
