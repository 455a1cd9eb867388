use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unit in which the usage API reports values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    KilowattHours,
    AmpHours,
    Dollars,
    Trees,
    GallonsOfGas,
    MilesDriven,
    Carbon,
}

impl EnergyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyUnit::KilowattHours => "KilowattHours",
            EnergyUnit::AmpHours => "AmpHours",
            EnergyUnit::Dollars => "Dollars",
            EnergyUnit::Trees => "Trees",
            EnergyUnit::GallonsOfGas => "GallonsOfGas",
            EnergyUnit::MilesDriven => "MilesDriven",
            EnergyUnit::Carbon => "Carbon",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnergyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kilowatthours" | "kwh" => Ok(EnergyUnit::KilowattHours),
            "amphours" | "ah" => Ok(EnergyUnit::AmpHours),
            "dollars" | "usd" => Ok(EnergyUnit::Dollars),
            "trees" => Ok(EnergyUnit::Trees),
            "gallonsofgas" => Ok(EnergyUnit::GallonsOfGas),
            "milesdriven" => Ok(EnergyUnit::MilesDriven),
            "carbon" => Ok(EnergyUnit::Carbon),
            _ => Err(format!("Unknown energy unit: {}", s)),
        }
    }
}
