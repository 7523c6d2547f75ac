//! Transfer object size constraints

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared size range for transfer objects of one type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraint {
    #[serde(default)]
    pub units_type: Option<String>,

    #[serde(default)]
    pub min_size: Option<f64>,

    #[serde(default)]
    pub max_size: Option<f64>,
}

/// Binary size units a descriptor may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kb,
    Mb,
    Gb,
    Tb,
    Pb,
}

impl SizeUnit {
    pub fn bytes(self) -> u64 {
        match self {
            SizeUnit::Kb => 1 << 10,
            SizeUnit::Mb => 1 << 20,
            SizeUnit::Gb => 1 << 30,
            SizeUnit::Tb => 1 << 40,
            SizeUnit::Pb => 1 << 50,
        }
    }

    /// Express a byte count in this unit
    #[allow(clippy::cast_precision_loss)]
    pub fn from_bytes(self, bytes: u64) -> f64 {
        bytes as f64 / self.bytes() as f64
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kb" => Ok(SizeUnit::Kb),
            "mb" => Ok(SizeUnit::Mb),
            "gb" => Ok(SizeUnit::Gb),
            "tb" => Ok(SizeUnit::Tb),
            "pb" => Ok(SizeUnit::Pb),
            other => Err(format!("unknown size unit \"{other}\"")),
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SizeUnit::Kb => "kb",
            SizeUnit::Mb => "mb",
            SizeUnit::Gb => "gb",
            SizeUnit::Tb => "tb",
            SizeUnit::Pb => "pb",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_case_insensitive() {
        assert_eq!("KB".parse::<SizeUnit>().unwrap(), SizeUnit::Kb);
        assert_eq!(" gb ".parse::<SizeUnit>().unwrap(), SizeUnit::Gb);
        assert!("bytes".parse::<SizeUnit>().is_err());
    }

    #[test]
    fn test_conversion() {
        assert_eq!(SizeUnit::Mb.bytes(), 1_048_576);
        assert!((SizeUnit::Kb.from_bytes(2048) - 2.0).abs() < f64::EPSILON);
    }
}
