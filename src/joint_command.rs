//! Line codec for sending joint angles to the device and reading its feedback.
//!
//! A line is a prefix followed by comma separated angles and a newline:
//! `T,0.100000,-0.250000,1.570796` for radians (6 decimals) and `D,5.73,-14.32,90.00`
//! for degrees (2 decimals). Port handling is left to the caller.

use std::fmt;
use std::str::FromStr;

const RADIANS_PREFIX: &str = "T";
const DEGREES_PREFIX: &str = "D";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointCommand {
    pub unit: AngleUnit,
    pub angles: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    UnknownPrefix(String),
    InvalidNumber { position: usize, value: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "Empty command line"),
            CommandError::UnknownPrefix(prefix) =>
                write!(f, "Unknown command prefix '{}', expected T or D", prefix),
            CommandError::InvalidNumber { position, value } =>
                write!(f, "Invalid angle at position {}: '{}'", position, value),
        }
    }
}

impl std::error::Error for CommandError {}

impl JointCommand {
    pub fn radians(angles: &[f64]) -> Self {
        JointCommand { unit: AngleUnit::Radians, angles: angles.to_vec() }
    }

    /// Degrees form of the given radian angles.
    pub fn degrees_from_radians(angles: &[f64]) -> Self {
        JointCommand {
            unit: AngleUnit::Degrees,
            angles: angles.iter().map(|a| a.to_degrees()).collect(),
        }
    }

    /// Newline terminated wire line.
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }

    pub fn to_radians(&self) -> Vec<f64> {
        match self.unit {
            AngleUnit::Radians => self.angles.clone(),
            AngleUnit::Degrees => self.angles.iter().map(|a| a.to_radians()).collect(),
        }
    }
}

impl fmt::Display for JointCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (prefix, decimals) = match self.unit {
            AngleUnit::Radians => (RADIANS_PREFIX, 6),
            AngleUnit::Degrees => (DEGREES_PREFIX, 2),
        };
        write!(f, "{}", prefix)?;
        for angle in &self.angles {
            write!(f, ",{:.*}", decimals, angle)?;
        }
        Ok(())
    }
}

impl FromStr for JointCommand {
    type Err = CommandError;

    /// Parses a line in either form. Surrounding whitespace and the trailing newline are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let mut fields = line.split(',');
        let prefix = fields.next().unwrap_or_default().trim();
        let unit = match prefix {
            RADIANS_PREFIX => AngleUnit::Radians,
            DEGREES_PREFIX => AngleUnit::Degrees,
            other => return Err(CommandError::UnknownPrefix(other.to_string())),
        };
        let angles = fields
            .enumerate()
            .map(|(position, field)| {
                let field = field.trim();
                field.parse::<f64>().ok().filter(|v| v.is_finite())
                    .ok_or_else(|| CommandError::InvalidNumber { position, value: field.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JointCommand { unit, angles })
    }
}
