//! Unit handling
//!
//! Selects the program unit mode (G20/G21) and parses operator-entered
//! dimensions, including fractional inch notation such as `1 1/2`.
//! Values are never converted between systems: a job written in inches
//! emits inches.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// The unit-mode G-code word for this system.
    pub fn gcode(&self) -> &'static str {
        match self {
            Self::Metric => "G21",
            Self::Imperial => "G20",
        }
    }

    /// Short unit label ("mm" or "in").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }
}

impl Default for MeasurementSystem {
    fn default() -> Self {
        Self::Metric
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "mm" | "g21" => Ok(Self::Metric),
            "imperial" | "inch" | "in" | "g20" => Ok(Self::Imperial),
            _ => Err(Error::UnknownUnits(s.to_string())),
        }
    }
}

/// Parse a dimension entered as text.
///
/// Accepts decimals (`-10.5`) and whole-plus-fraction forms (`1 1/2`, `-1/4`).
/// A leading minus applies to the whole value.
pub fn parse_dimension(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::parse(input, "empty value"));
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let mut total = 0.0;
    for part in body.split_whitespace() {
        if part.contains('/') {
            let frac_parts: Vec<&str> = part.split('/').collect();
            if frac_parts.len() != 2 {
                return Err(Error::parse(input, "invalid fraction format"));
            }
            let num = frac_parts[0]
                .parse::<f64>()
                .map_err(|_| Error::parse(input, "invalid numerator"))?;
            let den = frac_parts[1]
                .parse::<f64>()
                .map_err(|_| Error::parse(input, "invalid denominator"))?;
            if den == 0.0 {
                return Err(Error::parse(input, "division by zero"));
            }
            total += num / den;
        } else {
            total += part
                .parse::<f64>()
                .map_err(|e| Error::parse(input, e.to_string()))?;
        }
    }

    if !total.is_finite() {
        return Err(Error::parse(input, "value is not finite"));
    }

    Ok(if negative { -total } else { total })
}
