//! Job-file numbers that may be written as text.

use crate::error::SettingsError;
use convkit_core::parse_dimension;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A length, feed or speed read from a job file.
///
/// Accepts a plain number or a string such as `"0.25"` or `"1 1/2"`.
/// Strings are parsed here so the generators only ever see `f64`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Dimension(f64);

impl Dimension {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Dimension> for f64 {
    fn from(dimension: Dimension) -> Self {
        dimension.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Dimension {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(parse_dimension(s)?))
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(text) => parse_dimension(&text)
                .map(Self)
                .map_err(serde::de::Error::custom),
        }
    }
}
