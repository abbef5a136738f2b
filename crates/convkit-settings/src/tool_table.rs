//! Tool table: tool number to diameter and description.
//!
//! The generators never look tools up themselves. Job loading resolves every
//! operation's tool diameter from here before generation starts.

use crate::dimension::Dimension;
use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One tool table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Tool number as used by `T<n> M6`
    pub number: u32,
    /// Cutting diameter
    pub diameter: Dimension,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ToolTableFile {
    #[serde(default)]
    tools: Vec<ToolEntry>,
}

/// Tool table keyed by tool number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolTable {
    tools: BTreeMap<u32, ToolEntry>,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, rejecting duplicate numbers and non-positive diameters.
    pub fn from_entries(entries: impl IntoIterator<Item = ToolEntry>) -> SettingsResult<Self> {
        let mut table = Self::new();
        for entry in entries {
            Self::check_entry(&entry)?;
            if table.tools.contains_key(&entry.number) {
                return Err(SettingsError::invalid(
                    format!("tools.{}", entry.number),
                    "tool number listed twice",
                ));
            }
            table.tools.insert(entry.number, entry);
        }
        Ok(table)
    }

    fn check_entry(entry: &ToolEntry) -> SettingsResult<()> {
        let diameter = entry.diameter.value();
        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(SettingsError::invalid(
                format!("tools.{}.diameter", entry.number),
                format!("must be greater than 0, got {diameter}"),
            ));
        }
        Ok(())
    }

    /// Copies every tool of `other` into this table, replacing same-numbered tools.
    pub fn merge(&mut self, other: &ToolTable) {
        for entry in other.entries() {
            self.tools.insert(entry.number, entry.clone());
        }
    }

    pub fn lookup(&self, number: u32) -> Option<&ToolEntry> {
        self.tools.get(&number)
    }

    /// Diameter of tool `number`, or [`SettingsError::ToolNotFound`].
    pub fn diameter(&self, number: u32) -> SettingsResult<f64> {
        self.lookup(number)
            .map(|entry| entry.diameter.value())
            .ok_or(SettingsError::ToolNotFound(number))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ToolEntry> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Loads a `[[tools]]` table from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ToolTableFile = match extension(path) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        };
        let table = Self::from_entries(file.tools)?;
        info!("Loaded {} tools from {}", table.len(), path.display());
        Ok(table)
    }

    /// `<config dir>/convkit/tools.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("convkit").join("tools.toml"))
    }

    /// Loads the table at [`ToolTable::default_path`], or an empty table when
    /// there is no such file.
    pub fn load_default() -> SettingsResult<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            Some(path) => {
                debug!("No tool table at {}", path.display());
                Ok(Self::new())
            }
            None => Ok(Self::new()),
        }
    }
}

pub(crate) fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u32, diameter: f64) -> ToolEntry {
        ToolEntry {
            number,
            diameter: Dimension::new(diameter),
            description: String::new(),
        }
    }

    #[test]
    fn test_lookup_and_missing_tool() {
        let table = ToolTable::from_entries([entry(1, 0.25), entry(4, 0.5)]).unwrap();
        assert_eq!(table.diameter(4).unwrap(), 0.5);
        assert!(matches!(table.diameter(2), Err(SettingsError::ToolNotFound(2))));
    }

    #[test]
    fn test_duplicate_numbers_are_rejected() {
        assert!(ToolTable::from_entries([entry(1, 0.25), entry(1, 0.5)]).is_err());
    }

    #[test]
    fn test_zero_diameter_is_rejected() {
        assert!(ToolTable::from_entries([entry(3, 0.0)]).is_err());
    }

    #[test]
    fn test_merge_replaces_same_number() {
        let mut table = ToolTable::from_entries([entry(1, 0.25), entry(2, 0.125)]).unwrap();
        let inline = ToolTable::from_entries([entry(1, 0.375)]).unwrap();
        table.merge(&inline);
        assert_eq!(table.len(), 2);
        assert_eq!(table.diameter(1).unwrap(), 0.375);
    }
}
