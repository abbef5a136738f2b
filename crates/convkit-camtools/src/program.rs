//! Program assembly.
//!
//! [`GCodeProgram`] collects operation blocks between a fixed preamble and
//! epilog and renders them, with or without `N` line numbers.

use crate::error::{CamToolError, CamToolResult};
use convkit_core::MeasurementSystem;
use std::path::Path;
use tracing::{debug, info};

/// Absolute distance, units/min feed, XY plane, incremental arc centres.
pub const PREAMBLE: &str = "G90 G94 G17 G91.1";

/// Machine-coordinate retract, program end, end-of-tape marker.
pub const EPILOG: [&str; 3] = ["G53 G0 Z0", "M30", "%"];

/// Something that turns its parameters into a named block of G-code lines.
pub trait OperationGenerator {
    /// Name written as a comment above the block. May be empty.
    fn name(&self) -> String;

    /// Builds the block, validating everything before the first line.
    fn generate(&self) -> CamToolResult<Vec<String>>;
}

/// Line numbering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumbering {
    pub start: u32,
    pub stride: u32,
}

impl Default for LineNumbering {
    fn default() -> Self {
        Self {
            start: 10,
            stride: 10,
        }
    }
}

/// Ordered G-code program buffer.
#[derive(Debug, Clone)]
pub struct GCodeProgram {
    preamble: Vec<String>,
    body: Vec<String>,
    epilog: Vec<String>,
    numbering: LineNumbering,
}

impl Default for GCodeProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl GCodeProgram {
    /// Creates an empty program with the standard preamble and epilog.
    pub fn new() -> Self {
        Self {
            preamble: vec![PREAMBLE.to_string()],
            body: Vec::new(),
            epilog: EPILOG.iter().map(|line| line.to_string()).collect(),
            numbering: LineNumbering::default(),
        }
    }

    /// Adds the unit-mode word after the fixed preamble line.
    pub fn with_units(mut self, units: MeasurementSystem) -> Self {
        self.preamble.push(units.gcode().to_string());
        self
    }

    /// Sets the first line number and the increment between lines.
    pub fn with_line_numbers(mut self, start: u32, stride: u32) -> CamToolResult<Self> {
        if stride == 0 {
            return Err(CamToolError::invalid(
                "stride",
                "line number stride must be greater than 0",
            ));
        }
        self.numbering = LineNumbering { start, stride };
        Ok(self)
    }

    /// Appends `lines`, preceded by a `(name)` comment unless `name` is empty.
    pub fn append_operation(&mut self, name: &str, lines: impl IntoIterator<Item = String>) {
        if !name.is_empty() {
            self.body.push(format!("({name})"));
        }
        self.body.extend(lines);
    }

    /// Generates `op` and appends it. On error the program is left untouched.
    pub fn add(&mut self, op: &dyn OperationGenerator) -> CamToolResult<()> {
        let name = op.name();
        let lines = op.generate()?;
        debug!("Appending '{}' ({} lines)", name, lines.len());
        self.append_operation(&name, lines);
        Ok(())
    }

    /// Body lines appended so far, without preamble or epilog.
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Preamble, body and epilog in output order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.preamble
            .iter()
            .chain(self.body.iter())
            .chain(self.epilog.iter())
            .map(String::as_str)
    }

    /// Renders the program, one instruction per line.
    ///
    /// With `numbered`, each line gets an `N<n> ` prefix counting from the
    /// configured start by the configured stride. Numbers keep counting past
    /// `u32::MAX` rather than wrapping.
    pub fn to_text(&self, numbered: bool) -> String {
        let mut line_number = u64::from(self.numbering.start);
        let stride = u64::from(self.numbering.stride);
        self.lines()
            .map(|line| {
                if numbered {
                    let prefixed = format!("N{line_number} {line}");
                    line_number = line_number.saturating_add(stride);
                    prefixed
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes the rendered program, newline terminated, to `path`.
    pub fn write_to_file(&self, path: &Path, numbered: bool) -> CamToolResult<()> {
        let mut text = self.to_text(numbered);
        text.push('\n');
        std::fs::write(path, text)?;
        info!("Wrote G-code program to {}", path.display());
        Ok(())
    }
}
