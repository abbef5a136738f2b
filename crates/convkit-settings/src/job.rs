//! Job files.
//!
//! A job describes one machine setup and an ordered list of operations. It
//! is read from TOML or JSON, validated, has its tools resolved against a
//! [`ToolTable`], and is then turned into a [`GCodeProgram`].

use crate::dimension::Dimension;
use crate::error::{SettingsError, SettingsResult};
use crate::tool_table::{extension, ToolEntry, ToolTable};
use convkit_camtools::facing::DEFAULT_LEAD;
use convkit_camtools::pocket::DEFAULT_RAMP_ANGLE;
use convkit_camtools::{
    BoreGenerator, CircularOperation, CoolantMode, DrillCycle, DrillingGenerator,
    DrillingOperation, FacingGenerator, FacingOperation, GCodeProgram, HolePattern,
    MachineSetup, OperationGenerator, PocketGenerator, SpindleDirection, WorkOffset,
};
use convkit_core::{MeasurementSystem, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

fn default_true() -> bool {
    true
}

fn default_line_number() -> u32 {
    10
}

fn default_cycle() -> DrillCycle {
    DrillCycle::Drill
}

/// `[program]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSection {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_line_number")]
    pub start: u32,
    #[serde(default = "default_line_number")]
    pub stride: u32,
}

impl Default for ProgramSection {
    fn default() -> Self {
        Self {
            line_numbers: true,
            start: default_line_number(),
            stride: default_line_number(),
        }
    }
}

/// `[setup]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSection {
    pub wcs: WorkOffset,
    pub spindle_rpm: Dimension,
    #[serde(default)]
    pub spindle_direction: SpindleDirection,
    #[serde(default)]
    pub coolant: CoolantMode,
    /// Default tool for operations that do not name one
    pub tool: u32,
    #[serde(default)]
    pub units: MeasurementSystem,
    #[serde(default)]
    pub xy_feed: Option<Dimension>,
    #[serde(default)]
    pub z_feed: Option<Dimension>,
    pub clearance: Dimension,
    #[serde(default)]
    pub retract: Dimension,
}

impl SetupSection {
    pub fn machine_setup(&self) -> SettingsResult<MachineSetup> {
        let mut builder = MachineSetup::builder()
            .wcs(self.wcs)
            .spindle_rpm(self.spindle_rpm.value())
            .spindle_direction(self.spindle_direction)
            .coolant(self.coolant)
            .tool_number(self.tool)
            .units(self.units)
            .clearance(self.clearance.value())
            .retract(self.retract.value());
        if let Some(feed) = self.xy_feed {
            builder = builder.xy_feed(feed.value());
        }
        if let Some(feed) = self.z_feed {
            builder = builder.z_feed(feed.value());
        }
        Ok(builder.build()?)
    }
}

/// Drilling over explicit holes or a generated pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSpec {
    #[serde(default)]
    pub tool: Option<u32>,
    #[serde(default)]
    pub holes: Option<Vec<Point>>,
    #[serde(default)]
    pub pattern: Option<HolePattern>,
    pub z_start: Dimension,
    pub z_end: Dimension,
    /// Defaults to the setup retract
    #[serde(default)]
    pub retract: Option<Dimension>,
    /// Defaults to the setup Z feed. Not needed for tapping
    #[serde(default)]
    pub feed: Option<Dimension>,
    #[serde(default = "default_cycle")]
    pub cycle: DrillCycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSpec {
    #[serde(default)]
    pub tool: Option<u32>,
    #[serde(default)]
    pub tool_diameter: Option<Dimension>,
    pub x_start: Dimension,
    pub x_end: Dimension,
    pub y_start: Dimension,
    pub y_end: Dimension,
    pub z_start: Dimension,
    pub z_end: Dimension,
    pub step_over: Dimension,
    pub step_down: Dimension,
    #[serde(default)]
    pub lead_in: Option<Dimension>,
    #[serde(default)]
    pub lead_out: Option<Dimension>,
    #[serde(default = "default_true")]
    pub ramp_entry: bool,
}

/// Pocket or bore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularSpec {
    #[serde(default)]
    pub tool: Option<u32>,
    #[serde(default)]
    pub tool_diameter: Option<Dimension>,
    pub center: Point,
    pub diameter: Dimension,
    pub z_start: Dimension,
    pub z_end: Dimension,
    #[serde(default)]
    pub step_over: Dimension,
    #[serde(default)]
    pub step_down: Dimension,
    #[serde(default)]
    pub ramp_angle: Option<Dimension>,
}

impl CircularSpec {
    fn operation(&self, tool_diameter: f64) -> CircularOperation {
        CircularOperation {
            center: self.center,
            diameter: self.diameter.value(),
            z_start: self.z_start.value(),
            z_end: self.z_end.value(),
            step_over: self.step_over.value(),
            step_down: self.step_down.value(),
            tool_diameter,
            ramp_angle: self
                .ramp_angle
                .map_or(DEFAULT_RAMP_ANGLE, Dimension::value),
        }
    }
}

/// One `[[operations]]` entry, selected by its `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationSpec {
    Drill(DrillSpec),
    Face(FaceSpec),
    Pocket(CircularSpec),
    Bore(CircularSpec),
}

impl OperationSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Drill(_) => "drill",
            Self::Face(_) => "face",
            Self::Pocket(_) => "pocket",
            Self::Bore(_) => "bore",
        }
    }

    /// Tool override, if the operation names one.
    pub fn tool(&self) -> Option<u32> {
        match self {
            Self::Drill(spec) => spec.tool,
            Self::Face(spec) => spec.tool,
            Self::Pocket(spec) | Self::Bore(spec) => spec.tool,
        }
    }
}

/// A complete job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    pub setup: SetupSection,
    #[serde(default)]
    pub program: ProgramSection,
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

impl JobFile {
    /// Loads a job from a `.toml` or `.json` file and validates it.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let job = match extension(path) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => return Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        };
        info!(
            "Loaded job {} with {} operations",
            path.display(),
            job.operations.len()
        );
        Ok(job)
    }

    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let job: Self = toml::from_str(content)?;
        job.validate()?;
        Ok(job)
    }

    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let job: Self = serde_json::from_str(content)?;
        job.validate()?;
        Ok(job)
    }

    /// Checks what deserialization cannot: line numbering, the inline tool
    /// table, and that every drill has exactly one hole source.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.program.stride == 0 {
            return Err(SettingsError::invalid(
                "program.stride",
                "must be greater than 0",
            ));
        }
        ToolTable::from_entries(self.tools.iter().cloned())?;

        for (index, op) in self.operations.iter().enumerate() {
            if let OperationSpec::Drill(spec) = op {
                match (&spec.holes, &spec.pattern) {
                    (None, None) => {
                        return Err(SettingsError::MissingKey(format!(
                            "operations[{index}].holes or operations[{index}].pattern"
                        )))
                    }
                    (Some(_), Some(_)) => {
                        return Err(SettingsError::invalid(
                            format!("operations[{index}]"),
                            "give either holes or pattern, not both",
                        ))
                    }
                    _ => {}
                }
            }
        }

        if self.operations.is_empty() {
            warn!("Job has no operations, the program will only hold preamble and epilog");
        }
        Ok(())
    }

    /// `base` with this job's inline tools layered on top.
    pub fn tool_table(&self, base: &ToolTable) -> SettingsResult<ToolTable> {
        let mut table = base.clone();
        table.merge(&ToolTable::from_entries(self.tools.iter().cloned())?);
        Ok(table)
    }

    /// Resolves tools and parameters for every operation, in job order.
    ///
    /// Nothing is generated here, so a missing tool or feed is reported
    /// before any G-code exists.
    pub fn generators(
        &self,
        tools: &ToolTable,
    ) -> SettingsResult<Vec<Box<dyn OperationGenerator>>> {
        let base = self.setup.machine_setup()?;
        let tools = self.tool_table(tools)?;
        self.operations
            .iter()
            .enumerate()
            .map(|(index, op)| generator(index, op, &base, &tools))
            .collect()
    }

    /// Builds the complete program.
    pub fn build_program(&self, tools: &ToolTable) -> SettingsResult<GCodeProgram> {
        let generators = self.generators(tools)?;
        let mut program = GCodeProgram::new()
            .with_units(self.setup.units)
            .with_line_numbers(self.program.start, self.program.stride)?;
        for generator in &generators {
            program.add(generator.as_ref())?;
        }
        info!(
            "Generated {} operations, {} body lines ({})",
            generators.len(),
            program.body().len(),
            self.setup.units.label()
        );
        Ok(program)
    }
}

fn tool_diameter(explicit: Option<Dimension>, tool: u32, tools: &ToolTable) -> SettingsResult<f64> {
    match explicit {
        Some(diameter) => Ok(diameter.value()),
        None => tools.diameter(tool),
    }
}

fn generator(
    index: usize,
    op: &OperationSpec,
    base: &MachineSetup,
    tools: &ToolTable,
) -> SettingsResult<Box<dyn OperationGenerator>> {
    let mut setup = base.clone();
    if let Some(tool) = op.tool() {
        setup.tool_number = tool;
    }

    let generator: Box<dyn OperationGenerator> = match op {
        OperationSpec::Drill(spec) => {
            let holes = match (&spec.holes, &spec.pattern) {
                (Some(holes), None) => holes.clone(),
                (None, Some(pattern)) => {
                    let holes = pattern.holes()?;
                    info!(
                        "operations[{}]: {} pattern with {} holes",
                        index,
                        pattern.pattern_type().name(),
                        holes.len()
                    );
                    holes
                }
                _ => {
                    return Err(SettingsError::MissingKey(format!(
                        "operations[{index}].holes or operations[{index}].pattern"
                    )))
                }
            };
            let feed = match (spec.feed, spec.cycle) {
                (Some(feed), _) => feed.value(),
                (None, DrillCycle::Tap { .. } | DrillCycle::RigidTap { .. }) => 0.0,
                (None, _) => setup
                    .z_feed
                    .ok_or_else(|| SettingsError::MissingKey(format!("operations[{index}].feed")))?,
            };
            let drill = DrillingOperation {
                holes,
                z_start: spec.z_start.value(),
                z_end: spec.z_end.value(),
                retract: spec.retract.map_or(setup.retract, Dimension::value),
                feed,
                cycle: spec.cycle,
            };
            Box::new(DrillingGenerator::new(setup, drill))
        }
        OperationSpec::Face(spec) => {
            let face = FacingOperation {
                x_start: spec.x_start.value(),
                x_end: spec.x_end.value(),
                y_start: spec.y_start.value(),
                y_end: spec.y_end.value(),
                z_start: spec.z_start.value(),
                z_end: spec.z_end.value(),
                step_over: spec.step_over.value(),
                step_down: spec.step_down.value(),
                tool_diameter: tool_diameter(spec.tool_diameter, setup.tool_number, tools)?,
                lead_in: spec.lead_in.map_or(DEFAULT_LEAD, Dimension::value),
                lead_out: spec.lead_out.map_or(DEFAULT_LEAD, Dimension::value),
                ramp_entry: spec.ramp_entry,
            };
            Box::new(FacingGenerator::new(setup, face))
        }
        OperationSpec::Pocket(spec) => {
            let diameter = tool_diameter(spec.tool_diameter, setup.tool_number, tools)?;
            Box::new(PocketGenerator::new(setup, spec.operation(diameter)))
        }
        OperationSpec::Bore(spec) => {
            let diameter = tool_diameter(spec.tool_diameter, setup.tool_number, tools)?;
            Box::new(BoreGenerator::new(setup, spec.operation(diameter)))
        }
    };
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[setup]
wcs = "g55"
spindle_rpm = 1200
tool = 4
clearance = 0.2
retract = 0.02
z_feed = 4.8
"#;

    #[test]
    fn test_minimal_job_defaults() {
        let job = JobFile::from_toml_str(MINIMAL).unwrap();
        assert_eq!(job.setup.wcs, WorkOffset::G55);
        assert_eq!(job.setup.coolant, CoolantMode::Off);
        assert_eq!(job.program, ProgramSection::default());
        assert!(job.operations.is_empty());
    }

    #[test]
    fn test_drill_without_holes_is_missing_key() {
        let text = format!(
            "{MINIMAL}\n[[operations]]\ntype = \"drill\"\nz_start = 1\nz_end = 0.5\n"
        );
        assert!(matches!(
            JobFile::from_toml_str(&text),
            Err(SettingsError::MissingKey(_))
        ));
    }

    #[test]
    fn test_zero_stride_is_rejected() {
        let text = format!("{MINIMAL}\n[program]\nstride = 0\n");
        assert!(JobFile::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_largest_line_numbers_render() {
        let text = format!("{MINIMAL}\n[program]\nstart = 4294967295\nstride = 4294967295\n");
        let job = JobFile::from_toml_str(&text).unwrap();
        let program = job.build_program(&ToolTable::new()).unwrap();
        let rendered = program.to_text(true);
        assert!(rendered.starts_with("N4294967295 G90 G94 G17 G91.1\nN8589934590 G21\n"));
        assert!(rendered.ends_with("N21474836475 %"));
    }

    #[test]
    fn test_operation_tool_override() {
        let text = format!(
            "{MINIMAL}\n[[operations]]\ntype = \"pocket\"\ntool = 9\ncenter = [0, 0]\ndiameter = 1\nz_start = 0\nz_end = -0.25\n"
        );
        let job = JobFile::from_toml_str(&text).unwrap();
        assert_eq!(job.operations[0].tool(), Some(9));
        assert_eq!(job.operations[0].kind(), "pocket");
        assert!(matches!(
            job.generators(&ToolTable::new()),
            Err(SettingsError::ToolNotFound(9))
        ));
    }
}
