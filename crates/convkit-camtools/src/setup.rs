//! Machine setup and the fixed blocks emitted around every operation.
//!
//! [`MachineSetup::start_op`] selects the tool, starts the spindle, picks the
//! work offset and turns coolant on. [`MachineSetup::end_op`] turns coolant
//! off and lifts to the clearance height.

use crate::error::{require_finite, require_non_negative, require_positive, CamToolError, CamToolResult};
use convkit_core::{fmt_num, MeasurementSystem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spindle rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpindleDirection {
    /// Clockwise (M3), right-hand cutting and tapping
    #[default]
    Cw,
    /// Counter-clockwise (M4), left-hand cutting and tapping
    Ccw,
}

impl SpindleDirection {
    /// Spindle start M-code.
    pub fn mcode(&self) -> &'static str {
        match self {
            Self::Cw => "M3",
            Self::Ccw => "M4",
        }
    }
}

impl fmt::Display for SpindleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cw => write!(f, "cw"),
            Self::Ccw => write!(f, "ccw"),
        }
    }
}

impl FromStr for SpindleDirection {
    type Err = CamToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cw" | "m3" => Ok(Self::Cw),
            "ccw" | "m4" => Ok(Self::Ccw),
            _ => Err(CamToolError::invalid(
                "spindle_direction",
                format!("expected cw or ccw, got '{s}'"),
            )),
        }
    }
}

/// Coolant mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CoolantMode {
    #[default]
    Off,
    /// Mist coolant (M7)
    Mist,
    /// Flood coolant (M8)
    Flood,
}

impl CoolantMode {
    /// Coolant-on M-code, if any.
    pub fn mcode(&self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Mist => Some("M7"),
            Self::Flood => Some("M8"),
        }
    }

    pub fn is_on(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for CoolantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Mist => write!(f, "mist"),
            Self::Flood => write!(f, "flood"),
        }
    }
}

impl FromStr for CoolantMode {
    type Err = CamToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "off" | "none" => Ok(Self::Off),
            "mist" => Ok(Self::Mist),
            "flood" => Ok(Self::Flood),
            _ => Err(CamToolError::invalid(
                "coolant",
                format!("expected off, mist or flood, got '{s}'"),
            )),
        }
    }
}

impl TryFrom<String> for CoolantMode {
    type Error = CamToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CoolantMode> for String {
    fn from(mode: CoolantMode) -> Self {
        mode.to_string()
    }
}

/// Work coordinate system selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkOffset {
    #[default]
    G54,
    G55,
    G56,
    G57,
    G58,
    G59,
    G59_1,
    G59_2,
    G59_3,
}

impl WorkOffset {
    /// All selectable offsets, in controller order.
    pub fn all() -> &'static [WorkOffset] {
        &[
            Self::G54,
            Self::G55,
            Self::G56,
            Self::G57,
            Self::G58,
            Self::G59,
            Self::G59_1,
            Self::G59_2,
            Self::G59_3,
        ]
    }

    /// Uppercase G-code word.
    pub fn gcode(&self) -> &'static str {
        match self {
            Self::G54 => "G54",
            Self::G55 => "G55",
            Self::G56 => "G56",
            Self::G57 => "G57",
            Self::G58 => "G58",
            Self::G59 => "G59",
            Self::G59_1 => "G59.1",
            Self::G59_2 => "G59.2",
            Self::G59_3 => "G59.3",
        }
    }
}

impl fmt::Display for WorkOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gcode())
    }
}

impl FromStr for WorkOffset {
    type Err = CamToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|wcs| wcs.gcode() == wanted)
            .ok_or_else(|| {
                CamToolError::invalid("wcs", format!("'{s}' is not one of G54-G59.3"))
            })
    }
}

impl TryFrom<String> for WorkOffset {
    type Error = CamToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkOffset> for String {
    fn from(wcs: WorkOffset) -> Self {
        wcs.gcode().to_string()
    }
}

/// Machine state shared by every operation in a program.
///
/// The spindle speed is always a magnitude; rotation comes from
/// `spindle_direction` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSetup {
    pub wcs: WorkOffset,
    pub spindle_rpm: f64,
    pub spindle_direction: SpindleDirection,
    pub coolant: CoolantMode,
    pub tool_number: u32,
    pub units: MeasurementSystem,
    /// Cutting feed in the XY plane, required by facing, pocketing and boring
    pub xy_feed: Option<f64>,
    /// Plunge feed, required by facing, pocketing and boring
    pub z_feed: Option<f64>,
    /// Height the tool returns to when an operation ends
    pub clearance: f64,
    /// Distance above the work surface used for rapid approaches
    pub retract: f64,
}

impl MachineSetup {
    /// Starts a builder with no required fields set.
    pub fn builder() -> MachineSetupBuilder {
        MachineSetupBuilder::default()
    }

    /// Checks every numeric field.
    pub fn validate(&self) -> CamToolResult<()> {
        require_non_negative("spindle_rpm", self.spindle_rpm)?;
        require_finite("clearance", self.clearance)?;
        require_non_negative("retract", self.retract)?;
        if let Some(feed) = self.xy_feed {
            require_positive("xy_feed", feed)?;
        }
        if let Some(feed) = self.z_feed {
            require_positive("z_feed", feed)?;
        }
        Ok(())
    }

    /// XY feed, or a configuration error when it was never set.
    pub fn require_xy_feed(&self) -> CamToolResult<f64> {
        self.xy_feed
            .ok_or_else(|| CamToolError::Configuration("xy_feed is not set".to_string()))
    }

    /// Z feed, or a configuration error when it was never set.
    pub fn require_z_feed(&self) -> CamToolResult<f64> {
        self.z_feed
            .ok_or_else(|| CamToolError::Configuration("z_feed is not set".to_string()))
    }

    /// Tool change, spindle start, work offset and coolant.
    pub fn start_op(&self) -> Vec<String> {
        let mut gcode = vec![
            format!("T{} M6 G43", self.tool_number),
            format!("S{}", fmt_num(self.spindle_rpm)),
            self.spindle_direction.mcode().to_string(),
            self.wcs.gcode().to_string(),
        ];
        if let Some(code) = self.coolant.mcode() {
            gcode.push(code.to_string());
        }
        gcode
    }

    /// Coolant off (when it was on) and rapid to clearance height.
    pub fn end_op(&self) -> Vec<String> {
        let mut gcode = Vec::new();
        if self.coolant.is_on() {
            gcode.push("M9".to_string());
        }
        gcode.push(format!("G0 Z{}", fmt_num(self.clearance)));
        gcode
    }
}

/// Builder for [`MachineSetup`].
///
/// `tool_number`, `spindle_rpm`, `wcs` and `clearance` must be given;
/// everything else has a default.
#[derive(Debug, Clone, Default)]
pub struct MachineSetupBuilder {
    wcs: Option<WorkOffset>,
    spindle_rpm: Option<f64>,
    spindle_direction: SpindleDirection,
    coolant: CoolantMode,
    tool_number: Option<u32>,
    units: MeasurementSystem,
    xy_feed: Option<f64>,
    z_feed: Option<f64>,
    clearance: Option<f64>,
    retract: f64,
}

impl MachineSetupBuilder {
    pub fn wcs(mut self, wcs: WorkOffset) -> Self {
        self.wcs = Some(wcs);
        self
    }

    /// Spindle speed magnitude. A negative value is rejected by `build`.
    pub fn spindle_rpm(mut self, rpm: f64) -> Self {
        self.spindle_rpm = Some(rpm);
        self
    }

    pub fn spindle_direction(mut self, direction: SpindleDirection) -> Self {
        self.spindle_direction = direction;
        self
    }

    pub fn coolant(mut self, coolant: CoolantMode) -> Self {
        self.coolant = coolant;
        self
    }

    pub fn tool_number(mut self, tool: u32) -> Self {
        self.tool_number = Some(tool);
        self
    }

    pub fn units(mut self, units: MeasurementSystem) -> Self {
        self.units = units;
        self
    }

    pub fn xy_feed(mut self, feed: f64) -> Self {
        self.xy_feed = Some(feed);
        self
    }

    pub fn z_feed(mut self, feed: f64) -> Self {
        self.z_feed = Some(feed);
        self
    }

    pub fn clearance(mut self, z: f64) -> Self {
        self.clearance = Some(z);
        self
    }

    pub fn retract(mut self, distance: f64) -> Self {
        self.retract = distance;
        self
    }

    /// Builds and validates the setup.
    pub fn build(self) -> CamToolResult<MachineSetup> {
        fn missing(field: &str) -> CamToolError {
            CamToolError::Configuration(format!("{field} is not set"))
        }

        let setup = MachineSetup {
            wcs: self.wcs.ok_or_else(|| missing("wcs"))?,
            spindle_rpm: self.spindle_rpm.ok_or_else(|| missing("spindle_rpm"))?,
            spindle_direction: self.spindle_direction,
            coolant: self.coolant,
            tool_number: self.tool_number.ok_or_else(|| missing("tool_number"))?,
            units: self.units,
            xy_feed: self.xy_feed,
            z_feed: self.z_feed,
            clearance: self.clearance.ok_or_else(|| missing("clearance"))?,
            retract: self.retract,
        };
        setup.validate()?;
        Ok(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> MachineSetup {
        MachineSetup::builder()
            .tool_number(4)
            .spindle_rpm(1200.0)
            .wcs(WorkOffset::G55)
            .clearance(0.2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_start_op_without_coolant() {
        assert_eq!(setup().start_op(), vec!["T4 M6 G43", "S1200.000", "M3", "G55"]);
        assert_eq!(setup().end_op(), vec!["G0 Z0.200"]);
    }

    #[test]
    fn test_coolant_codes() {
        let mut s = setup();
        s.coolant = "MIST".parse().unwrap();
        assert_eq!(s.start_op().last().unwrap(), "M7");
        assert_eq!(s.end_op(), vec!["M9", "G0 Z0.200"]);

        s.coolant = "Flood".parse().unwrap();
        assert_eq!(s.start_op().last().unwrap(), "M8");
        assert_eq!(s.end_op(), vec!["M9", "G0 Z0.200"]);

        s.coolant = "".parse().unwrap();
        assert_eq!(s.coolant, CoolantMode::Off);
        assert!(!s.start_op().iter().any(|l| l == "M7" || l == "M8"));
    }

    #[test]
    fn test_ccw_spindle() {
        let mut s = setup();
        s.spindle_direction = "CCW".parse().unwrap();
        assert_eq!(s.start_op()[2], "M4");
    }

    #[test]
    fn test_wcs_parsing_is_case_insensitive() {
        assert_eq!("g59.2".parse::<WorkOffset>().unwrap(), WorkOffset::G59_2);
        assert_eq!(WorkOffset::G59_2.to_string(), "G59.2");
        assert!("G60".parse::<WorkOffset>().is_err());
    }

    #[test]
    fn test_builder_reports_missing_fields() {
        let err = MachineSetup::builder()
            .tool_number(1)
            .wcs(WorkOffset::G54)
            .clearance(1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CamToolError::Configuration(ref msg) if msg.contains("spindle_rpm")));
    }

    #[test]
    fn test_negative_rpm_is_rejected() {
        let err = MachineSetup::builder()
            .tool_number(1)
            .spindle_rpm(-700.0)
            .wcs(WorkOffset::G54)
            .clearance(1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CamToolError::InvalidParameter { .. }));
    }

    #[test]
    fn test_feeds_are_required_on_demand() {
        let s = setup();
        assert!(matches!(s.require_xy_feed(), Err(CamToolError::Configuration(_))));
        let s = MachineSetup {
            z_feed: Some(4.8),
            ..setup()
        };
        assert_eq!(s.require_z_feed().unwrap(), 4.8);
    }
}
