use crate::error::{require_finite, require_non_negative, require_positive, CamToolError, CamToolResult};
use crate::motion::words;
use crate::program::OperationGenerator;
use crate::setup::{MachineSetup, SpindleDirection};
use convkit_core::{fmt_num, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Drilling-family cycle and its cycle-specific parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrillCycle {
    /// G81 plain drilling
    Drill,
    /// G82 drilling with a dwell at the bottom
    Dwell { seconds: f64 },
    /// G83 full-retract peck drilling
    Peck { increment: f64 },
    /// G73 chip-breaking peck drilling
    ChipBreak { increment: f64 },
    /// G84/G74 floating-holder tapping, hand taken from the spindle direction
    Tap { pitch: f64 },
    /// G33.1 spindle-synchronised tapping, one hole at a time
    RigidTap { pitch: f64 },
}

/// Parameters for a drilling operation over an ordered hole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillingOperation {
    /// Holes in the order they are drilled
    pub holes: Vec<Point>,
    /// Z of the material surface
    pub z_start: f64,
    /// Z at the bottom of the hole
    pub z_end: f64,
    /// Height of the cycle retract plane above `z_start`
    pub retract: f64,
    /// Plunge feed. Ignored by the tapping cycles, which derive it from the pitch
    pub feed: f64,
    pub cycle: DrillCycle,
}

impl DrillingOperation {
    /// Z of the R (retract) plane.
    pub fn r_plane(&self) -> f64 {
        self.z_start + self.retract
    }
}

/// Generator for canned drilling and tapping cycles.
pub struct DrillingGenerator {
    setup: MachineSetup,
    op: DrillingOperation,
}

impl DrillingGenerator {
    /// Create a new DrillingGenerator for `op` on the given machine setup
    pub fn new(setup: MachineSetup, op: DrillingOperation) -> Self {
        Self { setup, op }
    }

    fn validate(&self) -> CamToolResult<()> {
        let op = &self.op;
        self.setup.validate()?;
        require_finite("z_start", op.z_start)?;
        require_finite("z_end", op.z_end)?;
        require_non_negative("retract", op.retract)?;
        for (index, hole) in op.holes.iter().enumerate() {
            require_finite(&format!("holes[{index}].x"), hole.x)?;
            require_finite(&format!("holes[{index}].y"), hole.y)?;
        }

        match op.cycle {
            DrillCycle::Drill => require_positive("feed", op.feed),
            DrillCycle::Dwell { seconds } => {
                require_non_negative("dwell seconds", seconds)?;
                require_positive("feed", op.feed)
            }
            DrillCycle::Peck { increment } => {
                require_positive("peck increment", increment)?;
                require_positive("feed", op.feed)
            }
            DrillCycle::ChipBreak { increment } => {
                require_positive("break increment", increment)?;
                require_positive("feed", op.feed)
            }
            DrillCycle::Tap { pitch } | DrillCycle::RigidTap { pitch } => {
                if !pitch.is_finite() || pitch == 0.0 {
                    return Err(CamToolError::invalid(
                        "pitch",
                        format!("must be non-zero, got {pitch}"),
                    ));
                }
                require_positive("spindle_rpm", self.setup.spindle_rpm)
            }
        }
    }

    fn hand(&self) -> &'static str {
        match self.setup.spindle_direction {
            SpindleDirection::Cw => "Right Hand",
            SpindleDirection::Ccw => "Left Hand",
        }
    }

    /// The canned-cycle line for the configured cycle.
    fn cycle_line(&self) -> String {
        let op = &self.op;
        let r = fmt_num(op.r_plane());
        let z = fmt_num(op.z_end);
        let f = fmt_num(op.feed);
        match op.cycle {
            DrillCycle::Drill => format!("G98 G81 R{r} Z{z} F{f}"),
            DrillCycle::Dwell { seconds } => {
                format!("G98 G82 R{r} Z{z} P{} F{f}", fmt_num(seconds))
            }
            DrillCycle::Peck { increment } => {
                format!("G98 G83 R{r} Z{z} Q{} F{f}", fmt_num(increment))
            }
            DrillCycle::ChipBreak { increment } => {
                format!("G98 G73 R{r} Z{z} Q{} F{f}", fmt_num(increment))
            }
            DrillCycle::Tap { pitch } => {
                let rpm = self.setup.spindle_rpm.abs();
                let code = match self.setup.spindle_direction {
                    SpindleDirection::Cw => "G84",
                    SpindleDirection::Ccw => "G74",
                };
                format!(
                    "G98 {code} R{r} Z{z} F{} S{}",
                    fmt_num((rpm * pitch).abs()),
                    fmt_num(rpm)
                )
            }
            DrillCycle::RigidTap { pitch } => {
                format!("G33.1 Z{z} K{}", fmt_num(pitch.abs()))
            }
        }
    }

    /// Rapid to the first hole, the modal cycle line, then one bare X/Y line
    /// per remaining hole.
    fn canned_cycle_body(&self, gcode: &mut Vec<String>) {
        let Some((first, rest)) = self.op.holes.split_first() else {
            return;
        };
        gcode.push(words("G0").x(first.x).y(first.y).build());
        gcode.push(self.cycle_line());
        for hole in rest {
            gcode.push(format!("X{} Y{}", fmt_num(hole.x), fmt_num(hole.y)));
        }
    }

    /// G33.1 is not modal, so every hole gets its own approach and tap move.
    fn rigid_tap_body(&self, gcode: &mut Vec<String>) {
        let r_plane = self.op.r_plane();
        for hole in &self.op.holes {
            gcode.push(words("G0").x(hole.x).y(hole.y).build());
            gcode.push(words("G0").z(r_plane).build());
            gcode.push(self.cycle_line());
        }
    }
}

impl OperationGenerator for DrillingGenerator {
    fn name(&self) -> String {
        match self.op.cycle {
            DrillCycle::Drill => "Drilling Operation".to_string(),
            DrillCycle::Dwell { .. } => "Dwell Drilling Operation".to_string(),
            DrillCycle::Peck { .. } => "Peck Drilling Operation".to_string(),
            DrillCycle::ChipBreak { .. } => "Chip Break Drilling Operation".to_string(),
            DrillCycle::Tap { pitch } => {
                format!("{} Tap Operation (pitch={})", self.hand(), fmt_num(pitch))
            }
            DrillCycle::RigidTap { pitch } => {
                format!("Rigid Tap Operation (pitch={})", fmt_num(pitch))
            }
        }
    }

    /// Setup block, the cycle over every hole, `G80`, then teardown.
    ///
    /// An empty hole list still produces setup, `G80` and teardown.
    fn generate(&self) -> CamToolResult<Vec<String>> {
        self.validate()?;
        debug!(
            "{}: {} holes, R plane {:.4}",
            self.name(),
            self.op.holes.len(),
            self.op.r_plane()
        );

        let mut gcode = self.setup.start_op();
        match self.op.cycle {
            DrillCycle::RigidTap { .. } => self.rigid_tap_body(&mut gcode),
            _ => self.canned_cycle_body(&mut gcode),
        }
        gcode.push("G80".to_string());
        gcode.extend(self.setup.end_op());
        Ok(gcode)
    }
}
