//! Circular pocket generator.
//!
//! The strategy depends on how the tool compares with the pocket:
//!
//! * tool equal to pocket: a peck-drill cycle at the centre
//! * pocket up to twice the tool: one helical plunge to full depth
//! * larger pockets: per depth level, a helix down then a spiral out
//!
//! A tool wider than the pocket is rejected before anything is emitted.

use crate::drilling::{DrillCycle, DrillingGenerator, DrillingOperation};
use crate::error::{require_finite, require_positive, CamToolError, CamToolResult};
use crate::motion::{helix, require_ramp_angle, spiral, words, ArcDirection, LINEAR_TOLERANCE};
use crate::program::OperationGenerator;
use crate::setup::MachineSetup;
use crate::step::normalize;
use convkit_core::{fmt_num, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Helix ramp angle used when none is given, in degrees.
pub const DEFAULT_RAMP_ANGLE: f64 = 3.0;

fn default_ramp_angle() -> f64 {
    DEFAULT_RAMP_ANGLE
}

/// Parameters shared by circular pockets and bores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularOperation {
    pub center: Point,
    /// Finished diameter of the feature
    pub diameter: f64,
    pub z_start: f64,
    pub z_end: f64,
    pub step_over: f64,
    pub step_down: f64,
    pub tool_diameter: f64,
    /// Helix ramp angle in degrees
    #[serde(default = "default_ramp_angle")]
    pub ramp_angle: f64,
}

impl CircularOperation {
    pub(crate) fn validate_common(&self, feature: &str) -> CamToolResult<()> {
        require_finite("center.x", self.center.x)?;
        require_finite("center.y", self.center.y)?;
        require_finite("z_start", self.z_start)?;
        require_finite("z_end", self.z_end)?;
        require_positive("diameter", self.diameter)?;
        require_positive("tool_diameter", self.tool_diameter)?;
        require_ramp_angle(self.ramp_angle)?;

        if self.z_end >= self.z_start {
            return Err(CamToolError::invalid(
                "z_end",
                format!("must be below z_start ({}), got {}", self.z_start, self.z_end),
            ));
        }
        if self.tool_diameter > self.diameter + LINEAR_TOLERANCE {
            return Err(CamToolError::ToolTooLarge {
                tool_diameter: self.tool_diameter,
                feature: feature.to_string(),
                feature_diameter: self.diameter,
            });
        }
        Ok(())
    }

    pub fn depth(&self) -> f64 {
        self.z_start - self.z_end
    }
}

pub type PocketOperation = CircularOperation;

/// How a pocket of a given size is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketStrategy {
    /// Tool and pocket are the same size
    PeckDrill,
    /// One helix reaches full depth and full width
    SingleHelix,
    /// Helix plus spiral at every depth level
    HelixAndSpiral,
}

impl PocketStrategy {
    /// Picks the strategy for a tool that fits the pocket.
    pub fn select(tool_diameter: f64, pocket_diameter: f64) -> Self {
        if (pocket_diameter - tool_diameter).abs() <= LINEAR_TOLERANCE {
            Self::PeckDrill
        } else if pocket_diameter <= 2.0 * tool_diameter + LINEAR_TOLERANCE {
            Self::SingleHelix
        } else {
            Self::HelixAndSpiral
        }
    }
}

pub struct PocketGenerator {
    setup: MachineSetup,
    op: PocketOperation,
}

impl PocketGenerator {
    pub fn new(setup: MachineSetup, op: PocketOperation) -> Self {
        Self { setup, op }
    }

    fn validate(&self) -> CamToolResult<()> {
        self.setup.validate()?;
        self.op.validate_common("pocket")?;
        require_positive("step_down", self.op.step_down)?;
        self.setup.require_z_feed()?;
        if self.strategy() != PocketStrategy::PeckDrill {
            require_positive("step_over", self.op.step_over)?;
            self.setup.require_xy_feed()?;
        }
        Ok(())
    }

    pub fn strategy(&self) -> PocketStrategy {
        PocketStrategy::select(self.op.tool_diameter, self.op.diameter)
    }

    fn peck_drill(&self) -> CamToolResult<Vec<String>> {
        let op = &self.op;
        let drill = DrillingOperation {
            holes: vec![op.center],
            z_start: op.z_start,
            z_end: op.z_end,
            retract: self.setup.retract,
            feed: self.setup.require_z_feed()?,
            cycle: DrillCycle::Peck {
                increment: op.step_down,
            },
        };
        DrillingGenerator::new(self.setup.clone(), drill).generate()
    }

    /// Rapid over `x` at the pocket's Y, then drop to the approach height and
    /// feed down to `z`.
    fn approach(&self, gcode: &mut Vec<String>, x: f64, z: f64, z_feed: f64) {
        gcode.push(words("G0").x(x).y(self.op.center.y).build());
        gcode.push(words("G0").z(self.op.z_start + self.setup.retract).build());
        gcode.push(words("G1").z(z).f(z_feed).build());
    }

    fn single_helix(&self, xy_feed: f64, z_feed: f64) -> CamToolResult<Vec<String>> {
        let op = &self.op;
        let cx = op.center.x;
        let path_diameter = op.diameter - op.tool_diameter;
        let path_radius = path_diameter / 2.0;
        let descent = helix(
            op.z_start,
            op.z_end,
            path_diameter,
            op.ramp_angle,
            Some(xy_feed),
            ArcDirection::Ccw,
        )?;

        let mut gcode = self.setup.start_op();
        gcode.push(format!("F{}", fmt_num(xy_feed)));
        self.approach(&mut gcode, cx - path_radius, op.z_start, z_feed);
        gcode.extend(descent);
        // Flat full circle to clean up the floor left by the ramp.
        gcode.push(words("G3").i(path_radius).build());
        gcode.push(words("G1").x(cx).build());
        gcode.extend(self.setup.end_op());
        Ok(gcode)
    }

    fn helix_and_spiral(&self, xy_feed: f64, z_feed: f64) -> CamToolResult<Vec<String>> {
        let op = &self.op;
        let cx = op.center.x;
        let helix_diameter = op.tool_diameter / 2.0;
        let helix_radius = helix_diameter / 2.0;
        let levels = normalize(op.depth(), op.step_down)?;
        let level_z = |level: u32| {
            if level == levels.count {
                op.z_end
            } else {
                op.z_start - levels.offset(level)
            }
        };

        // Build every motion block first so a bad parameter emits nothing.
        let rings = spiral(
            cx,
            op.diameter - op.tool_diameter,
            op.step_over,
            None,
            ArcDirection::Ccw,
        )?;
        let mut descents = Vec::with_capacity(levels.count as usize);
        for level in 1..=levels.count {
            descents.push(helix(
                level_z(level - 1),
                level_z(level),
                helix_diameter,
                op.ramp_angle,
                Some(xy_feed),
                ArcDirection::Ccw,
            )?);
        }

        debug!(
            "Pocket: {} levels of {:.4}, {} spiral arcs per level",
            levels.count,
            levels.step,
            rings.len()
        );

        let mut gcode = self.setup.start_op();
        gcode.push(format!("F{}", fmt_num(xy_feed)));
        self.approach(&mut gcode, cx - helix_radius, op.z_start, z_feed);
        for (index, descent) in descents.into_iter().enumerate() {
            let level = index as u32 + 1;
            gcode.extend(descent);
            gcode.push(words("G1").x(cx).build());
            gcode.extend(rings.iter().cloned());
            gcode.push(words("G0").z(op.z_start + self.setup.retract).build());
            if level < levels.count {
                gcode.push(words("G0").x(cx - helix_radius).y(op.center.y).build());
                gcode.push(words("G1").z(level_z(level)).f(z_feed).build());
            }
        }
        gcode.extend(self.setup.end_op());
        Ok(gcode)
    }
}

impl OperationGenerator for PocketGenerator {
    fn name(&self) -> String {
        "Pocket Operation".to_string()
    }

    fn generate(&self) -> CamToolResult<Vec<String>> {
        self.validate()?;
        let strategy = self.strategy();
        debug!("{}: {:?}", self.name(), strategy);

        match strategy {
            PocketStrategy::PeckDrill => self.peck_drill(),
            PocketStrategy::SingleHelix => {
                self.single_helix(self.setup.require_xy_feed()?, self.setup.require_z_feed()?)
            }
            PocketStrategy::HelixAndSpiral => {
                self.helix_and_spiral(self.setup.require_xy_feed()?, self.setup.require_z_feed()?)
            }
        }
    }
}
