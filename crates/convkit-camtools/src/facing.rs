//! Facing toolpath generator.
//!
//! Clears a rectangle with a back-and-forth raster. Rows are joined by
//! half-circle arcs in the XY plane, and each depth pass can be entered and
//! left through a quarter-circle ramp in the XZ plane so the cutter never
//! plunges straight down at the edge of the stock.

use crate::error::{require_finite, require_non_negative, require_positive, CamToolError, CamToolResult};
use crate::motion::words;
use crate::program::OperationGenerator;
use crate::setup::MachineSetup;
use crate::step::{normalize, StepPlan};
use convkit_core::fmt_num;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lead-in and lead-out used when none is given.
pub const DEFAULT_LEAD: f64 = 0.1;

fn default_lead() -> f64 {
    DEFAULT_LEAD
}

fn default_ramp_entry() -> bool {
    true
}

/// Facing parameters.
///
/// `y_start` is the row the cutter starts on; `y_end` may lie above or below
/// it. X always runs from `x_start` to `x_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacingOperation {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
    pub z_start: f64,
    pub z_end: f64,
    pub step_over: f64,
    pub step_down: f64,
    pub tool_diameter: f64,
    /// Extra travel before the left edge
    #[serde(default = "default_lead")]
    pub lead_in: f64,
    /// Extra travel past the right edge
    #[serde(default = "default_lead")]
    pub lead_out: f64,
    /// Enter and leave each pass through an XZ ramp instead of a plunge
    #[serde(default = "default_ramp_entry")]
    pub ramp_entry: bool,
}

/// Raster geometry derived once per generation.
struct Raster {
    rows: StepPlan,
    passes: StepPlan,
    x_left: f64,
    x_right: f64,
    y_first: f64,
    /// +1 when rows advance toward +Y, -1 otherwise
    y_sign: f64,
    ramp_radius: f64,
}

impl Raster {
    fn row_y(&self, row: u32) -> f64 {
        self.y_first + self.y_sign * self.rows.offset(row)
    }
}

pub struct FacingGenerator {
    setup: MachineSetup,
    op: FacingOperation,
}

impl FacingGenerator {
    pub fn new(setup: MachineSetup, op: FacingOperation) -> Self {
        Self { setup, op }
    }

    fn validate(&self) -> CamToolResult<()> {
        let op = &self.op;
        self.setup.validate()?;
        for (name, value) in [
            ("x_start", op.x_start),
            ("x_end", op.x_end),
            ("y_start", op.y_start),
            ("y_end", op.y_end),
            ("z_start", op.z_start),
            ("z_end", op.z_end),
        ] {
            require_finite(name, value)?;
        }
        require_positive("step_over", op.step_over)?;
        require_positive("step_down", op.step_down)?;
        require_positive("tool_diameter", op.tool_diameter)?;
        require_non_negative("lead_in", op.lead_in)?;
        require_non_negative("lead_out", op.lead_out)?;

        if op.x_end <= op.x_start {
            return Err(CamToolError::invalid(
                "x_end",
                format!("must be greater than x_start ({}), got {}", op.x_start, op.x_end),
            ));
        }
        if op.y_end == op.y_start {
            return Err(CamToolError::invalid("y_end", "facing width must not be 0"));
        }
        if op.z_end >= op.z_start {
            return Err(CamToolError::invalid(
                "z_end",
                format!("must be below z_start ({}), got {}", op.z_start, op.z_end),
            ));
        }

        self.setup.require_xy_feed()?;
        if !op.ramp_entry {
            self.setup.require_z_feed()?;
        }
        Ok(())
    }

    fn raster(&self) -> CamToolResult<Raster> {
        let op = &self.op;
        let radius = op.tool_diameter / 2.0;
        let rows = normalize(op.y_end - op.y_start, op.step_over)?;
        let passes = normalize(op.z_start - op.z_end, op.step_down)?;
        let y_sign = if op.y_end < op.y_start { -1.0 } else { 1.0 };

        Ok(Raster {
            rows,
            passes,
            x_left: op.x_start - radius - op.lead_in,
            x_right: op.x_end + radius + op.lead_out,
            // First row sits so the cutter edge overlaps the stock edge by one step.
            y_first: op.y_start - y_sign * (radius - rows.step),
            y_sign,
            ramp_radius: self.setup.retract + passes.step,
        })
    }

    /// Moves the cutter from clearance down to `z_cut` at the left edge of row `y`.
    fn enter(
        &self,
        gcode: &mut Vec<String>,
        raster: &Raster,
        y: f64,
        z_top: f64,
        z_cut: f64,
        xy_feed: f64,
    ) -> CamToolResult<()> {
        let approach_z = z_top + self.setup.retract;
        if self.op.ramp_entry {
            gcode.push(words("G0").x(raster.x_left - raster.ramp_radius).y(y).build());
            gcode.push(words("G0").z(approach_z).build());
            gcode.push(
                words("G18 G2")
                    .x(raster.x_left)
                    .z(z_cut)
                    .i(raster.ramp_radius)
                    .build(),
            );
            gcode.push(words("G1").x(raster.x_right).build());
        } else {
            let z_feed = self.setup.require_z_feed()?;
            gcode.push(words("G0").x(raster.x_left).y(y).build());
            gcode.push(words("G0").z(approach_z).build());
            gcode.push(words("G1").z(z_cut).f(z_feed).build());
            gcode.push(words("G1").x(raster.x_right).f(xy_feed).build());
        }
        Ok(())
    }

    /// Lifts the cutter off the last row, mirroring the entry ramp.
    fn exit(&self, gcode: &mut Vec<String>, raster: &Raster, at_right: bool, z_cut: f64) {
        if !self.op.ramp_entry {
            return;
        }
        let r = raster.ramp_radius;
        let line = if at_right {
            words("G18 G2").x(raster.x_right + r)
        } else {
            words("G18 G3").x(raster.x_left - r)
        };
        gcode.push(line.z(z_cut + r).k(r).build());
    }
}

impl OperationGenerator for FacingGenerator {
    fn name(&self) -> String {
        "Facing Operation".to_string()
    }

    /// Setup, then one raster per depth pass, then teardown.
    ///
    /// Even passes walk the rows from the first row; odd passes walk them
    /// back from the last row, so consecutive passes cross the stock in
    /// opposite directions.
    fn generate(&self) -> CamToolResult<Vec<String>> {
        self.validate()?;
        let op = &self.op;
        let xy_feed = self.setup.require_xy_feed()?;
        let raster = self.raster()?;

        if op.step_over > op.tool_diameter {
            warn!(
                "Facing step_over {} is wider than the tool ({}), ridges will be left",
                op.step_over, op.tool_diameter
            );
        }
        debug!(
            "Facing: {} rows at {:.4}, {} passes at {:.4}",
            raster.rows.count, raster.rows.step, raster.passes.count, raster.passes.step
        );

        let mut gcode = self.setup.start_op();
        gcode.push(format!("F{}", fmt_num(xy_feed)));

        let last_row = raster.rows.count - 1;
        for pass in 0..raster.passes.count {
            let z_top = op.z_start - raster.passes.offset(pass);
            let z_cut = if pass + 1 == raster.passes.count {
                op.z_end
            } else {
                op.z_start - raster.passes.offset(pass + 1)
            };

            let forward = pass % 2 == 0;
            let row_at = |i: u32| {
                if forward {
                    raster.row_y(i)
                } else {
                    raster.row_y(last_row - i)
                }
            };

            self.enter(&mut gcode, &raster, row_at(0), z_top, z_cut, xy_feed)?;

            let mut at_right = true;
            for i in 1..raster.rows.count {
                let y = row_at(i);
                let dy = y - row_at(i - 1);
                let arc = match (at_right, dy < 0.0) {
                    (true, true) | (false, false) => "G17 G2",
                    (true, false) | (false, true) => "G17 G3",
                };
                gcode.push(words(arc).y(y).j(dy / 2.0).build());
                let x = if at_right { raster.x_left } else { raster.x_right };
                gcode.push(words("G1").x(x).build());
                at_right = !at_right;
            }

            self.exit(&mut gcode, &raster, at_right, z_cut);
            if pass + 1 < raster.passes.count {
                gcode.push(words("G0").z(self.setup.clearance).build());
            }
        }

        if op.ramp_entry {
            gcode.push("G17".to_string());
        }
        gcode.extend(self.setup.end_op());
        Ok(gcode)
    }
}
