//! Helical boring to a finished diameter.

use crate::error::{require_non_negative, CamToolResult};
use crate::motion::{words, LINEAR_TOLERANCE};
use crate::pocket::CircularOperation;
use crate::program::OperationGenerator;
use crate::setup::MachineSetup;
use crate::step::{normalize, StepPlan};
use convkit_core::fmt_num;
use tracing::debug;

/// A bore is cut on the finished radius in one continuous ramp.
pub type BoreOperation = CircularOperation;

/// Helical boring generator.
///
/// The tool rides the finished bore radius from `z_start` to `z_end`,
/// descending `tool_diameter * tan(ramp_angle)` per revolution at most (or
/// `step_down`, when that is smaller). The revolution count is normalized so
/// every turn drops the same amount and the last one lands on `z_end`.
pub struct BoreGenerator {
    setup: MachineSetup,
    op: BoreOperation,
}

impl BoreGenerator {
    pub fn new(setup: MachineSetup, op: BoreOperation) -> Self {
        Self { setup, op }
    }

    fn validate(&self) -> CamToolResult<()> {
        self.setup.validate()?;
        self.op.validate_common("bore")?;
        require_non_negative("step_down", self.op.step_down)?;
        self.setup.require_xy_feed()?;
        self.setup.require_z_feed()?;
        Ok(())
    }

    /// Per-revolution descent and number of revolutions.
    fn turns(&self) -> CamToolResult<StepPlan> {
        let op = &self.op;
        let mut per_turn = op.tool_diameter * op.ramp_angle.to_radians().tan();
        if op.step_down > 0.0 && op.step_down < per_turn {
            per_turn = op.step_down;
        }
        normalize(op.depth(), per_turn)
    }
}

impl OperationGenerator for BoreGenerator {
    fn name(&self) -> String {
        "Bore Operation".to_string()
    }

    fn generate(&self) -> CamToolResult<Vec<String>> {
        self.validate()?;
        let op = &self.op;
        let xy_feed = self.setup.require_xy_feed()?;
        let z_feed = self.setup.require_z_feed()?;
        let turns = self.turns()?;
        let cx = op.center.x;
        let path_radius = (op.diameter - op.tool_diameter) / 2.0;

        let mut gcode = self.setup.start_op();
        gcode.push(format!("F{}", fmt_num(xy_feed)));
        gcode.push(words("G0").x(cx).y(op.center.y).build());
        gcode.push(words("G0").z(op.z_start + self.setup.retract).build());
        gcode.push(words("G1").z(op.z_start).f(z_feed).build());

        if path_radius <= LINEAR_TOLERANCE {
            debug!("{}: tool matches bore, plunging", self.name());
            gcode.push(words("G1").z(op.z_end).f(z_feed).build());
        } else {
            debug!(
                "{}: {} revolutions of {:.4}",
                self.name(),
                turns.count,
                turns.step
            );
            gcode.push(words("G1").x(cx - path_radius).f(xy_feed).build());
            for turn in 1..=turns.count {
                let z = if turn == turns.count {
                    op.z_end
                } else {
                    op.z_start - turns.offset(turn)
                };
                gcode.push(words("G3").z(z).i(path_radius).build());
            }
            gcode.push(words("G3").i(path_radius).build());
            gcode.push(words("G1").x(cx).build());
        }

        gcode.extend(self.setup.end_op());
        Ok(gcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::WorkOffset;
    use convkit_core::Point;

    fn bore(step_down: f64) -> BoreOperation {
        BoreOperation {
            center: Point::new(0.0, 0.0),
            diameter: 1.0,
            z_start: 0.0,
            z_end: -1.0,
            step_over: 0.1,
            step_down,
            tool_diameter: 0.5,
            ramp_angle: 30.0,
        }
    }

    fn setup() -> MachineSetup {
        MachineSetup::builder()
            .tool_number(2)
            .spindle_rpm(8000.0)
            .wcs(WorkOffset::G54)
            .clearance(0.5)
            .retract(0.1)
            .xy_feed(30.0)
            .z_feed(5.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_turns_use_tool_ramp() {
        // 0.5 * tan(30) is about 0.289 per turn over 1.0 of depth.
        let plan = BoreGenerator::new(setup(), bore(0.0)).turns().unwrap();
        assert_eq!(plan.count, 4);
        assert!((plan.step - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_turns_capped_by_step_down() {
        let plan = BoreGenerator::new(setup(), bore(0.125)).turns().unwrap();
        assert_eq!(plan.count, 8);
    }
}
