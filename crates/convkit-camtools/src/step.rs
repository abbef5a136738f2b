//! Pass-count normalization.
//!
//! Turns a nominal step and a total distance into a whole number of equal
//! passes. Facing, pocketing and boring all take their pass counts from
//! here so no operation ends with a short trailing pass.

use crate::error::{CamToolError, CamToolResult};

/// Relative slack for treating a distance/step quotient as a whole number.
const QUOTIENT_TOLERANCE: f64 = 1e-9;

/// Equal-step plan covering a distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// Size of every step, never larger than the nominal step.
    pub step: f64,
    /// Number of steps.
    pub count: u32,
}

impl StepPlan {
    /// Position after `index` steps, measured from the start.
    pub fn offset(&self, index: u32) -> f64 {
        self.step * index as f64
    }

    /// Total distance covered by the plan.
    pub fn total(&self) -> f64 {
        self.offset(self.count)
    }
}

/// Normalize `distance` into equal steps no larger than `nominal_step`.
///
/// Both arguments are taken by magnitude; the caller applies direction.
/// A zero distance yields a zero-step plan. A zero nominal step is rejected
/// because it would divide the distance into infinitely many passes.
pub fn normalize(distance: f64, nominal_step: f64) -> CamToolResult<StepPlan> {
    if !distance.is_finite() {
        return Err(CamToolError::invalid("distance", "must be a finite number"));
    }
    if !nominal_step.is_finite() || nominal_step == 0.0 {
        return Err(CamToolError::invalid(
            "step",
            format!("must be non-zero and finite, got {nominal_step}"),
        ));
    }

    let distance = distance.abs();
    let nominal_step = nominal_step.abs();

    // 2.1 / 0.7 is 3.0000000000000004 in f64; that must stay 3 passes, not 4.
    let quotient = distance / nominal_step;
    let nearest = quotient.round();
    let steps = if nearest >= 1.0 && (quotient - nearest).abs() <= QUOTIENT_TOLERANCE * nearest {
        nearest
    } else {
        quotient.ceil()
    };
    if steps > u32::MAX as f64 {
        return Err(CamToolError::invalid(
            "step",
            format!("{nominal_step} is too small to cover {distance}"),
        ));
    }

    let count = steps as u32;
    if count == 0 {
        return Ok(StepPlan {
            step: 0.0,
            count: 0,
        });
    }

    Ok(StepPlan {
        step: distance / count as f64,
        count,
    })
}
