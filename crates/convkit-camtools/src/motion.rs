//! Motion word building and the helix/spiral interpolation primitives.
//!
//! Arc centres are written incrementally (I/J/K relative to the start
//! point), matching the `G91.1` mode set by the program preamble.

use crate::error::{require_finite, require_positive, CamToolError, CamToolResult};
use crate::step::normalize;
use convkit_core::fmt_num;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Distances closer than this are treated as equal.
pub(crate) const LINEAR_TOLERANCE: f64 = 1e-9;

/// Upper bound on generated revolutions for a single helix. Steeper
/// descents are used when the requested angle would need more.
pub(crate) const MAX_HELIX_TURNS: f64 = 10_000.0;

/// Arc rotation direction, viewed from the positive end of the plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcDirection {
    /// G2
    Cw,
    /// G3
    #[default]
    Ccw,
}

impl ArcDirection {
    pub fn gcode(&self) -> &'static str {
        match self {
            Self::Cw => "G2",
            Self::Ccw => "G3",
        }
    }
}

/// Builder for a single G-code line made of a command and address words.
#[derive(Debug, Clone)]
pub struct Words {
    parts: Vec<String>,
}

/// Starts a line with `command`, e.g. `"G0"` or `"G18 G2"`.
pub fn words(command: &str) -> Words {
    Words {
        parts: vec![command.to_string()],
    }
}

impl Words {
    fn word(mut self, letter: char, value: f64) -> Self {
        self.parts.push(format!("{}{}", letter, fmt_num(value)));
        self
    }

    pub fn x(self, value: f64) -> Self {
        self.word('X', value)
    }

    pub fn y(self, value: f64) -> Self {
        self.word('Y', value)
    }

    pub fn z(self, value: f64) -> Self {
        self.word('Z', value)
    }

    pub fn i(self, value: f64) -> Self {
        self.word('I', value)
    }

    pub fn j(self, value: f64) -> Self {
        self.word('J', value)
    }

    pub fn k(self, value: f64) -> Self {
        self.word('K', value)
    }

    pub fn f(self, value: f64) -> Self {
        self.word('F', value)
    }

    /// Appends `F` only when a feed is given.
    pub fn maybe_f(self, value: Option<f64>) -> Self {
        match value {
            Some(feed) => self.f(feed),
            None => self,
        }
    }

    pub fn build(self) -> String {
        self.parts.join(" ")
    }
}

/// Full-circle helical descent around a centre `diameter / 2` in +X of the
/// current position.
///
/// Each revolution drops `π · diameter · tan(ramp_angle)`; once less than a
/// full revolution's drop remains, one last revolution lands exactly on
/// `z_end`. X and Y are omitted from every move so each revolution closes on
/// its start point.
///
/// Very small diameters at shallow angles would need an unbounded number of
/// revolutions; the drop per revolution is then raised so the helix
/// completes in at most 10 000 revolutions.
pub fn helix(
    z_start: f64,
    z_end: f64,
    diameter: f64,
    ramp_angle: f64,
    feed: Option<f64>,
    direction: ArcDirection,
) -> CamToolResult<Vec<String>> {
    require_finite("z_start", z_start)?;
    require_finite("z_end", z_end)?;
    require_positive("helix diameter", diameter)?;
    require_ramp_angle(ramp_angle)?;
    if z_end > z_start {
        return Err(CamToolError::invalid(
            "z_end",
            format!("helix must descend, but {z_end} is above {z_start}"),
        ));
    }

    let depth = z_start - z_end;
    let mut ramp_per_turn = PI * diameter * ramp_angle.to_radians().tan();
    if depth / ramp_per_turn > MAX_HELIX_TURNS {
        warn!(
            "{} deg ramp on a {:.4} helix needs more than {} revolutions for depth {:.4}; descending faster",
            ramp_angle, diameter, MAX_HELIX_TURNS, depth
        );
        ramp_per_turn = depth / MAX_HELIX_TURNS;
    }

    let radius = diameter / 2.0;
    let mut lines = Vec::new();
    let mut descended = 0.0;
    while depth - descended > LINEAR_TOLERANCE {
        descended += ramp_per_turn;
        let z = if descended >= depth - LINEAR_TOLERANCE {
            z_end
        } else {
            z_start - descended
        };
        lines.push(words(direction.gcode()).z(z).i(radius).maybe_f(feed).build());
    }

    debug!(
        "Helix {:.4} -> {:.4}: {} revolutions at {:.4} per turn",
        z_start,
        z_end,
        lines.len(),
        ramp_per_turn
    );
    Ok(lines)
}

/// Semicircular spiral from `x_center` out to `diameter / 2`.
///
/// The tool starts on the centre. Arcs alternate between the +X and -X sides
/// of the centre, each half turn growing the radius by half a step-over, and
/// a final half circle at full radius completes the outermost ring. The step
/// is normalized so the rings end exactly on the target radius.
pub fn spiral(
    x_center: f64,
    diameter: f64,
    step_over: f64,
    feed: Option<f64>,
    direction: ArcDirection,
) -> CamToolResult<Vec<String>> {
    require_finite("x_center", x_center)?;
    require_positive("step_over", step_over)?;
    if !diameter.is_finite() || diameter < 0.0 {
        return Err(CamToolError::invalid(
            "spiral diameter",
            format!("must not be negative, got {diameter}"),
        ));
    }

    let radius = diameter / 2.0;
    let plan = normalize(radius, step_over)?;
    if plan.count == 0 {
        return Ok(Vec::new());
    }

    let step = plan.step;
    let mut lines = Vec::with_capacity(2 * plan.count as usize + 1);
    let mut scale = 0.5;
    for ring in 1..=plan.count {
        let reach = if ring == plan.count {
            radius
        } else {
            plan.offset(ring)
        };
        lines.push(
            words(direction.gcode())
                .x(x_center + reach)
                .i(step * scale)
                .maybe_f(feed)
                .build(),
        );
        scale += 0.5;
        lines.push(
            words(direction.gcode())
                .x(x_center - reach)
                .i(-(step * scale))
                .maybe_f(feed)
                .build(),
        );
        scale += 0.5;
    }
    lines.push(
        words(direction.gcode())
            .x(x_center + radius)
            .i(radius)
            .maybe_f(feed)
            .build(),
    );

    debug!(
        "Spiral to radius {:.4}: {} rings of {:.4}",
        radius, plan.count, step
    );
    Ok(lines)
}

pub(crate) fn require_ramp_angle(ramp_angle: f64) -> CamToolResult<()> {
    if ramp_angle.is_finite() && ramp_angle > 0.0 && ramp_angle < 90.0 {
        Ok(())
    } else {
        Err(CamToolError::invalid(
            "ramp_angle",
            format!("must be between 0 and 90 degrees, got {ramp_angle}"),
        ))
    }
}
