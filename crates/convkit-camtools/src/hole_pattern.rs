//! Hole pattern generation for drilling operations.
//!
//! Produces ordered hole lists for bolt-hole circles, linear rows and grids.
//! The order of the returned points is the order the machine visits them.

use crate::error::{require_finite, require_non_negative, CamToolError, CamToolResult};
use convkit_core::Point;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Types of drilling patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    BoltCircle,
    Linear,
    Grid,
    Custom,
}

impl PatternType {
    /// Returns the name of the pattern type.
    pub fn name(&self) -> &'static str {
        match self {
            PatternType::BoltCircle => "Bolt Circle",
            PatternType::Linear => "Linear",
            PatternType::Grid => "Grid",
            PatternType::Custom => "Custom",
        }
    }
}

/// Parametric description of a hole pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HolePattern {
    /// Equally spaced holes on a circle.
    BoltCircle {
        num_holes: i64,
        diameter: f64,
        center: Point,
        #[serde(default)]
        start_angle: f64,
    },
    /// Holes evenly spaced from `start` to `end`, both ends included.
    Linear { start: Point, end: Point, count: i64 },
    /// Row-major grid starting at `origin`.
    Grid {
        origin: Point,
        spacing_x: f64,
        spacing_y: f64,
        count_x: i64,
        count_y: i64,
    },
    /// Explicit hole list.
    Custom { holes: Vec<Point> },
}

impl HolePattern {
    /// Pattern kind.
    pub fn pattern_type(&self) -> PatternType {
        match self {
            HolePattern::BoltCircle { .. } => PatternType::BoltCircle,
            HolePattern::Linear { .. } => PatternType::Linear,
            HolePattern::Grid { .. } => PatternType::Grid,
            HolePattern::Custom { .. } => PatternType::Custom,
        }
    }

    /// Expands the pattern into an ordered hole list.
    pub fn holes(&self) -> CamToolResult<Vec<Point>> {
        match self {
            HolePattern::BoltCircle {
                num_holes,
                diameter,
                center,
                start_angle,
            } => bolt_hole_circle(*num_holes, *diameter, *center, *start_angle),
            HolePattern::Linear { start, end, count } => linear(*start, *end, *count),
            HolePattern::Grid {
                origin,
                spacing_x,
                spacing_y,
                count_x,
                count_y,
            } => grid(*origin, *spacing_x, *spacing_y, *count_x, *count_y),
            HolePattern::Custom { holes } => Ok(holes.clone()),
        }
    }
}

fn require_count(name: &str, count: i64) -> CamToolResult<usize> {
    if count <= 0 {
        return Err(CamToolError::invalid(
            name,
            format!("must be greater than 0, got {count}"),
        ));
    }
    Ok(count as usize)
}

/// Computes `num_holes` points equally spaced on a circle.
///
/// The first hole sits at `start_angle` degrees, counter-clockwise from +X,
/// and the rest follow counter-clockwise in generation order.
pub fn bolt_hole_circle(
    num_holes: i64,
    diameter: f64,
    center: Point,
    start_angle: f64,
) -> CamToolResult<Vec<Point>> {
    let count = require_count("num_holes", num_holes)?;
    require_non_negative("diameter", diameter)?;
    require_finite("center.x", center.x)?;
    require_finite("center.y", center.y)?;
    require_finite("start_angle", start_angle)?;

    if diameter == 0.0 && count > 1 {
        warn!("Bolt circle diameter is 0, all {} holes coincide", count);
    }

    let radius = diameter / 2.0;
    let angle_step = 360.0 / count as f64;

    Ok((0..count)
        .map(|i| center.polar_offset(radius, start_angle + i as f64 * angle_step))
        .collect())
}

/// Creates `count` holes evenly spaced from `start` to `end`.
pub fn linear(start: Point, end: Point, count: i64) -> CamToolResult<Vec<Point>> {
    let count = require_count("count", count)?;

    Ok((0..count)
        .map(|i| {
            let t = i as f64 / (count - 1).max(1) as f64;
            Point::new(
                start.x + t * (end.x - start.x),
                start.y + t * (end.y - start.y),
            )
        })
        .collect())
}

/// Creates a row-major grid of holes.
pub fn grid(
    origin: Point,
    spacing_x: f64,
    spacing_y: f64,
    count_x: i64,
    count_y: i64,
) -> CamToolResult<Vec<Point>> {
    let count_x = require_count("count_x", count_x)?;
    let count_y = require_count("count_y", count_y)?;
    require_finite("spacing_x", spacing_x)?;
    require_finite("spacing_y", spacing_y)?;

    let mut holes = Vec::with_capacity(count_x * count_y);
    for row in 0..count_y {
        for col in 0..count_x {
            holes.push(Point::new(
                origin.x + col as f64 * spacing_x,
                origin.y + row as f64 * spacing_y,
            ));
        }
    }
    Ok(holes)
}
