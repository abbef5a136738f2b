//! # ConvKit Core
//!
//! Core types and utilities shared by the ConvKit crates.
//! Provides the measurement system, planar points, the fixed-precision
//! number formatting used for every G-code word, and the parsing of
//! operator-entered dimension text.

pub mod error;
pub mod format;
pub mod geometry;
pub mod units;

pub use error::{Error, Result};
pub use format::{fmt_num, DECIMALS};
pub use geometry::Point;
pub use units::{parse_dimension, MeasurementSystem};
