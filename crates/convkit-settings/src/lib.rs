//! ConvKit Settings Crate
//!
//! Reads job files and tool tables, turns text dimensions into numbers and
//! resolves tool diameters, then hands fully numeric parameters to the
//! generators in `convkit-camtools`.

pub mod dimension;
pub mod error;
pub mod job;
pub mod tool_table;

pub use dimension::Dimension;
pub use error::{SettingsError, SettingsResult};
pub use job::{CircularSpec, DrillSpec, FaceSpec, JobFile, OperationSpec, ProgramSection, SetupSection};
pub use tool_table::{ToolEntry, ToolTable};
