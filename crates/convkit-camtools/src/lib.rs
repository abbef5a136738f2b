//! # ConvKit CAM Tools
//!
//! Generators that turn validated operation parameters into G-code lines
//! for a LinuxCNC-style controller.
//!
//! ## Operations
//!
//! - **Drilling**: G81/G82/G83/G73 canned cycles, G84/G74 tapping and G33.1 rigid tapping
//! - **Facing**: Serpentine raster with arc row transitions and ramped entry
//! - **Pocketing**: Circular pockets by peck, helix, or helix plus spiral
//! - **Boring**: Helical bores on the finished radius
//!
//! ## Supporting Infrastructure
//!
//! - **Setup**: Tool change, spindle, work offset and coolant blocks
//! - **Hole Patterns**: Bolt circles, linear rows and grids
//! - **Step Normalizer**: Equal pass counts for every area-clearing operation
//! - **Program**: Line-numbered program assembly with fixed preamble and epilog

pub mod bore;
pub mod drilling;
pub mod error;
pub mod facing;
pub mod hole_pattern;
pub mod motion;
pub mod pocket;
pub mod program;
pub mod setup;
pub mod step;

pub use bore::{BoreGenerator, BoreOperation};
pub use drilling::{DrillCycle, DrillingGenerator, DrillingOperation};
pub use error::{CamToolError, CamToolResult};
pub use facing::{FacingGenerator, FacingOperation};
pub use hole_pattern::{bolt_hole_circle, HolePattern, PatternType};
pub use motion::{helix, spiral, ArcDirection};
pub use pocket::{CircularOperation, PocketGenerator, PocketOperation, PocketStrategy};
pub use program::{GCodeProgram, OperationGenerator};
pub use setup::{CoolantMode, MachineSetup, MachineSetupBuilder, SpindleDirection, WorkOffset};
pub use step::{normalize, StepPlan};
