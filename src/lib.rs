//! # ConvKit
//!
//! Conversational G-code generation for CNC mills.
//!
//! ## Architecture
//!
//! ConvKit is organized as a workspace with multiple crates:
//!
//! 1. **convkit-core** - Units, points, number formatting, dimension parsing
//! 2. **convkit-camtools** - Drilling cycles, facing, pocketing, boring, program assembly
//! 3. **convkit-settings** - Job files and tool tables
//! 4. **convkit** - Command line binary that ties them together
//!
//! A run loads a job file, resolves every tool against the tool table,
//! generates the whole program in memory and only then writes it out.

use anyhow::Context;
use std::path::{Path, PathBuf};

pub use convkit_camtools::{GCodeProgram, OperationGenerator};
pub use convkit_settings::{JobFile, ToolTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, so `--stdout` output stays clean
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// What a single run should do.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Job file, `.toml` or `.json`
    pub job: PathBuf,
    /// Output path; defaults to the job path with an `.ngc` extension
    pub output: Option<PathBuf>,
    /// Tool table file; defaults to the one in the user config directory
    pub tools: Option<PathBuf>,
    /// Force line numbers off regardless of the job's `[program]` section
    pub no_line_numbers: bool,
    /// Print the program instead of writing a file
    pub stdout: bool,
}

/// Default output path for `job`.
pub fn default_output_path(job: &Path) -> PathBuf {
    job.with_extension("ngc")
}

/// Loads the tool table from `path`, or the default location when `None`.
pub fn load_tool_table(path: Option<&Path>) -> anyhow::Result<ToolTable> {
    let table = match path {
        Some(path) => ToolTable::load_from_file(path)
            .with_context(|| format!("Failed to load tool table {}", path.display()))?,
        None => ToolTable::load_default().context("Failed to load default tool table")?,
    };
    Ok(table)
}

/// Loads the job and tools and generates the program.
///
/// Also returns whether the program should be rendered with line numbers.
pub fn build(opts: &RunOptions) -> anyhow::Result<(GCodeProgram, bool)> {
    let job = JobFile::load_from_file(&opts.job)
        .with_context(|| format!("Failed to load job {}", opts.job.display()))?;
    let tools = load_tool_table(opts.tools.as_deref())?;
    let program = job
        .build_program(&tools)
        .with_context(|| format!("Failed to generate {}", opts.job.display()))?;

    let numbered = job.program.line_numbers && !opts.no_line_numbers;
    Ok((program, numbered))
}

/// Loads the job and tools and renders the finished program text.
pub fn render(opts: &RunOptions) -> anyhow::Result<String> {
    let (program, numbered) = build(opts)?;
    Ok(program.to_text(numbered))
}

/// Generates the job and writes it out. Returns the file written, if any.
pub fn run(opts: &RunOptions) -> anyhow::Result<Option<PathBuf>> {
    let (program, numbered) = build(opts)?;
    if opts.stdout {
        println!("{}", program.to_text(numbered));
        return Ok(None);
    }

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&opts.job));
    program
        .write_to_file(&output, numbered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(Some(output))
}
