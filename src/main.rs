use convkit::{init_logging, run, RunOptions, BUILD_DATE, VERSION};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "convkit",
    about = "Generates G-code for drilling, facing, pocketing and boring from a job file"
)]
struct Opt {
    /// Job file (.toml or .json)
    #[structopt(parse(from_os_str))]
    job: PathBuf,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Tool table file
    #[structopt(long, parse(from_os_str))]
    tools: Option<PathBuf>,

    /// Omit N line numbers
    #[structopt(long)]
    no_line_numbers: bool,

    /// Print the program instead of writing a file
    #[structopt(long)]
    stdout: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let opt = Opt::from_args();
    info!("convkit {} (built {})", VERSION, BUILD_DATE);

    run(&RunOptions {
        job: opt.job,
        output: opt.output,
        tools: opt.tools,
        no_line_numbers: opt.no_line_numbers,
        stdout: opt.stdout,
    })?;

    Ok(())
}
