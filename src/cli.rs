use clap::Parser;

use critpath::output::OutputFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project file or glob pattern of project files
    #[arg(short = 'f', long = "file", default_value = "critpath.toml")]
    pub file: String,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// How to print the schedule
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Fail on invalid estimates instead of scheduling them as zero days
    #[arg(long = "strict")]
    pub strict: bool,

    /// Always recompute, ignoring and not updating the result cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Task whose critical path to compute, defaults to the configured task or the whole project
    pub task: Option<String>,
}
