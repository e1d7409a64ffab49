use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "chatlens",
    version,
    about = "Flatten chat-log JSON files into charts and a summary report"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    /// Directory scanned for `*.json` chat-log files.
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Root directory for per-file chart folders and `summary.json`.
    #[arg(long, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,
}
