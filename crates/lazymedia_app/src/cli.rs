use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lazymedia_logging::LogDestination;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "lazymedia",
    version,
    about = "Download media sources and build lazy-loading markup for them"
)]
pub struct Cli {
    /// Pipeline configuration (RON); defaults are used when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    /// Log debug messages as well.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the sources of captured assets into the local cache.
    Download {
        /// JSON array of captured assets.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the JSON array of located assets.
        #[arg(long)]
        output: PathBuf,
    },
    /// Render markup for encoded assets.
    Build {
        /// JSON array of encoded (or downloaded) assets.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the JSON array of built assets.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
