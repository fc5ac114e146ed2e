use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "m4atidy")]
#[command(version = "0.1.0")]
#[command(about = "Normalize tags and filenames of Apple Lossless files")]
#[command(group(ArgGroup::new("target").required(true).args(["basedir", "filename"])))]
pub struct Cli {
    /// Base directory to scan recursively for m4a files
    #[arg(long, short = 'b')]
    pub basedir: Option<PathBuf>,

    /// Single m4a file to process
    #[arg(long, short = 'f')]
    pub filename: Option<PathBuf>,

    /// Rewrite text tags into their canonical form
    #[arg(long, short = 's')]
    pub sanitize: bool,

    /// Rename files to "<track> <artist> - <title>.m4a"
    #[arg(long, short = 'r')]
    pub rename: bool,

    /// Log every tag write and skip
    #[arg(long, short = 'd', default_value_t = false)]
    pub debug: bool,

    /// Suppress everything below warnings
    #[arg(long)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Album name to write (album and album sort order)
    #[arg(long)]
    pub album: Option<String>,

    /// Artist name to write (artist, artist sort order, album artist)
    #[arg(long)]
    pub artist: Option<String>,

    /// Genre to write
    #[arg(long)]
    pub genre: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration derived from CLI flags
#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    pub verbose: bool,
    pub quiet: bool,
    pub format: OutputFormat,
}

impl LogConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbose: cli.debug,
            quiet: cli.quiet,
            format: cli.output,
        }
    }
}
