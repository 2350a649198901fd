use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// A bare path is run as `check <PATH>`; a path literally named `check`,
/// `markers` or `help` needs the explicit `check` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(name = "class-leak")]
#[command(
    about = "Find PHP classes without parent or interface that leak through serialization, ORM mapping or attributes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Worker threads used to analyze files (defaults to one per core)
    #[arg(short = 'j', long, value_name = "N", global = true)]
    pub jobs: Option<usize>,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Check(CheckArgs),
    /// Print the built-in serialization and entity markers
    Markers,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long = "file-extension", value_name = "EXT")]
    pub file_extensions: Vec<String>,

    #[arg(long = "skip-type", value_name = "TYPE")]
    pub skip_types: Vec<String>,

    #[arg(long = "skip-suffix", value_name = "SUFFIX")]
    pub skip_suffixes: Vec<String>,

    #[arg(long = "skip-attribute", value_name = "ATTRIBUTE")]
    pub skip_attributes: Vec<String>,

    #[arg(long = "serialization-marker", value_name = "TEXT")]
    pub serialization_markers: Vec<String>,

    #[arg(long = "entity-marker", value_name = "TEXT")]
    pub entity_markers: Vec<String>,

    /// Exit with status 2 when any leak is reported
    #[arg(long)]
    pub fail_on_leaks: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
