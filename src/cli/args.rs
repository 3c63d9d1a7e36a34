//! Command-line argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::measure::MeasureArgs;
use crate::cli::commands::qty::QtyCommands;
use crate::cli::commands::section::SectionArgs;

#[derive(Parser, Debug)]
#[command(
    name = "bimtk",
    version,
    about = "BIM viewport toolkit: measurements, section planes and quantity take-off",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "BIMTK_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Default `tracing` filter directive for the chosen verbosity
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "bimtk=error";
        }
        match self.verbose {
            0 => "bimtk=warn",
            1 => "bimtk=debug",
            _ => "bimtk=trace",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, YAML for single records
    #[default]
    Auto,
    /// Aligned table
    Table,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    Json,
    Yaml,
    /// Markdown table
    Md,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quantity take-off over model data
    #[command(subcommand)]
    Qty(QtyCommands),

    /// Measure distance, area or angle through picked points
    Measure(MeasureArgs),

    /// Apply section planes and test which points stay visible
    Section(SectionArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_directive() {
        let mut opts = GlobalOpts::default();
        assert_eq!(opts.log_directive(), "bimtk=warn");
        opts.verbose = 2;
        assert_eq!(opts.log_directive(), "bimtk=trace");
        opts.quiet = true;
        assert_eq!(opts.log_directive(), "bimtk=error");
    }
}
