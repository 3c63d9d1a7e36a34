//! `bimtk config` command - Inspect configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::load_config;
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file values merged over defaults)
    Show,

    /// Print where the user configuration file is looked up
    Path,
}

/// Run the config command
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    match global.output {
        OutputFormat::Json => {
            print_structured(&config, OutputFormat::Json)?;
        }
        _ => print!("{}", config.to_yaml().into_diagnostic()?),
    }
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    if let Some(path) = &global.config {
        println!("{}", path.display());
        return Ok(());
    }

    match Config::default_path() {
        Some(path) => {
            let marker = if path.exists() {
                style("(exists)").green()
            } else {
                style("(not created)").dim()
            };
            println!("{} {}", path.display(), marker);
            Ok(())
        }
        None => Err(miette::miette!(
            "Could not determine a configuration directory for this platform"
        )),
    }
}
