use clap::Parser;
use miette::Result;
use bimtk::cli::{Cli, Commands};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.log_directive().into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Qty(cmd) => bimtk::cli::commands::qty::run(cmd, &cli.global),
        Commands::Measure(args) => bimtk::cli::commands::measure::run(args, &cli.global),
        Commands::Section(args) => bimtk::cli::commands::section::run(args, &cli.global),
        Commands::Config(cmd) => bimtk::cli::commands::config::run(cmd, &cli.global),
        Commands::Completions(args) => bimtk::cli::commands::completions::run(args),
    }
}
