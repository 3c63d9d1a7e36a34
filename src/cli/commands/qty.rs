//! `bimtk qty` command - Quantity take-off over model data
//!
//! Loads a model, extracts one item per element (optionally folded and
//! priced), filters, and prints items, category groups, a summary, or a
//! delimited export.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::QuantityFilter;
use crate::cli::helpers::{format_opt, load_config, parse_price};
use crate::cli::output::{delimited_writer, effective_format, print_structured};
use crate::cli::table::{render, GroupRow, ItemRow, KeyValueRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::export::{export_to_csv, export_to_excel, ExportOptions};
use crate::core::loader::load_model;
use crate::core::quantity::{
    apply_pricing, extract_quantities, generate_summary, group_quantities, ExtractOptions,
};
use crate::entities::quantity::{QuantificationGroup, QuantityItem};

#[derive(Subcommand, Debug)]
pub enum QtyCommands {
    /// List quantity items
    List(ListArgs),

    /// Totals per category
    Groups(ModelArgs),

    /// Totals and breakdowns by type, material and phase
    Summary(ModelArgs),

    /// Export items as CSV or TSV
    Export(ExportArgs),
}

/// Model input and item shaping shared by every `qty` command
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Model file (.json, .yaml, .yml) or a directory of model files
    pub model: PathBuf,

    #[command(flatten)]
    pub filter: QuantityFilter,

    /// Fold identical elements into one counted item
    #[arg(long)]
    pub fold: bool,

    /// Apply unit prices from the configuration
    #[arg(long)]
    pub pricing: bool,

    /// Unit price override as KEY=PRICE, KEY being an IFC type or category (repeatable)
    #[arg(long = "price", value_name = "KEY=PRICE", value_parser = parse_price)]
    pub prices: Vec<(String, f64)>,
}

impl ModelArgs {
    fn pricing_enabled(&self, config: &Config) -> bool {
        self.pricing || config.quantity.pricing || !self.prices.is_empty()
    }

    fn price_table(&self, config: &Config) -> BTreeMap<String, f64> {
        let mut table = config.quantity.prices.clone();
        table.extend(self.prices.iter().cloned());
        table
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Tab-separated, for spreadsheets
    Tsv,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Export format
    #[arg(long, short = 'f', value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Run a qty subcommand
pub fn run(cmd: QtyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QtyCommands::List(args) => run_list(args, global),
        QtyCommands::Groups(args) => run_groups(args, global),
        QtyCommands::Summary(args) => run_summary(args, global),
        QtyCommands::Export(args) => run_export(args, global),
    }
}

/// Load, extract, price and filter
fn load_items(args: &ModelArgs, config: &Config) -> Result<Vec<QuantityItem>> {
    let model = load_model(&args.model)?;
    let options = ExtractOptions {
        fold_identical: args.fold || config.quantity.fold_identical,
    };

    let mut items = extract_quantities(&model, options);
    if args.pricing_enabled(config) {
        items = apply_pricing(&items, &args.price_table(config));
    }
    Ok(args.filter.apply(&items))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let mut items = load_items(&args.model, &config)?;
    let pricing = args.model.pricing_enabled(&config);

    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    if args.count {
        println!("{}", items.len());
        return Ok(());
    }

    let format = effective_format(global.output, true);
    if print_structured(&items, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv => print!("{}", export_to_csv(&items, ExportOptions { pricing })?),
        OutputFormat::Tsv => print!("{}", export_to_excel(&items, ExportOptions { pricing })?),
        _ => {
            if items.is_empty() {
                println!("No quantity items found.");
                return Ok(());
            }
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            println!("{}", render(rows, format));
            println!();
            println!("{} item(s) found.", style(items.len()).cyan());
        }
    }

    Ok(())
}

fn write_groups_delimited(groups: &[QuantificationGroup], format: OutputFormat) -> Result<()> {
    let mut wtr = delimited_writer(std::io::stdout(), format);

    wtr.write_record(["Category", "Items", "Count", "Area (m²)", "Volume (m³)", "Length (m)", "Cost"])
        .into_diagnostic()?;
    for g in groups {
        let blank = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_default();
        wtr.write_record([
            g.category.clone(),
            g.items.len().to_string(),
            g.total_count.to_string(),
            blank(g.total_area),
            blank(g.total_volume),
            blank(g.total_length),
            blank(g.total_cost),
        ])
        .into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;
    Ok(())
}

fn run_groups(args: ModelArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let items = load_items(&args, &config)?;
    let groups = group_quantities(&items);

    let format = effective_format(global.output, true);
    if print_structured(&groups, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv | OutputFormat::Tsv => write_groups_delimited(&groups, format)?,
        _ => {
            if groups.is_empty() {
                println!("No quantity items found.");
                return Ok(());
            }
            let rows: Vec<GroupRow> = groups.iter().map(GroupRow::from).collect();
            println!("{}", render(rows, format));
        }
    }

    Ok(())
}

fn summary_rows(items: &[QuantityItem]) -> Vec<KeyValueRow> {
    let summary = generate_summary(items);
    let mut rows = vec![
        KeyValueRow::new("Items", summary.total_items),
        KeyValueRow::new("Categories", summary.groups.len()),
        KeyValueRow::new("Area (m²)", format_opt(summary.total_area)),
        KeyValueRow::new("Volume (m³)", format_opt(summary.total_volume)),
        KeyValueRow::new("Length (m)", format_opt(summary.total_length)),
        KeyValueRow::new("Cost", format_opt(summary.total_cost)),
    ];
    rows.extend(
        summary
            .by_type
            .iter()
            .map(|(k, n)| KeyValueRow::new(format!("Type: {}", k), n)),
    );
    rows.extend(
        summary
            .by_material
            .iter()
            .map(|(k, n)| KeyValueRow::new(format!("Material: {}", k), n)),
    );
    rows.extend(
        summary
            .by_phase
            .iter()
            .map(|(k, n)| KeyValueRow::new(format!("Phase: {}", k), n)),
    );
    rows
}

fn run_summary(args: ModelArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let items = load_items(&args, &config)?;

    let format = match global.output {
        OutputFormat::Auto => OutputFormat::Table,
        f => f,
    };
    if print_structured(&generate_summary(&items), format)? {
        return Ok(());
    }

    let rows = summary_rows(&items);
    match format {
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut wtr = delimited_writer(std::io::stdout(), format);
            wtr.write_record(["Field", "Value"]).into_diagnostic()?;
            for row in &rows {
                wtr.write_record([&row.key, &row.value]).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        _ => println!("{}", render(rows, format)),
    }

    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let items = load_items(&args.model, &config)?;
    let options = ExportOptions {
        pricing: args.model.pricing_enabled(&config),
    };

    let text = match args.format {
        ExportFormat::Csv => export_to_csv(&items, options)?,
        ExportFormat::Tsv => export_to_excel(&items, options)?,
    };

    match &args.out {
        Some(path) => {
            fs::write(path, &text).into_diagnostic()?;
            println!(
                "{} Exported {} item(s) to {}",
                style("✓").green(),
                style(items.len()).cyan(),
                style(path.display()).yellow()
            );
        }
        None => print!("{}", text),
    }

    Ok(())
}
