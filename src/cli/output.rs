//! Output formatting utilities

use std::io::Write;

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a serializable value as JSON or YAML
///
/// Returns `false` for formats this helper does not handle.
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// CSV writer for `-o csv` / `-o tsv`
///
/// Tab-delimited for `Tsv`, comma-delimited otherwise. Fields holding the
/// delimiter or quotes are quoted; rows end with `\n`.
pub fn delimited_writer<W: Write>(out: W, format: OutputFormat) -> csv::Writer<W> {
    let delimiter = if format == OutputFormat::Tsv { b'\t' } else { b',' };
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}
