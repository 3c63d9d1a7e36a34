//! Delimited-text export of quantity items
//!
//! CSV for general use, tab-separated for pasting into spreadsheets. Column
//! set is fixed; price columns appear only when pricing is enabled. Rows end
//! with `\n` on every platform.

use std::collections::BTreeMap;

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::quantity::QuantityItem;

const BASE_HEADERS: [&str; 13] = [
    "ID",
    "Name",
    "Type",
    "Category",
    "Material",
    "Phase",
    "Length (m)",
    "Width (m)",
    "Height (m)",
    "Area (m²)",
    "Volume (m³)",
    "Count",
    "Unit",
];

const PRICE_HEADERS: [&str; 2] = ["Unit Price", "Total Price"];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportOptions {
    /// Append Unit Price and Total Price columns
    pub pricing: bool,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(bimtk::export::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(bimtk::export::io))]
    Io(#[from] std::io::Error),

    #[error("Export is not valid UTF-8: {0}")]
    #[diagnostic(code(bimtk::export::utf8))]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Missing column '{0}'")]
    #[diagnostic(
        code(bimtk::export::missing_column),
        help("The header row must come from a bimtk export")
    )]
    MissingColumn(String),

    #[error("Row {row}: invalid value '{value}' in column '{column}'")]
    #[diagnostic(code(bimtk::export::invalid_value))]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn headers(options: ExportOptions) -> Vec<&'static str> {
    let mut headers = BASE_HEADERS.to_vec();
    if options.pricing {
        headers.extend(PRICE_HEADERS);
    }
    headers
}

fn row(item: &QuantityItem, options: ExportOptions) -> Vec<String> {
    let mut row = vec![
        item.id.clone(),
        item.name.clone(),
        item.item_type.clone(),
        item.category.clone(),
        item.material.clone().unwrap_or_default(),
        item.phase.clone().unwrap_or_default(),
        fmt_opt(item.length),
        fmt_opt(item.width),
        fmt_opt(item.height),
        fmt_opt(item.area),
        fmt_opt(item.volume),
        item.count.to_string(),
        item.unit.clone(),
    ];
    if options.pricing {
        row.push(fmt_opt(item.unit_price));
        row.push(fmt_opt(item.total_price));
    }
    row
}

/// Write items as delimited text: header row, then one row per item
pub fn export_delimited(
    items: &[QuantityItem],
    options: ExportOptions,
    delimiter: u8,
) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(headers(options))?;
    for item in items {
        wtr.write_record(row(item, options))?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Comma-separated export
pub fn export_to_csv(items: &[QuantityItem], options: ExportOptions) -> Result<String, ExportError> {
    export_delimited(items, options, b',')
}

/// Tab-separated export for spreadsheets
pub fn export_to_excel(items: &[QuantityItem], options: ExportOptions) -> Result<String, ExportError> {
    export_delimited(items, options, b'\t')
}

/// Parse an export back into items
///
/// Recovers everything the export carries; `properties` are not exported
/// and come back empty. Price columns are optional.
pub fn read_export(text: &str, delimiter: u8) -> Result<Vec<QuantityItem>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let header_row = rdr.headers()?.clone();
    let columns: BTreeMap<&str, usize> = header_row
        .iter()
        .enumerate()
        .map(|(i, h)| (h, i))
        .collect();

    let index = |name: &str| -> Result<usize, ExportError> {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| ExportError::MissingColumn(name.to_string()))
    };
    let base: Vec<usize> = BASE_HEADERS
        .iter()
        .map(|&h| index(h))
        .collect::<Result<_, _>>()?;
    let unit_price_col = columns.get(PRICE_HEADERS[0]).copied();
    let total_price_col = columns.get(PRICE_HEADERS[1]).copied();

    let mut items = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row_no = i + 1;
        let field = |col: usize| record.get(col).unwrap_or("");
        let optional = |col: usize| Some(field(col).to_string()).filter(|s| !s.is_empty());
        let number = |col: usize, name: &str| -> Result<Option<f64>, ExportError> {
            let raw = field(col);
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>().map(Some).map_err(|_| ExportError::InvalidValue {
                row: row_no,
                column: name.to_string(),
                value: raw.to_string(),
            })
        };

        let count = field(base[11])
            .parse::<u32>()
            .map_err(|_| ExportError::InvalidValue {
                row: row_no,
                column: BASE_HEADERS[11].to_string(),
                value: field(base[11]).to_string(),
            })?;

        let unit_price = match unit_price_col {
            Some(col) => number(col, PRICE_HEADERS[0])?,
            None => None,
        };
        let total_price = match total_price_col {
            Some(col) => number(col, PRICE_HEADERS[1])?,
            None => None,
        };

        items.push(QuantityItem {
            id: field(base[0]).to_string(),
            name: field(base[1]).to_string(),
            item_type: field(base[2]).to_string(),
            category: field(base[3]).to_string(),
            material: optional(base[4]),
            phase: optional(base[5]),
            length: number(base[6], BASE_HEADERS[6])?,
            width: number(base[7], BASE_HEADERS[7])?,
            height: number(base[8], BASE_HEADERS[8])?,
            area: number(base[9], BASE_HEADERS[9])?,
            volume: number(base[10], BASE_HEADERS[10])?,
            count,
            unit: field(base[12]).to_string(),
            unit_price,
            total_price,
            properties: BTreeMap::new(),
        });
    }

    Ok(items)
}
