//! `bimtk measure` command - Run one measurement over picked points
//!
//! Feeds the points through a measurement session exactly as a viewer would,
//! including grid snapping, and prints the committed record.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{load_config, parse_point};
use crate::cli::output::{delimited_writer, effective_format, print_structured};
use crate::cli::table::{render, KeyValueRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::MeasurementConfig;
use crate::core::geometry::{self, Point};
use crate::core::measurement::MeasurementEngine;
use crate::core::scene::{InMemoryViewport, SceneNode};
use crate::core::units::LengthUnit;
use crate::entities::measurement::{Measurement, MeasurementKind};

#[derive(clap::Args, Debug)]
pub struct MeasureArgs {
    /// Measurement kind: distance, area or angle
    pub kind: MeasurementKind,

    /// Picked points as x,y,z; the angle vertex is the second point.
    /// Options go before the first point.
    #[arg(required = true, num_args = 1.., value_parser = parse_point, allow_hyphen_values = true)]
    pub points: Vec<Point>,

    /// Unit to report in
    #[arg(long, short = 'u')]
    pub length_unit: Option<LengthUnit>,

    /// Label text for distance/area units (angles always use °)
    #[arg(long)]
    pub unit: Option<String>,

    /// Decimal places in the label
    #[arg(long, short = 'p')]
    pub precision: Option<usize>,

    /// Grid size for snapping
    #[arg(long)]
    pub grid: Option<f64>,

    /// Disable grid snapping
    #[arg(long)]
    pub no_snap: bool,

    /// Include the scene objects the measurement created
    #[arg(long)]
    pub scene: bool,
}

impl MeasureArgs {
    /// Command-line flags over configuration values
    fn apply_to(&self, config: &mut MeasurementConfig) {
        if let Some(unit) = self.length_unit {
            config.length_unit = unit;
        }
        if let Some(label) = &self.unit {
            config.unit = Some(label.clone());
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(grid) = self.grid {
            config.grid_size = grid;
        }
        if self.no_snap {
            config.snap_to_grid = false;
        }
    }
}

#[derive(Serialize)]
struct MeasureOutput<'a> {
    #[serde(flatten)]
    measurement: &'a Measurement,
    #[serde(skip_serializing_if = "Option::is_none")]
    scene: Option<Vec<&'a SceneNode>>,
}

fn format_point(p: &Point) -> String {
    format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
}

/// Run the measure command
pub fn run(args: MeasureArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?.measurement;
    args.apply_to(&mut config);

    // Area polygons take every point given, then close
    if args.kind == MeasurementKind::Area {
        config.explicit_polygon_close = true;
    }

    let mut viewport = InMemoryViewport::new();
    let mut engine = MeasurementEngine::new(config);
    engine.start_measurement(args.kind);

    for point in &args.points {
        if !engine.is_active() {
            return Err(miette::miette!(
                "Too many points for {} measurement (needs {})",
                args.kind,
                geometry::commit_threshold(args.kind)
            ));
        }
        engine.add_point(&mut viewport, *point, None);
    }
    if args.kind == MeasurementKind::Area {
        engine.finish_measurement(&mut viewport);
    }

    let Some(measurement) = engine.measurements().first() else {
        let collected = engine.pending_points().len();
        return Err(miette::miette!(
            help = "Angle arms need points distinct from the vertex",
            "No {} measurement from {} point(s)",
            args.kind,
            collected.max(args.points.len())
        ));
    };

    let format = effective_format(global.output, false);
    let output = MeasureOutput {
        measurement,
        scene: args
            .scene
            .then(|| viewport.nodes().map(|(_, node)| node).collect()),
    };
    if print_structured(&output, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut wtr = delimited_writer(std::io::stdout(), format);
            wtr.write_record(["kind", "value", "unit", "label"]).into_diagnostic()?;
            wtr.write_record([
                measurement.kind.to_string(),
                measurement.value.to_string(),
                measurement.unit.clone(),
                measurement.label.clone(),
            ])
            .into_diagnostic()?;
            wtr.flush().into_diagnostic()?;
        }
        _ => {
            let mut rows = vec![
                KeyValueRow::new("ID", measurement.id),
                KeyValueRow::new("Kind", measurement.kind),
                KeyValueRow::new("Value", measurement.value),
                KeyValueRow::new("Label", &measurement.label),
            ];
            rows.extend(
                measurement
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| KeyValueRow::new(format!("Point {}", i + 1), format_point(p))),
            );
            if args.scene {
                rows.push(KeyValueRow::new("Scene objects", viewport.live_count()));
            }
            println!("{}", render(rows, format));
            println!();
            println!("{} {}", style("✓").green(), style(&measurement.label).cyan().bold());
        }
    }

    Ok(())
}
