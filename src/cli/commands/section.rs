//! `bimtk section` command - Apply section planes to a set of points
//!
//! Builds planes through the section-plane manager, then reports the
//! effective clipping list and which points survive it.

use std::str::FromStr;

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{load_config, parse_point};
use crate::cli::output::{delimited_writer, effective_format, print_structured};
use crate::cli::table::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::geometry::{Point, Vector};
use crate::core::scene::InMemoryViewport;
use crate::core::section::SectionPlaneManager;
use crate::entities::section_plane::{ClipPlane, SectionAxis, SectionPlane};

/// A plane given on the command line
///
/// `AXIS=POSITION` for x/y/z, `custom=NX,NY,NZ,CONSTANT` for arbitrary
/// planes, each optionally followed by `:inv` and/or `:off`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSpec {
    pub axis: SectionAxis,
    pub position: f64,
    pub equation: Option<(Vector, f64)>,
    pub inverted: bool,
    pub disabled: bool,
}

impl FromStr for PlaneSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let head = parts.next().unwrap_or_default();
        let (axis, value) = head
            .split_once('=')
            .ok_or_else(|| format!("Invalid plane: '{}'. Use AXIS=POSITION or custom=NX,NY,NZ,D", s))?;
        let axis: SectionAxis = axis.trim().parse()?;

        let mut spec = PlaneSpec {
            axis,
            position: 0.0,
            equation: None,
            inverted: false,
            disabled: false,
        };

        let numbers: Vec<f64> = value
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| format!("Invalid plane values: '{}'", value))?;

        match (axis, numbers.as_slice()) {
            (SectionAxis::Custom, [nx, ny, nz, d]) => {
                spec.equation = Some((Vector::new(*nx, *ny, *nz), *d));
            }
            (SectionAxis::Custom, _) => {
                return Err(format!(
                    "Invalid custom plane: '{}'. Use custom=NX,NY,NZ,D",
                    s
                ))
            }
            (_, [position]) => spec.position = *position,
            _ => return Err(format!("Invalid plane position: '{}'", value)),
        }

        for flag in parts {
            match flag.trim().to_lowercase().as_str() {
                "inv" | "inverted" => spec.inverted = true,
                "off" | "disabled" => spec.disabled = true,
                other => {
                    return Err(format!(
                        "Invalid plane flag: '{}'. Use 'inv' or 'off'",
                        other
                    ))
                }
            }
        }

        Ok(spec)
    }
}

#[derive(clap::Args, Debug)]
pub struct SectionArgs {
    /// Plane as AXIS=POSITION or custom=NX,NY,NZ,D, with optional :inv / :off (repeatable)
    #[arg(long = "plane", short = 'p', required = true)]
    pub planes: Vec<PlaneSpec>,

    /// Point to test as x,y,z (repeatable)
    #[arg(long = "point", value_parser = parse_point, allow_hyphen_values = true)]
    pub points: Vec<Point>,

    /// Maximum number of planes (overrides configuration)
    #[arg(long)]
    pub max_planes: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PointReport {
    point: Point,
    visible: bool,
}

#[derive(Debug, Serialize)]
struct SectionReport {
    planes: Vec<SectionPlane>,
    clipping: Vec<ClipPlane>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    points: Vec<PointReport>,
}

#[derive(tabled::Tabled)]
struct PlaneRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "AXIS")]
    axis: String,
    #[tabled(rename = "NORMAL")]
    normal: String,
    #[tabled(rename = "CONSTANT")]
    constant: String,
    #[tabled(rename = "ENABLED")]
    enabled: bool,
    #[tabled(rename = "INVERTED")]
    inverted: bool,
}

/// Build the planes described by `specs` into `manager`
///
/// Planes past the capacity limit are skipped with a warning from the
/// manager; the number actually created is returned.
pub fn build_planes(
    manager: &mut SectionPlaneManager,
    viewport: &mut InMemoryViewport,
    specs: &[PlaneSpec],
) -> usize {
    let mut created = 0;
    for spec in specs {
        let Some(plane) = manager.create_plane(viewport, spec.axis, spec.position, None) else {
            continue;
        };
        created += 1;

        if let Some((normal, constant)) = spec.equation {
            manager.update_plane_normal(viewport, &plane.id, normal, constant);
        }
        if spec.inverted {
            manager.invert_plane(viewport, &plane.id);
        }
        if spec.disabled {
            manager.toggle_plane(viewport, &plane.id);
        }
        let size = manager.config().helper_size;
        manager.create_plane_helper(viewport, &plane.id, size);
    }
    created
}

/// Run the section command
pub fn run(args: SectionArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?.section;
    if let Some(max) = args.max_planes {
        if max == 0 {
            return Err(miette::miette!("--max-planes must be at least 1"));
        }
        config.max_planes = max;
    }

    let mut viewport = InMemoryViewport::new();
    let mut manager = SectionPlaneManager::new(config);
    let created = build_planes(&mut manager, &mut viewport, &args.planes);
    if created < args.planes.len() {
        eprintln!(
            "{} {} plane(s) skipped: limit is {}",
            style("!").yellow(),
            args.planes.len() - created,
            manager.config().max_planes
        );
    }

    let report = SectionReport {
        planes: manager.planes().to_vec(),
        clipping: viewport.clipping_planes().to_vec(),
        points: args
            .points
            .iter()
            .map(|p| PointReport {
                point: *p,
                visible: viewport.is_point_visible(p),
            })
            .collect(),
    };

    let format = effective_format(global.output, true);
    if print_structured(&report, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut wtr = delimited_writer(std::io::stdout(), format);
            wtr.write_record(["x", "y", "z", "visible"]).into_diagnostic()?;
            for p in &report.points {
                wtr.write_record([
                    p.point.x.to_string(),
                    p.point.y.to_string(),
                    p.point.z.to_string(),
                    p.visible.to_string(),
                ])
                .into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        _ => {
            let rows: Vec<PlaneRow> = report
                .planes
                .iter()
                .map(|p| PlaneRow {
                    name: p.name.clone(),
                    axis: p.axis.to_string(),
                    normal: format!("({:.3}, {:.3}, {:.3})", p.normal.x, p.normal.y, p.normal.z),
                    constant: format!("{:.3}", p.constant),
                    enabled: p.enabled,
                    inverted: p.inverted,
                })
                .collect();
            println!("{}", render(rows, format));

            if !report.points.is_empty() {
                println!();
                for p in &report.points {
                    let marker = if p.visible {
                        style("visible").green()
                    } else {
                        style("clipped").red()
                    };
                    println!(
                        "  ({}, {}, {})  {}",
                        p.point.x, p.point.y, p.point.z, marker
                    );
                }
            }
        }
    }

    Ok(())
}
