//! Command-line front end: classify points, tag points with polygon
//! properties, and generate triangle grids.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geo::Coord;
use geojson::{FeatureCollection, JsonObject};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pipcheck::grid::{triangle_grid, TriangleGridOptions, Units};
use pipcheck::models::feature_collection_from_str;
use pipcheck::pip::classify_feature;
use pipcheck::{BBox, Classification, PipOptions, PolygonFeature};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "pipcheck")]
#[command(about = "Point-in-polygon tools for GeoJSON")]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one point against every polygon in a file
    Classify {
        /// Point as "x,y"
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Coord<f64>,

        /// GeoJSON Polygon/MultiPolygon features
        #[arg(long)]
        polygons: PathBuf,

        /// Report boundary points as not contained
        #[arg(long)]
        ignore_boundary: bool,
    },

    /// Copy a polygon property onto the points it contains
    Tag {
        /// GeoJSON Point features
        #[arg(long)]
        points: PathBuf,

        /// GeoJSON Polygon/MultiPolygon features
        #[arg(long)]
        polygons: PathBuf,

        /// Property to read from polygons
        #[arg(long)]
        field: String,

        /// Property to write on points
        #[arg(long)]
        out_field: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a grid of triangles over a bbox
    Grid {
        /// Extent as "west,south,east,north"
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: BBox,

        /// Side length of each cell
        #[arg(long)]
        cell_side: f64,

        /// Units of the cell side
        #[arg(long, value_enum, default_value_t = UnitsArg::Kilometers)]
        units: UnitsArg,

        /// GeoJSON file whose first feature masks the grid
        #[arg(long)]
        mask: Option<PathBuf>,

        /// JSON object copied onto every triangle
        #[arg(long)]
        properties: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitsArg {
    Kilometers,
    Meters,
    Miles,
    NauticalMiles,
    Degrees,
    Radians,
}

impl From<UnitsArg> for Units {
    fn from(units: UnitsArg) -> Self {
        match units {
            UnitsArg::Kilometers => Units::Kilometers,
            UnitsArg::Meters => Units::Meters,
            UnitsArg::Miles => Units::Miles,
            UnitsArg::NauticalMiles => Units::NauticalMiles,
            UnitsArg::Degrees => Units::Degrees,
            UnitsArg::Radians => Units::Radians,
        }
    }
}

#[derive(Serialize)]
struct ClassifyResult {
    index: usize,
    classification: Classification,
    contains: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the GeoJSON output
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    if std::env::var_os("RUST_LOG").is_some() {
        tracing::subscriber::set_global_default(
            builder.with_env_filter(EnvFilter::from_default_env()).finish(),
        )?;
    } else {
        tracing::subscriber::set_global_default(builder.with_max_level(level).finish())?;
    }

    match args.command {
        Command::Classify {
            point,
            polygons,
            ignore_boundary,
        } => {
            let options = PipOptions::ignore_boundary(ignore_boundary);
            let features = load_polygons(&polygons)?;
            let results = features
                .iter()
                .enumerate()
                .map(|(index, feature)| -> Result<ClassifyResult> {
                    let classification = classify_feature(point, feature)
                        .with_context(|| format!("Polygon feature {}", index))?;
                    Ok(ClassifyResult {
                        index,
                        classification,
                        contains: classification.contains(options.ignore_boundary),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Tag {
            points,
            polygons,
            field,
            out_field,
            output,
        } => {
            let points = load_collection(&points)?;
            let polygons = load_collection(&polygons)?;
            let tagged = pipcheck::tag::tag(&points, &polygons, &field, &out_field)?;
            write_collection(&tagged, output.as_deref())?;
        }
        Command::Grid {
            bbox,
            cell_side,
            units,
            mask,
            properties,
            output,
        } => {
            let mask = match mask {
                Some(path) => {
                    let feature = load_polygons(&path)?
                        .into_iter()
                        .next()
                        .with_context(|| format!("{} has no features", path.display()))?;
                    Some(feature.geometry)
                }
                None => None,
            };
            let properties: JsonObject = match properties {
                Some(text) => serde_json::from_str(&text).context("Invalid --properties JSON")?,
                None => JsonObject::new(),
            };
            let options = TriangleGridOptions {
                units: units.into(),
                properties,
                mask,
            };
            let grid = triangle_grid(bbox, cell_side, &options)?;
            write_collection(&grid, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_collection(path: &Path) -> Result<FeatureCollection> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let collection = feature_collection_from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} features from {}", collection.features.len(), path.display());
    Ok(collection)
}

fn load_polygons(path: &Path) -> Result<Vec<PolygonFeature>> {
    load_collection(path)?
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            PolygonFeature::from_geojson(feature)
                .with_context(|| format!("Feature {} of {}", index, path.display()))
        })
        .collect()
}

fn write_collection(collection: &FeatureCollection, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string(collection)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} features to {}", collection.features.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Parse "x,y"
fn parse_point(s: &str) -> Result<Coord<f64>, String> {
    match parse_numbers(s)?.as_slice() {
        [x, y] => Ok(Coord { x: *x, y: *y }),
        _ => Err(format!("expected \"x,y\", got \"{}\"", s)),
    }
}

/// Parse "west,south,east,north"
fn parse_bbox(s: &str) -> Result<BBox, String> {
    let parts = parse_numbers(s)?;
    BBox::from_slice(&parts)
        .ok_or_else(|| format!("expected \"west,south,east,north\", got \"{}\"", s))
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number \"{}\": {}", p.trim(), e))
        })
        .collect()
}
