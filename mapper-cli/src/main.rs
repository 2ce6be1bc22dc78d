mod fill;
mod job;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fill::{FillType, generate_fill};
use job::{MapJob, parse_mappings};
use mapper_core::{ElementKind, FieldStore, GridTopology, MappingKind, RasterGrid, map};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON job file; replaces the grid/field/mapping flags below
    #[arg(long)]
    job: Option<PathBuf>,

    /// Raster rows
    #[arg(long, default_value_t = 4)]
    rows: usize,

    /// Raster columns
    #[arg(long, default_value_t = 5)]
    cols: usize,

    /// Node spacing
    #[arg(long, default_value_t = 1.0)]
    spacing: f64,

    /// Name of the node field to map
    #[arg(long, default_value = "values")]
    field: String,

    /// Node field fill: arange | random | constant:<value>
    #[arg(long, default_value = "arange")]
    fill: FillType,

    /// RNG seed for the random fill (reproducibility)
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Comma-separated mappings, e.g. "tail,head,mean,max,min,cell"
    #[arg(long, default_value = "tail,head,mean,max,min,cell")]
    mappings: String,

    /// Report path (JSON); stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Level {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct MappedField {
    mapping: MappingKind,
    at: ElementKind,
    name: String,
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct MapReport {
    rows: usize,
    cols: usize,
    spacing: f64,

    nodes: usize,
    links: usize,
    cells: usize,

    field: String,
    fill: FillType,
    seed: u64,
    node_values: Vec<f64>,

    results: Vec<MappedField>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(args.log_level))
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let job = match &args.job {
        Some(path) => MapJob::from_json_file(path)?,
        None => job_from_args(&args)?,
    };

    let report = run_job(&job)?;

    match &args.out {
        Some(path) => {
            let mut w = BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            );
            serde_json::to_writer_pretty(&mut w, &report)?;
            w.write_all(b"\n")?;
            w.flush()?;
            info!("Wrote report to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut w = stdout.lock();
            serde_json::to_writer_pretty(&mut w, &report)?;
            w.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn job_from_args(args: &Args) -> Result<MapJob> {
    let job = MapJob {
        rows: args.rows,
        cols: args.cols,
        spacing: args.spacing,
        field: args.field.clone(),
        fill: args.fill,
        seed: args.seed,
        mappings: parse_mappings(&args.mappings)?,
    };
    job.validate()?;
    Ok(job)
}

fn run_job(job: &MapJob) -> Result<MapReport> {
    let grid = RasterGrid::with_spacing(job.rows, job.cols, job.spacing)
        .with_context(|| format!("building {}x{} raster", job.rows, job.cols))?;
    info!(
        "Raster {}x{}: {} nodes, {} links, {} cells",
        job.rows,
        job.cols,
        grid.node_count(),
        grid.link_count(),
        grid.cell_count()
    );

    let mut rng = ChaCha8Rng::seed_from_u64(job.seed);
    let node_values = generate_fill(&mut rng, grid.node_count(), job.fill);

    let mut fields = FieldStore::new(&grid);
    fields.add_field(ElementKind::Node, &job.field, node_values.clone())?;

    let mut results = Vec::with_capacity(job.mappings.len());
    for &kind in &job.mappings {
        let name = job.output_name(kind);
        let values = map(kind, &grid, &mut fields, &job.field, &name)
            .with_context(|| format!("mapping '{}' with {kind}", job.field))?
            .to_vec();
        results.push(MappedField {
            mapping: kind,
            at: kind.target(),
            name,
            values,
        });
    }

    info!("Mappings: {} (field '{}', fill {})", results.len(), job.field, job.fill);

    Ok(MapReport {
        rows: job.rows,
        cols: job.cols,
        spacing: job.spacing,
        nodes: grid.node_count(),
        links: grid.link_count(),
        cells: grid.cell_count(),
        field: job.field.clone(),
        fill: job.fill,
        seed: job.seed,
        node_values,
        results,
    })
}
