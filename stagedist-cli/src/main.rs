mod reports;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use stagedist_engine::constants::{
    DEFAULT_BLOCK_FLOOR_OUTPUT, DEFAULT_FLOOR_IN_BLOCK_OUTPUT, DEFAULT_OBJ_IN_BLOCK_OUTPUT,
    DEFAULT_STAGE_CONFIG_PATH,
};
use stagedist_engine::{DistributionEngine, DistributionRun, PipelineConfig, QuotaPolicy, TableKind};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use source::FsTableSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Allocation {
    /// Floor every share and give the remainder to the first category
    FloorRemainder,
    /// Round every share to nearest; totals may drift
    RoundNearest,
}

impl From<Allocation> for QuotaPolicy {
    fn from(value: Allocation) -> Self {
        match value {
            Allocation::FloorRemainder => Self::FloorRemainder,
            Allocation::RoundNearest => Self::RoundNearest,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stagedist", version)]
#[command(
    about = "Build block/floor, object and break-floor distribution tables from stage ratio tables"
)]
struct Args {
    /// Region -> block and floor ratios (config_block_floor_map.csv)
    block_floor: PathBuf,

    /// Region -> objects dropped by broken blocks (config_obj_in_block.csv)
    obj_in_block: PathBuf,

    /// Region -> floors revealed by broken blocks (config_floor_in_block_map.csv)
    floor_in_block: PathBuf,

    /// Base stage configuration holding stageMaxLT / stageMaxRB
    #[arg(long, default_value = DEFAULT_STAGE_CONFIG_PATH)]
    stage_config: PathBuf,

    /// Directory the distribution files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// File name of the block/floor distribution
    #[arg(long, default_value = DEFAULT_BLOCK_FLOOR_OUTPUT)]
    block_floor_out: String,

    /// File name of the object distribution
    #[arg(long, default_value = DEFAULT_OBJ_IN_BLOCK_OUTPUT)]
    obj_in_block_out: String,

    /// File name of the break-floor distribution
    #[arg(long, default_value = DEFAULT_FLOOR_IN_BLOCK_OUTPUT)]
    floor_in_block_out: String,

    /// How totals are split across categories
    #[arg(long, value_enum, default_value_t = Allocation::FloorRemainder)]
    allocation: Allocation,

    /// Keep cells outside the stage bounds
    #[arg(long)]
    no_stage_clip: bool,

    /// Reproduce the older tool: round-nearest shares and no stage clipping
    #[arg(long, conflicts_with_all = ["allocation", "no_stage_clip"])]
    legacy: bool,

    /// Summary report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Optional path to write the summary report instead of stdout
    #[arg(long)]
    report_output: Option<PathBuf>,

    /// Verbose output (per-row debug logging)
    #[arg(short, long)]
    verbose: bool,
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
struct RunConfig {
    source: FsTableSource,
    pipeline: PipelineConfig,
    outputs: [(TableKind, PathBuf); 3],
}

impl RunConfig {
    fn from_args(args: &Args) -> Self {
        let pipeline = if args.legacy {
            PipelineConfig::legacy()
        } else {
            PipelineConfig {
                allocation: args.allocation.into(),
                clip_to_stage: !args.no_stage_clip,
            }
        };
        Self {
            source: FsTableSource {
                stage_config: args.stage_config.clone(),
                block_floor: args.block_floor.clone(),
                obj_in_block: args.obj_in_block.clone(),
                floor_in_block: args.floor_in_block.clone(),
            },
            pipeline,
            outputs: [
                (TableKind::BlockFloor, args.out_dir.join(&args.block_floor_out)),
                (TableKind::ObjInBlock, args.out_dir.join(&args.obj_in_block_out)),
                (
                    TableKind::FloorInBlock,
                    args.out_dir.join(&args.floor_in_block_out),
                ),
            ],
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let start_time = Instant::now();
    let config = RunConfig::from_args(&args);
    let run = execute(&config)?;
    write_outputs(&config, &run)?;
    write_reports(&args, &run, start_time)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn execute(config: &RunConfig) -> Result<DistributionRun> {
    let engine = DistributionEngine::new(config.source.clone(), config.pipeline);
    engine.run().context("distribution run failed")
}

/// Render every table first, then write them, so a failed render leaves no
/// partial set of files behind.
fn write_outputs(config: &RunConfig, run: &DistributionRun) -> Result<()> {
    let rendered = config
        .outputs
        .iter()
        .map(|(table, path)| {
            reports::render_table(run, *table)
                .with_context(|| format!("failed to render {table} distribution"))
                .map(|bytes| (path.as_path(), bytes))
        })
        .collect::<Result<Vec<(&Path, Vec<u8>)>>>()?;

    for (path, bytes) in rendered {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn write_reports(args: &Args, run: &DistributionRun, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.report_output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, run)?,
        _ => {
            writeln!(
                &mut output_target,
                "{}",
                "🧱 Stage Distribution".bright_cyan().bold()
            )?;
            reports::generate_console_report(&mut output_target, run, start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
