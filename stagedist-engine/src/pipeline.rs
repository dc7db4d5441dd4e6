//! The three-table distribution run.
//!
//! Rows are processed strictly in file order: claims made by earlier rows
//! shadow later ones, and the block/floor records are handed downstream in
//! the same order they were produced.
use serde::{Deserialize, Serialize};

use crate::aggregate::{DistributionRecord, weighted_total};
use crate::claims::ClaimTracker;
use crate::constants::{BLOCK_TIER_START, DESCRIPTOR_COLUMNS};
use crate::error::DistributionError;
use crate::geometry::Point;
use crate::numbers::usize_to_u64;
use crate::quota::{Counts, QuotaPolicy};
use crate::spawn::{SpawnCount, allocate_spawns};
use crate::stage::StageConfig;
use crate::table::{
    ObjectRow, RatioRow, RegionDescriptor, TableKind, parse_object_table, parse_ratio_table,
};

/// Knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub allocation: QuotaPolicy,
    /// Drop cells that fall outside the stage bounds.
    #[serde(default = "PipelineConfig::default_clip_to_stage")]
    pub clip_to_stage: bool,
}

impl PipelineConfig {
    const fn default_clip_to_stage() -> bool {
        true
    }

    /// Reproduces the older tool: rounded shares, no clipping.
    #[must_use]
    pub const fn legacy() -> Self {
        Self {
            allocation: QuotaPolicy::RoundNearest,
            clip_to_stage: false,
        }
    }

    fn tracker(&self, stage: &StageConfig) -> ClaimTracker {
        ClaimTracker::new(self.clip_to_stage.then(|| stage.bounds()))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allocation: QuotaPolicy::default(),
            clip_to_stage: Self::default_clip_to_stage(),
        }
    }
}

/// Per-table counters reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: TableKind,
    pub rows_read: usize,
    pub rows_emitted: usize,
    /// Rows dropped for an unrecognized region type.
    pub skipped_rows: usize,
    /// Rows whose weights were all zero and were emitted as zeros.
    pub degenerate_rows: usize,
    pub claimed_points: usize,
}

impl TableSummary {
    #[must_use]
    pub const fn new(table: TableKind) -> Self {
        Self {
            table,
            rows_read: 0,
            rows_emitted: 0,
            skipped_rows: 0,
            degenerate_rows: 0,
            claimed_points: 0,
        }
    }
}

/// Output row of the block/floor and floor-in-block tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub fields: [String; DESCRIPTOR_COLUMNS],
    pub total: u64,
    pub counts: Counts,
}

/// Output row of the object table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDistributionRow {
    pub fields: [String; DESCRIPTOR_COLUMNS],
    pub total: u64,
    pub jewels: i64,
    pub objects: Vec<SpawnCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOutput<R> {
    pub rows: Vec<R>,
    pub summary: TableSummary,
}

impl<R> TableOutput<R> {
    const fn new(table: TableKind) -> Self {
        Self {
            rows: Vec::new(),
            summary: TableSummary::new(table),
        }
    }

    fn push(&mut self, row: R) {
        self.rows.push(row);
        self.summary.rows_emitted += 1;
    }
}

/// Block/floor output plus the records dependent tables draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFloorRun {
    pub output: TableOutput<CategoryRow>,
    pub records: Vec<DistributionRecord>,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRun {
    pub stage: StageConfig,
    pub config: PipelineConfig,
    pub block_floor: TableOutput<CategoryRow>,
    pub obj_in_block: TableOutput<ObjectDistributionRow>,
    pub floor_in_block: TableOutput<CategoryRow>,
    #[serde(skip)]
    pub records: Vec<DistributionRecord>,
}

impl DistributionRun {
    #[must_use]
    pub const fn summaries(&self) -> [TableSummary; 3] {
        [
            self.block_floor.summary,
            self.obj_in_block.summary,
            self.floor_in_block.summary,
        ]
    }
}

/// Claim the cells of a row's region, or `None` when the region type is
/// unknown and the row must be dropped.
fn claim_row(
    tracker: &mut ClaimTracker,
    summary: &mut TableSummary,
    line: usize,
    descriptor: &RegionDescriptor,
) -> Option<Vec<Point>> {
    summary.rows_read += 1;
    let Some(region) = descriptor.region() else {
        log::warn!(
            "{} line {line}: unknown region type {:?}, row skipped",
            summary.table,
            descriptor.type_token()
        );
        summary.skipped_rows += 1;
        return None;
    };
    let points = tracker.filter_and_claim(region.points());
    summary.claimed_points = tracker.claimed_len();
    log::debug!(
        "{} line {line}: {region} claimed {} of {} cells",
        summary.table,
        points.len(),
        region.point_count()
    );
    Some(points)
}

/// Split a total, turning degenerate weights into a zero row.
fn split_total(
    policy: QuotaPolicy,
    summary: &mut TableSummary,
    line: usize,
    total: u64,
    weights: &[u64],
) -> Counts {
    policy.allocate(total, weights).unwrap_or_else(|err| {
        log::warn!("{} line {line}: {err}; emitting zeros", summary.table);
        summary.degenerate_rows += 1;
        std::iter::repeat_n(0, weights.len()).collect()
    })
}

fn finish<R>(output: &TableOutput<R>) {
    let s = &output.summary;
    log::info!(
        "{}: {} rows read, {} emitted, {} skipped, {} degenerate, {} cells claimed",
        s.table,
        s.rows_read,
        s.rows_emitted,
        s.skipped_rows,
        s.degenerate_rows,
        s.claimed_points
    );
}

/// Block/floor table: the row's total is the number of cells it claims.
#[must_use]
pub fn distribute_block_floor(
    rows: &[RatioRow],
    stage: &StageConfig,
    config: &PipelineConfig,
) -> BlockFloorRun {
    let mut tracker = config.tracker(stage);
    let mut output = TableOutput::new(TableKind::BlockFloor);
    let mut records = Vec::new();

    for row in rows {
        let Some(points) = claim_row(&mut tracker, &mut output.summary, row.line, &row.descriptor)
        else {
            continue;
        };
        let total = usize_to_u64(points.len());
        let counts = split_total(
            config.allocation,
            &mut output.summary,
            row.line,
            total,
            &row.weights,
        );
        let blocks = counts.iter().skip(BLOCK_TIER_START).sum();
        records.push(DistributionRecord::new(blocks, points));
        output.push(CategoryRow {
            fields: row.descriptor.fields.clone(),
            total,
            counts,
        });
    }

    finish(&output);
    BlockFloorRun { output, records }
}

/// Object table: totals come from overlap with the block/floor records.
#[must_use]
pub fn distribute_obj_in_block(
    rows: &[ObjectRow],
    stage: &StageConfig,
    config: &PipelineConfig,
    records: &[DistributionRecord],
) -> TableOutput<ObjectDistributionRow> {
    let mut tracker = config.tracker(stage);
    let mut output = TableOutput::new(TableKind::ObjInBlock);

    for row in rows {
        let Some(points) = claim_row(&mut tracker, &mut output.summary, row.line, &row.descriptor)
        else {
            continue;
        };
        let total = weighted_total(&points, records);
        let spawns = allocate_spawns(total, row.jewel_percent, &row.objects);
        output.push(ObjectDistributionRow {
            fields: row.descriptor.fields.clone(),
            total,
            jewels: spawns.jewels,
            objects: spawns.objects,
        });
    }

    finish(&output);
    output
}

/// Floor-in-block table: block/floor allocation over an inherited total.
#[must_use]
pub fn distribute_floor_in_block(
    rows: &[RatioRow],
    stage: &StageConfig,
    config: &PipelineConfig,
    records: &[DistributionRecord],
) -> TableOutput<CategoryRow> {
    let mut tracker = config.tracker(stage);
    let mut output = TableOutput::new(TableKind::FloorInBlock);

    for row in rows {
        let Some(points) = claim_row(&mut tracker, &mut output.summary, row.line, &row.descriptor)
        else {
            continue;
        };
        let total = weighted_total(&points, records);
        let counts = split_total(
            config.allocation,
            &mut output.summary,
            row.line,
            total,
            &row.weights,
        );
        output.push(CategoryRow {
            fields: row.descriptor.fields.clone(),
            total,
            counts,
        });
    }

    finish(&output);
    output
}

/// Raw text of the three input tables.
#[derive(Debug, Clone, Copy)]
pub struct TableTexts<'a> {
    pub block_floor: &'a str,
    pub obj_in_block: &'a str,
    pub floor_in_block: &'a str,
}

/// Parse all three tables, then distribute them in order.
///
/// Every table is parsed before any is processed, so a malformed row never
/// yields partial output.
///
/// # Errors
///
/// Returns the first parse failure found, checking tables in processing
/// order.
pub fn run_tables(
    stage: StageConfig,
    texts: TableTexts<'_>,
    config: PipelineConfig,
) -> Result<DistributionRun, DistributionError> {
    let block_rows = parse_ratio_table(TableKind::BlockFloor, texts.block_floor)?;
    let object_rows = parse_object_table(texts.obj_in_block)?;
    let floor_rows = parse_ratio_table(TableKind::FloorInBlock, texts.floor_in_block)?;

    let BlockFloorRun {
        output: block_floor,
        records,
    } = distribute_block_floor(&block_rows, &stage, &config);
    let obj_in_block = distribute_obj_in_block(&object_rows, &stage, &config, &records);
    let floor_in_block = distribute_floor_in_block(&floor_rows, &stage, &config, &records);

    Ok(DistributionRun {
        stage,
        config,
        block_floor,
        obj_in_block,
        floor_in_block,
        records,
    })
}
