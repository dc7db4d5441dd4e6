//! Stage Distribution Engine
//!
//! Turns hand-authored region ratio tables into exact per-region counts of
//! floors, blocks and spawned objects for a tile-based stage.
//! This crate does no file I/O; callers feed it text through [`TableSource`].

pub mod aggregate;
pub mod claims;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod numbers;
pub mod pipeline;
pub mod quota;
pub mod region;
pub mod spawn;
pub mod stage;
pub mod table;

// Re-export commonly used types
pub use aggregate::{DistributionRecord, weighted_total};
pub use claims::{ClaimTracker, PointSet, point_set};
pub use error::DistributionError;
pub use geometry::Point;
pub use pipeline::{
    BlockFloorRun, CategoryRow, DistributionRun, ObjectDistributionRow, PipelineConfig,
    TableOutput, TableSummary, TableTexts, distribute_block_floor, distribute_floor_in_block,
    distribute_obj_in_block, run_tables,
};
pub use quota::{Counts, QuotaError, QuotaPolicy};
pub use region::{DiamondRegion, RectRegion, Region, RegionKind};
pub use spawn::{ObjectSpawn, SpawnAllocation, SpawnCount, allocate_spawns, clamped_count};
pub use stage::StageConfig;
pub use table::{ObjectRow, RatioRow, RegionDescriptor, TableKind};

/// Trait for abstracting where stage configuration and tables come from.
/// The engine never touches the filesystem; callers own the reading.
pub trait TableSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the base stage configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn load_stage_config(&self) -> Result<String, Self::Error>;

    /// Load the raw text of one input table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read.
    fn load_table(&self, table: TableKind) -> Result<String, Self::Error>;
}

/// Runs the three-table distribution against a [`TableSource`].
pub struct DistributionEngine<S>
where
    S: TableSource,
{
    source: S,
    config: PipelineConfig,
}

impl<S> DistributionEngine<S>
where
    S: TableSource,
{
    /// Create an engine with the provided source and run configuration
    pub const fn new(source: S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the stage bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is malformed.
    pub fn load_stage(&self) -> Result<StageConfig, DistributionError> {
        let json = self
            .source
            .load_stage_config()
            .map_err(|err| DistributionError::Source {
                what: "stage config".to_string(),
                source: Box::new(err),
            })?;
        StageConfig::from_json(&json)
    }

    fn load_table(&self, table: TableKind) -> Result<String, DistributionError> {
        self.source
            .load_table(table)
            .map_err(|err| DistributionError::Source {
                what: format!("{table} table"),
                source: Box::new(err),
            })
    }

    /// Load everything and distribute all three tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage config is unusable, a table cannot be
    /// loaded, or a table row is malformed. Nothing is produced in that case.
    pub fn run(&self) -> Result<DistributionRun, DistributionError> {
        let stage = self.load_stage()?;
        let block_floor = self.load_table(TableKind::BlockFloor)?;
        let obj_in_block = self.load_table(TableKind::ObjInBlock)?;
        let floor_in_block = self.load_table(TableKind::FloorInBlock)?;
        run_tables(
            stage,
            TableTexts {
                block_floor: &block_floor,
                obj_in_block: &obj_in_block,
                floor_in_block: &floor_in_block,
            },
            self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fmt;

    #[derive(Debug)]
    struct Missing(&'static str);

    impl fmt::Display for Missing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} not found", self.0)
        }
    }

    impl std::error::Error for Missing {}

    #[derive(Default)]
    struct FixtureSource {
        stage: Option<String>,
        tables: HashMap<TableKind, String>,
    }

    impl TableSource for FixtureSource {
        type Error = Missing;

        fn load_stage_config(&self) -> Result<String, Self::Error> {
            self.stage.clone().ok_or(Missing("stage"))
        }

        fn load_table(&self, table: TableKind) -> Result<String, Self::Error> {
            self.tables.get(&table).cloned().ok_or(Missing(table.label()))
        }
    }

    fn fixture() -> FixtureSource {
        FixtureSource {
            stage: Some(
                r#"{"stageMaxLT":{"value":{"x":0,"y":0}},"stageMaxRB":{"value":{"x":3,"y":3}}}"#
                    .to_string(),
            ),
            tables: HashMap::from([
                (
                    TableKind::BlockFloor,
                    "h\nh\nrect,0,0,3,3,0,0,0,0,1,0,0,0\n".to_string(),
                ),
                (
                    TableKind::ObjInBlock,
                    "h\nh\nrect,0,0,1,1,0,50,,7,1,-1,-1,25\n".to_string(),
                ),
                (
                    TableKind::FloorInBlock,
                    "h\nh\nrect,0,0,3,1,0,1,1,0\n".to_string(),
                ),
            ]),
        }
    }

    #[test]
    fn engine_runs_all_tables() {
        let engine = DistributionEngine::new(fixture(), PipelineConfig::default());
        let run = engine.run().unwrap();
        assert_eq!(run.block_floor.rows[0].counts.as_slice(), &[0, 0, 0, 16, 0, 0, 0]);
        assert_eq!(run.obj_in_block.rows[0].total, 4);
        assert_eq!(run.obj_in_block.rows[0].jewels, 2);
        assert_eq!(run.obj_in_block.rows[0].objects[0].num, 1);
        assert_eq!(run.floor_in_block.rows[0].total, 8);
        assert_eq!(run.floor_in_block.rows[0].counts.as_slice(), &[4, 4, 0]);
        assert_eq!(run.summaries().map(|s| s.rows_emitted), [1, 1, 1]);
    }

    #[test]
    fn missing_stage_config_aborts() {
        let source = FixtureSource {
            stage: None,
            ..fixture()
        };
        let engine = DistributionEngine::new(source, PipelineConfig::default());
        let err = engine.run().unwrap_err();
        assert!(matches!(err, DistributionError::Source { .. }));
        assert!(err.to_string().contains("stage config"));
    }

    #[test]
    fn missing_table_names_the_table() {
        let mut source = fixture();
        source.tables.remove(&TableKind::ObjInBlock);
        let engine = DistributionEngine::new(source, PipelineConfig::legacy());
        assert!(!engine.config().clip_to_stage);
        let err = engine.run().unwrap_err();
        assert_eq!(err.to_string(), "failed to load obj_in_block table");
    }
}
