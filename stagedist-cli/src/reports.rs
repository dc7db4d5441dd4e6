use anyhow::Result;
use colored::Colorize;
use stagedist_engine::constants::{
    DESCRIPTOR_HEADER, JEWEL_HEADER, MIN_OBJECT_HEADER_GROUPS, TOTAL_HEADER,
};
use stagedist_engine::{CategoryRow, DistributionRun, ObjectDistributionRow, TableKind};
use std::io::Write;
use std::time::Duration;

const HEADER_SEPARATOR: &str = ", ";

fn header_line(columns: impl IntoIterator<Item = String>) -> String {
    columns.into_iter().collect::<Vec<_>>().join(HEADER_SEPARATOR)
}

fn leading_columns() -> impl Iterator<Item = String> {
    DESCRIPTOR_HEADER
        .into_iter()
        .chain(std::iter::once(TOTAL_HEADER))
        .map(str::to_string)
}

/// Header of the block/floor and floor-in-block outputs.
#[must_use]
pub fn category_header(table: TableKind) -> String {
    header_line(leading_columns().chain(table.categories().iter().map(|c| (*c).to_string())))
}

/// Header of the object output, widened past two groups when needed.
#[must_use]
pub fn object_header(groups: usize) -> String {
    let groups = groups.max(MIN_OBJECT_HEADER_GROUPS);
    let object_columns =
        (1..=groups).flat_map(|n| [format!("obj{n}"), format!("level{n}"), format!("num{n}")]);
    header_line(
        leading_columns()
            .chain(std::iter::once(JEWEL_HEADER.to_string()))
            .chain(object_columns),
    )
}

pub fn write_category_csv<W: Write>(
    out: &mut W,
    table: TableKind,
    rows: &[CategoryRow],
) -> Result<()> {
    writeln!(out, "{}", category_header(table))?;
    for row in rows {
        let mut cells: Vec<String> = row.fields.to_vec();
        cells.push(row.total.to_string());
        cells.extend(row.counts.iter().map(u64::to_string));
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}

pub fn write_object_csv<W: Write>(out: &mut W, rows: &[ObjectDistributionRow]) -> Result<()> {
    let groups = rows.iter().map(|r| r.objects.len()).max().unwrap_or(0);
    writeln!(out, "{}", object_header(groups))?;
    for row in rows {
        let mut cells: Vec<String> = row.fields.to_vec();
        cells.push(row.total.to_string());
        cells.push(row.jewels.to_string());
        for object in &row.objects {
            cells.push(object.kind.clone());
            cells.push(object.level.clone());
            cells.push(object.num.to_string());
        }
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}

/// Render one output table into memory.
pub fn render_table(run: &DistributionRun, table: TableKind) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match table {
        TableKind::BlockFloor => write_category_csv(&mut buffer, table, &run.block_floor.rows)?,
        TableKind::ObjInBlock => write_object_csv(&mut buffer, &run.obj_in_block.rows)?,
        TableKind::FloorInBlock => {
            write_category_csv(&mut buffer, table, &run.floor_in_block.rows)?;
        }
    }
    Ok(buffer)
}

pub fn generate_json_report<W: Write>(out: &mut W, run: &DistributionRun) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&run.summaries())?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    run: &DistributionRun,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Distribution Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    writeln!(
        out,
        "Stage bounds: {} .. {}",
        run.stage.max_lt, run.stage.max_rb
    )?;
    writeln!(
        out,
        "Allocation: {:?}{}",
        run.config.allocation,
        if run.config.clip_to_stage {
            ""
        } else {
            " (unclipped)"
        }
    )?;
    writeln!(out)?;

    for summary in run.summaries() {
        writeln!(out, "{}", summary.table.label().bold())?;
        writeln!(
            out,
            "   Rows: {}/{} emitted",
            summary.rows_emitted, summary.rows_read
        )?;
        writeln!(out, "   Cells claimed: {}", summary.claimed_points)?;
        if summary.skipped_rows > 0 {
            writeln!(
                out,
                "   Skipped (unknown region): {}",
                summary.skipped_rows.to_string().yellow()
            )?;
        }
        if summary.degenerate_rows > 0 {
            writeln!(
                out,
                "   Zero-weight rows: {}",
                summary.degenerate_rows.to_string().yellow()
            )?;
        }
    }

    let blocks: u64 = run.records.iter().map(|r| r.total).sum();
    writeln!(out)?;
    writeln!(out, "Blocks placed: {}", blocks.to_string().green())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagedist_engine::{
        PipelineConfig, Point, SpawnCount, StageConfig, TableOutput, TableSummary,
    };

    fn category_row(total: u64, counts: &[u64]) -> CategoryRow {
        CategoryRow {
            fields: ["rect", "0", "0", "3", "3", "0"].map(String::from),
            total,
            counts: counts.iter().copied().collect(),
        }
    }

    fn sample_run() -> DistributionRun {
        DistributionRun {
            stage: StageConfig::new(Point::new(0, 0), Point::new(3, 3)),
            config: PipelineConfig::default(),
            block_floor: TableOutput {
                rows: vec![category_row(16, &[4, 0, 0, 12, 0, 0, 0])],
                summary: TableSummary::new(TableKind::BlockFloor),
            },
            obj_in_block: TableOutput {
                rows: vec![ObjectDistributionRow {
                    fields: ["distance", "1", "1", "0", "0", "1"].map(String::from),
                    total: 5,
                    jewels: 0,
                    objects: vec![SpawnCount {
                        kind: "3".to_string(),
                        level: "2".to_string(),
                        num: 1,
                    }],
                }],
                summary: TableSummary {
                    skipped_rows: 1,
                    ..TableSummary::new(TableKind::ObjInBlock)
                },
            },
            floor_in_block: TableOutput {
                rows: vec![category_row(12, &[6, 3, 3])],
                summary: TableSummary::new(TableKind::FloorInBlock),
            },
            records: Vec::new(),
        }
    }

    #[test]
    fn headers_match_distribution_layout() {
        assert_eq!(
            category_header(TableKind::BlockFloor),
            "rangeType, point1X, point1Y, point2X, point2Y, distance, total, floorNone, floorWater, floorMagma, blockL1, blockL2, blockL3, blockL4"
        );
        assert_eq!(
            category_header(TableKind::FloorInBlock),
            "rangeType, point1X, point1Y, point2X, point2Y, distance, total, floorNone, floorWater, floorMagma"
        );
        assert_eq!(
            object_header(0),
            "rangeType, point1X, point1Y, point2X, point2Y, distance, total, jewels, obj1, level1, num1, obj2, level2, num2"
        );
        assert!(object_header(3).ends_with("obj3, level3, num3"));
    }

    #[test]
    fn renders_rows_without_padding() {
        let run = sample_run();
        let block = String::from_utf8(render_table(&run, TableKind::BlockFloor).unwrap()).unwrap();
        assert!(block.ends_with("\nrect,0,0,3,3,0,16,4,0,0,12,0,0,0\n"));

        let objects = String::from_utf8(render_table(&run, TableKind::ObjInBlock).unwrap()).unwrap();
        assert!(objects.ends_with("\ndistance,1,1,0,0,1,5,0,3,2,1\n"));

        let floors =
            String::from_utf8(render_table(&run, TableKind::FloorInBlock).unwrap()).unwrap();
        assert_eq!(floors.lines().count(), 2);
        assert!(floors.contains("rect,0,0,3,3,0,12,6,3,3"));
    }

    #[test]
    fn json_report_lists_every_table() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &sample_run()).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        assert!(content.contains("\"block_floor\""));
        assert!(content.contains("\"floor_in_block\""));
        assert!(content.contains("\"skipped_rows\": 1"));
    }

    #[test]
    fn console_report_mentions_skips() {
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &sample_run(), Duration::from_millis(3)).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        assert!(content.contains("Distribution Summary"));
        assert!(content.contains("Skipped (unknown region)"));
        assert!(content.contains("obj_in_block"));
    }
}
