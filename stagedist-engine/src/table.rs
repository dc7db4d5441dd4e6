//! Parsing of the three ratio tables.
//!
//! Rows are comma-split without quoting. The six region-descriptor fields are
//! kept verbatim so the output can echo them exactly as authored.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BLOCK_FLOOR_CATEGORIES, COL_FIRST_OBJECT, COL_FIRST_WEIGHT, COL_JEWEL_PERCENT,
    COL_OBJECT_RESERVED, COL_P1_X, COL_P1_Y, COL_P2_X, COL_P2_Y, COL_RADIUS, COL_RANGE_TYPE,
    DEFAULT_BLOCK_FLOOR_OUTPUT, DEFAULT_FLOOR_IN_BLOCK_OUTPUT, DEFAULT_OBJ_IN_BLOCK_OUTPUT,
    DESCRIPTOR_COLUMNS, FLOOR_IN_BLOCK_CATEGORIES, HEADER_LINES, OBJECT_GROUP_WIDTH,
};
use crate::error::DistributionError;
use crate::geometry::Point;
use crate::region::{Region, RegionKind};
use crate::spawn::ObjectSpawn;

/// The three input tables, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Region -> floor and block ratios.
    BlockFloor,
    /// Region -> objects dropped by broken blocks.
    ObjInBlock,
    /// Region -> floors revealed by broken blocks.
    FloorInBlock,
}

impl TableKind {
    pub const ALL: [Self; 3] = [Self::BlockFloor, Self::ObjInBlock, Self::FloorInBlock];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BlockFloor => "block_floor",
            Self::ObjInBlock => "obj_in_block",
            Self::FloorInBlock => "floor_in_block",
        }
    }

    /// Category names for the weighted tables; the object table has none.
    #[must_use]
    pub const fn categories(self) -> &'static [&'static str] {
        match self {
            Self::BlockFloor => &BLOCK_FLOOR_CATEGORIES,
            Self::ObjInBlock => &[],
            Self::FloorInBlock => &FLOOR_IN_BLOCK_CATEGORIES,
        }
    }

    #[must_use]
    pub const fn default_output(self) -> &'static str {
        match self {
            Self::BlockFloor => DEFAULT_BLOCK_FLOOR_OUTPUT,
            Self::ObjInBlock => DEFAULT_OBJ_IN_BLOCK_OUTPUT,
            Self::FloorInBlock => DEFAULT_FLOOR_IN_BLOCK_OUTPUT,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The leading six columns of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Fields as written in the input.
    pub fields: [String; DESCRIPTOR_COLUMNS],
    pub p1: Point,
    pub p2: Point,
    pub radius: i32,
}

impl RegionDescriptor {
    #[must_use]
    pub fn kind(&self) -> Option<RegionKind> {
        RegionKind::from_token(&self.fields[COL_RANGE_TYPE])
    }

    /// The described region, or `None` for an unrecognized region type.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.kind()
            .map(|kind| Region::from_descriptor(kind, self.p1, self.p2, self.radius))
    }

    #[must_use]
    pub fn type_token(&self) -> &str {
        &self.fields[COL_RANGE_TYPE]
    }
}

/// Weights are at most a handful of categories.
pub type Weights = SmallVec<[u64; 8]>;

/// A row of the block/floor or floor-in-block table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioRow {
    /// 1-based line number in the source text.
    pub line: usize,
    pub descriptor: RegionDescriptor,
    pub weights: Weights,
}

/// A row of the object table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRow {
    pub line: usize,
    pub descriptor: RegionDescriptor,
    pub jewel_percent: i64,
    pub objects: Vec<ObjectSpawn>,
}

/// Data lines of a table: header lines dropped, line endings stripped,
/// blank lines skipped. Yields 1-based line numbers.
pub fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(HEADER_LINES)
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(line_no, line)| {
            if line.trim().is_empty() {
                log::debug!("skipping blank line {line_no}");
                false
            } else {
                true
            }
        })
}

struct RowFields<'a> {
    table: TableKind,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> RowFields<'a> {
    fn split(table: TableKind, line: usize, text: &'a str) -> Self {
        Self {
            table,
            line,
            fields: text.split(',').collect(),
        }
    }

    fn len(&self) -> usize {
        self.fields.len()
    }

    fn raw(&self, column: usize) -> Result<&'a str, DistributionError> {
        self.fields
            .get(column)
            .copied()
            .ok_or(DistributionError::MissingField {
                table: self.table,
                line: self.line,
                column: column + 1,
            })
    }

    fn int<T: FromStr>(&self, column: usize) -> Result<T, DistributionError> {
        let text = self.raw(column)?;
        text.trim().parse().map_err(|_| DistributionError::Parse {
            table: self.table,
            line: self.line,
            column: column + 1,
            text: text.to_string(),
        })
    }

    fn is_blank(&self, columns: std::ops::Range<usize>) -> bool {
        columns
            .filter_map(|c| self.fields.get(c))
            .all(|f| f.trim().is_empty())
    }

    fn descriptor(&self) -> Result<RegionDescriptor, DistributionError> {
        let mut fields: [String; DESCRIPTOR_COLUMNS] = Default::default();
        for (column, slot) in fields.iter_mut().enumerate() {
            *slot = self.raw(column)?.to_string();
        }
        Ok(RegionDescriptor {
            p1: Point::new(self.int(COL_P1_X)?, self.int(COL_P1_Y)?),
            p2: Point::new(self.int(COL_P2_X)?, self.int(COL_P2_Y)?),
            radius: self.int(COL_RADIUS)?,
            fields,
        })
    }
}

/// Parse one block/floor or floor-in-block row.
///
/// # Errors
///
/// Returns [`DistributionError::Parse`] for non-integer descriptor or weight
/// fields and [`DistributionError::MissingField`] when the row is too short.
pub fn parse_ratio_row(
    table: TableKind,
    line: usize,
    text: &str,
) -> Result<RatioRow, DistributionError> {
    let row = RowFields::split(table, line, text);
    let descriptor = row.descriptor()?;
    let categories = table.categories().len();
    let end = COL_FIRST_WEIGHT + categories;
    let weights = (COL_FIRST_WEIGHT..end)
        .map(|column| row.int::<u64>(column))
        .collect::<Result<Weights, _>>()?;
    if !row.is_blank(end..row.len()) {
        log::warn!(
            "{table} line {line}: ignoring {} columns past the {categories} category weights; \
             older outputs counted them in the weight sum, so this row's split differs",
            row.len() - end
        );
    }
    Ok(RatioRow {
        line,
        descriptor,
        weights,
    })
}

/// Parse one object-table row.
///
/// # Errors
///
/// Returns [`DistributionError::Parse`] for non-integer numeric fields,
/// [`DistributionError::MissingField`] when the jewel column is absent and
/// [`DistributionError::IncompleteObjectGroup`] for a partially filled group.
pub fn parse_object_row(line: usize, text: &str) -> Result<ObjectRow, DistributionError> {
    let table = TableKind::ObjInBlock;
    let row = RowFields::split(table, line, text);
    let descriptor = row.descriptor()?;
    let jewel_percent = row.int(COL_JEWEL_PERCENT)?;
    if let Ok(reserved) = row.raw(COL_OBJECT_RESERVED)
        && !reserved.trim().is_empty()
    {
        log::trace!("{table} line {line}: reserved column holds {reserved:?}");
    }

    let mut objects = Vec::new();
    let mut start = COL_FIRST_OBJECT;
    while start < row.len() {
        let end = start + OBJECT_GROUP_WIDTH;
        if row.is_blank(start..end) {
            start = end;
            continue;
        }
        if end > row.len() {
            return Err(DistributionError::IncompleteObjectGroup {
                table,
                line,
                column: start + 1,
            });
        }
        objects.push(ObjectSpawn {
            kind: row.raw(start)?.to_string(),
            level: row.raw(start + 1)?.to_string(),
            min: row.int(start + 2)?,
            max: row.int(start + 3)?,
            percent: row.int(start + 4)?,
        });
        start = end;
    }

    Ok(ObjectRow {
        line,
        descriptor,
        jewel_percent,
        objects,
    })
}

/// Parse every data row of a weighted table.
///
/// # Errors
///
/// Stops at the first malformed row; see [`parse_ratio_row`].
pub fn parse_ratio_table(table: TableKind, text: &str) -> Result<Vec<RatioRow>, DistributionError> {
    data_lines(text)
        .map(|(line, row)| parse_ratio_row(table, line, row))
        .collect()
}

/// Parse every data row of the object table.
///
/// # Errors
///
/// Stops at the first malformed row; see [`parse_object_row`].
pub fn parse_object_table(text: &str) -> Result<Vec<ObjectRow>, DistributionError> {
    data_lines(text)
        .map(|(line, row)| parse_object_row(line, row))
        .collect()
}
