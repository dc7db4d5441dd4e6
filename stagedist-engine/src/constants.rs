//! Fixed layout of the ratio tables and the distribution files built from them.
//!
//! Column positions are zero-based indices into a comma-split row.

// Input layout -------------------------------------------------------------
/// Leading lines of every input table that carry headers, not data.
pub const HEADER_LINES: usize = 2;
/// `rangeType, p1x, p1y, p2x, p2y, radius`
pub const DESCRIPTOR_COLUMNS: usize = 6;
pub const COL_RANGE_TYPE: usize = 0;
pub const COL_P1_X: usize = 1;
pub const COL_P1_Y: usize = 2;
pub const COL_P2_X: usize = 3;
pub const COL_P2_Y: usize = 4;
pub const COL_RADIUS: usize = 5;
/// First category weight in the block/floor and floor-in-block tables.
pub const COL_FIRST_WEIGHT: usize = 6;
pub const COL_JEWEL_PERCENT: usize = 6;
/// Column 7 of the object table is not interpreted.
pub const COL_OBJECT_RESERVED: usize = 7;
pub const COL_FIRST_OBJECT: usize = 8;
/// `(type, level, min, max, percent)`
pub const OBJECT_GROUP_WIDTH: usize = 5;

// Categories ---------------------------------------------------------------
pub const BLOCK_FLOOR_CATEGORIES: [&str; 7] = [
    "floorNone",
    "floorWater",
    "floorMagma",
    "blockL1",
    "blockL2",
    "blockL3",
    "blockL4",
];
/// Block tiers inside [`BLOCK_FLOOR_CATEGORIES`]; their sum is what later
/// tables inherit.
pub const BLOCK_TIER_START: usize = 3;
pub const FLOOR_IN_BLOCK_CATEGORIES: [&str; 3] = ["floorNone", "floorWater", "floorMagma"];

// Output layout ------------------------------------------------------------
pub const DESCRIPTOR_HEADER: [&str; DESCRIPTOR_COLUMNS] = [
    "rangeType",
    "point1X",
    "point1Y",
    "point2X",
    "point2Y",
    "distance",
];
pub const TOTAL_HEADER: &str = "total";
pub const JEWEL_HEADER: &str = "jewels";
/// Object groups always present in the object-table header.
pub const MIN_OBJECT_HEADER_GROUPS: usize = 2;

// Default file names -------------------------------------------------------
pub const DEFAULT_BLOCK_FLOOR_OUTPUT: &str = "config_block_floor_distribution.csv";
pub const DEFAULT_OBJ_IN_BLOCK_OUTPUT: &str = "config_obj_in_block_distribution.csv";
pub const DEFAULT_FLOOR_IN_BLOCK_OUTPUT: &str = "config_floor_in_block_distribution.csv";
pub const DEFAULT_STAGE_CONFIG_PATH: &str = "assets/texts/config_base.json";
