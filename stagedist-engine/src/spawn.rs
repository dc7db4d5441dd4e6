//! Percentage-based object counts with optional clamps.
//!
//! Unlike [`crate::quota`], object counts are bounded independently and do
//! not have to add up to the total.
use serde::{Deserialize, Serialize};

use crate::numbers::{floor_f64_to_i64, i64_to_f64};

/// One `(type, level, min, max, percent)` group from the object table.
///
/// Type and level are opaque labels echoed into the output. A negative
/// `min` or `max` means that side is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpawn {
    pub kind: String,
    pub level: String,
    pub min: i64,
    pub max: i64,
    pub percent: i64,
}

/// Resolved count for one object group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCount {
    pub kind: String,
    pub level: String,
    pub num: i64,
}

/// `floor(total * percent * 0.01)`.
#[must_use]
pub fn percent_of(total: u64, percent: i64) -> i64 {
    let total = i64::try_from(total).unwrap_or(i64::MAX);
    floor_f64_to_i64(i64_to_f64(total.saturating_mul(percent)) * 0.01)
}

/// Percentage first, then the lower clamp, then the upper clamp.
#[must_use]
pub fn clamped_count(total: u64, percent: i64, min: i64, max: i64) -> i64 {
    let mut num = percent_of(total, percent);
    if min >= 0 {
        num = num.max(min);
    }
    if max >= 0 {
        num = num.min(max);
    }
    num
}

impl ObjectSpawn {
    #[must_use]
    pub fn resolve(&self, total: u64) -> SpawnCount {
        SpawnCount {
            kind: self.kind.clone(),
            level: self.level.clone(),
            num: clamped_count(total, self.percent, self.min, self.max),
        }
    }
}

/// Jewel count plus one resolved count per object group, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnAllocation {
    pub jewels: i64,
    pub objects: Vec<SpawnCount>,
}

#[must_use]
pub fn allocate_spawns(total: u64, jewel_percent: i64, objects: &[ObjectSpawn]) -> SpawnAllocation {
    SpawnAllocation {
        jewels: percent_of(total, jewel_percent),
        objects: objects.iter().map(|o| o.resolve(total)).collect(),
    }
}
