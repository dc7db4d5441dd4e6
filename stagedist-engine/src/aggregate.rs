//! Carrying totals from the block/floor table into dependent tables.
use crate::claims::{PointSet, point_set};
use crate::geometry::Point;
use crate::numbers::{round_half_even_f64_to_u64, u64_to_f64, usize_to_u64};

/// What one block/floor row leaves behind for later tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistributionRecord {
    /// Blocks placed by the row.
    pub total: u64,
    /// Cells the row claimed.
    pub points: PointSet,
}

impl DistributionRecord {
    #[must_use]
    pub fn new<I: IntoIterator<Item = Point>>(total: u64, points: I) -> Self {
        Self {
            total,
            points: point_set(points),
        }
    }

    /// Share of this record's total that falls on `points`, rounded half to
    /// even. Empty records contribute nothing.
    #[must_use]
    pub fn overlap_share(&self, points: &[Point]) -> u64 {
        if self.points.is_empty() {
            return 0;
        }
        let hits = points.iter().filter(|p| self.points.contains(p)).count();
        if hits == 0 {
            return 0;
        }
        let size = usize_to_u64(self.points.len());
        let ratio = u64_to_f64(usize_to_u64(hits)) / u64_to_f64(size);
        round_half_even_f64_to_u64(u64_to_f64(self.total) * ratio)
    }
}

/// Sum of every record's rounded overlap share with `points`.
///
/// Rounding happens per record, so many thin overlaps can drift from the
/// single-ratio answer.
#[must_use]
pub fn weighted_total(points: &[Point], records: &[DistributionRecord]) -> u64 {
    records
        .iter()
        .map(|record| record.overlap_share(points))
        .fold(0_u64, u64::saturating_add)
}
