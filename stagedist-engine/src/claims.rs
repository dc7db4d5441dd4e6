//! First-region-wins bookkeeping for one table run.
use std::collections::HashSet;
use std::hash::BuildHasher;
use twox_hash::XxHash64;

use crate::geometry::Point;
use crate::region::RectRegion;

/// Fixed-seed xxHash64 so set iteration never depends on process entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointHashState;

impl BuildHasher for PointHashState {
    type Hasher = XxHash64;

    fn build_hasher(&self) -> XxHash64 {
        XxHash64::with_seed(0)
    }
}

/// Hashed set of grid cells.
pub type PointSet = HashSet<Point, PointHashState>;

/// Collect points into a [`PointSet`].
#[must_use]
pub fn point_set<I: IntoIterator<Item = Point>>(points: I) -> PointSet {
    points.into_iter().collect()
}

/// Tracks which cells earlier rows of a table already own.
///
/// When `bounds` is set, cells outside it are never handed out.
#[derive(Debug, Clone, Default)]
pub struct ClaimTracker {
    claimed: PointSet,
    bounds: Option<RectRegion>,
}

impl ClaimTracker {
    #[must_use]
    pub fn new(bounds: Option<RectRegion>) -> Self {
        Self {
            claimed: PointSet::default(),
            bounds,
        }
    }

    /// Keep the candidates that are in bounds and not yet claimed, in their
    /// original order, and claim them.
    pub fn filter_and_claim<I>(&mut self, candidates: I) -> Vec<Point>
    where
        I: IntoIterator<Item = Point>,
    {
        let bounds = self.bounds;
        let claimed = &mut self.claimed;
        candidates
            .into_iter()
            .filter(|p| bounds.is_none_or(|b| b.contains(*p)))
            .filter(|p| claimed.insert(*p))
            .collect()
    }

    #[must_use]
    pub fn claimed_len(&self) -> usize {
        self.claimed.len()
    }
}
