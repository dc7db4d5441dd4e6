//! Region shapes and their deterministic point enumeration.
//!
//! Enumeration order is observable: it decides which region claims a shared
//! cell and keeps the rendered tables byte-stable between runs.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Point;

/// Axis-aligned rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectRegion {
    low: Point,
    high: Point,
}

impl RectRegion {
    /// Build a rectangle from any two opposite corners.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            low: Point::new(a.x.min(b.x), a.y.min(b.y)),
            high: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub const fn low(&self) -> Point {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> Point {
        self.high
    }

    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.low.x && p.x <= self.high.x && p.y >= self.low.y && p.y <= self.high.y
    }

    /// Row-major walk: y outer, x inner, both ascending.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (low, high) = (self.low, self.high);
        (low.y..=high.y).flat_map(move |y| (low.x..=high.x).map(move |x| Point::new(x, y)))
    }

    #[must_use]
    pub fn point_count(&self) -> u64 {
        let w = u64::from(self.high.x.abs_diff(self.low.x)) + 1;
        let h = u64::from(self.high.y.abs_diff(self.low.y)) + 1;
        w * h
    }
}

/// Every cell within `radius` Manhattan steps of `center`.
///
/// A negative radius covers nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiamondRegion {
    center: Point,
    radius: i32,
}

impl DiamondRegion {
    #[must_use]
    pub const fn new(center: Point, radius: i32) -> Self {
        Self { center, radius }
    }

    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        u64::try_from(self.radius).is_ok_and(|r| p.distance_to(self.center) <= r)
    }

    /// Rows from `-radius` to `radius`, each row left to right.
    ///
    /// Cells that would fall outside the `i32` grid are dropped.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (center, radius) = (self.center, self.radius);
        let rows = if radius < 0 { 1..=0 } else { -radius..=radius };
        rows.flat_map(move |dy| {
            let half = radius - dy.abs();
            (-half..=half).filter_map(move |dx| center.checked_add(Point::new(dx, dy)))
        })
    }

    /// `2r² + 2r + 1` cells for a non-negative radius, counted on an
    /// unbounded grid.
    #[must_use]
    pub fn point_count(&self) -> u64 {
        match u64::try_from(self.radius) {
            Ok(r) => 2 * r * r + 2 * r + 1,
            Err(_) => 0,
        }
    }
}

/// The region-type token that opens every table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Rect,
    Distance,
}

impl RegionKind {
    /// Recognize a token; anything unknown yields `None` and the row is skipped.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "rect" => Some(Self::Rect),
            "distance" => Some(Self::Distance),
            _ => None,
        }
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Distance => "distance",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A region of the stage grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Rect(RectRegion),
    Diamond(DiamondRegion),
}

impl Region {
    /// Build the shape a row describes. Rectangles ignore `radius`; diamonds
    /// ignore `p2`.
    #[must_use]
    pub fn from_descriptor(kind: RegionKind, p1: Point, p2: Point, radius: i32) -> Self {
        match kind {
            RegionKind::Rect => Self::Rect(RectRegion::new(p1, p2)),
            RegionKind::Distance => Self::Diamond(DiamondRegion::new(p1, radius)),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(p),
            Self::Diamond(diamond) => diamond.contains(p),
        }
    }

    /// Covered cells in their canonical order. Each call starts over.
    #[must_use]
    pub fn points(&self) -> Box<dyn Iterator<Item = Point>> {
        match self {
            Self::Rect(rect) => Box::new(rect.points()),
            Self::Diamond(diamond) => Box::new(diamond.points()),
        }
    }

    #[must_use]
    pub fn point_count(&self) -> u64 {
        match self {
            Self::Rect(rect) => rect.point_count(),
            Self::Diamond(diamond) => diamond.point_count(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rect(rect) => write!(f, "rect {}..{}", rect.low, rect.high),
            Self::Diamond(diamond) => {
                write!(f, "distance {} r{}", diamond.center, diamond.radius)
            }
        }
    }
}
