//! Integer grid points.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A cell coordinate on the stage grid.
///
/// Points are plain values: every operation returns a fresh point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Multiply both components by `k`.
    #[must_use]
    pub const fn scale(self, k: i32) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
        }
    }

    /// Manhattan norm measured from the origin.
    #[must_use]
    pub fn distance(self) -> u64 {
        u64::from(self.x.unsigned_abs()) + u64::from(self.y.unsigned_abs())
    }

    /// Manhattan distance between two points. Never overflows, even across
    /// the whole `i32` plane.
    #[must_use]
    pub fn distance_to(self, other: Self) -> u64 {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.y.abs_diff(other.y))
    }

    /// `self + rhs`, or `None` if either component leaves the `i32` range.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_add(rhs.x), self.y.checked_add(rhs.y)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Point {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        self.scale(rhs)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
