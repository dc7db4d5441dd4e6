//! Stage bounds read from the base stage configuration.
//!
//! Only `stageMaxLT` and `stageMaxRB` are consulted; every other key in the
//! file belongs to other tools and is ignored.
use serde::{Deserialize, Serialize};

use crate::error::DistributionError;
use crate::geometry::Point;
use crate::region::RectRegion;

/// Integer written either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Coordinate {
    fn resolve(&self, field: &'static str) -> Result<i32, DistributionError> {
        let invalid = |reason: String| DistributionError::Config { field, reason };
        let wide = match self {
            Self::Int(v) => *v,
            Self::Float(v) => {
                if v.fract() != 0.0 || !v.is_finite() {
                    return Err(invalid(format!("{v} is not a whole number")));
                }
                num_traits::cast::<f64, i64>(*v)
                    .ok_or_else(|| invalid(format!("{v} is out of range")))?
            }
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| invalid(format!("{s:?} is not an integer")))?,
        };
        i32::try_from(wide).map_err(|_| invalid(format!("{wide} does not fit a grid coordinate")))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CoordinatePair {
    x: Coordinate,
    y: Coordinate,
}

#[derive(Debug, Clone, Deserialize)]
struct ValueEntry {
    value: CoordinatePair,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BaseConfigFile {
    stage_max_lt: ValueEntry,
    stage_max_rb: ValueEntry,
}

/// The playable extent of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub max_lt: Point,
    pub max_rb: Point,
}

impl StageConfig {
    #[must_use]
    pub const fn new(max_lt: Point, max_rb: Point) -> Self {
        Self { max_lt, max_rb }
    }

    /// Load the bounds from the base configuration JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::ConfigJson`] when the document is not JSON
    /// or lacks the bound entries, and [`DistributionError::Config`] when a
    /// coordinate is not an integer.
    pub fn from_json(json: &str) -> Result<Self, DistributionError> {
        let file: BaseConfigFile = serde_json::from_str(json)?;
        let lt = &file.stage_max_lt.value;
        let rb = &file.stage_max_rb.value;
        Ok(Self {
            max_lt: Point::new(
                lt.x.resolve("stageMaxLT.value.x")?,
                lt.y.resolve("stageMaxLT.value.y")?,
            ),
            max_rb: Point::new(
                rb.x.resolve("stageMaxRB.value.x")?,
                rb.y.resolve("stageMaxRB.value.y")?,
            ),
        })
    }

    /// Normalized bounds rectangle.
    #[must_use]
    pub fn bounds(&self) -> RectRegion {
        RectRegion::new(self.max_lt, self.max_rb)
    }
}
