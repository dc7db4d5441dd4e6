use thiserror::Error;

use crate::table::TableKind;

/// Fatal failures of a distribution run.
///
/// Skipped rows and degenerate weight vectors are not errors; they are logged
/// and counted in the table summary.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("stage config is not valid JSON")]
    ConfigJson(#[from] serde_json::Error),
    #[error("stage config {field} is invalid: {reason}")]
    Config { field: &'static str, reason: String },
    #[error("{table} line {line}, column {column}: expected an integer, found {text:?}")]
    Parse {
        table: TableKind,
        line: usize,
        column: usize,
        text: String,
    },
    #[error("{table} line {line}: missing column {column}")]
    MissingField {
        table: TableKind,
        line: usize,
        column: usize,
    },
    #[error("{table} line {line}: object group starting at column {column} is incomplete")]
    IncompleteObjectGroup {
        table: TableKind,
        line: usize,
        column: usize,
    },
    #[error("failed to load {what}")]
    Source {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl DistributionError {
    /// Input table the error points at, if any.
    #[must_use]
    pub const fn table(&self) -> Option<TableKind> {
        match self {
            Self::Parse { table, .. }
            | Self::MissingField { table, .. }
            | Self::IncompleteObjectGroup { table, .. } => Some(*table),
            Self::ConfigJson(_) | Self::Config { .. } | Self::Source { .. } => None,
        }
    }
}
