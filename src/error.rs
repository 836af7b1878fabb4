use crate::config::Role;
use crate::record::EntityKind;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV must contain a header row and at least one data row")]
    NoDataRows,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Role {0} is not allowed to import records")]
    PermissionDenied(Role),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Batch commit failed after {committed} records: {source}")]
    Commit {
        committed: usize,
        #[source]
        source: StoreError,
    },
}

/// Reason a single row was skipped. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("Missing value for '{column}'")]
    MissingValue { column: String },

    #[error("Invalid number '{value}' for '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("Value {value} for '{column}' must be {bound}")]
    OutOfBounds {
        column: String,
        value: String,
        bound: &'static str,
    },

    #[error("Unrecognized value '{value}' for '{column}'")]
    UnknownLabel { column: String, value: String },

    #[error("Invalid date '{value}' for '{column}'")]
    InvalidDate { column: String, value: String },

    #[error("No client found for shop id '{0}'")]
    UnknownShop(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Batch of {size} records exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Record id already exists: {0}")]
    DuplicateId(String),

    #[error("Record {id} does not belong to the {expected} collection")]
    EntityMismatch { id: String, expected: EntityKind },

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store snapshot is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommissionError {
    #[error("Sales total for agent '{0}' is too large")]
    SalesOverflow(String),

    #[error("Commission on {0} is too large")]
    AmountOverflow(rust_decimal::Decimal),
}
