//! Error types for the price-outlook library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while modeling a single series.
///
/// These are isolated per entity: a run records them and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// A value that must be strictly positive (log transform) is not.
    #[error("non-positive value {value} at index {index}")]
    NonPositiveValue { index: usize, value: f64 },

    /// Parameter optimization did not converge.
    #[error("optimizer failed to converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

/// Errors that abort a whole run before any output is produced.
#[derive(Error, Debug)]
pub enum InputError {
    /// The table has no dates.
    #[error("input table is empty")]
    EmptyTable,

    /// The table has dates but no entity columns.
    #[error("input table has no entity columns")]
    NoEntities,

    /// An entity column is not aligned with the date index.
    #[error("column '{entity}' has {got} values, expected {expected}")]
    Misaligned {
        entity: String,
        expected: usize,
        got: usize,
    },

    /// Dates are not strictly increasing.
    #[error("dates must be strictly increasing (row {index})")]
    DatesNotIncreasing { index: usize },

    /// A column name is empty, duplicated or reserved.
    #[error("invalid column name '{0}'")]
    InvalidColumn(String),

    /// A date cell could not be parsed.
    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },

    /// A value cell could not be parsed.
    #[error("row {row}, column '{column}': cannot parse number '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// Horizon must be at least one step.
    #[error("forecast horizon must be positive, got {0}")]
    InvalidHorizon(usize),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shared outputs (dates, change tables) could not be built.
    #[error("cannot assemble output: {0}")]
    Assembly(#[from] ForecastError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
