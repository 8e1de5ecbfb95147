//! Errors reported when building or querying a library

use crate::library::TableError;

/// Error while building a library; construction is aborted
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// A timing table of a cell is malformed
    #[error("malformed table on arc {input} -> {output} of cell '{cell}': {source}")]
    MalformedTable {
        cell: String,
        output: String,
        input: String,
        #[source]
        source: TableError,
    },

    /// A cell is inconsistent: bad pin reference, function arity, area...
    #[error("invalid cell '{cell}': {reason}")]
    InvalidCell { cell: String, reason: String },

    /// Two cells have the same name
    #[error("cell name '{0}' is used more than once")]
    DuplicateCellName(String),

    /// The table of a wire load model is malformed
    #[error("malformed wire load model '{name}': {source}")]
    MalformedWireLoad {
        name: String,
        #[source]
        source: TableError,
    },

    /// Two wire load models have the same name
    #[error("wire load model '{0}' is defined more than once")]
    DuplicateWireLoad(String),

    /// The default wire load model does not exist
    #[error("unknown wire load model '{0}'")]
    UnknownWireLoad(String),

    /// The exact canonization limit is above the supported maximum
    #[error("exact NPN canonization limit {value} is above the maximum {max}")]
    InvalidExactLimit { value: usize, max: usize },

    /// A scale factor is negative, infinite or NaN
    #[error("{name} scale factor must be finite and non-negative, got {value}")]
    InvalidScaleFactor { name: &'static str, value: f64 },
}

impl LibraryError {
    pub(crate) fn invalid_cell(cell: &str, reason: impl Into<String>) -> LibraryError {
        LibraryError::InvalidCell {
            cell: cell.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error in a query to a library, caused by the caller
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// The output does not depend on the input, so there is no timing arc between them
    #[error("output {output} of cell '{cell}' does not depend on input {input}")]
    NoSuchArc {
        cell: String,
        output: String,
        input: String,
    },

    /// The pin index or name does not exist on the cell
    #[error("cell '{cell}' has no pin {pin}")]
    NoSuchPin { cell: String, pin: String },

    /// The cell handle does not belong to the library
    #[error("no cell with index {0}")]
    UnknownCell(usize),

    /// The query input does not exist
    #[error("no query input {input}, the function has {nb_inputs} inputs")]
    NoSuchInput { input: usize, nb_inputs: usize },

    /// The number of input timings does not match the number of inputs
    #[error("expected timing for {expected} inputs, got {found}")]
    InputCountMismatch { expected: usize, found: usize },
}
