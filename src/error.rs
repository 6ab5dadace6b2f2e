use thiserror::Error;

/// Failures the pipeline reports to its caller. Decode failures never appear
/// here; the loader recovers from them with the Latin-1 fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("No groups available to rank")]
    EmptyGroup,
    #[error("Row {row} column '{column}': '{value}' is not a valid quantity")]
    InvalidQuantity {
        row: usize,
        column: String,
        value: String,
    },
}
