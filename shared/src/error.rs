//! Error type for model construction

/// Errors raised when a record is built from raw (count, sequence) parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{field}: count {count} does not match sequence length {len}")]
    CountMismatch {
        field: &'static str,
        count: i32,
        len: usize,
    },

    #[error("{field}: a zero count must not carry an allocated sequence")]
    EmptyAllocation { field: &'static str },
}
