use thiserror::Error;

/// Errors returned by verification operations.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot aggregate an empty sample set")]
    EmptyAggregate,
}
