//! Error types shared across the workspace

use thiserror::Error;

/// The three failure kinds that originate inside or at the edge of the
/// analysis. Referential-integrity gaps inside the core are never errors;
/// they are skipped best-effort.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to parse input: {0}")]
    Parse(String),

    #[error("invalid runtime: {0}")]
    InvalidRuntime(String),

    #[error("unsupported strategy: {0}")]
    UnsupportedStrategy(String),
}
