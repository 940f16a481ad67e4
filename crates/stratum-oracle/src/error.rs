//! Oracle error types

use thiserror::Error;

/// Errors that can occur while asking an oracle for decisions
#[derive(Error, Debug)]
pub enum OracleError {
    /// The underlying provider failed (network, model, rate limit)
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider answered with nothing usable
    #[error("Empty response from provider")]
    EmptyResponse,
}
