//! Shared validation error type.

use thiserror::Error;

/// Errors raised while constructing or validating domain values.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
