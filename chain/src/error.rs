//! Chain transport and encoding errors.

use thiserror::Error;

/// Errors raised by a chain backend.
///
/// These are transport-level; classification into the user-facing error
/// taxonomy (precondition / read / write / unknown-outcome) happens in the
/// client crate where the surrounding operation is known.
#[derive(Debug, Error)]
pub enum ChainError {
    /// HTTP transport failure — connection refused, TLS, timeout on the
    /// request itself.
    #[error("http error: {0}")]
    Http(String),

    /// The backend answered with an error payload.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The wallet or chain refused the submission outright.
    #[error("rejected: {0}")]
    Rejected(String),

    /// A response did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The finality wait exceeded its deadline. The transaction may still
    /// land; callers must not treat this as a failure.
    #[error("confirmation wait timed out")]
    Timeout,

    /// The operation is not expressible on this backend.
    #[error("unsupported on this backend: {0}")]
    Unsupported(String),
}
