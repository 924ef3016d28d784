//! Error types for key derivation.

use thiserror::Error;

/// Errors raised by the deriver.
///
/// Every failure is raised immediately to the caller; nothing is retried or
/// partially recovered, and no operation ever returns a partial result.
#[derive(Debug, Error)]
pub enum DeriverError {
    /// The counterparty is missing, unparseable, or not a point on the curve.
    #[error("invalid counterparty: {0}")]
    InvalidCounterparty(String),

    /// The protocol's security level or name violates the namespace rules.
    #[error("invalid protocol id: {0}")]
    InvalidProtocolId(String),

    /// The key identifier length is out of range.
    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    /// A derived key failed validation, or a shared computation degenerated.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// A secret-revelation request that policy forbids.
    #[error("policy violation: {0}")]
    PolicyViolation(String),
}

/// Convenience alias for fallible deriver operations.
pub type DeriverResult<T> = Result<T, DeriverError>;
