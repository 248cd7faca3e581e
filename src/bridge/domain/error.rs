//! Error types for bridge domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing bridge domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeDomainError {
    /// The port protocol is neither `tcp` nor `udp`.
    #[error("invalid port protocol '{0}' (expected tcp or udp)")]
    InvalidProtocol(String),

    /// The port specification does not match `<port>[/<proto>]`.
    #[error("invalid port specification '{0}'")]
    InvalidPortSpec(String),
}
