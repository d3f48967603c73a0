// ── Core error types ──
//
// Errors surfaced by passpoint-core. Throttled or rejected ANQP requests
// are NOT errors: they come back as `false` from the request manager.
// Only malformed ANQP payloads and collaborator failures land here.

use thiserror::Error;

use crate::model::NetworkId;

/// Wire-level failures while decoding an ANQP payload.
///
/// Always fatal for the element being parsed. Callers discard the whole
/// ANQP response rather than keeping a partially decoded element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("runt payload: {remaining} bytes, need at least {required}")]
    Runt { remaining: usize, required: usize },

    #[error("invalid data length: {declared} bytes declared, {remaining} remaining")]
    InvalidLength { declared: usize, remaining: usize },

    #[error("buffer underflow reading {field}")]
    BufferUnderflow { field: &'static str },

    #[error("invalid {charset} string in {field}")]
    InvalidEncoding {
        field: &'static str,
        charset: &'static str,
    },

    #[error("unknown auth param id {id}")]
    UnknownAuthParam { id: u8 },

    #[error("invalid length {length} for auth param {id}")]
    InvalidAuthParamLength { id: u8, length: usize },

    #[error("invalid roaming consortium OI length {length}")]
    InvalidOiLength { length: usize },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Wire errors ──────────────────────────────────────────────────
    #[error("malformed ANQP payload: {0}")]
    Protocol(#[from] ProtocolError),

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("network configuration rejected by store: {reason}")]
    StoreRejected { reason: String },

    #[error("network not found: {network_id}")]
    NetworkNotFound { network_id: NetworkId },

    #[error("passpoint service stopped")]
    ServiceStopped,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// True when the error came from decoding an AP's ANQP payload.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
