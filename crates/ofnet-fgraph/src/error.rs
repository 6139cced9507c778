//! Error types for forwarding-graph operations.

use thiserror::Error;

/// Error type for forwarding-graph operations.
///
/// A closed set of kinds so callers can branch on the failure class instead
/// of matching message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FgraphError {
    /// A flow with the same identity key already exists in the table.
    #[error("flow {key} already exists")]
    DuplicateFlow { key: String },

    /// A flow being converted into bucket actions produced an instruction
    /// that is not apply-actions.
    #[error("wrong instruction type for bucket: {kind}")]
    InvalidBucketInstruction { kind: &'static str },

    /// The switch connection failed to transmit a message.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// The flow is not bound to a switch connection.
    #[error("flow is not bound to a switch")]
    FlowNotBound,

    /// The flow has no next graph element and no actions to compile.
    #[error("flow has no next graph element")]
    NextElemMissing,
}

/// Result type for forwarding-graph operations.
pub type FgraphResult<T> = Result<T, FgraphError>;
