//! Error types.
//!
//! Every error here is a defect in the calling application or component
//! code. None of them are retried; a pass either completes or stops at the
//! first error.

use thiserror::Error;

use crate::document::NodeId;
use crate::types::Key;

/// Errors raised by a reconciliation pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VdomError {
    /// A spec that cannot be turned into a virtual node.
    #[error("invalid spec: {reason}")]
    InvalidSpec { reason: String },

    /// Two siblings in one child list declare the same key.
    #[error("duplicate key {key} among siblings")]
    DuplicateKey { key: Key },

    /// `refresh()` was called while the component was still rendering.
    #[error("component `{component}` refreshed while it is rendering")]
    Reentrant { component: String },

    /// Strict sync produced something other than the node it was given.
    #[error("sync of node {expected:?} produced {actual:?}")]
    SyncMismatch { expected: NodeId, actual: Vec<NodeId> },
}

impl VdomError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        VdomError::InvalidSpec { reason: reason.into() }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = VdomError> = std::result::Result<T, E>;
