//! Error types for metactl-sync.

use std::path::PathBuf;

use thiserror::Error;

use metactl_core::FormatError;
use metactl_driver::DriverError;

use crate::engine::MetadataAction;

/// A failed action: which action failed, and why.
///
/// Displays the action context (`cannot apply metadata`); the underlying
/// cause is kept as the error source.
#[derive(Debug, Error)]
#[error("{}", .action.failure_context())]
pub struct SyncError {
    pub action: MetadataAction,
    #[source]
    pub kind: SyncErrorKind,
}

/// Underlying cause of a [`SyncError`].
#[derive(Debug, Error)]
pub enum SyncErrorKind {
    /// The remote call failed (transport or engine rejection).
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Locating, reading or decoding the local metadata file failed,
    /// including the "no file in any supported encoding" condition.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Writing the exported document failed.
    #[error("cannot save metadata to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode metadata")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    pub fn new(action: MetadataAction, kind: impl Into<SyncErrorKind>) -> Self {
        Self {
            action,
            kind: kind.into(),
        }
    }

    /// `true` when no local metadata file exists in any supported encoding.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, SyncErrorKind::Format(FormatError::NotFound { .. }))
    }

    /// The driver error behind this failure, if any.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match &self.kind {
            SyncErrorKind::Driver(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience constructor for [`SyncErrorKind::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncErrorKind {
    SyncErrorKind::Io {
        path: path.into(),
        source,
    }
}
