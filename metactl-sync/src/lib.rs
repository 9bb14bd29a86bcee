//! # metactl-sync
//!
//! The metadata synchronization engine.
//!
//! Call [`execute`] with a [`MetadataAction`], a driver and a
//! [`SyncContext`]. The engine resolves the local metadata file when the
//! action needs one, performs exactly one driver primitive, writes the
//! exported document for `export`, and returns a [`SyncOutcome`].

pub mod diff;
pub mod engine;
pub mod error;
pub mod report;
pub mod writer;

pub use engine::{execute, MetadataAction, SyncContext, SyncOutcome};
pub use error::{SyncError, SyncErrorKind};
pub use report::render_inconsistencies;
pub use writer::WriteResult;
