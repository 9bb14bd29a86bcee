//! # metactl-driver
//!
//! The boundary between metactl and a remote engine.
//!
//! [`MetadataDriver`] is the capability set the synchronization engine talks
//! to. [`HttpDriver`] implements it over the engine's JSON query API;
//! [`InMemoryDriver`] implements it against local state for tests and
//! offline use.

mod error;
pub mod http;
pub mod memory;
mod wire;

pub use error::DriverError;
pub use http::HttpDriver;
pub use memory::{DriverOp, InMemoryDriver};

use metactl_core::{InconsistencyStatus, MetadataDocument};
use serde_json::Value;

/// Primitive operations against a remote engine.
///
/// Each call is one blocking round-trip. Implementations never retry.
pub trait MetadataDriver {
    /// Fetch the engine's current metadata.
    fn export(&mut self) -> Result<MetadataDocument, DriverError>;

    /// Replace remote metadata with the empty baseline.
    fn reset(&mut self) -> Result<(), DriverError>;

    /// Ask the engine to recompute derived state from its metadata.
    fn reload(&mut self) -> Result<(), DriverError>;

    fn get_inconsistent_objects(&mut self) -> Result<InconsistencyStatus, DriverError>;

    /// Discard every inconsistent object on the engine.
    fn drop_inconsistent_objects(&mut self) -> Result<(), DriverError>;

    /// Replace remote metadata with `document`.
    fn apply(&mut self, document: &MetadataDocument) -> Result<(), DriverError>;

    /// Run driver-specific requests in order and return one result per
    /// request. A failing request is reported through
    /// [`DriverError::QueryFailed`] with its position.
    fn query(&mut self, requests: &[Value]) -> Result<Vec<Value>, DriverError>;
}
