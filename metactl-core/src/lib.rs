//! metactl core library: metadata document model, local file resolution,
//! project configuration, errors.
//!
//! - [`document`]: the opaque [`MetadataDocument`] value
//! - [`inconsistency`]: [`InconsistentObject`] records reported by the engine
//! - [`format`]: locating and decoding `metadata.{yaml,json}`
//! - [`config`]: project `config.yaml` and server connection settings
//! - [`error`]: [`FormatError`], [`ConfigError`]

pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod inconsistency;

pub use config::{ExecutionConfig, ProjectConfig, ServerConfig, ServerOverrides};
pub use document::MetadataDocument;
pub use error::{ConfigError, FormatError};
pub use format::{LoadedMetadata, MetadataFormat, ResolvedFile};
pub use inconsistency::{InconsistencyStatus, InconsistentObject};
