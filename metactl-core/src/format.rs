//! Local metadata file resolution.
//!
//! # Layout
//!
//! ```text
//! <migrations-directory>/
//!   metadata.yaml   (tried first)
//!   metadata.json   (tried second; canonical export target)
//! ```
//!
//! Resolution walks an explicit ordered list of `(path, format)` pairs and
//! stops at the first file that exists. A missing file advances to the next
//! candidate; any other read error aborts immediately.
//!
//! Both encodings decode into the same [`MetadataDocument`] tree, so `apply`
//! behaves identically whichever file the author saved.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::MetadataDocument;
use crate::error::{io_err, FormatError};

/// Base name shared by every local metadata file.
pub const METADATA_BASE_NAME: &str = "metadata";

/// A supported on-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    Yaml,
    Json,
}

impl MetadataFormat {
    /// Lookup order used by `apply` and `diff`.
    pub const PRIORITY: [MetadataFormat; 2] = [MetadataFormat::Yaml, MetadataFormat::Json];

    /// Encoding written by `export`, regardless of what was read.
    pub const CANONICAL: MetadataFormat = MetadataFormat::Json;

    pub fn extension(self) -> &'static str {
        match self {
            MetadataFormat::Yaml => "yaml",
            MetadataFormat::Json => "json",
        }
    }

    /// `metadata.<ext>`
    pub fn file_name(self) -> String {
        format!("{METADATA_BASE_NAME}.{}", self.extension())
    }

    /// `<dir>/metadata.<ext>`: pure, no I/O.
    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Decode raw bytes in this encoding.
    ///
    /// YAML merge keys (`<<: *anchor`) are expanded before conversion. An
    /// empty document (`null` at the top level) is rejected.
    ///
    /// The error is returned as text; [`ResolvedFile::decode`] attaches the
    /// path.
    pub fn decode(self, bytes: &[u8]) -> Result<MetadataDocument, String> {
        let value: Value = match self {
            MetadataFormat::Yaml => {
                let mut yaml: serde_yaml::Value =
                    serde_yaml::from_slice(bytes).map_err(|e| e.to_string())?;
                yaml.apply_merge().map_err(|e| e.to_string())?;
                serde_json::to_value(yaml).map_err(|e| e.to_string())?
            }
            MetadataFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string())?,
        };
        if value.is_null() {
            return Err("document is empty".to_string());
        }
        Ok(MetadataDocument::from(value))
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataFormat::Yaml => write!(f, "YAML"),
            MetadataFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Raw bytes of the first local metadata file found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub format: MetadataFormat,
    pub bytes: Vec<u8>,
}

impl ResolvedFile {
    pub fn decode(self) -> Result<LoadedMetadata, FormatError> {
        match self.format.decode(&self.bytes) {
            Ok(document) => Ok(LoadedMetadata {
                path: self.path,
                format: self.format,
                document,
            }),
            Err(message) => Err(FormatError::Decode {
                path: self.path,
                format: self.format,
                message,
            }),
        }
    }
}

/// A decoded local metadata document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMetadata {
    pub path: PathBuf,
    pub format: MetadataFormat,
    pub document: MetadataDocument,
}

/// Ordered `(path, format)` candidates for `dir`.
pub fn candidates(dir: &Path, formats: &[MetadataFormat]) -> Vec<(PathBuf, MetadataFormat)> {
    formats.iter().map(|f| (f.path_in(dir), *f)).collect()
}

/// Read the first existing candidate under `dir`.
///
/// Returns [`FormatError::NotFound`] when no candidate exists and
/// [`FormatError::Io`] for any other read failure.
pub fn resolve(dir: &Path, formats: &[MetadataFormat]) -> Result<ResolvedFile, FormatError> {
    for (path, format) in candidates(dir, formats) {
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("resolved local metadata: {}", path.display());
                return Ok(ResolvedFile {
                    path,
                    format,
                    bytes,
                });
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::trace!("no metadata at {}", path.display());
                continue;
            }
            Err(err) => return Err(io_err(path, err)),
        }
    }
    Err(FormatError::NotFound {
        dir: dir.to_path_buf(),
        tried: formats.to_vec(),
    })
}

/// Resolve with [`MetadataFormat::PRIORITY`] and decode.
pub fn load(dir: &Path) -> Result<LoadedMetadata, FormatError> {
    resolve(dir, &MetadataFormat::PRIORITY)?.decode()
}
