//! Error types for metactl-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::MetadataFormat;

/// Errors raised while locating, reading or decoding the local metadata file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// No candidate file exists. This is the expected "nothing to apply"
    /// condition, distinct from a failed read.
    #[error(
        "unable to locate {} under {}",
        tried_names(.tried),
        .dir.display()
    )]
    NotFound {
        dir: PathBuf,
        tried: Vec<MetadataFormat>,
    },

    /// A candidate exists but could not be read (permission, I/O error).
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its bytes are not a valid document in the
    /// matched encoding.
    #[error("cannot parse {format} metadata at {path}: {message}")]
    Decode {
        path: PathBuf,
        format: MetadataFormat,
        message: String,
    },
}

/// Errors raised while loading project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `config.yaml` exists but is malformed.
    #[error("failed to parse config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid endpoint '{endpoint}': expected an http:// or https:// URL")]
    InvalidEndpoint { endpoint: String },
}

fn tried_names(tried: &[MetadataFormat]) -> String {
    let exts: Vec<&str> = tried.iter().map(|f| f.extension()).collect();
    match exts.as_slice() {
        [] => "a metadata file".to_string(),
        [single] => format!("metadata.{single} file"),
        many => format!("metadata.[{}] file", many.join("|")),
    }
}

/// Convenience constructor for [`FormatError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FormatError {
    FormatError::Io {
        path: path.into(),
        source,
    }
}
