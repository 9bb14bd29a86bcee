//! Atomic, digest-gated writer for exported metadata.
//!
//! ## Protocol
//!
//! 1. SHA-256 the new content.
//! 2. Hash the file currently at the target path, if any; skip when equal.
//! 3. Write to `<path>.metactl.tmp`.
//! 4. Rename over the target (atomic on POSIX); remove the tmp on failure.
//!
//! The parent directory is never created. A missing migrations directory
//! surfaces as an I/O failure.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncErrorKind};

/// Outcome of writing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// Content changed or the file did not exist.
    Written { path: PathBuf, digest: String },
    /// The file already held exactly this content.
    Unchanged { path: PathBuf, digest: String },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } | WriteResult::Unchanged { path, .. } => path,
        }
    }

    /// Hex SHA-256 of the file content after the write.
    pub fn digest(&self) -> &str {
        match self {
            WriteResult::Written { digest, .. } | WriteResult::Unchanged { digest, .. } => digest,
        }
    }
}

/// Write `content` to `path` unless the file already holds it.
pub(crate) fn write_if_changed(path: &Path, content: &str) -> Result<WriteResult, SyncErrorKind> {
    let tmp = PathBuf::from(format!("{}.metactl.tmp", path.display()));
    write_if_changed_with_tmp(path, content, &tmp)
}

fn write_if_changed_with_tmp(
    path: &Path,
    content: &str,
    tmp: &Path,
) -> Result<WriteResult, SyncErrorKind> {
    let digest = sha256_hex(content.as_bytes());

    match std::fs::read(path) {
        Ok(existing) if sha256_hex(&existing) == digest => {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
                digest,
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(path, err)),
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        digest,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
