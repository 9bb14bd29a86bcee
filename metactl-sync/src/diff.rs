//! Unified diff between the engine's metadata and the local file.

use similar::TextDiff;

use metactl_core::{LoadedMetadata, MetadataDocument};

/// Header used for the remote side of the diff.
pub const SERVER_LABEL: &str = "server";

/// Diff `remote` against `local`, both rendered in the canonical encoding so
/// that key order and whitespace in the local file do not show up.
///
/// Returns `None` when the documents are structurally equal.
pub fn diff_documents(
    remote: &MetadataDocument,
    local: &LoadedMetadata,
) -> Result<Option<String>, serde_json::Error> {
    let old = remote.to_canonical_string()?;
    let new = local.document.to_canonical_string()?;
    if old == new {
        return Ok(None);
    }

    let local_label = local
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.path.display().to_string());

    let unified = TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(SERVER_LABEL, &local_label)
        .context_radius(3)
        .to_string();
    Ok(Some(unified))
}
