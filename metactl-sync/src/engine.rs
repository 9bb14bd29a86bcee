//! Action router: one [`MetadataAction`] in, one driver primitive out.
//!
//! | action              | local file                   | driver call                 |
//! |---------------------|------------------------------|-----------------------------|
//! | `export`            | writes `metadata.json`       | `export`                    |
//! | `clear`             | none                         | `reset`                     |
//! | `reload`            | none                         | `reload`                    |
//! | `apply`             | reads `metadata.{yaml,json}` | `apply`                     |
//! | `diff`              | reads `metadata.{yaml,json}` | `export`                    |
//! | `get_inconsistent`  | none                         | `get_inconsistent_objects`  |
//! | `drop_inconsistent` | none                         | `drop_inconsistent_objects` |
//!
//! Every failure is returned as a [`SyncError`] naming the action, with the
//! driver or file error kept as its source. Nothing is retried.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use metactl_core::{format, InconsistentObject, MetadataFormat};
use metactl_driver::MetadataDriver;

use crate::diff::diff_documents;
use crate::error::{SyncError, SyncErrorKind};
use crate::report::render_inconsistencies;
use crate::writer::{write_if_changed, WriteResult};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataAction {
    Export,
    Clear,
    Reload,
    Apply,
    Diff,
    GetInconsistent,
    DropInconsistent,
}

impl MetadataAction {
    pub const ALL: [MetadataAction; 7] = [
        MetadataAction::Export,
        MetadataAction::Clear,
        MetadataAction::Reload,
        MetadataAction::Apply,
        MetadataAction::Diff,
        MetadataAction::GetInconsistent,
        MetadataAction::DropInconsistent,
    ];

    /// Command name, e.g. `get_inconsistent`.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataAction::Export => "export",
            MetadataAction::Clear => "clear",
            MetadataAction::Reload => "reload",
            MetadataAction::Apply => "apply",
            MetadataAction::Diff => "diff",
            MetadataAction::GetInconsistent => "get_inconsistent",
            MetadataAction::DropInconsistent => "drop_inconsistent",
        }
    }

    /// Context attached to every failure of this action.
    pub fn failure_context(self) -> &'static str {
        match self {
            MetadataAction::Export => "cannot export metadata",
            MetadataAction::Clear => "cannot clear metadata",
            MetadataAction::Reload => "cannot reload metadata",
            MetadataAction::Apply => "cannot apply metadata",
            MetadataAction::Diff => "cannot diff metadata",
            MetadataAction::GetInconsistent => "cannot fetch inconsistent metadata",
            MetadataAction::DropInconsistent => "cannot drop inconsistent metadata",
        }
    }
}

impl fmt::Display for MetadataAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        MetadataAction::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = MetadataAction::ALL.iter().map(|a| a.as_str()).collect();
                format!("unknown metadata action '{s}'; expected: {}", names.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Context and outcome
// ---------------------------------------------------------------------------

/// Per-invocation configuration handed to [`execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub migrations_dir: PathBuf,
}

impl SyncContext {
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Where `export` writes: `<migrations>/metadata.json`.
    pub fn export_path(&self) -> PathBuf {
        MetadataFormat::CANONICAL.path_in(&self.migrations_dir)
    }
}

/// Result of one successful action.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// `shadowed_by` names a higher-priority local file that a later `apply`
    /// would read instead of the one just written.
    Exported {
        write: WriteResult,
        shadowed_by: Option<PathBuf>,
    },
    Cleared,
    Reloaded,
    Applied {
        source: PathBuf,
        format: MetadataFormat,
    },
    /// `unified_diff` is `None` when local and remote are equal.
    Diffed {
        source: PathBuf,
        unified_diff: Option<String>,
    },
    /// The engine reports no inconsistent objects; nothing to show.
    Consistent,
    Inconsistent {
        objects: Vec<InconsistentObject>,
        report: String,
    },
    DroppedInconsistent,
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Run `action` against `driver`.
pub fn execute(
    action: MetadataAction,
    driver: &mut dyn MetadataDriver,
    ctx: &SyncContext,
) -> Result<SyncOutcome, SyncError> {
    tracing::debug!("metadata {action} (migrations: {})", ctx.migrations_dir.display());

    let result = match action {
        MetadataAction::Export => export(driver, ctx),
        MetadataAction::Clear => driver
            .reset()
            .map(|()| SyncOutcome::Cleared)
            .map_err(SyncErrorKind::from),
        MetadataAction::Reload => driver
            .reload()
            .map(|()| SyncOutcome::Reloaded)
            .map_err(SyncErrorKind::from),
        MetadataAction::Apply => apply(driver, ctx),
        MetadataAction::Diff => diff(driver, ctx),
        MetadataAction::GetInconsistent => get_inconsistent(driver),
        MetadataAction::DropInconsistent => driver
            .drop_inconsistent_objects()
            .map(|()| SyncOutcome::DroppedInconsistent)
            .map_err(SyncErrorKind::from),
    };

    match result {
        Ok(outcome) => {
            tracing::info!("metadata {action} done");
            Ok(outcome)
        }
        Err(kind) => {
            tracing::debug!("metadata {action} failed: {kind}");
            Err(SyncError::new(action, kind))
        }
    }
}

fn export(driver: &mut dyn MetadataDriver, ctx: &SyncContext) -> Result<SyncOutcome, SyncErrorKind> {
    let document = driver.export()?;
    let content = document.to_canonical_string()?;
    let write = write_if_changed(&ctx.export_path(), &content)?;

    let shadowed_by = shadowing_file(&ctx.migrations_dir);
    if let Some(path) = &shadowed_by {
        tracing::warn!(
            "{} takes precedence over {} on apply",
            path.display(),
            write.path().display()
        );
    }

    Ok(SyncOutcome::Exported { write, shadowed_by })
}

/// First existing local file that outranks the canonical export target.
fn shadowing_file(dir: &Path) -> Option<PathBuf> {
    MetadataFormat::PRIORITY
        .iter()
        .take_while(|f| **f != MetadataFormat::CANONICAL)
        .map(|f| f.path_in(dir))
        .find(|p| p.is_file())
}

fn apply(driver: &mut dyn MetadataDriver, ctx: &SyncContext) -> Result<SyncOutcome, SyncErrorKind> {
    // Resolve before touching the driver: with no local file there is
    // nothing to apply, and an empty payload must never act as a reset.
    let loaded = format::load(&ctx.migrations_dir)?;
    tracing::debug!("applying {} ({})", loaded.path.display(), loaded.format);
    driver.apply(&loaded.document)?;
    Ok(SyncOutcome::Applied {
        source: loaded.path,
        format: loaded.format,
    })
}

fn diff(driver: &mut dyn MetadataDriver, ctx: &SyncContext) -> Result<SyncOutcome, SyncErrorKind> {
    let local = format::load(&ctx.migrations_dir)?;
    let remote = driver.export()?;
    let unified_diff = diff_documents(&remote, &local)?;
    Ok(SyncOutcome::Diffed {
        source: local.path,
        unified_diff,
    })
}

fn get_inconsistent(driver: &mut dyn MetadataDriver) -> Result<SyncOutcome, SyncErrorKind> {
    let status = driver.get_inconsistent_objects()?;
    if status.is_consistent {
        return Ok(SyncOutcome::Consistent);
    }
    let report = render_inconsistencies(&status.objects);
    Ok(SyncOutcome::Inconsistent {
        objects: status.objects,
        report,
    })
}
