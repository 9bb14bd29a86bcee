//! `metactl metadata <action>`: export, apply and inspect engine metadata.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use metactl_core::{ExecutionConfig, InconsistencyStatus, ServerOverrides};
use metactl_driver::HttpDriver;
use metactl_sync::{execute, MetadataAction, SyncContext, SyncOutcome, WriteResult};

/// Arguments for `metactl metadata`.
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Project directory holding `config.yaml` and the migrations directory.
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub project: PathBuf,

    /// Engine endpoint, e.g. http://localhost:8080.
    #[arg(long, global = true, env = "METACTL_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Admin secret sent with every request.
    #[arg(
        long,
        global = true,
        env = "METACTL_ADMIN_SECRET",
        hide_env_values = true,
        value_name = "SECRET"
    )]
    pub admin_secret: Option<String>,

    /// Deprecated spelling of --admin-secret.
    #[arg(long, global = true, hide = true, value_name = "SECRET")]
    pub access_key: Option<String>,

    #[command(subcommand)]
    pub command: MetadataCommand,
}

#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    /// Write the engine's metadata to <migrations>/metadata.json.
    Export,

    /// Reset the engine's metadata to the empty baseline.
    #[command(alias = "reset")]
    Clear,

    /// Have the engine re-read its metadata from the database.
    Reload,

    /// Replace the engine's metadata with the local file.
    Apply,

    /// Show how the local file differs from the engine's metadata.
    Diff,

    /// List metadata objects the engine cannot resolve.
    #[command(name = "get_inconsistent", alias = "get-inconsistent")]
    GetInconsistent {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove every inconsistent object from the engine's metadata.
    #[command(name = "drop_inconsistent", alias = "drop-inconsistent")]
    DropInconsistent,
}

impl MetadataCommand {
    fn action(&self) -> MetadataAction {
        match self {
            MetadataCommand::Export => MetadataAction::Export,
            MetadataCommand::Clear => MetadataAction::Clear,
            MetadataCommand::Reload => MetadataAction::Reload,
            MetadataCommand::Apply => MetadataAction::Apply,
            MetadataCommand::Diff => MetadataAction::Diff,
            MetadataCommand::GetInconsistent { .. } => MetadataAction::GetInconsistent,
            MetadataCommand::DropInconsistent => MetadataAction::DropInconsistent,
        }
    }

    fn wants_json(&self) -> bool {
        matches!(self, MetadataCommand::GetInconsistent { json: true })
    }
}

impl MetadataArgs {
    pub fn run(self) -> Result<()> {
        let overrides = ServerOverrides {
            endpoint: self.endpoint.clone(),
            admin_secret: self.admin_secret(),
        };
        let config = ExecutionConfig::resolve(&self.project, overrides).with_context(|| {
            format!(
                "failed to load configuration for project {}",
                self.project.display()
            )
        })?;

        let mut driver = HttpDriver::new(&config.server);
        let ctx = SyncContext::new(&config.migrations_dir);
        let action = self.command.action();

        let outcome = match execute(action, &mut driver, &ctx) {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_not_found() {
                    eprintln!(
                        "{} run `metactl metadata export` to create {}",
                        "hint:".cyan().bold(),
                        ctx.export_path().display()
                    );
                }
                return Err(err.into());
            }
        };

        print_outcome(outcome, self.command.wants_json())
    }

    fn admin_secret(&self) -> Option<String> {
        if self.admin_secret.is_some() {
            return self.admin_secret.clone();
        }
        if self.access_key.is_some() {
            tracing::warn!("--access-key is deprecated, use --admin-secret instead");
        }
        self.access_key.clone()
    }
}

fn print_outcome(outcome: SyncOutcome, json: bool) -> Result<()> {
    match outcome {
        SyncOutcome::Exported { write, shadowed_by } => {
            match write {
                WriteResult::Written { path, .. } => {
                    println!("✓ metadata exported to {}", path.display())
                }
                WriteResult::Unchanged { path, .. } => {
                    println!("✓ metadata exported ({} unchanged)", path.display())
                }
            }
            if let Some(shadow) = shadowed_by {
                println!(
                    "  {} {} is read first by `apply`; remove it to apply this export",
                    "!".yellow().bold(),
                    shadow.display()
                );
            }
        }
        SyncOutcome::Cleared => println!("✓ metadata cleared"),
        SyncOutcome::Reloaded => println!("✓ metadata reloaded"),
        SyncOutcome::Applied { source, format } => {
            println!("✓ metadata applied from {} ({format})", source.display())
        }
        SyncOutcome::Diffed {
            source,
            unified_diff: None,
        } => println!("✓ {} matches the server", source.display()),
        SyncOutcome::Diffed {
            unified_diff: Some(diff),
            ..
        } => {
            print!("{diff}");
            if !diff.ends_with('\n') {
                println!();
            }
        }
        SyncOutcome::Consistent if json => print_status(&InconsistencyStatus::consistent())?,
        SyncOutcome::Consistent => println!("✓ metadata is consistent"),
        SyncOutcome::Inconsistent { objects, .. } if json => print_status(&InconsistencyStatus {
            is_consistent: false,
            objects,
        })?,
        SyncOutcome::Inconsistent { report, .. } => println!("{report}"),
        SyncOutcome::DroppedInconsistent => println!("✓ inconsistent objects dropped"),
    }
    Ok(())
}

fn print_status(status: &InconsistencyStatus) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(status).context("failed to serialize inconsistency JSON")?
    );
    Ok(())
}
