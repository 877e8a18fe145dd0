use anyhow::Context;
use appswap_core::{SkipSet, TransactionOutcome, UpdateError, UpdateRequest, UpdaterConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::backup::{cleanup_backup, create_backup, rollback};
use crate::copy::{copy_file, copy_tree_with, CopySummary};
use crate::launch::Launcher;
use crate::layout::TargetLayout;
use crate::process::{wait_for_exit, Clock, ProcessTable, WaitOutcome, WaitPolicy};

/// Operator-facing alert channel. Only presentation; the exit code and the
/// log are the real record of what happened.
pub trait Notifier {
    fn alert(&self, title: &str, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    pub skip: SkipSet,
    pub backup: bool,
    pub wait: WaitPolicy,
    pub exe_suffix: String,
}

impl TransactionOptions {
    pub fn from_config(config: &UpdaterConfig, updater_file_name: Option<&str>) -> Self {
        Self {
            skip: config.skip_set(updater_file_name),
            backup: config.backup,
            wait: WaitPolicy {
                poll_interval: config.poll_interval(),
                timeout: config.wait_timeout(),
            },
            exe_suffix: std::env::consts::EXE_SUFFIX.to_string(),
        }
    }
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self::from_config(&UpdaterConfig::default(), None)
    }
}

/// Everything the transaction talks to outside the filesystem.
pub struct Collaborators<'a> {
    pub processes: &'a mut dyn ProcessTable,
    pub clock: &'a dyn Clock,
    pub launcher: &'a dyn Launcher,
    pub notifier: &'a dyn Notifier,
}

/// Mutation-phase states, logged as the transaction moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    BackupCreated,
    Copying,
    CopySucceeded,
    BackupDeleted,
    CopyFailed,
    RollingBack,
    RolledBack,
}

impl MutationState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BackupCreated => "backup-created",
            Self::Copying => "copying",
            Self::CopySucceeded => "copy-succeeded",
            Self::BackupDeleted => "backup-deleted",
            Self::CopyFailed => "copy-failed",
            Self::RollingBack => "rolling-back",
            Self::RolledBack => "rolled-back",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub request: UpdateRequest,
    pub copy: CopySummary,
    pub launched: PathBuf,
}

/// Runs the whole update and maps every result to an outcome.
///
/// Precondition: no other updater instance works on the same target.
pub fn run_update(
    args: &[String],
    options: &TransactionOptions,
    env: Collaborators<'_>,
) -> TransactionOutcome {
    run_update_with(args, options, env, &mut copy_file)
}

/// Same as [`run_update`] with the per-file copy step supplied by the caller.
pub fn run_update_with<CopyFile>(
    args: &[String],
    options: &TransactionOptions,
    env: Collaborators<'_>,
    copy: &mut CopyFile,
) -> TransactionOutcome
where
    CopyFile: FnMut(&Path, &Path) -> anyhow::Result<()>,
{
    let notifier = env.notifier;
    match execute_update_with(args, options, env, copy) {
        Ok(report) => {
            info!(
                "Update of {} finished: {} files copied, {} skipped",
                report.request.target_dir.display(),
                report.copy.files_copied,
                report.copy.files_skipped
            );
            TransactionOutcome::Success
        }
        Err(err) => {
            let outcome = err.outcome();
            report_failure(&err, notifier);
            outcome
        }
    }
}

/// Runs the update pipeline: validate, wait, back up, copy, launch.
pub fn execute_update(
    args: &[String],
    options: &TransactionOptions,
    env: Collaborators<'_>,
) -> Result<UpdateReport, UpdateError> {
    execute_update_with(args, options, env, &mut copy_file)
}

/// Same as [`execute_update`] with the per-file copy step supplied by the caller.
pub fn execute_update_with<CopyFile>(
    args: &[String],
    options: &TransactionOptions,
    env: Collaborators<'_>,
    copy: &mut CopyFile,
) -> Result<UpdateReport, UpdateError>
where
    CopyFile: FnMut(&Path, &Path) -> anyhow::Result<()>,
{
    let request = UpdateRequest::from_args(args, &options.exe_suffix)?;
    request.ensure_source_exists()?;

    let layout = TargetLayout::new(&request.target_dir);
    layout.ensure_target_dir()?;

    let process_name = request.process_name(&options.exe_suffix);
    match wait_for_exit(env.processes, env.clock, &process_name, options.wait)
        .context("failed to query running processes")?
    {
        WaitOutcome::Exited { .. } => {}
        WaitOutcome::TimedOut { waited, .. } => {
            return Err(UpdateError::ProcessTimeout {
                process: process_name,
                waited,
            });
        }
    }

    let copy = apply_payload(&request, &layout, options, copy)?;

    let executable = layout.executable_path(&request.main_executable);
    if !executable.is_file() {
        return Err(UpdateError::AppMissingAfterUpdate(executable));
    }
    env.launcher.launch(&executable, layout.target())?;
    info!("Application restarted: {}", executable.display());

    Ok(UpdateReport {
        request,
        copy,
        launched: executable,
    })
}

/// Copies the payload, wrapped in backup/rollback when enabled.
fn apply_payload<CopyFile>(
    request: &UpdateRequest,
    layout: &TargetLayout,
    options: &TransactionOptions,
    copy: &mut CopyFile,
) -> Result<CopySummary, UpdateError>
where
    CopyFile: FnMut(&Path, &Path) -> anyhow::Result<()>,
{
    let mut state = MutationState::Idle;
    let target = layout.target();

    let snapshot = if options.backup {
        info!("Creating backup...");
        let snapshot = create_backup(target, &layout.backup_dir(), &options.skip)?;
        transition(&mut state, MutationState::BackupCreated);
        Some(snapshot)
    } else {
        debug!("Backup disabled; a failed copy leaves the target partially updated");
        None
    };

    info!(
        "Starting update copy from {} to {}",
        request.source_dir.display(),
        target.display()
    );
    transition(&mut state, MutationState::Copying);
    match copy_tree_with(&request.source_dir, target, &options.skip, copy) {
        Ok(summary) => {
            transition(&mut state, MutationState::CopySucceeded);
            info!("Update copy completed.");
            if let Some(snapshot) = &snapshot {
                if cleanup_backup(snapshot.location()) {
                    transition(&mut state, MutationState::BackupDeleted);
                }
            }
            Ok(summary)
        }
        Err(err) => {
            transition(&mut state, MutationState::CopyFailed);
            error!("Error during copy: {err:#}");
            if let Some(snapshot) = &snapshot {
                transition(&mut state, MutationState::RollingBack);
                let report = rollback(snapshot, target, &options.skip);
                if report.is_clean() && !report.backup_missing {
                    cleanup_backup(snapshot.location());
                }
                transition(&mut state, MutationState::RolledBack);
            }
            Err(UpdateError::Copy(err))
        }
    }
}

fn transition(state: &mut MutationState, next: MutationState) {
    debug!("transaction state: {} -> {}", state.as_str(), next.as_str());
    *state = next;
}

fn report_failure(err: &UpdateError, notifier: &dyn Notifier) {
    let (title, message) = match err {
        UpdateError::InvalidArgs { values } => {
            warn!("Invalid arguments.");
            warn!("Args count: {}", values.len());
            for value in values {
                warn!("Arg: {value}");
            }
            ("Invalid arguments", err.to_string())
        }
        UpdateError::SourceMissing(_) => {
            error!("{err}");
            (
                "Source directory not found",
                format!("{err}\nCheck the configured update path."),
            )
        }
        UpdateError::ProcessTimeout { .. } => {
            error!("Main application failed to close in time: {err}");
            ("Application still running", err.to_string())
        }
        UpdateError::AppMissingAfterUpdate(_) => {
            error!("{err}");
            ("Application missing", err.to_string())
        }
        UpdateError::Copy(_) | UpdateError::Fatal(_) => {
            error!("FATAL ERROR: {err:#}");
            ("Fatal error", format!("{err:#}"))
        }
    };

    if err.notifies_user() {
        notifier.alert(title, &message);
    }
}
