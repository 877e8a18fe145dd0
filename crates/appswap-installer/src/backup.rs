use anyhow::{Context, Result};
use appswap_core::SkipSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::copy::copy_file;
use crate::fs_utils::{copy_symlink, entry_name, is_copyable_symlink, remove_dir_all_if_exists};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Pre-update copy of the target tree, keyed by target-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    location: PathBuf,
    entries: BTreeMap<PathBuf, EntryKind>,
}

impl BackupSnapshot {
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn entries(&self) -> &BTreeMap<PathBuf, EntryKind> {
        &self.entries
    }

    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .filter(|kind| **kind != EntryKind::Directory)
            .count()
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.entries.contains_key(relative)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub backup_missing: bool,
    pub restored: usize,
    pub removed: usize,
    pub failures: Vec<String>,
}

impl RollbackReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Snapshots every non-skipped file and directory under `target` into `backup_dir`.
///
/// Symlinks are stored as links and never followed.
/// A stale directory at `backup_dir` is removed first. The skip rules match
/// the copier's, so a rollback restores exactly what a copy may overwrite.
pub fn create_backup(target: &Path, backup_dir: &Path, skip: &SkipSet) -> Result<BackupSnapshot> {
    remove_dir_all_if_exists(backup_dir)
        .with_context(|| format!("failed to remove stale backup {}", backup_dir.display()))?;
    fs::create_dir_all(backup_dir)
        .with_context(|| format!("failed to create {}", backup_dir.display()))?;

    let mut entries = BTreeMap::new();
    backup_recursive(target, backup_dir, Path::new(""), skip, &mut entries)?;

    let snapshot = BackupSnapshot {
        location: backup_dir.to_path_buf(),
        entries,
    };
    info!(
        "Backup created at {} ({} files)",
        backup_dir.display(),
        snapshot.file_count()
    );
    Ok(snapshot)
}

fn backup_recursive(
    target_root: &Path,
    backup_root: &Path,
    relative: &Path,
    skip: &SkipSet,
    entries: &mut BTreeMap<PathBuf, EntryKind>,
) -> Result<()> {
    let dir = target_root.join(relative);
    for entry in fs::read_dir(&dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let name = entry_name(&path);
        let rel = relative.join(entry.file_name());
        let metadata = fs::symlink_metadata(&path)
            .with_context(|| format!("failed to stat {}", path.display()))?;

        if metadata.is_dir() {
            if SkipSet::is_backup_dir(&name) {
                continue;
            }
            let backup_path = backup_root.join(&rel);
            fs::create_dir_all(&backup_path)
                .with_context(|| format!("failed to create {}", backup_path.display()))?;
            entries.insert(rel.clone(), EntryKind::Directory);
            backup_recursive(target_root, backup_root, &rel, skip, entries)?;
            continue;
        }

        if skip.contains(&name) {
            continue;
        }
        if is_copyable_symlink(&metadata) {
            copy_symlink(&path, &backup_root.join(&rel))?;
            entries.insert(rel, EntryKind::Symlink);
            continue;
        }
        copy_file(&path, &backup_root.join(&rel))?;
        entries.insert(rel, EntryKind::File);
    }
    Ok(())
}

/// Restores `target` to the state captured in `snapshot`.
///
/// Entries the copy added are removed and backed-up files are copied back
/// over the target. Nothing here returns an error: every failure is logged
/// and recorded in the report so the caller can surface its own error.
pub fn rollback(snapshot: &BackupSnapshot, target: &Path, skip: &SkipSet) -> RollbackReport {
    let mut report = RollbackReport::default();
    if !snapshot.location.is_dir() {
        warn!(
            "No backup found at {}; nothing to restore",
            snapshot.location.display()
        );
        report.backup_missing = true;
        return report;
    }

    info!("Restoring files from backup...");
    remove_new_entries(snapshot, target, Path::new(""), skip, &mut report);

    for (relative, kind) in &snapshot.entries {
        let destination = target.join(relative);
        let result = match kind {
            EntryKind::Directory => fs::create_dir_all(&destination)
                .with_context(|| format!("failed to create {}", destination.display())),
            EntryKind::File => copy_file(&snapshot.location.join(relative), &destination),
            EntryKind::Symlink => copy_symlink(&snapshot.location.join(relative), &destination),
        };
        match result {
            Ok(()) if *kind != EntryKind::Directory => report.restored += 1,
            Ok(()) => {}
            Err(err) => record_failure(&mut report, err),
        }
    }

    if report.is_clean() {
        info!(
            "Rollback completed: {} files restored, {} new entries removed",
            report.restored, report.removed
        );
    } else {
        warn!(
            "Rollback finished with {} failure(s); backup kept at {}",
            report.failures.len(),
            snapshot.location.display()
        );
    }
    report
}

fn remove_new_entries(
    snapshot: &BackupSnapshot,
    target_root: &Path,
    relative: &Path,
    skip: &SkipSet,
    report: &mut RollbackReport,
) {
    let dir = target_root.join(relative);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            record_failure(
                report,
                anyhow::Error::new(err).context(format!("failed to read {}", dir.display())),
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry_name(&path);
        let rel = relative.join(entry.file_name());
        let is_dir = fs::symlink_metadata(&path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        if is_dir {
            if SkipSet::is_backup_dir(&name) {
                continue;
            }
            if snapshot.contains(&rel) {
                remove_new_entries(snapshot, target_root, &rel, skip, report);
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => report.removed += 1,
                Err(err) => record_failure(
                    report,
                    anyhow::Error::new(err).context(format!("failed to remove {}", path.display())),
                ),
            }
            continue;
        }

        if skip.contains(&name) || snapshot.contains(&rel) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => report.removed += 1,
            Err(err) => record_failure(
                report,
                anyhow::Error::new(err).context(format!("failed to remove {}", path.display())),
            ),
        }
    }
}

fn record_failure(report: &mut RollbackReport, err: anyhow::Error) {
    warn!("Rollback failed: {err:#}");
    report.failures.push(format!("{err:#}"));
}

/// Deletes the backup tree. Returns whether the directory is gone afterwards.
pub fn cleanup_backup(backup_dir: &Path) -> bool {
    match remove_dir_all_if_exists(backup_dir) {
        Ok(()) => true,
        Err(err) => {
            warn!("Cleanup backup failed for {}: {err}", backup_dir.display());
            false
        }
    }
}
