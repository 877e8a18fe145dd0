use anyhow::{Context, Result};
use appswap_core::SkipSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::fs_utils::{copy_symlink, entry_name, is_copyable_symlink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub files_copied: usize,
    pub files_skipped: usize,
    pub dirs_created: usize,
}

/// Overlays `source` onto `target`.
///
/// Existing files are overwritten in place, files and directories that only
/// exist in `target` are left alone. Names in `skip` are never written and
/// a nested backup directory in `source` is ignored. Symlinks are recreated
/// as links. Individual file copies are not atomic.
pub fn copy_tree(source: &Path, target: &Path, skip: &SkipSet) -> Result<CopySummary> {
    copy_tree_with(source, target, skip, &mut copy_file)
}

/// Same as [`copy_tree`] with the per-file copy step supplied by the caller.
pub fn copy_tree_with<CopyFile>(
    source: &Path,
    target: &Path,
    skip: &SkipSet,
    copy: &mut CopyFile,
) -> Result<CopySummary>
where
    CopyFile: FnMut(&Path, &Path) -> Result<()>,
{
    let mut summary = CopySummary::default();
    copy_tree_recursive(source, target, skip, copy, &mut summary)?;
    Ok(summary)
}

fn copy_tree_recursive<CopyFile>(
    src: &Path,
    dst: &Path,
    skip: &SkipSet,
    copy: &mut CopyFile,
    summary: &mut CopySummary,
) -> Result<()>
where
    CopyFile: FnMut(&Path, &Path) -> Result<()>,
{
    if !dst.is_dir() {
        fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;
        summary.dirs_created += 1;
    }

    for entry in fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))? {
        let entry = entry.with_context(|| format!("failed to read entry in {}", src.display()))?;
        let src_path = entry.path();
        let name = entry_name(&src_path);
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::symlink_metadata(&src_path)
            .with_context(|| format!("failed to stat {}", src_path.display()))?;

        if metadata.is_dir() {
            if SkipSet::is_backup_dir(&name) {
                debug!("Ignoring backup directory inside source: {}", src_path.display());
                continue;
            }
            copy_tree_recursive(&src_path, &dst_path, skip, copy, summary)?;
            continue;
        }

        if skip.contains(&name) {
            info!("Skipping file: {}", src_path.display());
            summary.files_skipped += 1;
            continue;
        }

        if is_copyable_symlink(&metadata) {
            copy_symlink(&src_path, &dst_path)?;
            summary.files_copied += 1;
            continue;
        }

        copy(&src_path, &dst_path)?;
        summary.files_copied += 1;
    }
    Ok(())
}

pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_context(|| {
        format!(
            "failed to copy {} to {}",
            src.display(),
            dst.display()
        )
    })?;
    Ok(())
}
