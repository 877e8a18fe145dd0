use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// File name of `path` as UTF-8, lossily. Skip rules compare on this.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Recreates the link at `src` as `dst` without following it. A file or
/// link already at `dst` is replaced.
#[cfg(unix)]
pub fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src)
        .with_context(|| format!("failed to read symlink {}", src.display()))?;
    if let Ok(existing) = fs::symlink_metadata(dst) {
        if !existing.is_dir() {
            fs::remove_file(dst)
                .with_context(|| format!("failed to replace {}", dst.display()))?;
        }
    }
    std::os::unix::fs::symlink(&target, dst).with_context(|| {
        format!(
            "failed to create symlink {} -> {}",
            dst.display(),
            target.display()
        )
    })
}

#[cfg(not(unix))]
pub fn copy_symlink(src: &Path, _dst: &Path) -> Result<()> {
    Err(anyhow::anyhow!(
        "cannot recreate symlink {} on this platform",
        src.display()
    ))
}

/// Whether `metadata` describes a link that should be recreated rather than
/// followed.
pub fn is_copyable_symlink(metadata: &fs::Metadata) -> bool {
    cfg!(unix) && metadata.file_type().is_symlink()
}
