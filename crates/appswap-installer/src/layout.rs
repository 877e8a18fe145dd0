use anyhow::{anyhow, Context, Result};
use appswap_core::BACKUP_DIR_NAME;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths derived from the installation directory being updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    target: PathBuf,
}

impl TargetLayout {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.target.join(BACKUP_DIR_NAME)
    }

    pub fn executable_path(&self, executable: &str) -> PathBuf {
        self.target.join(executable)
    }

    /// Creates the target directory; a first install may have none yet.
    pub fn ensure_target_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.target)
            .with_context(|| format!("failed to create {}", self.target.display()))
    }
}

/// Directory holding the running updater executable. Config and log live here.
pub fn updater_home() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot resolve updater executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("updater executable has no parent: {}", exe.display()))
}

pub fn updater_file_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
