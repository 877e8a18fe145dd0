use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

pub trait Launcher {
    /// Starts `executable` without waiting for it.
    fn launch(&self, executable: &Path, working_dir: &Path) -> Result<()>;
}

/// Spawns the application detached from the updater's stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(&self, executable: &Path, working_dir: &Path) -> Result<()> {
        let mut command = Command::new(executable);
        command
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .with_context(|| format!("failed to start {}", executable.display()))?;
        info!("Started {} (pid {})", executable.display(), child.id());
        Ok(())
    }
}
