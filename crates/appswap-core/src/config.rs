use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::skip::{SkipSet, DEFAULT_LOG_FILE};

/// Optional `appswap.toml` living next to the updater executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterConfig {
    pub skip_files: Vec<String>,
    pub backup: bool,
    pub poll_interval_ms: u64,
    pub wait_timeout_ms: u64,
    pub log_file: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            skip_files: vec!["LocalConfig.ini".to_string(), "updater.exe".to_string()],
            backup: true,
            poll_interval_ms: 200,
            wait_timeout_ms: 30_000,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl UpdaterConfig {
    pub const FILE_NAME: &'static str = "appswap.toml";

    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse appswap config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config at `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };
        Self::from_toml_str(&raw).with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Builds the skip set: configured names, the log file, this config
    /// file, the backup directory and, when known, the running updater's
    /// own file name.
    pub fn skip_set(&self, updater_file_name: Option<&str>) -> SkipSet {
        let mut skip = SkipSet::new(&self.skip_files)
            .with(&self.log_file)
            .with(Self::FILE_NAME);
        if let Some(name) = updater_file_name {
            skip = skip.with(name);
        }
        skip
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than zero"));
        }
        if self.wait_timeout_ms < self.poll_interval_ms {
            return Err(anyhow!(
                "wait_timeout_ms ({}) must not be shorter than poll_interval_ms ({})",
                self.wait_timeout_ms,
                self.poll_interval_ms
            ));
        }
        if let Some(entry) = self.skip_files.iter().find(|entry| entry.trim().is_empty()) {
            return Err(anyhow!("skip_files entries must not be empty: {entry:?}"));
        }
        let log_file = self.log_file.trim();
        if log_file.is_empty() || log_file.contains(['/', '\\']) || log_file == ".." {
            return Err(anyhow!(
                "log_file must be a bare file name: {:?}",
                self.log_file
            ));
        }
        Ok(())
    }
}
