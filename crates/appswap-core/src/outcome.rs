use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Terminal state of an update transaction, one per process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionOutcome {
    Success,
    InvalidArgs,
    SourceMissing,
    ProcessTimeout,
    AppMissingAfterUpdate,
    FatalError,
}

impl TransactionOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidArgs => 1,
            Self::SourceMissing => 2,
            Self::ProcessTimeout => 3,
            Self::AppMissingAfterUpdate => 4,
            Self::FatalError => 99,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InvalidArgs => "invalid-args",
            Self::SourceMissing => "source-missing",
            Self::ProcessTimeout => "process-timeout",
            Self::AppMissingAfterUpdate => "app-missing-after-update",
            Self::FatalError => "fatal-error",
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("expected 3 arguments <sourceDir> <targetDir> <mainExecutable>, got {}", .values.len())]
    InvalidArgs { values: Vec<String> },

    #[error("source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("process '{process}' still running after {}ms", .waited.as_millis())]
    ProcessTimeout { process: String, waited: Duration },

    /// The payload copy failed. The target has already been rolled back when
    /// this reaches the caller; the wrapped error is the original cause.
    #[error("update copy failed: {0:#}")]
    Copy(anyhow::Error),

    #[error("main application not found after update: {}", .0.display())]
    AppMissingAfterUpdate(PathBuf),

    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl UpdateError {
    pub fn outcome(&self) -> TransactionOutcome {
        match self {
            Self::InvalidArgs { .. } => TransactionOutcome::InvalidArgs,
            Self::SourceMissing(_) => TransactionOutcome::SourceMissing,
            Self::ProcessTimeout { .. } => TransactionOutcome::ProcessTimeout,
            Self::AppMissingAfterUpdate(_) => TransactionOutcome::AppMissingAfterUpdate,
            Self::Copy(_) | Self::Fatal(_) => TransactionOutcome::FatalError,
        }
    }

    /// Whether the operator gets an alert for this failure class.
    pub fn notifies_user(&self) -> bool {
        !matches!(self, Self::AppMissingAfterUpdate(_))
    }
}
