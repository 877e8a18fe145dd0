mod config;
mod outcome;
mod request;
mod skip;

pub use config::UpdaterConfig;
pub use outcome::{TransactionOutcome, UpdateError};
pub use request::{
    normalize_executable_name, strip_suffix_ignore_case, trim_trailing_separators, UpdateRequest,
};
pub use skip::{SkipSet, BACKUP_DIR_NAME, DEFAULT_LOG_FILE};
