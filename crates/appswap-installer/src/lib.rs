mod backup;
mod copy;
mod fs_utils;
mod launch;
mod layout;
mod process;
mod transaction;
mod worker;

pub use backup::{
    cleanup_backup, create_backup, rollback, BackupSnapshot, EntryKind, RollbackReport,
};
pub use copy::{copy_tree, copy_tree_with, CopySummary};
pub use launch::{DetachedLauncher, Launcher};
pub use layout::{updater_file_name, updater_home, TargetLayout};
pub use process::{
    comm_prefix_matches, name_matches_with_suffix, process_identity_matches,
    process_name_matches, wait_for_exit, Clock, ProcessTable, SystemClock, SystemProcessTable,
    WaitOutcome, WaitPolicy, COMM_NAME_LIMIT,
};
pub use transaction::{
    execute_update, execute_update_with, run_update, run_update_with, Collaborators,
    MutationState, Notifier, TransactionOptions, UpdateReport,
};
pub use worker::run_on_worker;
