use std::path::{Path, PathBuf};

use appswap_core::{TransactionOutcome, UpdaterConfig};
use appswap_installer::{
    run_on_worker, run_update, updater_file_name, updater_home, Collaborators, DetachedLauncher,
    SystemClock, SystemProcessTable, TransactionOptions,
};
use tracing::{info, warn};

use crate::logging::init_logging;
use crate::render::TerminalNotifier;

/// Loads configuration, installs logging and runs the transaction on its
/// worker thread. The calling thread only waits for the hand-back.
pub(crate) fn run_cli(args: Vec<String>) -> TransactionOutcome {
    let home = updater_home().unwrap_or_else(|_| PathBuf::from("."));
    let (config, config_error) = load_config(&home);
    init_logging(&home.join(&config.log_file));

    info!("appswap {} started", env!("CARGO_PKG_VERSION"));
    if let Some(err) = config_error {
        warn!("Ignoring config: {err:#}");
    }

    let options = TransactionOptions::from_config(&config, updater_file_name().as_deref());
    let notifier = TerminalNotifier::current();
    let outcome = run_on_worker(
        move || {
            let mut processes = SystemProcessTable::new();
            run_update(
                &args,
                &options,
                Collaborators {
                    processes: &mut processes,
                    clock: &SystemClock,
                    launcher: &DetachedLauncher,
                    notifier: &notifier,
                },
            )
        },
        &notifier,
    );

    info!(
        "appswap finished: {} (exit code {})",
        outcome.as_str(),
        outcome.exit_code()
    );
    outcome
}

/// Configuration problems never block an update: defaults are used instead.
fn load_config(home: &Path) -> (UpdaterConfig, Option<anyhow::Error>) {
    match UpdaterConfig::load(&home.join(UpdaterConfig::FILE_NAME)) {
        Ok(config) => (config, None),
        Err(err) => (UpdaterConfig::default(), Some(err)),
    }
}
