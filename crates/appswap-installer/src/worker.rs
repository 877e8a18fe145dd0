use appswap_core::TransactionOutcome;
use std::any::Any;
use std::thread;
use tracing::error;

use crate::transaction::Notifier;

const WORKER_THREAD_NAME: &str = "appswap-transaction";

/// Runs `job` on a dedicated thread and blocks until it hands back an outcome.
///
/// There is no cancellation: once started the job runs to completion. A
/// panic, or a thread that cannot be spawned, ends as `FatalError`.
pub fn run_on_worker<Job>(job: Job, notifier: &dyn Notifier) -> TransactionOutcome
where
    Job: FnOnce() -> TransactionOutcome + Send + 'static,
{
    let handle = match thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(job)
    {
        Ok(handle) => handle,
        Err(err) => {
            let message = format!("failed to start update worker: {err}");
            error!("FATAL ERROR: {message}");
            notifier.alert("Fatal error", &message);
            return TransactionOutcome::FatalError;
        }
    };

    match handle.join() {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = format!("update worker panicked: {}", panic_message(payload.as_ref()));
            error!("FATAL ERROR: {message}");
            notifier.alert("Fatal error", &message);
            TransactionOutcome::FatalError
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}
