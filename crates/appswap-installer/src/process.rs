use anyhow::Result;
use appswap_core::strip_suffix_ignore_case;
use std::env::consts::EXE_SUFFIX;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::System;
use tracing::{debug, info, warn};

/// Source of "how many processes with this name are running".
pub trait ProcessTable {
    fn running_count(&mut self, process_name: &str) -> Result<usize>;
}

/// Time source for the poll loop, replaceable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Process table backed by the OS, excluding the updater itself.
pub struct SystemProcessTable {
    system: System,
    own_pid: u32,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            own_pid: std::process::id(),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn running_count(&mut self, process_name: &str) -> Result<usize> {
        self.system.refresh_processes();
        let count = self
            .system
            .processes()
            .iter()
            .filter(|(pid, _)| pid.as_u32() != self.own_pid)
            .filter(|(_, process)| {
                process_identity_matches(
                    process.name(),
                    process.exe(),
                    process.cmd().first().map(String::as_str),
                    process_name,
                )
            })
            .count();
        Ok(count)
    }
}

/// Length the Linux kernel cuts a process `comm` name to.
pub const COMM_NAME_LIMIT: usize = 15;

/// Matches a process by its table name, executable file name or `argv[0]`.
///
/// A table name of exactly [`COMM_NAME_LIMIT`] bytes on Linux is the
/// truncated `comm` and matches as a prefix of `wanted`; `exe` and `argv0`
/// may be unreadable for processes of other users.
pub fn process_identity_matches(
    name: &str,
    exe: Option<&Path>,
    argv0: Option<&str>,
    wanted: &str,
) -> bool {
    if process_name_matches(name, wanted) {
        return true;
    }
    if cfg!(target_os = "linux") && comm_prefix_matches(name, wanted) {
        return true;
    }
    let exe_name = exe
        .and_then(Path::file_name)
        .map(|file_name| file_name.to_string_lossy());
    if exe_name.is_some_and(|file_name| process_name_matches(&file_name, wanted)) {
        return true;
    }
    argv0
        .and_then(|argv0| argv0.rsplit(['/', '\\']).next())
        .is_some_and(|base| process_name_matches(base, wanted))
}

/// Whether `comm` is `wanted` cut to [`COMM_NAME_LIMIT`] bytes.
pub fn comm_prefix_matches(comm: &str, wanted: &str) -> bool {
    comm.len() == COMM_NAME_LIMIT
        && wanted.len() > COMM_NAME_LIMIT
        && wanted
            .get(..COMM_NAME_LIMIT)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(comm))
}

/// Compares a process-table name against the wanted name, ignoring case and
/// the platform executable suffix on the table side.
pub fn process_name_matches(candidate: &str, wanted: &str) -> bool {
    name_matches_with_suffix(candidate, wanted, EXE_SUFFIX)
}

pub fn name_matches_with_suffix(candidate: &str, wanted: &str, exe_suffix: &str) -> bool {
    candidate.eq_ignore_ascii_case(wanted)
        || strip_suffix_ignore_case(candidate, exe_suffix)
            .is_some_and(|stem| stem.eq_ignore_ascii_case(wanted))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited { polls: u32 },
    TimedOut { still_running: usize, waited: Duration },
}

/// Polls until no process named `process_name` is running.
///
/// Never signals or kills the process; a timeout only reports it.
pub fn wait_for_exit(
    table: &mut dyn ProcessTable,
    clock: &dyn Clock,
    process_name: &str,
    policy: WaitPolicy,
) -> Result<WaitOutcome> {
    info!("Waiting for process to exit: {process_name}");
    let started = clock.now();
    let mut polls = 0_u32;

    loop {
        polls += 1;
        let running = table.running_count(process_name)?;
        if running == 0 {
            info!("Main application closed after {polls} poll(s)");
            return Ok(WaitOutcome::Exited { polls });
        }

        let waited = clock.now().saturating_duration_since(started);
        if waited >= policy.timeout {
            warn!(
                "{running} process(es) named {process_name} still running after {}ms",
                waited.as_millis()
            );
            return Ok(WaitOutcome::TimedOut {
                still_running: running,
                waited,
            });
        }
        debug!("{running} process(es) named {process_name} still running");
        clock.sleep(policy.poll_interval);
    }
}
