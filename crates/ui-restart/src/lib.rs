//! # ui-restart
//!
//! Restart helper for the mdbatch web UI: enumerate running processes, pick
//! those whose command line contains a fixed substring, and terminate each
//! of them once.
//!
//! The pass is best-effort and single-shot. A process that refuses to die is
//! reported and the pass moves on to the next match; nothing is retried and
//! processes that do not match are never touched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ui_restart::{restart_matching, SystemProcessTable, DEFAULT_PATTERN};
//!
//! let mut table = SystemProcessTable::new();
//! for outcome in restart_matching(&mut table, DEFAULT_PATTERN) {
//!     println!("{outcome}");
//! }
//! ```
//!
//! The process table sits behind the [`ProcessTable`] trait so the matching
//! and termination rules can be exercised without killing real processes.

use std::collections::HashSet;
use std::fmt;
use sysinfo::{Pid, System};
use thiserror::Error;

/// Substring identifying a running mdbatch web UI.
pub const DEFAULT_PATTERN: &str = "mdbatch serve";

/// Environment variable that replaces [`DEFAULT_PATTERN`].
pub const PATTERN_ENV: &str = "MDBATCH_RESTART_PATTERN";

// ── Error type ───────────────────────────────────────────────────────────────

/// Why a single process could not be terminated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestartError {
    /// The process exited between listing and termination.
    #[error("process {pid} no longer exists")]
    NoSuchProcess { pid: u32 },

    /// The OS refused the kill request (permissions, protected process, ...).
    #[error("termination of process {pid} was refused")]
    KillRefused { pid: u32 },
}

// ── Process model ────────────────────────────────────────────────────────────

/// Snapshot of one running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Space-joined argv; falls back to the process name when argv is hidden.
    pub command_line: String,
    /// `command_line` with argv[0] reduced to its file stem, so
    /// `C:\tools\mdbatch.exe serve` reads `mdbatch serve`.
    pub launch_line: String,
}

impl ProcessInfo {
    pub fn new<S: AsRef<str>>(pid: u32, name: impl Into<String>, argv: &[S]) -> Self {
        let name = name.into();
        let (command_line, launch_line) = match argv.split_first() {
            None => (name.clone(), name.clone()),
            Some((program, rest)) => {
                let rest: Vec<&str> = rest.iter().map(|a| a.as_ref()).collect();
                let raw = std::iter::once(program.as_ref())
                    .chain(rest.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" ");
                let short = std::iter::once(program_stem(program.as_ref()))
                    .chain(rest.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" ");
                (raw, short)
            }
        };
        Self {
            pid,
            name,
            command_line,
            launch_line,
        }
    }

    /// Case-sensitive substring test against either form of the command line.
    /// An empty pattern matches nothing.
    pub fn matches(&self, pattern: &str) -> bool {
        !pattern.is_empty()
            && (self.command_line.contains(pattern) || self.launch_line.contains(pattern))
    }
}

/// `/usr/bin/mdbatch` → `mdbatch`, `C:\bin\mdbatch.EXE` → `mdbatch`.
pub fn program_stem(argv0: &str) -> &str {
    let trimmed = argv0.trim_matches('"');
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".exe") => {
            &base[..cut]
        }
        _ => base,
    }
}

/// Pids that are threads of another process rather than processes.
///
/// Each owner lists its tasks. On Linux that set also holds the owner's own
/// pid (the main thread), which stays a process.
pub fn thread_ids<I>(owners: I) -> HashSet<u32>
where
    I: IntoIterator<Item = (u32, Vec<u32>)>,
{
    owners
        .into_iter()
        .flat_map(|(pid, tasks)| tasks.into_iter().filter(move |t| *t != pid))
        .collect()
}

/// Source of processes and the ability to terminate them.
pub trait ProcessTable {
    /// Current processes, threads excluded.
    fn processes(&mut self) -> Vec<ProcessInfo>;

    /// Ask the OS to terminate `pid`.
    fn terminate(&mut self, pid: u32) -> Result<(), RestartError>;

    /// Pid of the caller, never selected for termination.
    fn own_pid(&self) -> Option<u32>;
}

/// The real process table, backed by `sysinfo`.
pub struct SystemProcessTable {
    system: System,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn processes(&mut self) -> Vec<ProcessInfo> {
        self.system.refresh_processes();
        let threads = thread_ids(self.system.processes().iter().map(|(pid, p)| {
            let tasks: Vec<u32> = p
                .tasks()
                .map(|set| set.iter().map(|t| t.as_u32()).collect())
                .unwrap_or_default();
            (pid.as_u32(), tasks)
        }));

        let mut list: Vec<ProcessInfo> = self
            .system
            .processes()
            .iter()
            .filter(|(pid, _)| !threads.contains(&pid.as_u32()))
            .map(|(pid, p)| ProcessInfo::new(pid.as_u32(), p.name(), p.cmd()))
            .collect();
        list.sort_by_key(|p| p.pid);
        list
    }

    fn terminate(&mut self, pid: u32) -> Result<(), RestartError> {
        match self.system.process(Pid::from_u32(pid)) {
            None => Err(RestartError::NoSuchProcess { pid }),
            Some(p) if p.kill() => Ok(()),
            Some(_) => Err(RestartError::KillRefused { pid }),
        }
    }

    fn own_pid(&self) -> Option<u32> {
        sysinfo::get_current_pid().ok().map(|p| p.as_u32())
    }
}

// ── Selection and termination ────────────────────────────────────────────────

/// Processes matching `pattern` (see [`ProcessInfo::matches`]), minus `exclude_pid`.
pub fn matching<'a>(
    processes: &'a [ProcessInfo],
    pattern: &str,
    exclude_pid: Option<u32>,
) -> Vec<&'a ProcessInfo> {
    processes
        .iter()
        .filter(|p| Some(p.pid) != exclude_pid)
        .filter(|p| p.matches(pattern))
        .collect()
}

/// Result of one termination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationOutcome {
    pub process: ProcessInfo,
    pub result: Result<(), RestartError>,
}

impl TerminationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(()) => write!(f, "Killed {} ({})", self.process.pid, self.process.name),
            Err(e) => write!(
                f,
                "Failed to kill {} ({}): {}",
                self.process.pid, self.process.name, e
            ),
        }
    }
}

/// Terminate every process matching `pattern`, one attempt each.
///
/// Returns one outcome per matched process, in pid order. An empty result
/// means nothing matched.
pub fn restart_matching<T: ProcessTable>(table: &mut T, pattern: &str) -> Vec<TerminationOutcome> {
    let processes = table.processes();
    let own = table.own_pid();
    let targets: Vec<ProcessInfo> = matching(&processes, pattern, own)
        .into_iter()
        .cloned()
        .collect();

    targets
        .into_iter()
        .map(|process| {
            let result = table.terminate(process.pid);
            TerminationOutcome { process, result }
        })
        .collect()
}

/// Pattern to use: `MDBATCH_RESTART_PATTERN` if set and non-empty, else [`DEFAULT_PATTERN`].
pub fn pattern_from_env() -> String {
    std::env::var(PATTERN_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PATTERN.to_string())
}
