//! Run logging and the EPP wrapper.
//!
//! Every CLI subcommand runs inside [`run_epp`]: a tee logger writes
//! `LEVEL: message` lines to stderr (which the LIMS shows in the GUI) and
//! to the run log file (which is kept as a file artifact for audit), while
//! tracking whether anything at warning level or above was emitted. The
//! outcome maps onto the exit-code contract:
//!
//! - `0`: finished, log is clean;
//! - `1`: finished, but warnings or errors are in the log;
//! - `2`: failed.
//!
//! Callers treat any non-zero exit as needing operator attention.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::errors::{Error, Result};
use crate::model::Snapshot;

/// Shared view of whether the log saw a warning or worse.
#[derive(Clone, Debug, Default)]
pub struct WarningTracker(Arc<AtomicBool>);

impl WarningTracker {
    pub fn warned(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

struct TeeLogger {
    file: Mutex<File>,
    warned: Arc<AtomicBool>,
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if record.level() <= Level::Warn {
            self.warned.store(true, Ordering::Relaxed);
        }
        let line = format!("{}: {}", record.level(), record.args());
        eprintln!("{line}");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install the tee logger. Returns the tracker consulted for the exit
/// code. Fails if a logger is already installed (one run per process).
pub fn init(log_path: &Path) -> Result<WarningTracker> {
    let file = File::create(log_path).map_err(|e| Error::io(log_path.display(), e))?;
    let warned = Arc::new(AtomicBool::new(false));
    let logger = TeeLogger {
        file: Mutex::new(file),
        warned: Arc::clone(&warned),
    };
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| Error::Invalid(format!("could not install logger: {e}")))?;
    log::set_max_level(LevelFilter::Info);
    Ok(WarningTracker(warned))
}

/// Timestamp fragment used in artifact file names (`yymmdd_hhmmss`).
pub fn timestamp() -> String {
    Local::now().format("%y%m%d_%H%M%S").to_string()
}

/// Conventional artifact file name: `<stem>_<step>_<timestamp>_<tech>.<ext>`.
pub fn artifact_file_name(stem: &str, snapshot: &Snapshot, timestamp: &str, ext: &str) -> String {
    format!(
        "{stem}_{}_{timestamp}_{}.{ext}",
        snapshot.step.id,
        snapshot.step.technician.replace(' ', "")
    )
}

/// Outcome of one EPP run, as far as the process exit code is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Clean,
    Warnings,
    Failed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::Warnings => 1,
            ExitStatus::Failed => 2,
        }
    }
}

/// Run one EPP to completion and return the exit status.
///
/// The operation receives the loaded snapshot and its backing path so it
/// can persist writes, and returns a one-line abstract for the GUI.
pub fn run_epp<F>(script_name: &str, snapshot_path: &Path, log_path: &Path, op: F) -> ExitStatus
where
    F: FnOnce(&mut Snapshot, &Path) -> anyhow::Result<String>,
{
    let tracker = match init(log_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitStatus::Failed;
        }
    };

    let started = timestamp();
    let outcome = Snapshot::from_path(snapshot_path)
        .map_err(anyhow::Error::from)
        .and_then(|mut snapshot| {
            log::info!(
                "Script '{script_name}' started at {started} in step '{}' ({}) opened by {}.",
                snapshot.step.type_name,
                snapshot.step.id,
                snapshot.step.technician
            );
            op(&mut snapshot, snapshot_path)
        });

    let status = match outcome {
        Ok(abstract_line) => {
            log::info!("{abstract_line}");
            if tracker.warned() {
                eprintln!("Script finished successfully. Errors or warnings occurred, please check log.");
                ExitStatus::Warnings
            } else {
                eprintln!("Script finished successfully.");
                ExitStatus::Clean
            }
        }
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Script failed.");
            ExitStatus::Failed
        }
    };
    log::logger().flush();
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_contract() {
        assert_eq!(ExitStatus::Clean.code(), 0);
        assert_eq!(ExitStatus::Warnings.code(), 1);
        assert_eq!(ExitStatus::Failed.code(), 2);
    }

    #[test]
    fn artifact_names_strip_technician_spaces() {
        let snap = crate::model::test_support::snapshot_with_pair();
        let name = artifact_file_name("barcodes", &snap, "260806_120000", "txt");
        assert_eq!(name, "barcodes_24-100_260806_120000_KimLab.txt");
    }
}
