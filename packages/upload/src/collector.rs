//! Thread-safe collection of failed source paths.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gcs_uploader_upload_models::{DumpOutcome, ERRORS_LOG_FILE};

/// Append-only list of source paths whose upload failed.
///
/// Shared by every worker of a batch. Only the path is kept, never the
/// reason.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    failed: Mutex<Vec<PathBuf>>,
}

impl ErrorCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as failed. Safe to call from any number of workers.
    pub fn record_failure(&self, path: impl Into<PathBuf>) {
        self.lock().push(path.into());
    }

    /// Copy of every recorded path, in recording order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Writes every recorded path, one per line, to `{dir}/errors.log`,
    /// replacing any previous dump. Writes nothing when no failure was
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the dump file cannot be written.
    pub fn dump(&self, dir: &Path) -> std::io::Result<DumpOutcome> {
        let failed = self.snapshot();
        if failed.is_empty() {
            log::info!("No failures to dump");
            return Ok(DumpOutcome::NoFailures);
        }

        let mut contents = String::new();
        for path in &failed {
            contents.push_str(&path.to_string_lossy());
            contents.push('\n');
        }

        let path = dir.join(ERRORS_LOG_FILE);
        std::fs::write(&path, contents)?;
        log::info!(
            "Wrote {} failed path(s) to {}",
            failed.len(),
            path.display()
        );

        Ok(DumpOutcome::Written {
            path,
            entries: failed.len(),
        })
    }

    // A worker that panicked mid-push cannot leave the Vec half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.failed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::test_support::scratch_dir;

    #[test]
    fn concurrent_records_are_never_lost() {
        const WORKERS: usize = 64;

        let collector = Arc::new(ErrorCollector::new());
        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || collector.record_failure(format!("file-{i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.count(), WORKERS);
        let unique: HashSet<PathBuf> = collector.snapshot().into_iter().collect();
        assert_eq!(unique.len(), WORKERS);
    }

    #[test]
    fn snapshot_keeps_recording_order() {
        let collector = ErrorCollector::new();
        collector.record_failure("a");
        collector.record_failure("b");
        collector.record_failure("a");
        assert_eq!(
            collector.snapshot(),
            vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("a")]
        );
    }

    #[test]
    fn dump_writes_one_line_per_failure() {
        let dir = scratch_dir("collector_dump");
        let collector = ErrorCollector::new();
        collector.record_failure("in/one.csv");
        collector.record_failure("in/two.csv");

        let outcome = collector.dump(&dir).unwrap();
        let path = dir.join(ERRORS_LOG_FILE);
        assert_eq!(
            outcome,
            DumpOutcome::Written {
                path: path.clone(),
                entries: 2
            }
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "in/one.csv\nin/two.csv\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dump_overwrites_previous_file() {
        let dir = scratch_dir("collector_overwrite");
        std::fs::write(dir.join(ERRORS_LOG_FILE), "stale\nstale\nstale\n").unwrap();

        let collector = ErrorCollector::new();
        collector.record_failure("fresh");
        collector.dump(&dir).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.join(ERRORS_LOG_FILE)).unwrap(),
            "fresh\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_dump_writes_nothing() {
        let dir = scratch_dir("collector_empty");
        let collector = ErrorCollector::new();

        assert_eq!(collector.dump(&dir).unwrap(), DumpOutcome::NoFailures);
        assert!(!dir.join(ERRORS_LOG_FILE).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
