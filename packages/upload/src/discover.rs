//! Filesystem walk that feeds the work stream.

use std::path::Path;

use async_channel::Sender;
use walkdir::WalkDir;

use crate::{DiscoveryError, UploadJob};

/// Walks `root` and sends one [`UploadJob`] per regular file whose base name
/// starts with `prefix`. An empty prefix matches every file.
///
/// Directories, symlinks and other non-regular entries are never sent.
/// Entries are visited in file name order within each directory. Each send
/// blocks until a worker takes the job, so this must run on a blocking
/// thread.
///
/// Returns the number of jobs sent.
///
/// # Errors
///
/// * [`DiscoveryError::Walk`] if any part of the tree cannot be read (a
///   missing root included)
/// * [`DiscoveryError::StreamClosed`] if the stream was closed underneath
///   discovery
pub fn discover(root: &Path, prefix: &str, jobs: &Sender<UploadJob>) -> Result<u64, DiscoveryError> {
    let mut emitted = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            root: root.to_path_buf(),
            emitted,
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }

        log::trace!("Discovered {}", entry.path().display());
        jobs.send_blocking(UploadJob::new(entry.into_path()))
            .map_err(|_| DiscoveryError::StreamClosed { emitted })?;
        emitted += 1;
    }

    Ok(emitted)
}
