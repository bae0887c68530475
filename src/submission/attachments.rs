//! Descriptors for uploaded files staged on disk for the lifetime of one
//! submission, and their guaranteed removal once the delivery attempt is
//! over.

use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// One uploaded file: the name the client gave it and where it was spooled.
/// The pipeline is the sole owner of the staged file and the only place that
/// deletes it.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub filename: String,
    pub path: PathBuf,
}

/// Best-effort removal of every staged file. Failures are logged and
/// swallowed; they never change the submission outcome. Safe to call more
/// than once on the same set.
pub fn cleanup(uploads: &[StagedUpload]) {
    for upload in uploads {
        if let Err(err) = std::fs::remove_file(&upload.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(path = %upload.path.display(), %err, "failed to remove staged upload");
            }
        }
    }
}
