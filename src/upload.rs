//! Staging of multipart submissions: text parts become the field map, file
//! parts under `anexos` are spooled to temp files with the count and size
//! bounds enforced before the pipeline ever runs.

use crate::config::UploadConfig;
use crate::submission::attachments::{self, StagedUpload};
use crate::submission::Submission;
use axum::extract::multipart::{Field, Multipart};
use tokio::io::AsyncWriteExt;

/// Fixed by the form contract: the client may attach at most five files.
pub const MAX_UPLOAD_FILES: usize = 5;
/// Multipart field name carrying file uploads.
pub const UPLOAD_FIELD: &str = "anexos";

const FALLBACK_FILENAME: &str = "anexo";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("limite de {MAX_UPLOAD_FILES} anexos por envio excedido")]
    TooManyFiles,
    #[error("anexo '{filename}' excede o limite de {limit_mb} MB")]
    FileTooLarge { filename: String, limit_mb: u64 },
    #[error("corpo multipart inválido: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("falha ao preparar anexo: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumes the multipart body into a field map plus staged uploads. On any
/// error the files staged so far are removed before the error is returned,
/// so no request leaves orphans behind.
pub async fn stage_submission(
    multipart: Multipart,
    limits: &UploadConfig,
) -> Result<(Submission, Vec<StagedUpload>), UploadError> {
    let mut uploads = Vec::new();
    match stage_inner(multipart, limits, &mut uploads).await {
        Ok(submission) => Ok((submission, uploads)),
        Err(err) => {
            attachments::cleanup(&uploads);
            Err(err)
        }
    }
}

async fn stage_inner(
    mut multipart: Multipart,
    limits: &UploadConfig,
    uploads: &mut Vec<StagedUpload>,
) -> Result<Submission, UploadError> {
    let mut submission = Submission::new();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == UPLOAD_FIELD {
            if uploads.len() == MAX_UPLOAD_FILES {
                return Err(UploadError::TooManyFiles);
            }
            let filename = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(FALLBACK_FILENAME)
                .to_string();
            uploads.push(spool_field(&mut field, filename, limits).await?);
        } else if !name.is_empty() {
            submission.insert(name, field.text().await?);
        }
    }

    Ok(submission)
}

async fn spool_field(
    field: &mut Field<'_>,
    filename: String,
    limits: &UploadConfig,
) -> Result<StagedUpload, UploadError> {
    let temp = tempfile::Builder::new()
        .prefix("ficha-anexo-")
        .tempfile()?;
    let path = temp
        .into_temp_path()
        .keep()
        .map_err(|err| UploadError::Io(err.error))?;

    // Once kept, the path is ours to delete: any failure while streaming
    // (truncated body, disk error, size cap) must not strand the file.
    match stream_to_disk(field, &path, &filename, limits).await {
        Ok(()) => Ok(StagedUpload { filename, path }),
        Err(err) => {
            let _ = tokio::fs::remove_file(&path).await;
            Err(err)
        }
    }
}

async fn stream_to_disk(
    field: &mut Field<'_>,
    path: &std::path::Path,
    filename: &str,
    limits: &UploadConfig,
) -> Result<(), UploadError> {
    let limit = limits.max_file_bytes();
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        written += chunk.len() as u64;
        if written > limit {
            return Err(UploadError::FileTooLarge {
                filename: filename.to_string(),
                limit_mb: limits.max_file_mb,
            });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(())
}

/// Router-level body ceiling: all five files at the per-file limit plus
/// headroom for the text fields and multipart framing.
pub fn body_limit_bytes(limits: &UploadConfig) -> usize {
    let files = limits.max_file_bytes() as usize * MAX_UPLOAD_FILES;
    files + 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_covers_all_files_plus_headroom() {
        let limits = UploadConfig { max_file_mb: 10 };
        assert_eq!(
            body_limit_bytes(&limits),
            10 * 1024 * 1024 * MAX_UPLOAD_FILES + 1024 * 1024
        );
    }

    #[test]
    fn upload_errors_render_without_internals() {
        let err = UploadError::FileTooLarge {
            filename: "contrato.pdf".to_string(),
            limit_mb: 10,
        };
        assert_eq!(
            err.to_string(),
            "anexo 'contrato.pdf' excede o limite de 10 MB"
        );
    }
}
