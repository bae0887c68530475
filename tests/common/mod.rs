#![allow(dead_code)]

use async_trait::async_trait;
use ficha_cadastral::submission::attachments::StagedUpload;
use ficha_cadastral::submission::delivery::{DeliveryError, Mailer, OutgoingEmail};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

/// Test double for the delivery gateway: records what it was asked to send,
/// or refuses every message when built as failing.
pub struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Attachment {
                path: PathBuf::from("transport"),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "transport rejected the message",
                ),
            });
        }
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}

/// Writes a temp file and hands back the descriptor the upload layer would
/// produce for it; the caller (or the pipeline) owns the deletion.
pub fn staged_file(filename: &str, contents: &[u8]) -> StagedUpload {
    let mut file = tempfile::Builder::new()
        .prefix("ficha-test-")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents).expect("write temp file");
    let path = file.into_temp_path().keep().expect("persist temp file");
    StagedUpload {
        filename: filename.to_string(),
        path,
    }
}
