//! The submission orchestrator: compose, deliver, clean up, report one
//! outcome. Every failure converges here; nothing escapes to the HTTP layer
//! as an error.

use super::attachments::{self, StagedUpload};
use super::delivery::{subject_for, Mailer, OutgoingEmail};
use super::{report, Submission};
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info};

pub const SUCCESS_MESSAGE: &str = "Enviado com sucesso";
pub const FAILURE_MESSAGE: &str = "Falha ao enviar";

/// The single externally observable result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub ok: bool,
    pub message: String,
}

impl SubmissionOutcome {
    fn success() -> Self {
        Self {
            ok: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    fn failure() -> Self {
        Self {
            ok: false,
            message: FAILURE_MESSAGE.to_string(),
        }
    }
}

pub struct SubmissionPipeline {
    mailer: Arc<dyn Mailer>,
}

impl SubmissionPipeline {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Runs one full traversal: compose the report, attempt delivery once,
    /// then delete the staged uploads no matter which branch was taken.
    /// Internal diagnostics go to the log; the caller only sees the generic
    /// success/failure message.
    pub async fn process(
        &self,
        submission: &Submission,
        uploads: Vec<StagedUpload>,
    ) -> SubmissionOutcome {
        let report = report::compose(submission, Local::now());
        let email = OutgoingEmail {
            subject: subject_for(submission.company_name()),
            html_body: report::render_html(&report),
            attachments: uploads.clone(),
        };

        let sent = self.mailer.send(email).await;

        // Cleanup runs on both branches, before the outcome is decided on.
        attachments::cleanup(&uploads);

        match sent {
            Ok(()) => {
                info!(
                    protocol = report.protocol,
                    attachments = uploads.len(),
                    "submission delivered"
                );
                SubmissionOutcome::success()
            }
            Err(err) => {
                error!(protocol = report.protocol, %err, "submission delivery failed");
                SubmissionOutcome::failure()
            }
        }
    }
}
