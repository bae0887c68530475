//! Outbound mail gateway. One synchronous delivery attempt per submission;
//! no retry, no queue.

use super::attachments::StagedUpload;
use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::PathBuf;

const SUBJECT_PREFIX: &str = "Ficha Cadastral PJ";
const DEFAULT_SUBJECT_NAME: &str = "Nova submissão";

/// `"<prefix> - <company name>"`, with a default phrase when the form left
/// the company name blank.
pub fn subject_for(company_name: &str) -> String {
    let name = company_name.trim();
    if name.is_empty() {
        format!("{SUBJECT_PREFIX} - {DEFAULT_SUBJECT_NAME}")
    } else {
        format!("{SUBJECT_PREFIX} - {name}")
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<StagedUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("unable to build mail message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("unable to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DeliveryError>;
}

/// SMTP implementation over lettre's async transport. Routing (from/to) is
/// fixed at construction from process configuration.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, DeliveryError> {
        let mut builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };
        builder = builder.port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.parse()?,
            to: config.to.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DeliveryError> {
        let mut body = MultiPart::mixed().singlepart(SinglePart::html(email.html_body));

        for upload in &email.attachments {
            let content = tokio::fs::read(&upload.path).await.map_err(|source| {
                DeliveryError::Attachment {
                    path: upload.path.clone(),
                    source,
                }
            })?;
            body = body.singlepart(
                Attachment::new(upload.filename.clone())
                    .body(content, content_type_for(&upload.filename)),
            );
        }

        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject)
            .multipart(body)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

fn content_type_for(filename: &str) -> ContentType {
    let mime = mime_guess::from_path(filename).first_or_octet_stream();
    ContentType::parse(mime.as_ref()).expect("mime_guess yields a valid content type")
}
