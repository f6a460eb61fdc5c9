pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Sender used when neither the message nor the service names one.
pub const DEFAULT_SENDER: &str = "support@picturebook.local";

#[derive(Debug, Clone, Default)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub plaintext: String,
    pub html: String,
}

/// Delivers an email whose sender has already been resolved.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), String>;
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, email: Email) -> Result<(), String> {
        let message = build_message(&email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;
        Ok(())
    }
}

/// Fallback when SMTP is not configured: the message is written to the log.
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, email: Email) -> Result<(), String> {
        tracing::warn!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email not sent:\n{}",
            email.plaintext
        );
        Ok(())
    }
}

pub struct EmailService {
    transport: Arc<dyn MailTransport>,
    default_sender: Option<String>,
}

impl EmailService {
    pub fn new(transport: Arc<dyn MailTransport>, default_sender: Option<String>) -> Self {
        Self {
            transport,
            default_sender,
        }
    }

    /// SMTP-backed service when configured, log-only otherwise.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Self {
        let Some(smtp) = smtp else {
            tracing::warn!("SMTP not configured, outgoing email will be logged only");
            return Self::new(Arc::new(LogTransport), None);
        };

        match SmtpTransport::new(smtp) {
            Ok(transport) => {
                tracing::info!("SMTP configured");
                Self::new(Arc::new(transport), smtp.from.clone())
            }
            Err(e) => {
                tracing::warn!("SMTP not available: {e}");
                Self::new(Arc::new(LogTransport), smtp.from.clone())
            }
        }
    }

    pub async fn send(&self, mut email: Email) -> Result<(), String> {
        email.from = self.sender(&email).to_string();
        self.transport.send(email).await
    }

    pub async fn forgot_password(&self, to: &str, reset_url: &str) -> Result<(), String> {
        let email = Email {
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            plaintext: templates::password_reset_text(reset_url),
            html: templates::password_reset_html(reset_url),
            ..Default::default()
        };
        self.send(email)
            .await
            .map_err(|e| format!("forgot password: {e}"))
    }

    fn sender<'a>(&'a self, email: &'a Email) -> &'a str {
        if !email.from.is_empty() {
            &email.from
        } else if let Some(sender) = self.default_sender.as_deref() {
            sender
        } else {
            DEFAULT_SENDER
        }
    }
}

/// Render an email into a MIME message: multipart/alternative when both
/// bodies are present, a single part otherwise.
pub fn build_message(email: &Email) -> Result<Message, String> {
    let builder = Message::builder()
        .from(
            email
                .from
                .parse()
                .map_err(|e| format!("Invalid from address: {e}"))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| format!("Invalid to address: {e}"))?)
        .subject(email.subject.clone());

    let message = match (email.plaintext.is_empty(), email.html.is_empty()) {
        (false, false) => builder.multipart(MultiPart::alternative_plain_html(
            email.plaintext.clone(),
            email.html.clone(),
        )),
        (false, true) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.plaintext.clone()),
        (true, false) => builder
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone()),
        (true, true) => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
    };

    message.map_err(|e| format!("Failed to build email: {e}"))
}
