//! SMTP OTP Mailer
//!
//! Sends verification codes through an SMTP relay. With no host configured
//! the mailer runs in no-op mode and only logs, which keeps local setups
//! working without mail infrastructure.

use std::sync::Arc;

use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::domain::mailer::{DeliveryError, OtpMailer};
use crate::domain::value_object::{Email, OtpCode};
use crate::error::{IdentityError, IdentityResult};

pub const OTP_SUBJECT: &str = "Email Verification";

/// SMTP connection settings
#[derive(Clone, Default)]
pub struct SmtpConfig {
    /// Empty host selects no-op mode
    pub host: String,
    pub port: u16,
    pub starttls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender mailbox, e.g. `Job Tracker <no-reply@example.com>`
    pub from: String,
}

impl SmtpConfig {
    /// App passwords are often pasted with the spaces they are displayed with
    pub fn normalized_password(&self) -> Option<String> {
        self.password
            .as_deref()
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("starttls", &self.starttls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from", &self.from)
            .finish()
    }
}

/// OTP mailer over SMTP (or no-op)
#[derive(Clone)]
pub struct SmtpOtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    valid_minutes: i64,
}

impl SmtpOtpMailer {
    /// Build the transport once; it is reused for every message
    pub fn new(config: &SmtpConfig) -> IdentityResult<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| IdentityError::Internal(format!("Invalid SMTP_FROM address: {e}")))?;

        let transport = if config.host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; OTP mailer will only log");
            None
        } else {
            let builder = if config.starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            }
            .map_err(|e| {
                IdentityError::Internal(format!("Failed to configure SMTP transport: {e}"))
            })?
            .port(config.port);

            let builder = match (&config.username, config.normalized_password()) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password))
                }
                _ => builder,
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            valid_minutes: 10,
        })
    }

    /// Validity stated in the mail body; match `IdentityConfig::otp_ttl`
    pub fn with_otp_validity(mut self, validity: chrono::TimeDelta) -> Self {
        self.valid_minutes = validity.num_minutes();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

/// Plain-text body of the verification mail
pub fn otp_body(code: &OtpCode, valid_minutes: i64) -> String {
    format!(
        "Your verification code is: {}\n\n\
         This code will expire in {valid_minutes} minutes.\n\
         If you didn't request this verification, please ignore this email.",
        code.as_str()
    )
}

impl OtpMailer for SmtpOtpMailer {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), DeliveryError> {
        let Some(transport) = &self.transport else {
            tracing::info!("OTP mailer in no-op mode; skipping send");
            return Ok(());
        };

        let recipient = to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError(format!("invalid recipient: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(OTP_SUBJECT)
            .header(header::ContentType::TEXT_PLAIN)
            .body(otp_body(code, self.valid_minutes))
            .map_err(|e| DeliveryError(format!("failed to build message: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;

        tracing::debug!("OTP email sent");
        Ok(())
    }
}
