//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to deliver form mails through an SMTP relay.

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::email::{Email, EmailError, EmailSender};

/// SMTP relay configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Use STARTTLS (default: true)
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Create SMTP configuration from environment variables
    ///
    /// Reads `SMTP_HOST`, `SMTP_PORT` (default 587), `SMTP_USERNAME`,
    /// `SMTP_PASSWORD` and `SMTP_USE_TLS` (default true).
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` if required environment variables are missing
    pub fn from_env() -> Result<Self, EmailError> {
        let required = |name: &str| {
            std::env::var(name)
                .map_err(|_| EmailError::config(format!("{name} environment variable not set")))
        };

        let port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|_| EmailError::config("SMTP_PORT must be a valid port number"))?;

        let use_tls = std::env::var("SMTP_USE_TLS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(true);

        Ok(Self {
            host: required("SMTP_HOST")?,
            port,
            username: required("SMTP_USERNAME")?,
            password: required("SMTP_PASSWORD")?,
            use_tls,
        })
    }
}

/// SMTP email backend
///
/// # Examples
///
/// ```rust,no_run
/// use formmail::email::{Email, EmailSender, SmtpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = SmtpBackend::from_env()?;
///
/// let email = Email::new()
///     .to("office@example.com")
///     .from("Website <noreply@example.com>")
///     .subject("Contact request")
///     .text("Hello");
///
/// backend.send(email).await?;
/// # Ok(())
/// # }
/// ```
pub struct SmtpBackend {
    config: SmtpConfig,
}

impl SmtpBackend {
    /// Create a new SMTP backend with the given configuration
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Create a new SMTP backend from environment variables
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` if required environment variables are missing
    pub fn from_env() -> Result<Self, EmailError> {
        Ok(Self::new(SmtpConfig::from_env()?))
    }

    fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
        address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(address.to_string()))
    }

    /// Build a lettre message from an email
    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from = email.from.as_deref().ok_or(EmailError::NoSender)?;
        let mut builder = Message::builder().from(Self::mailbox(from)?);

        for to in &email.to {
            builder = builder.to(Self::mailbox(to)?);
        }

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(Self::mailbox(reply_to)?);
        }

        let subject = email.subject.as_ref().ok_or(EmailError::NoSubject)?;
        builder = builder.subject(subject);

        let message = match (&email.html, &email.text) {
            (Some(html), Some(text)) => builder.multipart(MultiPart::alternative_plain_html(
                text.clone(),
                html.clone(),
            )),
            (Some(html), None) => builder.singlepart(SinglePart::html(html.clone())),
            (None, Some(text)) => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(text.clone()),
            (None, None) => return Err(EmailError::NoContent),
        };

        message.map_err(|e| EmailError::smtp(e.to_string()))
    }

    /// Create the SMTP transport from config
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = if self.config.use_tls {
            let tls_parameters = TlsParameters::new(self.config.host.clone())
                .map_err(|e| EmailError::smtp(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| EmailError::smtp(e.to_string()))?
                .credentials(credentials)
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
                .credentials(credentials)
        };

        Ok(transport.port(self.config.port).build())
    }
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email)?;
        let transport = self.create_transport()?;

        debug!(host = %self.config.host, port = self.config.port, "Sending form mail via SMTP");

        transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_config_from_env() {
        std::env::set_var("SMTP_HOST", "smtp.example.com");
        std::env::set_var("SMTP_PORT", "2525");
        std::env::set_var("SMTP_USERNAME", "user@example.com");
        std::env::set_var("SMTP_PASSWORD", "password123");
        std::env::set_var("SMTP_USE_TLS", "false");

        let config = SmtpConfig::from_env().unwrap();

        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 2525);
        assert_eq!(config.username, "user@example.com");
        assert!(!config.use_tls);
    }

    #[test]
    fn test_build_message_with_name_and_reply_to() {
        let email = Email::new()
            .to("office@example.com")
            .from("John Doe <info@example.com>")
            .reply_to("ada@example.com")
            .subject("Contact")
            .text("plain")
            .html("<h1>html</h1>");

        assert!(SmtpBackend::build_message(&email).is_ok());
    }

    #[test]
    fn test_build_message_requires_sender() {
        let email = Email::new()
            .to("office@example.com")
            .subject("Contact")
            .text("plain");

        assert!(matches!(
            SmtpBackend::build_message(&email),
            Err(EmailError::NoSender)
        ));
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let email = Email::new()
            .to("not an address")
            .from("info@example.com")
            .subject("Contact")
            .text("plain");

        assert!(matches!(
            SmtpBackend::build_message(&email),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
