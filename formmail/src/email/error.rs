//! Email error types

use thiserror::Error;

/// Errors that can occur when building or sending an email
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipients
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// The backend needs a From address and none is configured
    #[error("email must have a from address")]
    NoSender,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("email must have either text or HTML content")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error
    #[error("failed to render email template: {0}")]
    TemplateError(#[from] askama::Error),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Email configuration error
    #[error("email configuration error: {0}")]
    ConfigError(String),
}

impl EmailError {
    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::SmtpError(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EmailError::smtp("connection refused").to_string(),
            "SMTP error: connection refused"
        );
        assert_eq!(
            EmailError::InvalidAddress("nope".into()).to_string(),
            "invalid email address: nope"
        );
    }
}
