//! Email builder with fluent API

use serde::{Deserialize, Serialize};

use super::{EmailError, EmailTemplate};

/// An email message
///
/// ```rust
/// use formmail::email::Email;
///
/// let email = Email::new()
///     .to_list("office@example.com, sales@example.com")
///     .from("Website <noreply@example.com>")
///     .reply_to("ada@example.com")
///     .subject("Contact request")
///     .text("Hello")
///     .html("<p>Hello</p>");
///
/// assert_eq!(email.to.len(), 2);
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Recipients
    pub to: Vec<String>,

    /// Sender, either `address` or `Name <address>`
    pub from: Option<String>,

    /// Reply-To address
    pub reply_to: Option<String>,

    /// Subject line
    pub subject: Option<String>,

    /// Plain text body
    pub text: Option<String>,

    /// HTML body
    pub html: Option<String>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an email with the bodies rendered by a template
    ///
    /// # Errors
    ///
    /// Returns `EmailError::TemplateError` if the template fails to render
    pub fn from_template<T: EmailTemplate + ?Sized>(template: &T) -> Result<Self, EmailError> {
        let (html, text) = template.render_email()?;
        Ok(Self {
            html,
            text,
            ..Self::default()
        })
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Add recipients from a comma separated list
    ///
    /// Entries are trimmed and empty entries are skipped.
    #[must_use]
    pub fn to_list(mut self, addresses: &str) -> Self {
        self.to.extend(
            addresses
                .split(',')
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(ToString::to_string),
        );
        self
    }

    /// Set the sender
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the reply-to address
    #[must_use]
    pub fn reply_to(mut self, address: &str) -> Self {
        self.reply_to = Some(address.to_string());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the plain text body
    #[must_use]
    pub fn text(mut self, body: &str) -> Self {
        self.text = Some(body.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// Check that the email can be handed to a transport
    ///
    /// A From address is not required here: it is optional for form mails and
    /// backends that need one report [`EmailError::NoSender`] themselves.
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - No recipients
    /// - No subject
    /// - No content (text or HTML)
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }

        if self.text.is_none() && self.html.is_none() {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_builder() {
        let email = Email::new()
            .to("office@example.com")
            .from("noreply@example.com")
            .subject("Test")
            .text("Hello, World!");

        assert_eq!(email.to, vec!["office@example.com"]);
        assert_eq!(email.from, Some("noreply@example.com".to_string()));
        assert_eq!(email.subject, Some("Test".to_string()));
        assert_eq!(email.text, Some("Hello, World!".to_string()));
    }

    #[test]
    fn test_to_list_splits_and_trims() {
        let email = Email::new().to_list(" a@example.com,b@example.com , ,");
        assert_eq!(email.to, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_email_validation_no_recipients() {
        let email = Email::new().subject("Test").text("Hello");
        assert!(matches!(email.validate(), Err(EmailError::NoRecipients)));
    }

    #[test]
    fn test_email_validation_without_sender_is_ok() {
        let email = Email::new().to("office@example.com").subject("Test").text("Hello");
        assert!(email.validate().is_ok());
    }

    #[test]
    fn test_email_validation_no_subject() {
        let email = Email::new().to("office@example.com").text("Hello");
        assert!(matches!(email.validate(), Err(EmailError::NoSubject)));
    }

    #[test]
    fn test_email_validation_no_content() {
        let email = Email::new().to("office@example.com").subject("Test");
        assert!(matches!(email.validate(), Err(EmailError::NoContent)));
    }
}
