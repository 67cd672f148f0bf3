//! Testing utilities for formmail users
//!
//! [`MockEmailSender`] captures emails in memory so handlers and processors
//! can be tested without a mail server.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use formmail::forms::{FormProcessor, RegularField, SanitizerRegistry};
//! use formmail::testing::MockEmailSender;
//!
//! # async fn example() {
//! let processor = FormProcessor::new(SanitizerRegistry::with_defaults())
//!     .field("message", RegularField::new().label("Message").required())
//!     .receiver("office@example.com")
//!     .subject("Contact request");
//!
//! let mut input = HashMap::new();
//! input.insert("message".to_string(), "Hello".to_string());
//!
//! let sender = MockEmailSender::new();
//! processor.process_form_and_send(&input, &sender).await.unwrap();
//!
//! assert!(sender.was_sent_to("office@example.com"));
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::email::{Email, EmailError, EmailSender};

/// Mock email sender for testing
///
/// Captures sent emails in memory for assertions. A sender created with
/// [`MockEmailSender::failing`] rejects every email like a broken transport.
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<Mutex<Vec<Email>>>,
    fail: Arc<AtomicBool>,
}

impl MockEmailSender {
    /// Create a new mock email sender
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock sender whose transport always fails
    #[must_use]
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_failing(true);
        sender
    }

    /// Switch transport failures on or off
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Get the number of emails sent
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Get all sent emails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Get the last sent email
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Check if an email was sent to a specific address
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }

    /// Clear all sent emails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::smtp("mock transport failure"));
        }

        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::new()
            .to("office@example.com")
            .subject("Test")
            .text("Hello")
    }

    #[tokio::test]
    async fn test_mock_email_sender() {
        let mock = MockEmailSender::new();
        mock.send(email()).await.unwrap();

        assert_eq!(mock.sent_count(), 1);
        assert!(mock.was_sent_to("office@example.com"));
        assert!(!mock.was_sent_to("other@example.com"));
        assert_eq!(mock.last_sent().unwrap().subject.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn test_mock_email_sender_clear() {
        let mock = MockEmailSender::new();
        mock.send(email()).await.unwrap();
        mock.send(email()).await.unwrap();
        assert_eq!(mock.sent_emails().len(), 2);

        mock.clear();
        assert_eq!(mock.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_sender_records_nothing() {
        let mock = MockEmailSender::failing();
        assert!(matches!(
            mock.send(email()).await,
            Err(EmailError::SmtpError(_))
        ));
        assert_eq!(mock.sent_count(), 0);

        mock.set_failing(false);
        assert!(mock.send(email()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_validates_email() {
        let mock = MockEmailSender::new();
        let invalid = Email::new().subject("No recipient").text("x");
        assert!(matches!(
            mock.send(invalid).await,
            Err(EmailError::NoRecipients)
        ));
    }
}
