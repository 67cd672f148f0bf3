//! Email sender trait abstraction
//!
//! The processor hands finished emails to an [`EmailSender`]; the backends in
//! this crate and any host transport implement it.

use async_trait::async_trait;

use super::{Email, EmailError};

/// Trait for sending emails
///
/// # Examples
///
/// ```rust,no_run
/// use formmail::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("office@example.com")
///     .subject("Contact request")
///     .text("Hello");
///
/// sender.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email cannot be sent or is invalid
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
