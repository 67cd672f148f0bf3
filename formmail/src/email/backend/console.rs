//! Console backend for development
//!
//! Prints form mails instead of sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{Email, EmailError, EmailSender};

const WIDTH: usize = 60;

/// Console email backend
///
/// Logs the envelope through `tracing` and prints the plain text body to
/// stdout. Useful while wiring up a form without SMTP credentials.
///
/// # Examples
///
/// ```rust
/// use formmail::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("office@example.com")
///     .subject("Contact request")
///     .text("Hello");
///
/// backend.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Whether to log the HTML body as well
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console backend that also logs the HTML body
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    fn print(email: &Email, subject: &str) {
        let rule = "─".repeat(WIDTH);
        println!("\n╭{rule}╮");
        println!("│ {:<width$} │", "Form mail", width = WIDTH - 2);
        println!("├{rule}┤");
        println!(
            "│ {:<width$} │",
            format!("From:     {}", email.from.as_deref().unwrap_or("(none)")),
            width = WIDTH - 2
        );
        println!(
            "│ {:<width$} │",
            format!("To:       {}", email.to.join(", ")),
            width = WIDTH - 2
        );
        if let Some(reply_to) = &email.reply_to {
            println!(
                "│ {:<width$} │",
                format!("Reply-To: {reply_to}"),
                width = WIDTH - 2
            );
        }
        println!(
            "│ {:<width$} │",
            format!("Subject:  {subject}"),
            width = WIDTH - 2
        );
        println!("╰{rule}╯");

        if let Some(text) = &email.text {
            println!("{text}");
        }
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let subject = email.subject.as_deref().ok_or(EmailError::NoSubject)?;

        info!(
            from = ?email.from,
            to = ?email.to,
            reply_to = ?email.reply_to,
            subject = %subject,
            "Console email sent"
        );

        if self.verbose {
            if let Some(html) = &email.html {
                debug!(html = %html, "Email HTML content");
            }
        }

        Self::print(&email, subject);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_backend_send() {
        let backend = ConsoleBackend::new();

        let email = Email::new()
            .to("office@example.com")
            .from("noreply@example.com")
            .subject("Test Email")
            .text("This is a test email");

        assert!(backend.send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_backend_without_sender() {
        let backend = ConsoleBackend::verbose();

        let email = Email::new()
            .to("office@example.com")
            .reply_to("ada@example.com")
            .subject("Test Email")
            .text("plain")
            .html("<h1>html</h1>");

        assert!(backend.send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_backend_rejects_invalid() {
        let backend = ConsoleBackend::new();
        let email = Email::new().subject("No recipients").text("x");
        assert!(matches!(
            backend.send(email).await,
            Err(EmailError::NoRecipients)
        ));
    }
}
