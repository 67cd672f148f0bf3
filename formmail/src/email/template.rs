//! Email template trait
//!
//! Anything that can produce an HTML and/or plain text body implements
//! [`EmailTemplate`] and can be turned into an [`Email`](super::Email) with
//! [`Email::from_template`](super::Email::from_template).

use super::EmailError;

/// Trait for email templates
///
/// Returns a tuple of `(html, text)` where either can be `None`.
///
/// # Examples
///
/// ```rust
/// use formmail::email::{Email, EmailError, EmailTemplate};
///
/// struct Notice {
///     message: String,
/// }
///
/// impl EmailTemplate for Notice {
///     fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError> {
///         Ok((None, Some(self.message.clone())))
///     }
/// }
///
/// let email = Email::from_template(&Notice { message: "Hi".into() }).unwrap();
/// assert_eq!(email.text.as_deref(), Some("Hi"));
/// assert!(email.html.is_none());
/// ```
pub trait EmailTemplate {
    /// Render the email bodies
    ///
    /// # Errors
    ///
    /// Returns `EmailError::TemplateError` if the template fails to render
    fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError>;
}
