//! Email assembly and delivery
//!
//! This module provides:
//! - An [`Email`] builder handed to an [`EmailSender`]
//! - SMTP and console backends
//! - Rendering of sanitized form fields into HTML and plain text bodies
//!
//! # Examples
//!
//! ```rust
//! use formmail::email::{Email, FormMailBody};
//! use formmail::forms::{SanitizedField, SanitizedFields};
//!
//! let mut fields = SanitizedFields::new();
//! fields.insert("name", SanitizedField::new("Ada").with_label("Name"));
//!
//! let email = Email::from_template(&FormMailBody::new("Contact request", &fields))
//!     .unwrap()
//!     .to("office@example.com")
//!     .subject("Contact request");
//!
//! assert!(email.html.unwrap().contains("<th>Name</th>"));
//! assert!(email.text.unwrap().contains("Name:\nAda\n"));
//! ```

mod backend;
mod builder;
mod error;
pub mod markup;
pub mod render;
mod sender;
mod template;

pub use backend::{
    console::ConsoleBackend,
    smtp::{SmtpBackend, SmtpConfig},
};
pub use builder::Email;
pub use error::EmailError;
pub use render::{FormMailBody, MarkupToText};
pub use sender::EmailSender;
pub use template::EmailTemplate;

#[cfg(test)]
pub(crate) use sender::MockEmailSender as AutoMockEmailSender;
