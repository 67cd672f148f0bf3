//! formmail: server-side contact form processing
//!
//! A submission is checked against honeypot fields, an optional render
//! timestamp and the required fields. A submission that passes is sanitized
//! through named sanitizers and rendered into an HTML and plain text email,
//! which is handed to an [`EmailSender`](email::EmailSender).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use axum::{extract::State, routing::post, Router};
//! use formmail::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     formmail::observability::init()?;
//!
//!     let config = FormMailConfig::load_from("contact.toml")?;
//!     let processor = FormProcessor::from_config(&config, SanitizerRegistry::with_defaults())?;
//!
//!     let app = Router::new()
//!         .route("/contact", post(contact))
//!         .with_state(Arc::new(processor));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//!
//! async fn contact(
//!     State(processor): State<Arc<FormProcessor>>,
//!     form: SubmittedForm,
//! ) -> Result<&'static str, FormRejection> {
//!     processor
//!         .process_form_and_send(&form, &ConsoleBackend::new())
//!         .await?;
//!     Ok("Thank you!")
//! }
//! ```
//!
//! # Configuration
//!
//! See [`config`] for the TOML layout and the `FORMMAIL_` environment
//! overrides.

pub mod config;
pub mod email;
pub mod error;
pub mod forms;
pub mod observability;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use formmail::prelude::*;
    //! ```

    // Configuration
    pub use crate::config::FormMailConfig;

    // Form processing
    pub use crate::forms::{
        CustomField, FieldSpec, FormInput, FormProcessor, FormRejection, InputValue,
        MissingFields, Outcome, RegularField, RejectReason, SanitizedField, SanitizedFields,
        SanitizerRegistry, SubmittedForm,
    };

    // Email system
    pub use crate::email::{
        ConsoleBackend, Email, EmailError, EmailSender, EmailTemplate, FormMailBody, SmtpBackend,
    };

    // Error types
    pub use crate::error::FormMailError;
}
