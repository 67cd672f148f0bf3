//! Form submission checks and sanitization
//!
//! This module turns a raw submission into a list of sanitized, labelled
//! fields, or rejects it:
//! - Honeypot fields that must stay empty
//! - An optional render timestamp with a maximum age
//! - Required fields, collected into [`MissingFields`]
//! - Named sanitizers from a [`SanitizerRegistry`]
//!
//! # Quick Start
//!
//! ```rust
//! use formmail::forms::{
//!     CustomField, FormProcessor, RegularField, SanitizerRegistry, SubmittedForm,
//! };
//!
//! let processor = FormProcessor::new(SanitizerRegistry::with_defaults())
//!     .honeypot("email_confirm")
//!     .field("email", RegularField::new().label("Email").sanitizer("email").required())
//!     .field("topics", RegularField::new().label("Topics").sanitizer("text"))
//!     .field("source", CustomField::new("Source", "Website"))
//!     .receiver("office@example.com")
//!     .subject("Contact request");
//!
//! let form = SubmittedForm::from_urlencoded(
//!     "email=ada%40example.com&topics%5B%5D=rust&topics%5B%5D=mail",
//! )
//! .unwrap();
//!
//! let fields = processor.process_form(&form).unwrap();
//! assert_eq!(fields.value("topics"), Some("rust | mail"));
//! assert_eq!(fields.value("source"), Some("Website"));
//! ```
//!
//! # Rejections
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use formmail::forms::{FormProcessor, RegularField, RejectReason, SanitizerRegistry};
//!
//! let processor = FormProcessor::new(SanitizerRegistry::with_defaults())
//!     .field("name", RegularField::new().sanitizer("text").required().error_text("Name?"));
//!
//! let rejection = processor.process_form(&HashMap::<String, String>::new()).unwrap_err();
//!
//! assert_eq!(rejection.reason(), RejectReason::Required);
//! assert_eq!(rejection.missing_fields().unwrap().error_text("name"), Some("Name?"));
//! ```

mod error;
mod field;
mod input;
mod outcome;
mod processor;
pub mod sanitizer;

pub use error::MissingFields;
pub use field::{CustomField, FieldSpec, HtmlOption, HtmlOptions, RegularField};
pub use input::{FormInput, InputValue, SubmittedForm};
pub use outcome::{FormRejection, Outcome, RejectReason, SanitizedField, SanitizedFields};
pub use processor::FormProcessor;
pub use sanitizer::{SanitizerFn, SanitizerRegistry};
