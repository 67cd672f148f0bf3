//! Error types and error handling
//!
//! Validation results are not errors: a rejected submission is a
//! [`FormRejection`](crate::forms::FormRejection) value. The types here cover
//! setting the processor up.

use thiserror::Error;

/// Configuration and field definition errors
#[derive(Debug, Error)]
pub enum FormMailError {
    /// The configuration sources could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A field definition is not usable
    #[error("Invalid field '{name}': {reason}")]
    InvalidField {
        /// Field name as configured
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

impl FormMailError {
    /// Create an invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for FormMailError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}
