//! Missing required fields
//!
//! Produced by the required-field check and carried by
//! [`FormRejection::Required`](super::FormRejection::Required).

use std::collections::BTreeMap;

use serde::Serialize;

/// Required fields that were absent or sanitized to nothing
///
/// Every missing field is listed, in configuration order. Error texts are
/// only present for fields that configure one.
///
/// # Examples
///
/// ```rust
/// use formmail::forms::MissingFields;
///
/// let mut missing = MissingFields::new();
/// missing.add("email", Some("Please enter your email address"));
/// missing.add("privacy", None);
///
/// assert_eq!(missing.names(), ["email", "privacy"]);
/// assert_eq!(missing.error_text("email"), Some("Please enter your email address"));
/// assert_eq!(missing.error_text("privacy"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingFields {
    fields: Vec<String>,
    messages: BTreeMap<String, String>,
}

impl MissingFields {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing field with its optional error text
    pub fn add(&mut self, field: impl Into<String>, error_text: Option<&str>) {
        let field = field.into();
        if let Some(text) = error_text {
            self.messages.insert(field.clone(), text.to_string());
        }
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    /// Whether any field is missing
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether the given field is missing
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|name| name == field)
    }

    /// Names of the missing fields, in configuration order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.fields
    }

    /// Error text configured for a missing field
    #[must_use]
    pub fn error_text(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    /// Map of missing field name to error text
    ///
    /// Fields without a configured error text are not included.
    #[must_use]
    pub const fn error_texts(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    /// Number of missing fields
    #[must_use]
    pub fn count(&self) -> usize {
        self.fields.len()
    }
}
