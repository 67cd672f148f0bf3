//! Processing results
//!
//! A run either yields the sanitized fields or a [`FormRejection`] naming the
//! gate that stopped it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::field::HtmlOptions;
use super::MissingFields;

/// Result of processing a submission
pub type Outcome = Result<SanitizedFields, FormRejection>;

/// One field after sanitization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedField {
    /// Final value, after sanitizer and fallback
    pub value: String,
    /// Label for the email; `None` keeps the field out of the email
    pub label: Option<String>,
    /// Rendering options for the HTML body
    pub html_options: Option<HtmlOptions>,
    /// Whether the value is a literal from a custom field
    pub custom: bool,
}

impl SanitizedField {
    /// Create an unlabelled regular field value
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            html_options: None,
            custom: false,
        }
    }

    /// Set the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label if it is set and non-empty
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.is_empty())
    }
}

impl Serialize for SanitizedField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("SanitizedField", 4)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field(
            "html_options",
            &self.html_options.as_ref().map(ToString::to_string),
        )?;
        state.serialize_field("custom", &self.custom)?;
        state.end()
    }
}

/// Sanitized fields in configuration order
///
/// The order decides the row order of the rendered email, so callers that
/// merge or add fields before sending keep control over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedFields {
    entries: Vec<(String, SanitizedField)>,
}

impl SanitizedFields {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing one with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, field: SanitizedField) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = field;
        } else {
            self.entries.push((name, field));
        }
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SanitizedField> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    /// The value of a field by name
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|field| field.value.as_str())
    }

    /// Remove a field, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<SanitizedField> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SanitizedField)> {
        self.entries.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Field names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SanitizedFields {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, field) in &self.entries {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

/// Why a submission was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormRejection {
    /// A honeypot field was filled in
    #[error("honeypot field was populated")]
    Honeypot,

    /// The form timestamp is missing, too old or in the future
    #[error("form timestamp is outside the accepted window")]
    Timestamp,

    /// Required fields are missing
    #[error("{} required field(s) missing", .0.count())]
    Required(MissingFields),

    /// The mail transport did not accept the message
    #[error("mail could not be sent")]
    MailNotSent,

    /// No specific reason is known
    #[error("submission rejected for an unspecified reason")]
    Unspecified,
}

impl FormRejection {
    /// The reason code of this rejection
    #[must_use]
    pub const fn reason(&self) -> RejectReason {
        match self {
            Self::Honeypot => RejectReason::Honeypot,
            Self::Timestamp => RejectReason::Timestamp,
            Self::Required(_) => RejectReason::Required,
            Self::MailNotSent => RejectReason::MailNotSent,
            Self::Unspecified => RejectReason::Unspecified,
        }
    }

    /// Missing fields, for [`FormRejection::Required`]
    #[must_use]
    pub const fn missing_fields(&self) -> Option<&MissingFields> {
        match self {
            Self::Required(missing) => Some(missing),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    reason: RejectReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_fields: Option<&'a MissingFields>,
}

impl Serialize for FormRejection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RejectionBody {
            reason: self.reason(),
            missing_fields: self.missing_fields(),
        }
        .serialize(serializer)
    }
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(&self)).into_response()
    }
}

/// Stable reason codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// `honeypot`
    Honeypot,
    /// `timestamp`
    Timestamp,
    /// `required`
    Required,
    /// `mailnotsent`
    MailNotSent,
    /// `notspecified`
    #[serde(rename = "notspecified")]
    Unspecified,
}

impl RejectReason {
    /// The reason code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Honeypot => "honeypot",
            Self::Timestamp => "timestamp",
            Self::Required => "required",
            Self::MailNotSent => "mailnotsent",
            Self::Unspecified => "notspecified",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = Infallible;

    /// Parse a reason code; unknown codes map to [`RejectReason::Unspecified`]
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code {
            "honeypot" => Self::Honeypot,
            "timestamp" => Self::Timestamp,
            "required" => Self::Required,
            "mailnotsent" => Self::MailNotSent,
            _ => Self::Unspecified,
        })
    }
}
