//! Field specifications
//!
//! Describes which submitted fields the processor reads, how each one is
//! sanitized and how it is rendered into the outgoing email.

use std::fmt;

/// A single rendering option attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlOption {
    /// Convert line breaks to `<br>` in the HTML body
    Nl2br,
    /// Skip HTML escaping of the value in the HTML body
    NoHtmlEntities,
    /// Render the field as a single full-width cell
    FullWidth,
    /// Unrecognised option, kept for round-tripping and ignored when rendering
    Other(String),
}

impl HtmlOption {
    /// Parse a single option token
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "nl2br" => Self::Nl2br,
            "nohtmlentities" => Self::NoHtmlEntities,
            "fullwidth" => Self::FullWidth,
            other => Self::Other(other.to_string()),
        }
    }

    /// The configuration token for this option
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Nl2br => "nl2br",
            Self::NoHtmlEntities => "nohtmlentities",
            Self::FullWidth => "fullwidth",
            Self::Other(token) => token,
        }
    }
}

/// Ordered list of rendering options, parsed from a space separated string
///
/// ```rust
/// use formmail::forms::{HtmlOption, HtmlOptions};
///
/// let options = HtmlOptions::parse("nohtmlentities nl2br");
/// assert!(options.contains(&HtmlOption::Nl2br));
/// assert!(!options.is_full_width());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions(Vec<HtmlOption>);

impl HtmlOptions {
    /// Parse options separated by whitespace
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(HtmlOption::parse).collect())
    }

    /// Whether the given option is present
    #[must_use]
    pub fn contains(&self, option: &HtmlOption) -> bool {
        self.0.contains(option)
    }

    /// Whether the value should be emitted without HTML escaping
    #[must_use]
    pub fn skips_escaping(&self) -> bool {
        self.contains(&HtmlOption::NoHtmlEntities)
    }

    /// Whether the row spans the full table width
    #[must_use]
    pub fn is_full_width(&self) -> bool {
        self.contains(&HtmlOption::FullWidth)
    }

    /// Options in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &HtmlOption> {
        self.0.iter()
    }

    /// Whether no options are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HtmlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.0.iter().map(HtmlOption::as_str).collect();
        write!(f, "{}", tokens.join(" "))
    }
}

impl From<&str> for HtmlOptions {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// A field whose value comes from the submitted form
#[derive(Debug, Clone, Default)]
pub struct RegularField {
    /// Human readable label; unlabelled fields are left out of the email
    pub label: Option<String>,
    /// Name of the sanitizer to run over the value
    pub sanitizer: Option<String>,
    /// Whether the submission is rejected when this field is missing
    pub required: bool,
    /// Substituted when the sanitized value is empty
    pub fallback: Option<String>,
    /// Rendering options for the HTML body
    pub html_options: Option<HtmlOptions>,
    /// Message reported when the field is required but missing
    pub error_text: Option<String>,
}

impl RegularField {
    /// Create an unlabelled, optional field
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the sanitizer name
    #[must_use]
    pub fn sanitizer(mut self, name: impl Into<String>) -> Self {
        self.sanitizer = Some(name.into());
        self
    }

    /// Mark the field as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the fallback value
    #[must_use]
    pub fn fallback(mut self, value: impl Into<String>) -> Self {
        self.fallback = Some(value.into());
        self
    }

    /// Set the HTML rendering options
    #[must_use]
    pub fn html_options(mut self, options: impl Into<HtmlOptions>) -> Self {
        self.html_options = Some(options.into());
        self
    }

    /// Set the message reported when the field is missing
    #[must_use]
    pub fn error_text(mut self, text: impl Into<String>) -> Self {
        self.error_text = Some(text.into());
        self
    }
}

/// A literal value added to the email without reading the submission
#[derive(Debug, Clone)]
pub struct CustomField {
    /// Label shown in the email
    pub label: String,
    /// Literal value, may contain markup
    pub value: String,
    /// Rendering options for the HTML body
    pub html_options: Option<HtmlOptions>,
}

impl CustomField {
    /// Create a custom field
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            html_options: None,
        }
    }

    /// Set the HTML rendering options
    #[must_use]
    pub fn html_options(mut self, options: impl Into<HtmlOptions>) -> Self {
        self.html_options = Some(options.into());
        self
    }
}

/// Configuration of one output field
#[derive(Debug, Clone)]
pub enum FieldSpec {
    /// Read from the submission, checked and sanitized
    Regular(RegularField),
    /// Literal value, never read from input and never required
    Custom(CustomField),
}

impl FieldSpec {
    /// Whether this is a custom field
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// The configured label, if any
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Regular(field) => field.label.as_deref(),
            Self::Custom(field) => Some(&field.label),
        }
    }
}

impl From<RegularField> for FieldSpec {
    fn from(field: RegularField) -> Self {
        Self::Regular(field)
    }
}

impl From<CustomField> for FieldSpec {
    fn from(field: CustomField) -> Self {
        Self::Custom(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_options_parse_keeps_order() {
        let options = HtmlOptions::parse("nl2br  fullwidth nohtmlentities");
        let parsed: Vec<&HtmlOption> = options.iter().collect();
        assert_eq!(
            parsed,
            vec![&HtmlOption::Nl2br, &HtmlOption::FullWidth, &HtmlOption::NoHtmlEntities]
        );
    }

    #[test]
    fn test_html_options_full_width_at_start() {
        let options = HtmlOptions::parse("fullwidth");
        assert!(options.is_full_width());
    }

    #[test]
    fn test_html_options_unknown_token() {
        let options = HtmlOptions::parse("bold nl2br");
        assert!(options.contains(&HtmlOption::Other("bold".to_string())));
        assert_eq!(options.to_string(), "bold nl2br");
    }

    #[test]
    fn test_regular_field_builder() {
        let field = RegularField::new()
            .label("Name")
            .sanitizer("text")
            .required()
            .error_text("Please enter your name");

        assert_eq!(field.label.as_deref(), Some("Name"));
        assert_eq!(field.sanitizer.as_deref(), Some("text"));
        assert!(field.required);
        assert!(field.fallback.is_none());
        assert_eq!(field.error_text.as_deref(), Some("Please enter your name"));
    }

    #[test]
    fn test_field_spec_label() {
        let custom: FieldSpec = CustomField::new("Source", "<b>web</b>").into();
        let regular: FieldSpec = RegularField::new().into();

        assert!(custom.is_custom());
        assert_eq!(custom.label(), Some("Source"));
        assert_eq!(regular.label(), None);
    }
}
