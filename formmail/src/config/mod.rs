//! Configuration management for formmail
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `FORMMAIL_` prefix, `__` nests)
//! 2. The TOML file passed to [`FormMailConfig::load_from`]
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! [mail]
//! receiver = "office@example.com, sales@example.com"
//! sender = "noreply@example.com"
//! sender_name = "Website"
//! reply_to_field = "email"
//! subject = "Contact request"
//!
//! [protection]
//! honeypot_fields = ["name", "email_confirm"]
//! timestamp_field = "stamp"
//! timestamp_max_age_secs = 86400
//!
//! [form]
//! multi_value_separator = " | "
//!
//! [[fields]]
//! name = "email"
//! label = "Email address"
//! sanitizer = "email"
//! required = true
//! error_text = "Please enter a valid email address"
//!
//! [[fields]]
//! name = "message"
//! label = "Message"
//! sanitizer = "textarea"
//! html_options = "nl2br fullwidth"
//!
//! [[fields]]
//! name = "customfield--source"
//! label = "Source"
//! value = "<p>Contact form</p>"
//! ```
//!
//! `[[fields]]` is an array so the order of the entries is the order of the
//! rows in the rendered email.

use std::collections::HashSet;
use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidateEmail;

use crate::error::FormMailError;
use crate::forms::{CustomField, FieldSpec, HtmlOptions, RegularField};

/// Default maximum age of the form timestamp (24 hours)
pub const DEFAULT_TIMESTAMP_MAX_AGE_SECS: u64 = 86_400;

/// Default separator for multi-value fields
pub const DEFAULT_MULTI_VALUE_SEPARATOR: &str = " | ";

/// Default name prefix marking custom fields in configuration files
pub const DEFAULT_CUSTOM_FIELD_PREFIX: &str = "customfield--";

const ENV_PREFIX: &str = "FORMMAIL_";

/// Mail envelope settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Recipients; each entry may hold several comma separated addresses
    #[serde(deserialize_with = "one_or_many")]
    pub receiver: Vec<String>,

    /// Sender address
    pub sender: Option<String>,

    /// Display name placed in front of the sender address
    pub sender_name: Option<String>,

    /// Fixed reply-to address
    pub reply_to: Option<String>,

    /// Field whose submitted value becomes the reply-to address
    pub reply_to_field: Option<String>,

    /// Subject line
    pub subject: String,
}

/// Spam protection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionSettings {
    /// Hidden fields that must stay empty
    pub honeypot_fields: Vec<String>,

    /// Field carrying the Unix timestamp of when the form was rendered
    pub timestamp_field: Option<String>,

    /// Maximum accepted age of the timestamp in seconds
    pub timestamp_max_age_secs: u64,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            honeypot_fields: Vec::new(),
            timestamp_field: None,
            timestamp_max_age_secs: DEFAULT_TIMESTAMP_MAX_AGE_SECS,
        }
    }
}

/// Field handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Separator used to join multi-value fields
    pub multi_value_separator: String,

    /// Name prefix that marks a `[[fields]]` entry as a custom field
    pub custom_field_prefix: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            multi_value_separator: DEFAULT_MULTI_VALUE_SEPARATOR.to_string(),
            custom_field_prefix: DEFAULT_CUSTOM_FIELD_PREFIX.to_string(),
        }
    }
}

/// One `[[fields]]` entry as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Submitted field name, or custom field name with the custom prefix
    pub name: String,
    /// Label for the email
    pub label: Option<String>,
    /// Sanitizer name
    pub sanitizer: Option<String>,
    /// Whether the field is mandatory
    pub required: bool,
    /// Value used when the sanitized value is empty
    pub fallback: Option<String>,
    /// Space separated HTML rendering options
    pub html_options: Option<String>,
    /// Message reported when a required field is missing
    pub error_text: Option<String>,
    /// Literal value of a custom field
    pub value: Option<String>,
}

impl FieldConfig {
    /// Convert into a field spec
    ///
    /// Names starting with `custom_prefix` become [`FieldSpec::Custom`].
    ///
    /// # Errors
    ///
    /// Returns `FormMailError::InvalidField` for an empty name, or for a
    /// custom field without a value
    pub fn to_spec(&self, custom_prefix: &str) -> Result<FieldSpec, FormMailError> {
        if self.name.trim().is_empty() {
            return Err(FormMailError::invalid_field(&self.name, "name must not be empty"));
        }

        let html_options = self.html_options.as_deref().map(HtmlOptions::parse);

        if !custom_prefix.is_empty() && self.name.starts_with(custom_prefix) {
            let value = self.value.clone().ok_or_else(|| {
                FormMailError::invalid_field(&self.name, "custom fields need a value")
            })?;
            return Ok(FieldSpec::Custom(CustomField {
                label: self.label.clone().unwrap_or_default(),
                value,
                html_options,
            }));
        }

        Ok(FieldSpec::Regular(RegularField {
            label: self.label.clone(),
            sanitizer: self.sanitizer.clone(),
            required: self.required,
            fallback: self.fallback.clone(),
            html_options,
            error_text: self.error_text.clone(),
        }))
    }
}

/// Complete formmail configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormMailConfig {
    /// Mail envelope settings
    #[serde(default)]
    pub mail: MailSettings,

    /// Spam protection settings
    #[serde(default)]
    pub protection: ProtectionSettings,

    /// Field handling settings
    #[serde(default)]
    pub form: FormSettings,

    /// Field definitions in output order
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl FormMailConfig {
    /// Load configuration from a TOML file, overridden by `FORMMAIL_*` env vars
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use formmail::config::FormMailConfig;
    ///
    /// # fn example() -> Result<(), formmail::error::FormMailError> {
    /// let config = FormMailConfig::load_from("./contact.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `FormMailError::Config` if the file or the environment
    /// cannot be parsed into the configuration
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, FormMailError> {
        let config = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, without env overrides
    ///
    /// # Errors
    ///
    /// Returns `FormMailError::Config` if the string cannot be parsed
    pub fn from_toml_str(toml: &str) -> Result<Self, FormMailError> {
        Ok(Figment::from(Toml::string(toml)).extract()?)
    }

    /// Field specs in configuration order
    ///
    /// # Errors
    ///
    /// Returns `FormMailError::InvalidField` if an entry cannot be converted
    pub fn field_specs(&self) -> Result<Vec<(String, FieldSpec)>, FormMailError> {
        self.fields
            .iter()
            .map(|field| {
                field
                    .to_spec(&self.form.custom_field_prefix)
                    .map(|spec| (field.name.clone(), spec))
            })
            .collect()
    }

    /// Check the configuration for mistakes that would only show up at send time
    ///
    /// # Errors
    ///
    /// Returns the first problem found
    pub fn validate(&self) -> Result<(), FormMailError> {
        let receivers: Vec<&str> = self
            .mail
            .receiver
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .collect();

        if receivers.is_empty() {
            return Err(FormMailError::invalid("mail.receiver must name at least one address"));
        }
        if let Some(bad) = receivers.iter().find(|address| !address.validate_email()) {
            return Err(FormMailError::invalid(format!(
                "mail.receiver contains an invalid address: {bad}"
            )));
        }
        if let Some(sender) = &self.mail.sender {
            if !sender.validate_email() {
                return Err(FormMailError::invalid(format!(
                    "mail.sender is not a valid address: {sender}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormMailError::invalid_field(&field.name, "defined more than once"));
            }
        }

        self.field_specs().map(|_| ())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(address) => vec![address],
        OneOrMany::Many(addresses) => addresses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [mail]
        receiver = "office@example.com, sales@example.com"
        sender = "noreply@example.com"
        sender_name = "Website"
        subject = "Contact request"

        [protection]
        honeypot_fields = ["name", "email_confirm"]
        timestamp_field = "stamp"

        [[fields]]
        name = "amount"
        label = "Amount"
        sanitizer = "int"
        required = true
        fallback = "0"

        [[fields]]
        name = "privacy"
        required = true
        error_text = "Please accept the privacy policy"

        [[fields]]
        name = "customfield--source"
        label = "Source"
        value = "<b>web</b>"
        html_options = "nohtmlentities"
    "#;

    #[test]
    fn test_default_config() {
        let config = FormMailConfig::default();
        assert_eq!(config.protection.timestamp_max_age_secs, 86_400);
        assert_eq!(config.form.multi_value_separator, " | ");
        assert_eq!(config.form.custom_field_prefix, "customfield--");
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_parse_sample() {
        let config = FormMailConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.mail.receiver, vec!["office@example.com, sales@example.com"]);
        assert_eq!(config.mail.sender_name.as_deref(), Some("Website"));
        assert_eq!(config.protection.honeypot_fields, vec!["name", "email_confirm"]);
        assert_eq!(config.protection.timestamp_max_age_secs, 86_400);
        assert_eq!(config.fields.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_specs_keep_order_and_kind() {
        let config = FormMailConfig::from_toml_str(SAMPLE).unwrap();
        let specs = config.field_specs().unwrap();

        let names: Vec<&str> = specs.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["amount", "privacy", "customfield--source"]);
        assert!(!specs[0].1.is_custom());
        assert!(specs[2].1.is_custom());
    }

    #[test]
    fn test_receiver_list_form() {
        let config = FormMailConfig::from_toml_str(
            r#"
            [mail]
            receiver = ["a@example.com", "b@example.com"]
            "#,
        )
        .unwrap();
        assert_eq!(config.mail.receiver.len(), 2);
    }

    #[test]
    fn test_custom_field_without_value_is_rejected() {
        let field = FieldConfig {
            name: "customfield--note".to_string(),
            label: Some("Note".to_string()),
            ..FieldConfig::default()
        };
        assert!(matches!(
            field.to_spec(DEFAULT_CUSTOM_FIELD_PREFIX),
            Err(FormMailError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_custom_prefix_is_configurable() {
        let field = FieldConfig {
            name: "static:note".to_string(),
            label: Some("Note".to_string()),
            value: Some("hello".to_string()),
            ..FieldConfig::default()
        };
        assert!(field.to_spec("static:").unwrap().is_custom());
        assert!(!field.to_spec(DEFAULT_CUSTOM_FIELD_PREFIX).unwrap().is_custom());
    }

    #[test]
    fn test_validate_requires_receiver() {
        let config = FormMailConfig::default();
        assert!(matches!(config.validate(), Err(FormMailError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_fields() {
        let mut config = FormMailConfig::from_toml_str(SAMPLE).unwrap();
        config.fields.push(config.fields[0].clone());
        assert!(matches!(
            config.validate(),
            Err(FormMailError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        std::env::set_var("FORMMAIL_MAIL__SUBJECT", "Overridden");
        let config = FormMailConfig::load_from(&path).unwrap();
        std::env::remove_var("FORMMAIL_MAIL__SUBJECT");

        assert_eq!(config.mail.subject, "Overridden");
        assert_eq!(config.fields.len(), 3);
    }
}
