//! The form processing pipeline
//!
//! A submission passes three gates in order: honeypot, timestamp and required
//! fields. The first gate that fails decides the rejection. Only a submission
//! that passes all of them is sanitized, and only sanitized fields are ever
//! rendered into an email.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::sanitizer;
use super::{
    FieldSpec, FormInput, FormRejection, MissingFields, Outcome, RegularField, SanitizedField,
    SanitizedFields, SanitizerRegistry,
};
use crate::config::{
    FormMailConfig, DEFAULT_MULTI_VALUE_SEPARATOR, DEFAULT_TIMESTAMP_MAX_AGE_SECS,
};
use crate::email::render::default_markup_to_text;
use crate::email::{Email, EmailError, EmailSender, FormMailBody, MarkupToText};
use crate::error::FormMailError;

/// Sanitizer applied to the reply-to field value
const REPLY_TO_SANITIZER: &str = "email";

/// Validates submissions and turns them into emails
///
/// A processor is configured once and holds no per-submission state, so one
/// instance can serve every request (share it in an `Arc`).
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// use formmail::forms::{FormProcessor, FormRejection, RegularField, SanitizerRegistry};
///
/// let processor = FormProcessor::new(SanitizerRegistry::with_defaults())
///     .honeypot("email_confirm")
///     .field("name", RegularField::new().label("Name").sanitizer("text").required())
///     .receiver("office@example.com")
///     .subject("Contact request");
///
/// let mut input = HashMap::new();
/// input.insert("name".to_string(), "  Ada ".to_string());
///
/// let fields = processor.process_form(&input).unwrap();
/// assert_eq!(fields.value("name"), Some("Ada"));
///
/// input.insert("email_confirm".to_string(), "spam".to_string());
/// assert_eq!(processor.process_form(&input), Err(FormRejection::Honeypot));
/// ```
#[derive(Clone)]
pub struct FormProcessor {
    fields: Vec<(String, FieldSpec)>,
    honeypot_fields: Vec<String>,
    timestamp_field: Option<String>,
    timestamp_max_age_secs: u64,
    multi_value_separator: String,
    receivers: Vec<String>,
    sender: Option<String>,
    sender_name: Option<String>,
    reply_to: Option<String>,
    reply_to_field: Option<String>,
    subject: String,
    sanitizers: SanitizerRegistry,
    markup_to_text: MarkupToText,
}

impl FormProcessor {
    /// Create a processor with no fields and no protection configured
    #[must_use]
    pub fn new(sanitizers: SanitizerRegistry) -> Self {
        Self {
            fields: Vec::new(),
            honeypot_fields: Vec::new(),
            timestamp_field: None,
            timestamp_max_age_secs: DEFAULT_TIMESTAMP_MAX_AGE_SECS,
            multi_value_separator: DEFAULT_MULTI_VALUE_SEPARATOR.to_string(),
            receivers: Vec::new(),
            sender: None,
            sender_name: None,
            reply_to: None,
            reply_to_field: None,
            subject: String::new(),
            sanitizers,
            markup_to_text: default_markup_to_text(),
        }
    }

    /// Build a processor from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `FormMailError::InvalidField` if a field entry cannot be
    /// converted into a field spec
    pub fn from_config(
        config: &FormMailConfig,
        sanitizers: SanitizerRegistry,
    ) -> Result<Self, FormMailError> {
        let mut processor = Self::new(sanitizers);
        processor.fields = config.field_specs()?;
        processor.honeypot_fields.clone_from(&config.protection.honeypot_fields);
        processor.timestamp_field.clone_from(&config.protection.timestamp_field);
        processor.timestamp_max_age_secs = config.protection.timestamp_max_age_secs;
        processor
            .multi_value_separator
            .clone_from(&config.form.multi_value_separator);
        processor.receivers.clone_from(&config.mail.receiver);
        processor.sender.clone_from(&config.mail.sender);
        processor.sender_name.clone_from(&config.mail.sender_name);
        processor.reply_to.clone_from(&config.mail.reply_to);
        processor.reply_to_field.clone_from(&config.mail.reply_to_field);
        processor.subject.clone_from(&config.mail.subject);

        debug!(
            fields = processor.fields.len(),
            honeypots = processor.honeypot_fields.len(),
            "Form processor configured"
        );
        Ok(processor)
    }

    /// Add a field; fields are processed and rendered in the order added
    ///
    /// Adding a name twice replaces the earlier definition in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        if let Some(entry) = self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = spec;
        } else {
            self.fields.push((name, spec));
        }
        self
    }

    /// Add a honeypot field
    #[must_use]
    pub fn honeypot(mut self, name: impl Into<String>) -> Self {
        self.honeypot_fields.push(name.into());
        self
    }

    /// Enable the timestamp check on the given field
    #[must_use]
    pub fn timestamp_field(mut self, name: impl Into<String>, max_age_secs: u64) -> Self {
        self.timestamp_field = Some(name.into());
        self.timestamp_max_age_secs = max_age_secs;
        self
    }

    /// Set the separator used to join multi-value fields
    #[must_use]
    pub fn multi_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.multi_value_separator = separator.into();
        self
    }

    /// Add a receiver entry; an entry may hold several comma separated addresses
    #[must_use]
    pub fn receiver(mut self, addresses: impl Into<String>) -> Self {
        self.receivers.push(addresses.into());
        self
    }

    /// Set the sender address
    #[must_use]
    pub fn sender(mut self, address: impl Into<String>) -> Self {
        self.sender = Some(address.into());
        self
    }

    /// Set the sender display name
    #[must_use]
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Set a fixed reply-to address
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Take the reply-to address from a submitted field
    #[must_use]
    pub fn reply_to_field(mut self, name: impl Into<String>) -> Self {
        self.reply_to_field = Some(name.into());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Use a different converter for custom field markup in the text body
    #[must_use]
    pub fn markup_to_text(mut self, markup_to_text: MarkupToText) -> Self {
        self.markup_to_text = markup_to_text;
        self
    }

    /// The configured fields, in order
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldSpec)] {
        &self.fields
    }

    /// The sanitizer registry
    #[must_use]
    pub const fn sanitizers(&self) -> &SanitizerRegistry {
        &self.sanitizers
    }

    /// Reject the submission if any honeypot field carries a value
    ///
    /// # Errors
    ///
    /// Returns `FormRejection::Honeypot` on the first populated honeypot
    pub fn check_honeypot<I>(&self, input: &I) -> Result<(), FormRejection>
    where
        I: FormInput + ?Sized,
    {
        for name in &self.honeypot_fields {
            if input.get(name).is_some_and(|value| !value.is_empty()) {
                info!(field = %name, "Honeypot field populated");
                return Err(FormRejection::Honeypot);
            }
        }
        Ok(())
    }

    /// Check the form timestamp against the current time
    ///
    /// # Errors
    ///
    /// Returns `FormRejection::Timestamp` if the timestamp is missing,
    /// unparsable or outside the accepted window
    pub fn check_timestamp<I>(&self, input: &I) -> Result<(), FormRejection>
    where
        I: FormInput + ?Sized,
    {
        self.check_timestamp_at(input, Utc::now().timestamp())
    }

    /// Check the form timestamp against `now` (Unix seconds)
    ///
    /// Accepts timestamps in `[now - max_age, now]`. Passes when no timestamp
    /// field is configured.
    ///
    /// # Errors
    ///
    /// Returns `FormRejection::Timestamp` if the timestamp is missing,
    /// unparsable or outside the accepted window
    pub fn check_timestamp_at<I>(&self, input: &I, now: i64) -> Result<(), FormRejection>
    where
        I: FormInput + ?Sized,
    {
        let Some(name) = &self.timestamp_field else {
            return Ok(());
        };

        let stamp = input
            .get(name)
            .and_then(|value| value.joined(&self.multi_value_separator).trim().parse::<i64>().ok());

        let Some(stamp) = stamp else {
            info!(field = %name, "Form timestamp missing or not a number");
            return Err(FormRejection::Timestamp);
        };

        let max_age = i64::try_from(self.timestamp_max_age_secs).unwrap_or(i64::MAX);
        let oldest = now.saturating_sub(max_age);

        if stamp < oldest || stamp > now {
            info!(field = %name, stamp, now, max_age, "Form timestamp outside accepted window");
            return Err(FormRejection::Timestamp);
        }
        Ok(())
    }

    /// Collect every required field that is absent or sanitizes to nothing
    ///
    /// Custom fields are never checked. A required field naming a sanitizer
    /// that is not registered is only checked for presence.
    ///
    /// # Errors
    ///
    /// Returns all missing fields, in configuration order
    pub fn check_required<I>(&self, input: &I) -> Result<(), MissingFields>
    where
        I: FormInput + ?Sized,
    {
        let mut missing = MissingFields::new();

        for (name, spec) in &self.fields {
            let FieldSpec::Regular(field) = spec else {
                continue;
            };
            if !field.required {
                continue;
            }

            let value = input.get(name).filter(|value| !value.is_empty());
            let Some(value) = value else {
                missing.add(name, field.error_text.as_deref());
                continue;
            };

            if let Some(sanitizer) = &field.sanitizer {
                if self.sanitizers.has(sanitizer) {
                    let raw = value.joined(&self.multi_value_separator);
                    if self.sanitizers.apply(sanitizer, &raw).is_empty() {
                        missing.add(name, field.error_text.as_deref());
                    }
                } else {
                    warn!(field = %name, sanitizer = %sanitizer, "Unknown sanitizer, value only checked for presence");
                }
            }
        }

        if missing.has_missing() {
            info!(missing = ?missing.names(), "Required fields missing");
            Err(missing)
        } else {
            Ok(())
        }
    }

    /// Sanitize every configured field, in configuration order
    pub fn sanitize<I>(&self, input: &I) -> SanitizedFields
    where
        I: FormInput + ?Sized,
    {
        let mut sanitized = SanitizedFields::new();

        for (name, spec) in &self.fields {
            let field = match spec {
                FieldSpec::Custom(custom) => SanitizedField {
                    value: custom.value.clone(),
                    label: Some(custom.label.clone()),
                    html_options: custom.html_options.clone(),
                    custom: true,
                },
                FieldSpec::Regular(regular) => self.sanitize_regular(name, regular, input),
            };
            sanitized.insert(name.clone(), field);
        }

        debug!(fields = sanitized.len(), "Fields sanitized");
        sanitized
    }

    fn sanitize_regular<I>(&self, name: &str, field: &RegularField, input: &I) -> SanitizedField
    where
        I: FormInput + ?Sized,
    {
        let raw = input
            .get(name)
            .map(|value| value.joined(&self.multi_value_separator))
            .unwrap_or_default();

        let mut value = match &field.sanitizer {
            Some(sanitizer) => self.sanitizers.apply(sanitizer, &raw),
            None => raw,
        };

        if value.is_empty() {
            if let Some(fallback) = &field.fallback {
                value.clone_from(fallback);
            }
        }

        SanitizedField {
            value,
            label: field.label.clone(),
            html_options: field.html_options.clone(),
            custom: false,
        }
    }

    /// Run the gates and sanitize the submission
    ///
    /// # Errors
    ///
    /// Returns the rejection of the first gate that fails
    pub fn process_form<I>(&self, input: &I) -> Outcome
    where
        I: FormInput + ?Sized,
    {
        self.process_form_at(input, Utc::now().timestamp())
    }

    /// [`process_form`](Self::process_form) with an explicit current time
    ///
    /// # Errors
    ///
    /// Returns the rejection of the first gate that fails
    #[instrument(skip_all, fields(fields = self.fields.len()))]
    pub fn process_form_at<I>(&self, input: &I, now: i64) -> Outcome
    where
        I: FormInput + ?Sized,
    {
        self.check_honeypot(input)?;
        debug!("Honeypot check passed");

        self.check_timestamp_at(input, now)?;
        debug!("Timestamp check passed");

        self.check_required(input).map_err(FormRejection::Required)?;
        debug!("Required field check passed");

        Ok(self.sanitize(input))
    }

    /// The From header value, if a sender is configured
    #[must_use]
    pub fn from_address(&self) -> Option<String> {
        let sender = self.sender.as_deref().filter(|sender| !sender.is_empty())?;
        Some(match self.sender_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => format!("{name} <{sender}>"),
            None => sender.to_string(),
        })
    }

    /// The reply-to address for this submission
    ///
    /// A valid address in the reply-to field wins over the fixed reply-to.
    /// The field goes through the registry's `email` sanitizer, or the
    /// built-in one when the registry has none.
    #[must_use]
    pub fn reply_to_address<I>(&self, input: &I) -> Option<String>
    where
        I: FormInput + ?Sized,
    {
        self.reply_to_field
            .as_deref()
            .and_then(|name| input.get(name))
            .map(|value| {
                let raw = value.joined(&self.multi_value_separator);
                if self.sanitizers.has(REPLY_TO_SANITIZER) {
                    self.sanitizers.apply(REPLY_TO_SANITIZER, &raw)
                } else {
                    sanitizer::email(&raw)
                }
            })
            .filter(|address| !address.is_empty())
            .or_else(|| self.reply_to.clone().filter(|address| !address.is_empty()))
    }

    /// Render the sanitized fields into a complete email
    ///
    /// # Errors
    ///
    /// Returns `EmailError::TemplateError` if the HTML body fails to render
    pub fn build_email<I>(&self, fields: &SanitizedFields, input: &I) -> Result<Email, EmailError>
    where
        I: FormInput + ?Sized,
    {
        let body = FormMailBody::new(&self.subject, fields)
            .with_markup_to_text(self.markup_to_text.clone());

        let mut email = Email::from_template(&body)?.subject(&self.subject);
        for entry in &self.receivers {
            email = email.to_list(entry);
        }
        if let Some(from) = self.from_address() {
            email = email.from(&from);
        }
        if let Some(reply_to) = self.reply_to_address(input) {
            email = email.reply_to(&reply_to);
        }
        Ok(email)
    }

    /// Build the email and hand it to `sender`
    ///
    /// Returns whether the transport accepted the message. Failures are
    /// logged, never propagated.
    #[instrument(skip_all, fields(subject = %self.subject))]
    pub async fn send_email<I, S>(&self, fields: &SanitizedFields, input: &I, sender: &S) -> bool
    where
        I: FormInput + ?Sized,
        S: EmailSender + ?Sized,
    {
        let email = match self.build_email(fields, input) {
            Ok(email) => email,
            Err(e) => {
                warn!(error = %e, "Failed to build form mail");
                return false;
            }
        };

        let recipients = email.to.len();
        match sender.send(email).await {
            Ok(()) => {
                info!(recipients, "Form mail sent");
                true
            }
            Err(e) => {
                warn!(error = %e, "Form mail not sent");
                false
            }
        }
    }

    /// Process the submission and send the email
    ///
    /// # Errors
    ///
    /// Returns the gate rejection unchanged, or `FormRejection::MailNotSent`
    /// if the transport failed
    pub async fn process_form_and_send<I, S>(&self, input: &I, sender: &S) -> Outcome
    where
        I: FormInput + ?Sized,
        S: EmailSender + ?Sized,
    {
        self.process_form_and_send_at(input, sender, Utc::now().timestamp())
            .await
    }

    /// [`process_form_and_send`](Self::process_form_and_send) with an explicit
    /// current time
    ///
    /// # Errors
    ///
    /// Returns the gate rejection unchanged, or `FormRejection::MailNotSent`
    /// if the transport failed
    pub async fn process_form_and_send_at<I, S>(&self, input: &I, sender: &S, now: i64) -> Outcome
    where
        I: FormInput + ?Sized,
        S: EmailSender + ?Sized,
    {
        let fields = self.process_form_at(input, now)?;

        if self.send_email(&fields, input, sender).await {
            Ok(fields)
        } else {
            Err(FormRejection::MailNotSent)
        }
    }
}

impl fmt::Debug for FormProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormProcessor")
            .field("fields", &self.fields)
            .field("honeypot_fields", &self.honeypot_fields)
            .field("timestamp_field", &self.timestamp_field)
            .field("timestamp_max_age_secs", &self.timestamp_max_age_secs)
            .field("receivers", &self.receivers)
            .field("subject", &self.subject)
            .field("sanitizers", &self.sanitizers)
            .finish_non_exhaustive()
    }
}
