//! HTML and plain text bodies for a processed submission
//!
//! Only fields with a label are rendered. The HTML body is a styled table;
//! the text body lists `label:` / value pairs between divider lines.

use std::sync::Arc;

use askama::Template;

use super::markup::{escape_html, html_to_text, nl2br};
use super::{EmailError, EmailTemplate};
use crate::forms::{HtmlOption, SanitizedField, SanitizedFields};

/// Converts custom field markup to plain text for the text body
pub type MarkupToText = Arc<dyn Fn(&str) -> String + Send + Sync>;

const TITLE_DIVIDER: &str =
    "================================================================================";
const FIELD_DIVIDER: &str =
    "--------------------------------------------------------------------------------";

/// The default markup-to-text converter
#[must_use]
pub fn default_markup_to_text() -> MarkupToText {
    Arc::new(html_to_text)
}

struct HtmlRow {
    label: String,
    value: String,
    full_width: bool,
}

#[derive(Template)]
#[template(
    source = r#"<style>
    body{
        font-family: 'Arial', sans-serif;
    }
    table{
        width: 100%;
    }
    th{
        text-align: left;
    }
    th, td{
        border-bottom: 1px solid #666;
        padding: 0.5em;
        vertical-align: top;
    }
</style>
<h1>{{ subject|safe }}</h1>
<table>
{% for row in rows %}{% if row.full_width %}<tr>
<td colspan='2'><strong>{{ row.label|safe }}</strong><br><br>
{{ row.value|safe }}</td>
</tr>
{% else %}<tr>
<th>{{ row.label|safe }}</th>
<td>{{ row.value|safe }}</td>
</tr>
{% endif %}{% endfor %}</table>
"#,
    ext = "html"
)]
struct HtmlBody {
    subject: String,
    rows: Vec<HtmlRow>,
}

/// Render a field value for the HTML body
///
/// The value is escaped unless `nohtmlentities` is set, then the options are
/// applied in the order they are listed.
#[must_use]
pub fn html_value(field: &SanitizedField) -> String {
    let Some(options) = &field.html_options else {
        return escape_html(&field.value);
    };

    let mut value = if options.skips_escaping() {
        field.value.clone()
    } else {
        escape_html(&field.value)
    };

    for option in options.iter() {
        if *option == HtmlOption::Nl2br {
            value = nl2br(&value);
        }
    }
    value
}

/// Render the HTML body
///
/// # Errors
///
/// Returns `EmailError::TemplateError` if the template fails to render
pub fn render_html(subject: &str, fields: &SanitizedFields) -> Result<String, EmailError> {
    let rows = fields
        .iter()
        .filter_map(|(_, field)| {
            let label = field.display_label()?;
            let value = html_value(field);
            if value.is_empty() {
                return None;
            }
            Some(HtmlRow {
                label: escape_html(label),
                value,
                full_width: field
                    .html_options
                    .as_ref()
                    .is_some_and(|options| options.is_full_width()),
            })
        })
        .collect();

    let body = HtmlBody {
        subject: escape_html(subject),
        rows,
    };
    Ok(body.render()?)
}

/// Render the plain text body
///
/// Regular values are written verbatim; custom values pass through
/// `markup_to_text` first.
#[must_use]
pub fn render_text(
    subject: &str,
    fields: &SanitizedFields,
    markup_to_text: &(dyn Fn(&str) -> String + Send + Sync),
) -> String {
    let mut message = format!("{}\n{TITLE_DIVIDER}\n\n", subject.to_uppercase());

    for (_, field) in fields.iter() {
        let Some(label) = field.display_label() else {
            continue;
        };
        let value = if field.custom {
            markup_to_text(&field.value)
        } else {
            field.value.clone()
        };
        message.push_str(label);
        message.push_str(":\n");
        message.push_str(&value);
        message.push('\n');
        message.push_str(FIELD_DIVIDER);
        message.push('\n');
    }
    message
}

/// Both bodies of a form submission email
pub struct FormMailBody<'a> {
    subject: &'a str,
    fields: &'a SanitizedFields,
    markup_to_text: MarkupToText,
}

impl<'a> FormMailBody<'a> {
    /// Create a body with the default markup-to-text converter
    #[must_use]
    pub fn new(subject: &'a str, fields: &'a SanitizedFields) -> Self {
        Self {
            subject,
            fields,
            markup_to_text: default_markup_to_text(),
        }
    }

    /// Use a different markup-to-text converter for custom fields
    #[must_use]
    pub fn with_markup_to_text(mut self, markup_to_text: MarkupToText) -> Self {
        self.markup_to_text = markup_to_text;
        self
    }
}

impl EmailTemplate for FormMailBody<'_> {
    fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError> {
        let html = render_html(self.subject, self.fields)?;
        let text = render_text(self.subject, self.fields, self.markup_to_text.as_ref());
        Ok((Some(html), Some(text)))
    }
}
