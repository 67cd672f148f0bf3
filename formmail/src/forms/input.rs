//! Submitted form values
//!
//! The processor never talks to a request directly. It queries a [`FormInput`]
//! by field name, so any key/value source can back a submission.

use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use axum::Form;

/// A submitted value: a single string or the values of a multi-value control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    /// Text inputs, selects, single checkboxes
    Single(String),
    /// Checkbox groups and multi-selects
    Multiple(Vec<String>),
}

impl InputValue {
    /// Whether the value carries no content
    ///
    /// A list counts as empty when every element is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_empty(),
            Self::Multiple(values) => values.iter().all(String::is_empty),
        }
    }

    /// Flatten to a single string, joining lists with `separator`
    #[must_use]
    pub fn joined(&self, separator: &str) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::Multiple(values) => values.join(separator),
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for InputValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Source of submitted values, queried by field name
pub trait FormInput: Send + Sync {
    /// Look up a submitted value
    fn get(&self, name: &str) -> Option<InputValue>;
}

impl FormInput for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<InputValue> {
        HashMap::get(self, name).map(|value| InputValue::Single(value.clone()))
    }
}

impl FormInput for HashMap<String, InputValue> {
    fn get(&self, name: &str) -> Option<InputValue> {
        HashMap::get(self, name).cloned()
    }
}

/// A decoded form submission
///
/// Repeated names and names ending in `[]` are collected into
/// [`InputValue::Multiple`]; the brackets are stripped from the name.
///
/// ```rust
/// use formmail::forms::{FormInput, InputValue, SubmittedForm};
///
/// let form = SubmittedForm::from_pairs([
///     ("name", "Ada"),
///     ("topics[]", "rust"),
///     ("topics[]", "mail"),
/// ]);
///
/// assert_eq!(form.get("name"), Some(InputValue::Single("Ada".into())));
/// assert_eq!(
///     form.get("topics"),
///     Some(InputValue::Multiple(vec!["rust".into(), "mail".into()]))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    values: HashMap<String, InputValue>,
}

impl SubmittedForm {
    /// Create an empty submission
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a submission from decoded `(name, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (name, value) in pairs {
            form.push(name.into(), value.into());
        }
        form
    }

    /// Decode an `application/x-www-form-urlencoded` body
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid urlencoded data
    pub fn from_urlencoded(body: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)?;
        Ok(Self::from_pairs(pairs))
    }

    /// Set a single value, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<InputValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Number of distinct field names
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was submitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, name: String, value: String) {
        let (name, is_list) = name
            .strip_suffix("[]")
            .map_or((name.clone(), false), |stripped| (stripped.to_string(), true));

        match self.values.remove(&name) {
            None if is_list => {
                self.values.insert(name, InputValue::Multiple(vec![value]));
            }
            None => {
                self.values.insert(name, InputValue::Single(value));
            }
            Some(InputValue::Single(previous)) => {
                self.values
                    .insert(name, InputValue::Multiple(vec![previous, value]));
            }
            Some(InputValue::Multiple(mut values)) => {
                values.push(value);
                self.values.insert(name, InputValue::Multiple(values));
            }
        }
    }
}

impl FormInput for SubmittedForm {
    fn get(&self, name: &str) -> Option<InputValue> {
        self.values.get(name).cloned()
    }
}

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = axum::extract::rejection::FormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
        Ok(Self::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_value_is_empty() {
        assert!(InputValue::from("").is_empty());
        assert!(!InputValue::from("x").is_empty());
        assert!(InputValue::Multiple(vec![]).is_empty());
        assert!(InputValue::Multiple(vec![String::new()]).is_empty());
        assert!(!InputValue::Multiple(vec![String::new(), "b".into()]).is_empty());
    }

    #[test]
    fn test_input_value_joined() {
        let value = InputValue::Multiple(vec!["a".into(), "b".into()]);
        assert_eq!(value.joined(" | "), "a | b");
        assert_eq!(InputValue::from("a").joined(" | "), "a");
    }

    #[test]
    fn test_repeated_names_become_list() {
        let form = SubmittedForm::from_pairs([("color", "red"), ("color", "blue")]);
        assert_eq!(
            form.get("color"),
            Some(InputValue::Multiple(vec!["red".into(), "blue".into()]))
        );
    }

    #[test]
    fn test_bracket_suffix_single_value_is_list() {
        let form = SubmittedForm::from_pairs([("extras[]", "wifi")]);
        assert_eq!(
            form.get("extras"),
            Some(InputValue::Multiple(vec!["wifi".into()]))
        );
        assert_eq!(form.get("extras[]"), None);
    }

    #[test]
    fn test_from_urlencoded() {
        let form = SubmittedForm::from_urlencoded("name=Ada+Lovelace&msg=Line1%0ALine2").unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("name"), Some(InputValue::from("Ada Lovelace")));
        assert_eq!(form.get("msg"), Some(InputValue::from("Line1\nLine2")));
    }

    #[test]
    fn test_hash_map_input() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), "1".to_string());
        assert_eq!(FormInput::get(&map, "a"), Some(InputValue::from("1")));
        assert_eq!(FormInput::get(&map, "b"), None);
    }
}
