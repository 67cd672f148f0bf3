//! Named sanitizers
//!
//! Fields refer to sanitizers by name. The registry maps each name to a pure
//! `&str -> String` function. Unknown names resolve to a pass-through, so a
//! typo in a field definition never rejects a submission.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

/// A sanitizer function
pub type SanitizerFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Maximum length kept by the `text` sanitizer
pub const TEXT_MAX_LENGTH: usize = 255;

/// Maximum length kept by the `textarea` sanitizer
pub const TEXTAREA_MAX_LENGTH: usize = 16_384;

/// Maximum length kept by the `name` sanitizer
pub const NAME_MAX_LENGTH: usize = 128;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Registry of sanitizers keyed by name
///
/// ```rust
/// use formmail::forms::SanitizerRegistry;
///
/// let mut registry = SanitizerRegistry::with_defaults();
/// registry.register("upper", |value: &str| value.to_uppercase());
///
/// assert_eq!(registry.apply("upper", "abc"), "ABC");
/// assert_eq!(registry.apply("text", "  <b>hi</b> "), "hi");
/// assert_eq!(registry.apply("unknown", "as is"), "as is");
/// ```
#[derive(Clone, Default)]
pub struct SanitizerRegistry {
    sanitizers: HashMap<String, SanitizerFn>,
}

impl SanitizerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in sanitizers
    ///
    /// Installs `text`, `textarea`, `email`, `int`, `name` and `trim`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("text", text);
        registry.register("textarea", textarea);
        registry.register("email", email);
        registry.register("int", int);
        registry.register("name", name);
        registry.register("trim", |value: &str| value.trim().to_string());
        registry
    }

    /// Register or replace a sanitizer
    pub fn register<F>(&mut self, name: impl Into<String>, sanitizer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.sanitizers.insert(name.into(), Arc::new(sanitizer));
    }

    /// Whether a sanitizer with this name exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.sanitizers.contains_key(name)
    }

    /// Run the named sanitizer; unknown names return the value unchanged
    #[must_use]
    pub fn apply(&self, name: &str, value: &str) -> String {
        self.sanitizers
            .get(name)
            .map_or_else(|| value.to_string(), |sanitizer| sanitizer(value))
    }

    /// Names of all registered sanitizers, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sanitizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for SanitizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizerRegistry")
            .field("sanitizers", &self.names())
            .finish()
    }
}

/// Remove markup tags
#[must_use]
pub fn strip_tags(value: &str) -> String {
    TAG_PATTERN.replace_all(value, "").into_owned()
}

/// Remove control characters, keeping tab and newline when `keep_lines` is set
fn strip_control(value: &str, keep_lines: bool) -> String {
    value
        .chars()
        .filter(|&c| {
            if keep_lines && matches!(c, '\n' | '\t') {
                return true;
            }
            !c.is_control()
        })
        .collect()
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Single line text: no markup, no line breaks, trimmed
#[must_use]
pub fn text(value: &str) -> String {
    let flattened: String = strip_tags(value)
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect();
    let cleaned = strip_control(&flattened, false);
    truncate_chars(cleaned.trim(), TEXT_MAX_LENGTH).trim_end().to_string()
}

/// Multi line text: no markup, normalised line breaks, trimmed
#[must_use]
pub fn textarea(value: &str) -> String {
    let normalized = strip_tags(value).replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = strip_control(&normalized, true);
    truncate_chars(cleaned.trim(), TEXTAREA_MAX_LENGTH)
        .trim_end()
        .to_string()
}

/// A valid email address, or an empty string
#[must_use]
pub fn email(value: &str) -> String {
    let candidate = strip_control(value, false);
    let candidate = candidate.trim();
    if candidate.validate_email() {
        candidate.to_string()
    } else {
        String::new()
    }
}

/// The leading signed integer, or `"0"`
#[must_use]
pub fn int(value: &str) -> String {
    let trimmed = value.trim();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[digits_start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();

    trimmed[..digits_start + digits_len]
        .parse::<i64>()
        .map_or_else(|_| "0".to_string(), |number| number.to_string())
}

/// Letters, digits, dot, dash and underscore only
#[must_use]
pub fn name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(NAME_MAX_LENGTH)
        .collect()
}
