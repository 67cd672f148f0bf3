//! Small markup helpers for the email bodies

use once_cell::sync::Lazy;
use regex::Regex;

use crate::forms::sanitizer::strip_tags;

static LINE_BREAK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6])\s*>").expect("line break pattern is valid")
});

/// Escape text for HTML content and attribute values
///
/// ```rust
/// use formmail::email::markup::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replace every line break (`\r\n`, `\n` or `\r`) with `<br>`
#[must_use]
pub fn nl2br(value: &str) -> String {
    let mut converted = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                converted.push_str("<br>");
            }
            '\n' => converted.push_str("<br>"),
            _ => converted.push(c),
        }
    }
    converted
}

/// Turn a markup fragment into plain text
///
/// Line break tags and closing block tags become newlines, all other tags are
/// dropped and the common entities are decoded.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let with_breaks = LINE_BREAK_TAG.replace_all(html, "\n");
    let stripped = strip_tags(&with_breaks);
    decode_entities(&stripped).trim().to_string()
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("Hello World"), "Hello World");
    }

    #[test]
    fn test_nl2br_variants() {
        assert_eq!(nl2br("a\nb"), "a<br>b");
        assert_eq!(nl2br("a\r\nb"), "a<br>b");
        assert_eq!(nl2br("a\rb\n"), "a<br>b<br>");
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>Sent from <b>website</b></p><p>Tom &amp; Jerry</p>"),
            "Sent from website\nTom & Jerry"
        );
        assert_eq!(html_to_text("one<br>two<BR />three"), "one\ntwo\nthree");
    }

    #[test]
    fn test_decode_does_not_double_decode() {
        assert_eq!(html_to_text("&amp;lt;"), "&lt;");
    }
}
