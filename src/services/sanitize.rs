//! Input sanitisation and HTML escaping

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE_BLOCKS: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>"));
static TAGS: Lazy<Option<Regex>> = Lazy::new(|| compile(r"<[^<>]*>"));
static WHITESPACE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| compile(r"[\r\n\t ]+"));
static PERCENT_OCTET: Lazy<Option<Regex>> = Lazy::new(|| compile(r"(?i)%[a-f0-9]{2}"));
static SPACE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| compile(r" +"));

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| tracing::error!("Invalid sanitiser pattern {}: {}", pattern, e))
        .ok()
}

fn replace_all(pattern: &Lazy<Option<Regex>>, text: &str, with: &str) -> String {
    match pattern.as_ref() {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Characters PHP-style `trim` removes
fn trim_text(text: &str) -> &str {
    text.trim_matches([' ', '\t', '\n', '\r', '\0', '\x0B'])
}

/// Clean a single-line text value from a request.
///
/// Strips tags (and script/style blocks entirely), encodes stray `<`,
/// collapses whitespace to single spaces, trims, and removes percent-encoded
/// octets.
pub fn sanitize_text_field(value: &str) -> String {
    let mut filtered = value.to_string();

    if filtered.contains('<') {
        filtered = replace_all(&SCRIPT_STYLE_BLOCKS, &filtered, "");
        filtered = replace_all(&TAGS, &filtered, "");
        filtered = filtered.replace('<', "&lt;");
    }

    filtered = replace_all(&WHITESPACE_RUNS, &filtered, " ");
    filtered = trim_text(&filtered).to_string();

    let mut found = false;
    if let Some(re) = PERCENT_OCTET.as_ref() {
        // removing one octet can join two halves into a new one
        while re.is_match(&filtered) {
            filtered = re.replace_all(&filtered, "").into_owned();
            found = true;
        }
    }
    if found {
        filtered = replace_all(&SPACE_RUNS, trim_text(&filtered), " ");
    }

    filtered
}

/// Escape text for HTML element content and attribute values
pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values_unchanged() {
        assert_eq!(sanitize_text_field("gallery"), "gallery");
        assert_eq!(sanitize_text_field("nav_menu_item"), "nav_menu_item");
        assert_eq!(sanitize_text_field("contact-form-7"), "contact-form-7");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(sanitize_text_field("  a \t\r\n b  "), "a b");
    }

    #[test]
    fn test_tags_stripped() {
        assert_eq!(sanitize_text_field("<b>post</b>"), "post");
        assert_eq!(sanitize_text_field("x<script>alert(1)</script>y"), "xy");
        assert_eq!(sanitize_text_field("a < b"), "a &lt; b");
    }

    #[test]
    fn test_percent_octets_removed() {
        assert_eq!(sanitize_text_field("gal%20lery"), "gallery");
        assert_eq!(sanitize_text_field("%2%41b"), "b");
        assert_eq!(sanitize_text_field("a %41 b"), "a b");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"[gallery ids="1,2"]"#),
            "[gallery ids=&quot;1,2&quot;]"
        );
        assert_eq!(html_escape("<a href='x'>&</a>"), "&lt;a href=&#039;x&#039;&gt;&amp;&lt;/a&gt;");
    }
}
