//! Shortcode matcher
//!
//! Finds `[name attr="value"]`, `[name/]` and `[name]content[/name]` markup in
//! raw text. Matching is single pass and left to right: once an occurrence is
//! found, scanning resumes after its end, so enclosed content is never
//! rescanned. `[[name]]` is one escaped occurrence.
//!
//! Only names known to a [`TagRegistry`] are matched, unless the caller asks
//! for one specific name.

use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Shortcodes the host registers out of the box
pub const CORE_SHORTCODES: &[&str] = &[
    "wp_caption",
    "caption",
    "gallery",
    "playlist",
    "audio",
    "video",
    "embed",
];

/// One shortcode found in a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcodeOccurrence {
    /// Verbatim matched text, brackets included
    pub text: String,
    pub tag: String,
    /// Byte offset of the first `[`
    pub start: usize,
    /// Byte offset just past the last `]`
    pub end: usize,
    /// Raw text between the name and the closing `]` or `/]`
    pub attributes: String,
    /// Text between `[name ...]` and `[/name]` for enclosing forms
    pub content: Option<String>,
    pub self_closing: bool,
    /// Written as `[[name]]`, i.e. meant as literal text
    pub escaped: bool,
}

/// Read-only view of the registered shortcode names
pub trait TagRegistry: Send + Sync {
    /// Registered names in registration order
    fn tags(&self) -> Vec<String>;

    fn contains(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

/// Whether `name` can be used as a shortcode name
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '[' | ']' | '<' | '>' | '&' | '/' | '=' | '"' | '\'')
        })
}

/// In-memory, ordered shortcode registry
#[derive(Default)]
pub struct ShortcodeRegistry {
    tags: RwLock<Vec<String>>,
}

impl ShortcodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with [`CORE_SHORTCODES`]
    pub fn with_core_tags() -> Self {
        let registry = Self::new();
        for tag in CORE_SHORTCODES {
            registry.register(tag);
        }
        registry
    }

    /// Register a name. Invalid names are rejected and duplicates keep their
    /// original position. Returns whether the registry changed.
    pub fn register(&self, tag: &str) -> bool {
        if !is_valid_tag_name(tag) {
            warn!("Rejected invalid shortcode name: {:?}", tag);
            return false;
        }

        let mut tags = self.tags.write().unwrap_or_else(|e| e.into_inner());
        if tags.iter().any(|t| t == tag) {
            return false;
        }
        tags.push(tag.to_string());
        debug!("Registered shortcode: [{}]", tag);
        true
    }

    pub fn unregister(&self, tag: &str) -> bool {
        let mut tags = self.tags.write().unwrap_or_else(|e| e.into_inner());
        let before = tags.len();
        tags.retain(|t| t != tag);
        before != tags.len()
    }
}

impl TagRegistry for ShortcodeRegistry {
    fn tags(&self) -> Vec<String> {
        self.tags.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn contains(&self, tag: &str) -> bool {
        self.tags
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|t| t == tag)
    }
}

/// Matcher bound to a tag registry
#[derive(Clone)]
pub struct ShortcodeMatcher {
    registry: Arc<dyn TagRegistry>,
}

impl ShortcodeMatcher {
    pub fn new(registry: Arc<dyn TagRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn TagRegistry> {
        &self.registry
    }

    /// Find shortcodes in `text`.
    ///
    /// With `tag`, only that name is matched (registered or not). Without it,
    /// every name in the registry at call time is matched, earlier
    /// registrations winning when several could start at the same position.
    pub fn find_shortcodes(&self, text: &str, tag: Option<&str>) -> Vec<ShortcodeOccurrence> {
        match tag {
            Some(tag) => find_tags(text, &[tag]),
            None => find_tags(text, &self.registry.tags()),
        }
    }
}

/// Find occurrences of any of `names` in `text`, trying names in order.
/// Invalid names are ignored.
pub fn find_tags<S: AsRef<str>>(text: &str, names: &[S]) -> Vec<ShortcodeOccurrence> {
    let names: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| is_valid_tag_name(name))
        .collect();
    if names.is_empty() || !text.contains('[') {
        return Vec::new();
    }

    let mut scanner = Scanner::new(text, names.len());
    let mut occurrences = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let start = pos + offset;
        match scanner.match_at(start, &names) {
            Some(occurrence) => {
                pos = occurrence.end;
                occurrences.push(occurrence);
            }
            None => pos = start + 1,
        }
    }

    occurrences
}

/// Cached result of a forward search: `(searched_from, found_at)`
type Memo = Option<(usize, Option<usize>)>;

/// Scan state over one text. Forward searches are memoised so that many
/// unterminated openings do not rescan the rest of the text each time.
struct Scanner<'t> {
    text: &'t str,
    next_bracket: Memo,
    closing_tags: Vec<Memo>,
}

impl<'t> Scanner<'t> {
    fn new(text: &'t str, name_count: usize) -> Self {
        Self {
            text,
            next_bracket: None,
            closing_tags: vec![None; name_count],
        }
    }

    /// Try every name at the `[` found at `start`
    fn match_at(&mut self, start: usize, names: &[&str]) -> Option<ShortcodeOccurrence> {
        let opened_twice = self.text.as_bytes().get(start + 1) == Some(&b'[');
        let name_start = if opened_twice { start + 2 } else { start + 1 };

        names
            .iter()
            .enumerate()
            .find_map(|(index, name)| self.match_name(start, name_start, opened_twice, index, name))
    }

    fn match_name(
        &mut self,
        start: usize,
        name_start: usize,
        opened_twice: bool,
        index: usize,
        name: &str,
    ) -> Option<ShortcodeOccurrence> {
        let text = self.text;
        let bytes = text.as_bytes();

        if !bytes.get(name_start..)?.starts_with(name.as_bytes()) {
            return None;
        }
        let name_end = name_start + name.len();
        if bytes.get(name_end).is_some_and(|b| is_word_byte(*b)) {
            return None;
        }

        // Attributes never contain `]`, so the tag closes at the first one.
        let close = memo_find(&mut self.next_bracket, text, name_end, "]")?;
        let self_closing = close > name_end && bytes[close - 1] == b'/';
        let attributes_end = if self_closing { close - 1 } else { close };

        let mut end = close + 1;
        let mut content = None;
        if !self_closing {
            let closing_tag = format!("[/{}]", name);
            if let Some(at) = memo_find(&mut self.closing_tags[index], text, end, &closing_tag) {
                content = Some(text[end..at].to_string());
                end = at + closing_tag.len();
            }
        }

        let closed_twice = bytes.get(end) == Some(&b']');
        if closed_twice {
            end += 1;
        }

        Some(ShortcodeOccurrence {
            text: text[start..end].to_string(),
            tag: name.to_string(),
            start,
            end,
            attributes: text[name_end..attributes_end].to_string(),
            content,
            self_closing,
            escaped: opened_twice && closed_twice,
        })
    }
}

/// Characters that continue a name: ASCII word characters and `-`
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// First position of `needle` at or after `from`, reusing the previous
/// search when it already answers the question.
fn memo_find(memo: &mut Memo, haystack: &str, from: usize, needle: &str) -> Option<usize> {
    if let Some((searched_from, found)) = *memo {
        if from >= searched_from {
            match found {
                None => return None,
                Some(at) if from <= at => return Some(at),
                Some(_) => {}
            }
        }
    }

    let found = haystack.get(from..)?.find(needle).map(|i| from + i);
    *memo = Some((from, found));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(tags: &[&str]) -> ShortcodeMatcher {
        let registry = ShortcodeRegistry::new();
        for tag in tags {
            registry.register(tag);
        }
        ShortcodeMatcher::new(Arc::new(registry))
    }

    fn texts(occurrences: &[ShortcodeOccurrence]) -> Vec<&str> {
        occurrences.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn test_no_brackets() {
        let m = matcher(&["gallery"]);
        assert!(m.find_shortcodes("plain text", None).is_empty());
        assert!(m.find_shortcodes("", None).is_empty());
    }

    #[test]
    fn test_self_closing_with_attributes() {
        let m = matcher(&["gallery"]);
        let found = m.find_shortcodes(r#"Look: [gallery ids="1,2"] done"#, None);
        assert_eq!(texts(&found), vec![r#"[gallery ids="1,2"]"#]);
        assert_eq!(found[0].attributes, r#" ids="1,2""#);
        assert_eq!(found[0].start, 6);
        assert!(!found[0].self_closing);
        assert!(found[0].content.is_none());

        let found = m.find_shortcodes(r#"[gallery ids="3" /]"#, None);
        assert_eq!(texts(&found), vec![r#"[gallery ids="3" /]"#]);
        assert!(found[0].self_closing);
        assert_eq!(found[0].attributes, r#" ids="3" "#);
    }

    #[test]
    fn test_escaped() {
        let m = matcher(&["gallery"]);
        let found = m.find_shortcodes("[[gallery]]", None);
        assert_eq!(texts(&found), vec!["[[gallery]]"]);
        assert!(found[0].escaped);

        let found = m.find_shortcodes("[[gallery]]x[[/gallery]] [gallery]", None);
        assert_eq!(texts(&found), vec!["[[gallery]]x[[/gallery]]", "[gallery]"]);
        assert!(found[0].escaped);
        assert!(!found[1].escaped);
    }

    #[test]
    fn test_escaped_enclosing() {
        let m = matcher(&["quote"]);
        let found = m.find_shortcodes("[[quote]Hi[/quote]]", None);
        assert_eq!(texts(&found), vec!["[[quote]Hi[/quote]]"]);
        assert!(found[0].escaped);
        assert_eq!(found[0].content.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_enclosing() {
        let m = matcher(&["quote"]);
        let found = m.find_shortcodes("a [quote]Hello[/quote] b", None);
        assert_eq!(texts(&found), vec!["[quote]Hello[/quote]"]);
        assert_eq!(found[0].content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_word_boundary() {
        let m = matcher(&["tag"]);
        assert!(m.find_shortcodes("[tag-extra]", Some("tag")).is_empty());
        assert!(m.find_shortcodes("[tag_extra]", None).is_empty());
        assert!(m.find_shortcodes("[tagX]", None).is_empty());
        assert_eq!(texts(&m.find_shortcodes("[tag.x]", None)), vec!["[tag.x]"]);
    }

    #[test]
    fn test_unterminated_opening() {
        let m = matcher(&["gallery"]);
        assert!(m.find_shortcodes("[gallery ids=1", None).is_empty());
        let found = m.find_shortcodes("[gallery ids=1 [gallery]", None);
        assert_eq!(texts(&found), vec!["[gallery ids=1 [gallery]"]);
    }

    #[test]
    fn test_opening_without_closing_tag_stands_alone() {
        let m = matcher(&["gallery", "audio"]);
        let found = m.find_shortcodes("[gallery] text [audio]", None);
        assert_eq!(texts(&found), vec!["[gallery]", "[audio]"]);
    }

    #[test]
    fn test_nested_same_name_is_not_rescanned() {
        let m = matcher(&["box"]);
        let found = m.find_shortcodes("[box]a[box]b[/box]c[/box]", None);
        assert_eq!(texts(&found), vec!["[box]a[box]b[/box]"]);
        assert_eq!(found[0].content.as_deref(), Some("a[box]b"));
    }

    #[test]
    fn test_inner_content_not_rescanned() {
        let m = matcher(&["quote", "gallery"]);
        let found = m.find_shortcodes("[quote][gallery][/quote] [gallery]", None);
        assert_eq!(texts(&found), vec!["[quote][gallery][/quote]", "[gallery]"]);
    }

    #[test]
    fn test_specific_tag_only() {
        let m = matcher(&["gallery", "audio"]);
        let body = "[audio src=x] [gallery] [video]";
        assert_eq!(texts(&m.find_shortcodes(body, Some("gallery"))), vec!["[gallery]"]);
        // a specific tag does not need to be registered
        assert_eq!(texts(&m.find_shortcodes(body, Some("video"))), vec!["[video]"]);
    }

    #[test]
    fn test_case_sensitive() {
        let m = matcher(&["gallery"]);
        assert!(m.find_shortcodes("[Gallery]", None).is_empty());
        assert!(m.find_shortcodes("[gallery]", Some("Gallery")).is_empty());
    }

    #[test]
    fn test_registry_order_wins() {
        let m = matcher(&["a.b", "a"]);
        let found = m.find_shortcodes("[a.b]", None);
        assert_eq!(found[0].tag, "a.b");

        let m = matcher(&["a", "a.b"]);
        let found = m.find_shortcodes("[a.b]", None);
        assert_eq!(found[0].tag, "a");
        assert_eq!(found[0].attributes, ".b");
    }

    #[test]
    fn test_empty_registry_and_invalid_filter() {
        let m = matcher(&[]);
        assert!(m.find_shortcodes("[gallery]", None).is_empty());
        assert!(m.find_shortcodes("[gallery]", Some("")).is_empty());
        assert!(m.find_shortcodes("[a b]", Some("a b")).is_empty());
        assert!(m.find_shortcodes("[a/]", Some("a/")).is_empty());
    }

    #[test]
    fn test_trailing_bracket_is_consumed() {
        let m = matcher(&["gallery"]);
        let found = m.find_shortcodes("[gallery]]", None);
        assert_eq!(texts(&found), vec!["[gallery]]"]);
        assert!(!found[0].escaped);
    }

    #[test]
    fn test_multibyte_text() {
        let m = matcher(&["gallery"]);
        let found = m.find_shortcodes("日本語 [gallery title=\"写真\"] ü", None);
        assert_eq!(texts(&found), vec!["[gallery title=\"写真\"]"]);
    }

    #[test]
    fn test_registry_rejects_invalid_and_duplicate() {
        let registry = ShortcodeRegistry::with_core_tags();
        assert!(!registry.register("gallery"));
        assert!(!registry.register("bad name"));
        assert!(!registry.register("a=b"));
        assert!(registry.register("contact-form"));
        assert_eq!(registry.tags().len(), CORE_SHORTCODES.len() + 1);
        assert!(registry.contains("contact-form"));

        assert!(registry.unregister("contact-form"));
        assert!(!registry.contains("contact-form"));
    }

    #[test]
    fn test_registry_changes_visible_at_call_time() {
        let registry = Arc::new(ShortcodeRegistry::new());
        let m = ShortcodeMatcher::new(registry.clone());
        assert!(m.find_shortcodes("[later]", None).is_empty());

        registry.register("later");
        assert_eq!(texts(&m.find_shortcodes("[later]", None)), vec!["[later]"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Text without `[` never yields occurrences
        #[test]
        fn no_bracket_no_occurrence(text in "[^\\[]{0,200}") {
            prop_assert!(find_tags(&text, &["gallery", "a"]).is_empty());
        }

        /// Occurrences are verbatim, bracketed, ordered and non-overlapping
        #[test]
        fn occurrences_are_ordered_slices(text in "[a-z\\[\\]/ =\"]{0,120}") {
            let found = find_tags(&text, &["a", "ab", "b"]);
            let mut last_end = 0;
            for occurrence in &found {
                prop_assert!(occurrence.start >= last_end);
                prop_assert_eq!(&text[occurrence.start..occurrence.end], occurrence.text.as_str());
                prop_assert!(occurrence.text.starts_with('['));
                prop_assert!(occurrence.text.ends_with(']'));
                last_end = occurrence.end;
            }
        }

        /// A lone shortcode with simple attributes is found exactly once
        #[test]
        fn single_shortcode_found(
            prefix in "[a-z ]{0,20}",
            attrs in "( [a-z]{1,5}=\"[a-z0-9]{0,5}\"){0,3}",
            suffix in "[a-z ]{0,20}",
        ) {
            let shortcode = format!("[gallery{}]", attrs);
            let text = format!("{}{}{}", prefix, shortcode, suffix);
            let found = find_tags(&text, &["gallery"]);
            prop_assert_eq!(found.len(), 1);
            prop_assert_eq!(&found[0].text, &shortcode);
        }
    }
}
