//! Extension points shared with the host
//!
//! - Filter hooks that let integrations adjust exclusions and columns
//! - The shortcode registry and matcher

pub mod hooks;
pub mod shortcode;

pub use hooks::{hook_names, HookManager};
pub use shortcode::{
    find_tags, is_valid_tag_name, ShortcodeMatcher, ShortcodeOccurrence, ShortcodeRegistry,
    TagRegistry, CORE_SHORTCODES,
};
