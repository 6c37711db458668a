//! Markup stripping for rich editor content.
//!
//! The diff engine and the suggestion stream both work on plain text. Any
//! `<...>` run with at least one character between the brackets is removed;
//! everything else, including HTML entities and a stray unterminated `<`,
//! passes through unchanged.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Strip every markup tag from `rich` in a single left-to-right pass.
///
/// Idempotent: a `<` that survives one pass is either directly followed by
/// `>` or has no `>` after it at all, and removing text cannot change that.
pub fn normalize(rich: &str) -> String { TAG.replace_all(rich, "").into_owned() }

/// `true` when `text` has nothing but whitespace once markup is removed.
pub fn is_blank(text: &str) -> bool { normalize(text).trim().is_empty() }
