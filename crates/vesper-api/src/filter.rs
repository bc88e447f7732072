//! Strips `{...}` placeholders the assistant sometimes leaks into its replies.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// A brace span ends at the first closing brace; nesting is not handled.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// Remove every `{...}` span from assistant text.
pub fn filter(text: &str) -> String {
    filter_cow(text).into_owned()
}

/// Like [`filter`], borrowing when there is nothing to strip.
fn filter_cow(text: &str) -> Cow<'_, str> {
    PLACEHOLDER.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_single_span() {
        assert_eq!(filter("hello {ignored} world"), "hello  world");
    }

    #[test]
    fn test_removes_every_span() {
        assert_eq!(filter("{a}x{b}y{}z{c d}"), "xyz");
    }

    #[test]
    fn test_first_closing_brace_ends_span() {
        // "{outer {inner}" is one span, the trailing "}" survives
        assert_eq!(filter("a{outer {inner}}b"), "a}b");
    }

    #[test]
    fn test_unbalanced_braces_are_kept() {
        assert_eq!(filter("open { never closed"), "open { never closed");
        assert_eq!(filter("stray } brace"), "stray } brace");
    }

    #[test]
    fn test_span_across_lines() {
        assert_eq!(filter("x{\"tool\":\n\"noop\"}y"), "xy");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "hello {ignored} world",
            "a{outer {inner}}b",
            "}{",
            "plain text",
            "",
            "{{}}",
        ] {
            let once = filter(input);
            assert_eq!(filter(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_borrows_when_clean() {
        assert!(matches!(filter_cow("nothing here"), Cow::Borrowed(_)));
    }
}
