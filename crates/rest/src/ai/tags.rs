//! Tagged section extraction from model output.
//!
//! Prompts ask the model to wrap parts of its reply in `<NAME>...</NAME>`
//! markers. Tag names are ASCII letters, digits, `_` or `-` and match
//! case-insensitively. A missing or unterminated tag is simply absent.

/// Returns true if `name` is a valid tag name.
fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Extracts the trimmed content of the first complete `<name>` section.
///
/// ```
/// use wattle_rest::ai::extract_tag;
///
/// let reply = "Thinking...\n<ANSWER>\n  Your LDL is high.\n</ANSWER>";
/// assert_eq!(extract_tag(reply, "answer").as_deref(), Some("Your LDL is high."));
/// assert_eq!(extract_tag("<ANSWER>cut off", "ANSWER"), None);
/// ```
pub fn extract_tag(text: &str, name: &str) -> Option<String> {
    if !is_tag_name(name) {
        return None;
    }

    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let haystack = text.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);

    let start = haystack.find(&open)? + open.len();
    let end = start + haystack[start..].find(&close)?;
    Some(text[start..end].trim().to_string())
}

/// Extracts `name`, falling back to the whole trimmed text.
pub fn extract_tag_or_all(text: &str, name: &str) -> String {
    extract_tag(text, name).unwrap_or_else(|| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            extract_tag("<Summary>ok</SUMMARY>", "summary").as_deref(),
            Some("ok")
        );
    }

    #[test]
    fn test_first_complete_occurrence_wins() {
        let text = "<A>one</A> <A>two</A>";
        assert_eq!(extract_tag(text, "A").as_deref(), Some("one"));
    }

    #[test]
    fn test_missing_and_unterminated() {
        assert_eq!(extract_tag("no tags here", "ANSWER"), None);
        assert_eq!(extract_tag("<ANSWER>dangling", "ANSWER"), None);
        assert_eq!(extract_tag("</ANSWER>backwards<ANSWER>", "ANSWER"), None);
    }

    #[test]
    fn test_invalid_name() {
        assert_eq!(extract_tag("<a b>x</a b>", "a b"), None);
        assert_eq!(extract_tag("<>x</>", ""), None);
    }

    #[test]
    fn test_non_ascii_content_is_preserved() {
        let text = "<ANSWER> Ünïcödé İstanbul </ANSWER>";
        assert_eq!(
            extract_tag(text, "answer").as_deref(),
            Some("Ünïcödé İstanbul")
        );
    }

    #[test]
    fn test_fallback_to_all() {
        assert_eq!(extract_tag_or_all("  plain reply ", "ANSWER"), "plain reply");
        assert_eq!(extract_tag_or_all("<ANSWER>x</ANSWER>", "ANSWER"), "x");
    }

    #[test]
    fn test_names_with_dash_and_underscore() {
        let text = "<key-points>a</key-points><next_steps>b</next_steps>";
        assert_eq!(extract_tag(text, "KEY-POINTS").as_deref(), Some("a"));
        assert_eq!(extract_tag(text, "next_steps").as_deref(), Some("b"));
    }
}
