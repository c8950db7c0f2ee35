// Output formatting — terminal display and JSON export.

pub mod export;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and never panics on multi-byte characters like Hangul.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_hangul_on_char_boundary() {
        assert_eq!(truncate_chars("국밥이 맛있어요", 3), "국밥이...");
        assert_eq!(truncate_chars("짧다", 10), "짧다");
    }
}
