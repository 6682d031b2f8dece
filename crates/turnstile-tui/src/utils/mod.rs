//! Utility functions for the TUI

use std::path::Path;

/// Mask a secret for display
pub fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}

/// Enrollment digits laid out as fixed slots, e.g. `1 2 3 _ _`
pub fn digit_slots(digits: &str, slots: usize) -> String {
    let mut chars = digits.chars();
    (0..slots)
        .map(|_| chars.next().unwrap_or('_').to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Short display form of a saved file's location
pub fn display_path(path: &Path, max_len: usize) -> String {
    truncate(&path.display().to_string(), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("pässword"), "••••••••");
    }

    #[test]
    fn test_digit_slots() {
        assert_eq!(digit_slots("123", 5), "1 2 3 _ _");
        assert_eq!(digit_slots("", 4), "_ _ _ _");
        assert_eq!(digit_slots("1234", 4), "1 2 3 4");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 2), "he");
    }
}
