//! Shared helper functions for CLI commands

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Counts chars, not bytes; cell values and headers are arbitrary UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a rather long value", 10), "a rathe...");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // A cut point landing inside a multibyte char must not panic
        let header = format!("{}ééééé", "a".repeat(36));
        assert_eq!(truncate_str(&header, 40), format!("{}é", "a".repeat(36)) + "...");
        assert_eq!(truncate_str("numéro de série", 20), "numéro de série");
        assert_eq!(truncate_str("číslo šarže zařízení", 10), "číslo š...");
    }
}
