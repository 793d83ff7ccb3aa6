pub mod item_detail;
pub mod items;
pub mod overview;

/// Character-safe truncation for fixed-width columns.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// `filled` of `width` blocks.
pub fn bar(filled: usize, width: usize) -> String {
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Virtualization", 8), "Virtu...");
        assert_eq!(truncate("é", 1), "é");
    }

    #[test]
    fn truncate_keeps_short_and_exact() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate("ññññññ", 5), "ññ...");
    }

    #[test]
    fn bar_clamps_to_width() {
        assert_eq!(bar(3, 5), "███░░");
        assert_eq!(bar(9, 2), "██");
    }
}
