// src/utils.rs
// Shared utility functions

use std::time::Duration;

/// Truncate a string to at most `max_chars` characters with ellipsis.
///
/// Cuts on a character boundary, so multi-byte text never panics.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Join a field path segment onto a parent path
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("héllo wörld", 7), "héllo w...");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "i"), "i");
        assert_eq!(join_path("sr", "i"), "sr.i");
        assert_eq!(join_path("simple.SimpleClass", "0"), "simple.SimpleClass.0");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_micros(2_500)), 2);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
