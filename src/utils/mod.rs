//! Utility functions.
//!
//! Collection of helper functions used across the bot.

/// Escape text for inclusion in HTML-formatted Telegram messages or pages.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Current unix time in seconds.
pub fn now_ts() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// "First Last" display name, with the last name omitted when absent.
pub fn full_name(first: &str, last: Option<&str>) -> String {
    match last {
        Some(last) if !last.trim().is_empty() => format!("{} {}", first.trim(), last.trim()),
        _ => first.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("Ada", Some("Lovelace")), "Ada Lovelace");
        assert_eq!(full_name("Ada", None), "Ada");
        assert_eq!(full_name("Ada", Some("  ")), "Ada");
    }
}
