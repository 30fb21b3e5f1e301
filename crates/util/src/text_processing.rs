//! # Text Processing Utilities
//!
//! Redaction of credential-looking values before they reach logs or the
//! in-app diagnostics strip, plus small display helpers.

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Redacts values that look like secrets in a string.
///
/// Authorization headers, bearer tokens, and `*_KEY=`/`*_TOKEN=`-style
/// assignments have their values replaced with `[REDACTED]` while the key
/// names stay visible for debugging.
///
/// # Example
/// ```rust
/// use listpeek_util::redact_sensitive;
///
/// let redacted = redact_sensitive("LISTPEEK_ACCESS_TOKEN=abc123 ok");
/// assert_eq!(redacted, "LISTPEEK_ACCESS_TOKEN=[REDACTED] ok");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}")
            })
            .to_string();
    }

    redacted
}

/// Compiled redaction patterns, most specific first. Capture group 1 is kept.
fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)",
            r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
            r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s&]+)",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("redaction pattern compiles"))
        .collect()
    });

    &REDACT_PATTERNS
}

/// Shorten `text` to at most `max_chars` characters, ending with `…` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}
