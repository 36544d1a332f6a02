//! Redaction helper for values that must not appear whole in logs.

/// Truncate an opaque value for logging, keeping a correlatable prefix.
pub fn redact(value: &str) -> String {
    const VISIBLE: usize = 8;
    let mut head: String = value.chars().take(VISIBLE).collect();
    if value.chars().count() > VISIBLE {
        head.push('…');
    }
    head
}
