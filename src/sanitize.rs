// Text validation and HTML escaping for task text

/// True if `text` has at least one non-whitespace character
pub fn validate_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Trim, then escape `& < > " '` as HTML entities.
///
/// `&` is escaped first so entities produced by the later replacements are not
/// escaped again. Not idempotent: sanitizing twice double-escapes `&`.
pub fn sanitize_text(text: &str) -> String {
    text.trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
