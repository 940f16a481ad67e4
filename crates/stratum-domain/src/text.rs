//! Text helpers shared by the context assembler and review payloads

/// Cut `text` to at most `max_chars` characters for single-line display
///
/// Control characters (including newlines) become spaces, so an excerpt
/// never breaks the line structure it is embedded in. Truncation happens on
/// character boundaries, drops a dangling escape backslash, and appends `…`.
///
/// # Examples
///
/// ```
/// use stratum_domain::text::excerpt;
///
/// assert_eq!(excerpt("short", 10), "short");
/// assert_eq!(excerpt("line one\nline two", 8), "line one…");
/// ```
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let flattened = flattened.trim();

    if flattened.chars().count() <= max_chars {
        return flattened.to_string();
    }

    let mut cut: String = flattened.chars().take(max_chars).collect();
    while cut.ends_with('\\') {
        cut.pop();
    }
    let mut cut = cut.trim_end().to_string();
    cut.push('…');
    cut
}
