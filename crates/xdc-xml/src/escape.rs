#![forbid(unsafe_code)]

//! Entity escaping shared by canonical output and the element writer.
//!
//! Canonical XML fixes the escaping rules; the writer uses the same rules so
//! that a serialized XDC canonicalizes to bytes the writer itself produced:
//! - Text: `&` → `&amp;`, `<` → `&lt;`, `>` → `&gt;`, `\r` → `&#xD;`
//! - Attribute values: `&`, `<`, `"` plus `\t`, `\n`, `\r` as character references
//! - PI data: `\r` → `&#xD;`

/// Escape text node content.
pub fn escape_text(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

/// Escape an attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

/// Escape processing instruction data.
pub fn escape_pi(s: &str) -> String {
    escape_with(s, |ch| (ch == '\r').then_some("&#xD;"))
}

fn escape_with(s: &str, entity: impl Fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match entity(ch) {
            Some(reference) => out.push_str(reference),
            None => out.push(ch),
        }
    }
    out
}
