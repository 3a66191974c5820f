//! Minimal scanner for the styling service's markup fragments.
//!
//! The per-word styling payload wraps rule-carrying letters in tags such as
//! `<tajweed class=ham_wasl>ٱ</tajweed>`. The dominant rule colour for a word
//! is the value of the first `class` attribute found on any opening tag.
//! Anything unparseable yields `None`; malformed markup is never an error.

/// Value of the first `class` attribute on an opening tag in `fragment`.
pub fn first_class_attr(fragment: &str) -> Option<&str> {
    let mut rest = fragment;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            return None; // unterminated tag
        };
        let tag = &rest[open + 1..open + close];
        if !tag.starts_with('/') {
            if let Some(value) = class_attr(tag) {
                return Some(value);
            }
        }
        rest = &rest[open + close + 1..];
    }
    None
}

/// Scan the inside of one opening tag (`name attr=value …`) for `class`.
/// Values may be bare, single-quoted, or double-quoted.
fn class_attr(tag: &str) -> Option<&str> {
    // Skip the tag name.
    let mut rest = tag.trim_start();
    rest = match rest.find(char::is_whitespace) {
        Some(i) => &rest[i..],
        None => return None, // no attributes at all
    };

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = &rest[name_end..];

        // Bare attribute with no value.
        if !rest.starts_with('=') {
            if name == "class" {
                return None;
            }
            continue;
        }
        rest = &rest[1..];

        let (value, after) = if let Some(q) = rest.strip_prefix('"') {
            let end = q.find('"')?;
            (&q[..end], &q[end + 1..])
        } else if let Some(q) = rest.strip_prefix('\'') {
            let end = q.find('\'')?;
            (&q[..end], &q[end + 1..])
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        };

        if name == "class" {
            return (!value.is_empty()).then_some(value);
        }
        rest = after;
    }
}
