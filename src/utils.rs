//! Text helpers shared by exemplar quoting and reporting.

use crate::constants::clustering::QUOTE_ELLIPSIS;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Whitespace-collapsed quote of `text` holding at most `max_chars` chars.
///
/// Longer text is cut at the last word boundary in the second half of the
/// budget (or mid-word when there is none) and ends with an ellipsis that
/// counts toward the budget. Returns `None` when nothing printable remains.
pub fn quote_excerpt(text: &str, max_chars: usize) -> Option<String> {
    let collapsed = normalize_inline_whitespace(text);
    if collapsed.is_empty() || max_chars == 0 {
        return None;
    }
    if collapsed.chars().count() <= max_chars {
        return Some(collapsed);
    }

    let budget = max_chars - 1;
    let head: String = collapsed.chars().take(budget).collect();
    let cut = match head.rfind(' ') {
        Some(pos) if head[..pos].chars().count() >= budget / 2 => head[..pos].trim_end(),
        _ => head.trim_end(),
    };
    Some(format!("{cut}{QUOTE_ELLIPSIS}"))
}
