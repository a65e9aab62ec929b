use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended to truncated titles.
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string so it occupies at most `max_width` terminal columns.
///
/// Titles that fit are returned borrowed. Longer ones are cut on a character
/// boundary and suffixed with `...`. Widths of 3 or less leave no room for the
/// ellipsis, so as many whole characters as fit are returned instead.
///
/// ```
/// use popcorn::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Inception", 20), "Inception");
/// assert_eq!(truncate_to_width("The Lord of the Rings", 10), "The Lor...");
/// assert_eq!(truncate_to_width("Heat", 2), "He");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Strips terminal control characters and ANSI escape sequences.
///
/// Catalog text (titles, plots, cast lists) comes from a third party and is
/// rendered straight into the terminal, so CSI/OSC sequences and C0 controls
/// are removed. Tab, newline and carriage return survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_control = |b: u8| b == 0x1b || b == 0x7f || (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'));

    if !s.bytes().any(is_control) {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                // CSI: parameters until a final byte in 0x40..=0x7e
                i += 2;
                while i < bytes.len() {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            }
            0x1b if bytes.get(i + 1) == Some(&b']') => {
                // OSC: runs until BEL or ST
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b if is_control(b) => i += 1,
            _ => {
                let start = i;
                while i < bytes.len() && !is_control(bytes[i]) {
                    i += 1;
                }
                // Control bytes are ASCII and never split a code point.
                out.push_str(&s[start..i]);
            }
        }
    }

    Cow::Owned(out)
}
