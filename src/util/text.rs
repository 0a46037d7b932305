use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Terminal columns occupied by `s`.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_width` columns, ending in `…` when shortened.
///
/// Wide characters (CJK, emoji) are never split.
///
/// ```
/// use shelf::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Wooden train", 20), "Wooden train");
/// assert_eq!(truncate_to_width("Wooden train", 7), "Wooden…");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1; // room for the ellipsis
    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }

    let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
    out.push_str(&s[..end]);
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Make remote text safe to print on one terminal line.
///
/// Drops ANSI CSI (`ESC [ … final`) and OSC (`ESC ] … BEL|ESC \`) sequences
/// and other control characters; line breaks and tabs become single spaces.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\n' | '\r' | '\t' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("Robot", 5), Cow::Borrowed(_)));
        assert_eq!(truncate_to_width("", 0), "");
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello W…");
        assert_eq!(truncate_to_width("Hello", 1), "…");
        assert_eq!(truncate_to_width("Hello", 0), "");
    }

    #[test]
    fn test_wide_chars_not_split() {
        // each CJK char is 2 columns; budget 4 fits two of them
        assert_eq!(truncate_to_width("木製の電車", 5), "木製…");
        assert_eq!(display_width(&truncate_to_width("木製の電車", 6)), 5);
    }

    #[test]
    fn test_sanitize_clean_is_borrowed() {
        assert!(matches!(sanitize_line("Plain name"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize_line("\x1b[31mRed\x1b[0m car"), "Red car");
        assert_eq!(sanitize_line("\x1b]0;title\x07safe"), "safe");
        assert_eq!(sanitize_line("\x1b]0;title\x1b\\safe"), "safe");
        assert_eq!(sanitize_line("nul\x00 del\x7f"), "nul del");
    }

    #[test]
    fn test_sanitize_flattens_line_breaks() {
        assert_eq!(sanitize_line("two\r\nlines\tand tab"), "two lines and tab");
    }
}
