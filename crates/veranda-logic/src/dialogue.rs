//! Cleanup of raw generated dialogue text.
//!
//! The text-generation capability is asked for a single complete spoken
//! sentence but models routinely return wrapping quotes, trailing
//! whitespace, or a cut-off final clause. [`clean_generated_line`] settles
//! the raw text into something a character can say out loud, or `None`
//! when nothing usable remains.

/// Characters that end a spoken sentence.
const TERMINALS: [char; 4] = ['.', '!', '?', '…'];

/// Quote pairs that may wrap a whole line.
const QUOTE_PAIRS: [(char, char); 4] = [
    ('"', '"'),
    ('\'', '\''),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
];

/// Normalize a raw generated line.
///
/// Trims whitespace and strips wrapping quotes. If the result does not end
/// in terminal punctuation it is truncated back to the last sentence
/// boundary; text with no boundary at all is accepted as-is. Returns `None`
/// only when nothing remains.
pub fn clean_generated_line(raw: &str) -> Option<String> {
    let mut text = raw.trim().to_string();
    loop {
        let stripped = strip_wrapping_quotes(&text);
        if stripped == text {
            break;
        }
        text = stripped;
    }
    if text.is_empty() {
        return None;
    }
    if text.ends_with(|c| TERMINALS.contains(&c)) {
        return Some(text);
    }
    match text.rfind(|c| TERMINALS.contains(&c)) {
        Some(idx) => {
            let boundary = idx + text[idx..].chars().next().map_or(1, char::len_utf8);
            let cut = text[..boundary].trim().to_string();
            if cut.is_empty() {
                None
            } else {
                Some(cut)
            }
        }
        // No boundary anywhere: accept the fragment rather than dropping it.
        None => Some(text),
    }
}

fn strip_wrapping_quotes(s: &str) -> String {
    let mut chars = s.chars();
    let (Some(first), Some(last)) = (chars.next(), s.chars().next_back()) else {
        return s.to_string();
    };
    if s.chars().count() < 2 {
        return s.to_string();
    }
    if QUOTE_PAIRS.iter().any(|&(open, close)| first == open && last == close) {
        let inner = &s[first.len_utf8()..s.len() - last.len_utf8()];
        inner.trim().to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_complete_sentence() {
        assert_eq!(
            clean_generated_line("  Lovely evening, isn't it?  "),
            Some("Lovely evening, isn't it?".to_string())
        );
    }

    #[test]
    fn strips_wrapping_quotes() {
        assert_eq!(
            clean_generated_line("\"Welcome back to the atrium.\""),
            Some("Welcome back to the atrium.".to_string())
        );
        assert_eq!(
            clean_generated_line("\u{201C}The garden is in bloom.\u{201D}"),
            Some("The garden is in bloom.".to_string())
        );
    }

    #[test]
    fn strips_nested_quotes() {
        assert_eq!(
            clean_generated_line("'\"One moment, please.\"'"),
            Some("One moment, please.".to_string())
        );
    }

    #[test]
    fn truncates_incomplete_tail() {
        assert_eq!(
            clean_generated_line("The fountain is lovely today. And as for the"),
            Some("The fountain is lovely today.".to_string())
        );
    }

    #[test]
    fn fragment_without_boundary_accepted_as_is() {
        assert_eq!(
            clean_generated_line("Welcome to the hotel"),
            Some("Welcome to the hotel".to_string())
        );
    }

    #[test]
    fn empty_and_whitespace_yield_none() {
        assert_eq!(clean_generated_line(""), None);
        assert_eq!(clean_generated_line("   "), None);
        assert_eq!(clean_generated_line("\"\""), None);
    }

    #[test]
    fn lone_quote_char_survives_stripping() {
        // A single quote character is not a wrapped pair.
        assert_eq!(clean_generated_line("\""), Some("\"".to_string()));
    }

    #[test]
    fn multibyte_terminal_handled() {
        assert_eq!(
            clean_generated_line("Right this way… if you"),
            Some("Right this way…".to_string())
        );
    }
}
