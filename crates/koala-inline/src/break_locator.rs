//! Soft wrap opportunity lookup.
//!
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "When inline-level content is laid out into lines, it is broken across
//! line boxes. Such a break is called a line break."
//!
//! ASCII text uses a fast rule: a break is allowed before a breakable
//! space and after a hyphen, a question mark or a soft hyphen. Whenever a
//! non-ASCII character is involved, the decision is deferred to the UAX
//! #14 line breaking algorithm (`unicode-linebreak`).

use unicode_linebreak::{BreakOpportunity, linebreaks};

use crate::classify::{NO_BREAK_SPACE, SOFT_HYPHEN};

const fn is_breakable_space(ch: char, treat_nbsp_as_break: bool) -> bool {
    match ch {
        ' ' | '\n' | '\t' => true,
        NO_BREAK_SPACE => treat_nbsp_as_break,
        _ => false,
    }
}

const fn should_break_after(ch: char) -> bool {
    matches!(ch, '-' | '?' | SOFT_HYPHEN)
}

const fn needs_line_break_iterator(ch: char) -> bool {
    ch as u32 > 0x7F && ch != NO_BREAK_SPACE
}

/// [UAX #14](https://www.unicode.org/reports/tr14/)
///
/// Compute the character indices before which UAX #14 permits a break,
/// in ascending order. The end of the text is always included.
#[must_use]
pub fn unicode_break_opportunities(text: &[char]) -> Vec<usize> {
    let string: String = text.iter().collect();

    // Map byte offsets reported by the iterator back to char indices.
    let mut byte_to_char = Vec::with_capacity(string.len() + 1);
    for (index, ch) in text.iter().enumerate() {
        byte_to_char.extend(std::iter::repeat_n(index, ch.len_utf8()));
    }
    byte_to_char.push(text.len());

    linebreaks(&string)
        .filter(|(_, opportunity)| {
            matches!(
                opportunity,
                BreakOpportunity::Mandatory | BreakOpportunity::Allowed
            )
        })
        .filter_map(|(byte, _)| byte_to_char.get(byte).copied())
        .collect()
}

/// Find the first index `i >= from` such that a line break is permitted
/// immediately before `text[i]`, or `text.len()` if there is none.
///
/// `unicode_breaks` supplies the UAX #14 opportunities for the whole text
/// (see [`unicode_break_opportunities`]); it is only called when a
/// non-ASCII character is encountered, so callers can compute it lazily.
pub fn next_breakable_position<'a>(
    text: &[char],
    from: usize,
    treat_nbsp_as_break: bool,
    unicode_breaks: impl Fn() -> &'a [usize],
) -> usize {
    let mut next_break: Option<usize> = None;
    let mut last_ch = if from > 0 {
        text.get(from - 1).copied().unwrap_or('\0')
    } else {
        '\0'
    };

    for (i, &ch) in text.iter().enumerate().skip(from) {
        if is_breakable_space(ch, treat_nbsp_as_break) || should_break_after(last_ch) {
            return i;
        }

        if needs_line_break_iterator(ch) || needs_line_break_iterator(last_ch) {
            if i > 0 && next_break.is_none_or(|b| b < i) {
                // First opportunity strictly after `i - 1`.
                let breaks = unicode_breaks();
                next_break = breaks.get(breaks.partition_point(|&b| b < i)).copied();
            }
            if next_break == Some(i) && !is_breakable_space(last_ch, treat_nbsp_as_break) {
                return i;
            }
        }

        last_ch = ch;
    }

    text.len()
}

/// Returns true if a break is permitted before `text[pos]`.
///
/// `next_breakable` caches the last computed opportunity so that a
/// forward scan over one text item stays linear: the text is only
/// rescanned once `pos` moves past the cached position.
pub fn is_breakable<'a>(
    text: &[char],
    pos: usize,
    next_breakable: &mut Option<usize>,
    treat_nbsp_as_break: bool,
    unicode_breaks: impl Fn() -> &'a [usize],
) -> bool {
    if next_breakable.is_none_or(|next| pos > next) {
        *next_breakable = Some(next_breakable_position(
            text,
            pos,
            treat_nbsp_as_break,
            unicode_breaks,
        ));
    }
    *next_breakable == Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn next(text: &[char], from: usize) -> usize {
        let breaks = unicode_break_opportunities(text);
        next_breakable_position(text, from, false, || &breaks)
    }

    #[test]
    fn test_breaks_before_space() {
        let text = chars("Hello world");
        assert_eq!(next(&text, 0), 5);
        assert_eq!(next(&text, 5), 5);
        assert_eq!(next(&text, 6), 11);
    }

    #[test]
    fn test_breaks_after_hyphen_and_question_mark() {
        let text = chars("well-known?yes");
        assert_eq!(next(&text, 0), 5);
        assert_eq!(next(&text, 6), 11);
    }

    #[test]
    fn test_soft_hyphen_allows_break_after() {
        let text = chars("hy\u{00AD}phen");
        assert_eq!(next(&text, 0), 3);
    }

    #[test]
    fn test_no_break_space_is_configurable() {
        let text = chars("a\u{00A0}b");
        let breaks = unicode_break_opportunities(&text);
        assert_eq!(next_breakable_position(&text, 0, false, || &breaks), 3);
        assert_eq!(next_breakable_position(&text, 0, true, || &breaks), 1);
    }

    #[test]
    fn test_ideographs_defer_to_uax14() {
        // Breaks are allowed between CJK ideographs.
        let text = chars("漢字かな");
        assert_eq!(next(&text, 1), 1);
        assert_eq!(next(&text, 2), 2);
    }

    #[test]
    fn test_is_breakable_caches_position() {
        let text = chars("aaa bbb ccc");
        let breaks = unicode_break_opportunities(&text);
        let mut cache = None;
        assert!(!is_breakable(&text, 1, &mut cache, false, || &breaks));
        assert_eq!(cache, Some(3));
        assert!(!is_breakable(&text, 2, &mut cache, false, || &breaks));
        assert_eq!(cache, Some(3));
        assert!(is_breakable(&text, 3, &mut cache, false, || &breaks));
        assert!(!is_breakable(&text, 4, &mut cache, false, || &breaks));
        assert_eq!(cache, Some(7));
    }

    #[test]
    fn test_unicode_opportunities_are_char_indices() {
        let text = chars("שלום עולם");
        let breaks = unicode_break_opportunities(&text);
        assert_eq!(breaks, vec![5, 9]);
    }
}
