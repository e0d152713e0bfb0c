//! Character classification for bidi resolution and whitespace handling.
//!
//! [UAX #9 § 3.2 Bidirectional Character Types](https://www.unicode.org/reports/tr9/#Bidirectional_Character_Types)

use serde::Serialize;
use unicode_bidi::BidiClass;

use crate::style::{InlineStyle, NbspMode};

/// U+00AD SOFT HYPHEN
pub const SOFT_HYPHEN: char = '\u{00AD}';

/// U+00A0 NO-BREAK SPACE
pub const NO_BREAK_SPACE: char = '\u{00A0}';

/// U+2026 HORIZONTAL ELLIPSIS
pub const HORIZONTAL_ELLIPSIS: char = '\u{2026}';

/// The bidirectional character type of a code point, as consumed by the
/// resolver.
///
/// Isolate controls (LRI, RLI, FSI, PDI) are not supported by the
/// resolver and classify as [`Direction::OtherNeutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// L
    LeftToRight,
    /// R
    RightToLeft,
    /// AL
    ArabicLetter,
    /// EN
    EuropeanNumber,
    /// AN
    ArabicNumber,
    /// ES
    EuropeanNumberSeparator,
    /// ET
    EuropeanNumberTerminator,
    /// CS
    CommonNumberSeparator,
    /// BN
    BoundaryNeutral,
    /// B
    BlockSeparator,
    /// S
    SegmentSeparator,
    /// WS
    WhitespaceNeutral,
    /// ON
    OtherNeutral,
    /// NSM
    NonSpacingMark,
    /// LRE
    LeftToRightEmbedding,
    /// RLE
    RightToLeftEmbedding,
    /// LRO
    LeftToRightOverride,
    /// RLO
    RightToLeftOverride,
    /// PDF
    PopDirectionalFormat,
}

impl Direction {
    /// Returns true for LRE, RLE, LRO, RLO and PDF.
    #[must_use]
    pub const fn is_explicit_formatting(self) -> bool {
        matches!(
            self,
            Self::LeftToRightEmbedding
                | Self::RightToLeftEmbedding
                | Self::LeftToRightOverride
                | Self::RightToLeftOverride
                | Self::PopDirectionalFormat
        )
    }

    /// Returns true for the neutral and separator classes that take their
    /// direction from the surrounding text (ES, ET, CS, BN, B, S, WS, ON).
    #[must_use]
    pub const fn is_neutral_or_separator(self) -> bool {
        matches!(
            self,
            Self::EuropeanNumberSeparator
                | Self::EuropeanNumberTerminator
                | Self::CommonNumberSeparator
                | Self::BoundaryNeutral
                | Self::BlockSeparator
                | Self::SegmentSeparator
                | Self::WhitespaceNeutral
                | Self::OtherNeutral
        )
    }
}

/// [UAX #9 Table 4](https://www.unicode.org/reports/tr9/#Table_Bidirectional_Character_Types)
///
/// Look up the `Bidi_Class` property of a code point.
#[must_use]
pub fn bidi_class(ch: char) -> Direction {
    match unicode_bidi::bidi_class(ch) {
        BidiClass::L => Direction::LeftToRight,
        BidiClass::R => Direction::RightToLeft,
        BidiClass::AL => Direction::ArabicLetter,
        BidiClass::EN => Direction::EuropeanNumber,
        BidiClass::AN => Direction::ArabicNumber,
        BidiClass::ES => Direction::EuropeanNumberSeparator,
        BidiClass::ET => Direction::EuropeanNumberTerminator,
        BidiClass::CS => Direction::CommonNumberSeparator,
        BidiClass::BN => Direction::BoundaryNeutral,
        BidiClass::B => Direction::BlockSeparator,
        BidiClass::S => Direction::SegmentSeparator,
        BidiClass::WS => Direction::WhitespaceNeutral,
        BidiClass::NSM => Direction::NonSpacingMark,
        BidiClass::LRE => Direction::LeftToRightEmbedding,
        BidiClass::RLE => Direction::RightToLeftEmbedding,
        BidiClass::LRO => Direction::LeftToRightOverride,
        BidiClass::RLO => Direction::RightToLeftOverride,
        BidiClass::PDF => Direction::PopDirectionalFormat,
        BidiClass::ON | BidiClass::LRI | BidiClass::RLI | BidiClass::FSI | BidiClass::PDI => {
            Direction::OtherNeutral
        }
    }
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Space, tab and soft hyphen always collapse. A newline collapses only
/// when the style does not preserve newlines, and a no-break space only
/// when `nbsp-mode` treats it as an ordinary space.
#[must_use]
pub fn is_collapsible_whitespace(ch: char, style: &InlineStyle) -> bool {
    match ch {
        ' ' | '\t' | SOFT_HYPHEN => true,
        '\n' => !style.preserve_newline(),
        NO_BREAK_SPACE => style.nbsp_mode == NbspMode::Space,
        _ => false,
    }
}

/// Space or segment break, as seen by word-spacing and justification.
#[must_use]
pub const fn is_space_or_newline(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\t' | '\r' | '\u{000C}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::WhiteSpace;

    #[test]
    fn test_strong_classes() {
        assert_eq!(bidi_class('a'), Direction::LeftToRight);
        assert_eq!(bidi_class('ש'), Direction::RightToLeft);
        assert_eq!(bidi_class('ب'), Direction::ArabicLetter);
    }

    #[test]
    fn test_weak_and_neutral_classes() {
        assert_eq!(bidi_class('1'), Direction::EuropeanNumber);
        assert_eq!(bidi_class('\u{0661}'), Direction::ArabicNumber);
        assert_eq!(bidi_class('+'), Direction::EuropeanNumberSeparator);
        assert_eq!(bidi_class('$'), Direction::EuropeanNumberTerminator);
        assert_eq!(bidi_class(','), Direction::CommonNumberSeparator);
        assert_eq!(bidi_class(' '), Direction::WhitespaceNeutral);
        assert_eq!(bidi_class('\t'), Direction::SegmentSeparator);
        assert_eq!(bidi_class('\n'), Direction::BlockSeparator);
        assert_eq!(bidi_class('!'), Direction::OtherNeutral);
        assert_eq!(bidi_class('\u{0301}'), Direction::NonSpacingMark);
    }

    #[test]
    fn test_explicit_formatting_classes() {
        assert_eq!(bidi_class('\u{202A}'), Direction::LeftToRightEmbedding);
        assert_eq!(bidi_class('\u{202B}'), Direction::RightToLeftEmbedding);
        assert_eq!(bidi_class('\u{202D}'), Direction::LeftToRightOverride);
        assert_eq!(bidi_class('\u{202E}'), Direction::RightToLeftOverride);
        assert_eq!(bidi_class('\u{202C}'), Direction::PopDirectionalFormat);
        assert_eq!(bidi_class('\u{2066}'), Direction::OtherNeutral);
        assert!(Direction::PopDirectionalFormat.is_explicit_formatting());
    }

    #[test]
    fn test_collapsible_whitespace_depends_on_style() {
        let normal = InlineStyle::default();
        let pre = InlineStyle {
            white_space: WhiteSpace::Pre,
            ..InlineStyle::default()
        };
        let nbsp_as_space = InlineStyle {
            nbsp_mode: NbspMode::Space,
            ..InlineStyle::default()
        };

        assert!(is_collapsible_whitespace(' ', &normal));
        assert!(is_collapsible_whitespace(SOFT_HYPHEN, &pre));
        assert!(is_collapsible_whitespace('\n', &normal));
        assert!(!is_collapsible_whitespace('\n', &pre));
        assert!(!is_collapsible_whitespace(NO_BREAK_SPACE, &normal));
        assert!(is_collapsible_whitespace(NO_BREAK_SPACE, &nbsp_as_space));
        assert!(!is_collapsible_whitespace('x', &normal));
    }
}
