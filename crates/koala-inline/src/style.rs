//! Computed style values read by inline layout.
//!
//! Style resolution happens elsewhere; this module only describes the
//! already-computed values the line breaker, the bidi resolver and the
//! line constructor consult. Every inline content item carries one
//! [`InlineStyle`], and the containing block carries another.
//!
//! [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::float::ClearSide;
use crate::geometry::EdgeSizes;

/// [§ 2.1 Specifying Directionality: the direction property](https://www.w3.org/TR/css-writing-modes-3/#direction)
///
/// "This property specifies the inline base direction or directionality of
/// any bidi paragraph, embedding, isolate, or override established by the
/// box."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TextDirection {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

impl TextDirection {
    /// Returns true for `direction: ltr`.
    #[must_use]
    pub const fn is_ltr(self) -> bool {
        matches!(self, Self::Ltr)
    }
}

/// [§ 2.2 Embeddings and Overrides: the unicode-bidi property](https://www.w3.org/TR/css-writing-modes-3/#unicode-bidi)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UnicodeBidi {
    /// "The box does not open an additional level of embedding."
    #[default]
    Normal,
    /// "If the box is inline, this value creates a directional embedding by
    /// opening an additional level of embedding."
    Embed,
    /// "This value puts the box's immediate inline content in a directional
    /// override."
    BidiOverride,
}

/// [§ 3 White Space and Wrapping: the white-space property](https://www.w3.org/TR/css-text-3/#white-space-property)
///
/// | value    | new lines | spaces and tabs | text wrapping |
/// |----------|-----------|-----------------|---------------|
/// | normal   | collapse  | collapse        | wrap          |
/// | pre      | preserve  | preserve        | no wrap       |
/// | nowrap   | collapse  | collapse        | no wrap       |
/// | pre-wrap | preserve  | preserve        | wrap          |
/// | pre-line | preserve  | collapse        | wrap          |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse everything, wrap.
    #[default]
    Normal,
    /// Preserve everything, never wrap.
    Pre,
    /// Preserve everything, wrap.
    PreWrap,
    /// Preserve new lines only, wrap.
    PreLine,
    /// Collapse everything, never wrap.
    Nowrap,
}

impl WhiteSpace {
    /// Lines may be broken at soft wrap opportunities.
    #[must_use]
    pub const fn auto_wrap(self) -> bool {
        !matches!(self, Self::Pre | Self::Nowrap)
    }

    /// Sequences of spaces and tabs collapse to a single space.
    #[must_use]
    pub const fn collapse_white_space(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Segment breaks (`\n`) are forced line breaks.
    #[must_use]
    pub const fn preserve_newline(self) -> bool {
        !matches!(self, Self::Normal | Self::Nowrap)
    }

    /// Preserved spaces hang at the end of the line; the line may only be
    /// broken after them.
    #[must_use]
    pub const fn break_only_after_white_space(self) -> bool {
        matches!(self, Self::PreWrap)
    }
}

/// [§ 5.2 Breaking Rules for Letters: the word-break property](https://www.w3.org/TR/css-text-3/#word-break-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum WordBreak {
    /// "Words break according to their customary rules."
    #[default]
    Normal,
    /// "Breaking is allowed within words."
    BreakAll,
    /// "An otherwise unbreakable sequence of characters may be broken at an
    /// arbitrary point if there are no otherwise-acceptable break points in
    /// the line."
    BreakWord,
}

/// [§ 7.1 Text Alignment: the text-align shorthand](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    /// "Inline-level content is aligned to the start edge of the line box."
    #[default]
    Start,
    /// "Inline-level content is aligned to the end edge of the line box."
    End,
    /// "Inline-level content is aligned to the line-left edge of the line box."
    Left,
    /// "Inline-level content is aligned to the line-right edge of the line box."
    Right,
    /// "Inline-level content is centered within the line box."
    Center,
    /// "Text is justified according to the method specified by the
    /// text-justify property."
    Justify,
}

/// [§ 10.8 Line height calculations: the 'vertical-align' property](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Align the vertical midpoint of the box with the baseline of the
    /// parent box plus half the x-height of the parent."
    Middle,
    /// "Lower the baseline of the box to the proper position for subscripts
    /// of the parent's box."
    Sub,
    /// "Raise the baseline of the box to the proper position for
    /// superscripts of the parent's box."
    Super,
    /// "Align the top of the box with the top of the parent's content area."
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content
    /// area."
    TextBottom,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line
    /// box."
    Bottom,
    /// "Raise (positive value) or lower (negative value) the box by this
    /// distance."
    Length(f32),
}

/// [§ 2.1 Case Transforms: the text-transform property](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TextTransform {
    /// No effects.
    #[default]
    None,
    /// "Puts the first typographic letter unit of each word in titlecase."
    Capitalize,
    /// "Puts all letters in uppercase."
    Uppercase,
    /// "Puts all letters in lowercase."
    Lowercase,
}

impl TextTransform {
    /// Apply the transform to a run of characters.
    #[must_use]
    pub fn apply(self, text: &str) -> Vec<char> {
        match self {
            Self::None => text.chars().collect(),
            Self::Uppercase => text.chars().flat_map(char::to_uppercase).collect(),
            Self::Lowercase => text.chars().flat_map(char::to_lowercase).collect(),
            Self::Capitalize => {
                let mut out = Vec::with_capacity(text.len());
                let mut at_word_start = true;
                for ch in text.chars() {
                    if at_word_start && ch.is_alphanumeric() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    at_word_start = ch.is_whitespace();
                }
                out
            }
        }
    }
}

/// How a no-break space (U+00A0) behaves for collapsing and wrapping.
///
/// Mirrors the non-standard `-webkit-nbsp-mode` property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NbspMode {
    /// No-break spaces never collapse and never offer a break.
    #[default]
    Normal,
    /// No-break spaces behave like ordinary spaces.
    Space,
}

/// [§ 7 Overflow Ellipsis: the text-overflow property](https://www.w3.org/TR/css-overflow-3/#text-overflow)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TextOverflow {
    /// "Clip inline content that overflows its block container element."
    #[default]
    Clip,
    /// "Render an ellipsis character (U+2026) to represent clipped inline
    /// content."
    Ellipsis,
}

/// The computed values inline layout reads from one content item (or
/// from the containing block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineStyle {
    /// `direction`
    pub direction: TextDirection,
    /// `unicode-bidi`
    pub unicode_bidi: UnicodeBidi,
    /// `white-space`
    pub white_space: WhiteSpace,
    /// `word-break` (with `overflow-wrap: break-word` folded into
    /// [`WordBreak::BreakWord`]).
    pub word_break: WordBreak,
    /// `text-align` (only read from the containing block).
    pub text_align: TextAlign,
    /// `vertical-align`
    pub vertical_align: VerticalAlign,
    /// `text-transform`, applied once when text is inserted.
    pub text_transform: TextTransform,
    /// `-webkit-nbsp-mode`
    pub nbsp_mode: NbspMode,
    /// `text-overflow` (only read from the containing block).
    pub text_overflow: TextOverflow,
    /// `clear`, honored on forced line breaks.
    pub clear: Option<ClearSide>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Explicit `line-height` in pixels; `None` is `line-height: normal`.
    pub line_height: Option<f32>,
    /// `word-spacing` in pixels.
    pub word_spacing: f32,
    /// `letter-spacing` in pixels.
    pub letter_spacing: f32,
    /// Margin widths of an inline container or atomic item.
    pub margin: EdgeSizes,
    /// Border widths of an inline container.
    pub border: EdgeSizes,
    /// Padding widths of an inline container.
    pub padding: EdgeSizes,
    /// `-webkit-rtl-ordering: visual`; the content is already in visual
    /// order and must not be reordered.
    pub visually_ordered: bool,
    /// The block keeps the height of one line even with no content (e.g.
    /// an editable region).
    pub has_line_if_empty: bool,
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self {
            direction: TextDirection::Ltr,
            unicode_bidi: UnicodeBidi::Normal,
            white_space: WhiteSpace::Normal,
            word_break: WordBreak::Normal,
            text_align: TextAlign::Start,
            vertical_align: VerticalAlign::Baseline,
            text_transform: TextTransform::None,
            nbsp_mode: NbspMode::Normal,
            text_overflow: TextOverflow::Clip,
            clear: None,
            font_size: 16.0,
            line_height: None,
            word_spacing: 0.0,
            letter_spacing: 0.0,
            margin: EdgeSizes::default(),
            border: EdgeSizes::default(),
            padding: EdgeSizes::default(),
            visually_ordered: false,
            has_line_if_empty: false,
        }
    }
}

impl InlineStyle {
    /// Shorthand for [`WhiteSpace::auto_wrap`].
    #[must_use]
    pub const fn auto_wrap(&self) -> bool {
        self.white_space.auto_wrap()
    }

    /// Shorthand for [`WhiteSpace::collapse_white_space`].
    #[must_use]
    pub const fn collapse_white_space(&self) -> bool {
        self.white_space.collapse_white_space()
    }

    /// Shorthand for [`WhiteSpace::preserve_newline`].
    #[must_use]
    pub const fn preserve_newline(&self) -> bool {
        self.white_space.preserve_newline()
    }

    /// Shorthand for [`WhiteSpace::break_only_after_white_space`].
    #[must_use]
    pub const fn break_only_after_white_space(&self) -> bool {
        self.white_space.break_only_after_white_space()
    }

    /// An unbreakable word may be split when nothing else fits.
    #[must_use]
    pub const fn break_words(&self) -> bool {
        matches!(self.word_break, WordBreak::BreakWord)
    }

    /// Sum of the margin, border and padding on the inline-start side.
    ///
    /// For `direction: rtl` the start side is the right edge.
    #[must_use]
    pub fn start_edge_width(&self) -> f32 {
        if self.direction.is_ltr() {
            self.margin.left + self.border.left + self.padding.left
        } else {
            self.margin.right + self.border.right + self.padding.right
        }
    }

    /// Sum of the margin, border and padding on the inline-end side.
    #[must_use]
    pub fn end_edge_width(&self) -> f32 {
        if self.direction.is_ltr() {
            self.margin.right + self.border.right + self.padding.right
        } else {
            self.margin.left + self.border.left + self.padding.left
        }
    }

    /// Returns true if an inline container has any horizontal margin,
    /// border or padding.
    #[must_use]
    pub fn has_horizontal_borders_padding_or_margin(&self) -> bool {
        self.margin.has_horizontal() || self.border.has_horizontal() || self.padding.has_horizontal()
    }
}
