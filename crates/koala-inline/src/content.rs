//! Arena-backed tree of inline content items.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
//!
//! "Inline-level elements are those elements of the source document that
//! do not form new blocks of content; the content is distributed in lines."
//!
//! The tree is rooted at the containing block ([`ItemId::BLOCK`]). Items
//! are allocated in document order: the builder only ever appends to the
//! innermost open container, so comparing two [`ItemId`]s compares their
//! position in a pre-order traversal.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::break_locator::unicode_break_opportunities;
use crate::float::FloatSide;
use crate::font::FontMetrics;
use crate::style::InlineStyle;

/// A type-safe index into [`InlineContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    /// The containing block is always at index 0.
    pub const BLOCK: Self = Self(0);
}

/// Errors reported by the content builder and the editing calls.
///
/// Layout itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// `close_inline` was called with no open inline container.
    #[error("no inline container is open")]
    UnbalancedInline,

    /// Children can only be appended to the block or an inline container.
    #[error("item {0:?} cannot contain children")]
    NotAContainer(ItemId),

    /// A text range extends past the end of the text.
    #[error("range {offset}..{end} is outside text of length {len}")]
    OffsetOutOfRange {
        /// Start of the requested range.
        offset: usize,
        /// End of the requested range.
        end: usize,
        /// Length of the text.
        len: usize,
    },

    /// The item is not a text item.
    #[error("item {0:?} is not text")]
    NotText(ItemId),

    /// The item is not a float.
    #[error("item {0:?} is not a float")]
    NotAFloat(ItemId),

    /// No item with this id exists.
    #[error("no item {0:?}")]
    UnknownItem(ItemId),
}

/// Intrinsic widths of a text item.
///
/// [§ 4.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PreferredWidths {
    /// "The min-content size": the widest unbreakable word.
    pub min: f32,
    /// "The max-content size": the whole text on one line.
    pub max: f32,
}

/// Characters of a text item plus lazily computed caches.
#[derive(Debug, Clone, Default)]
pub struct TextItem {
    chars: Vec<char>,
    unicode_breaks: OnceCell<Vec<usize>>,
    preferred_widths: OnceCell<PreferredWidths>,
}

impl TextItem {
    fn new(chars: Vec<char>) -> Self {
        Self {
            chars,
            unicode_breaks: OnceCell::new(),
            preferred_widths: OnceCell::new(),
        }
    }

    /// The text, after `text-transform`.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// UAX #14 break opportunities, computed on first use.
    #[must_use]
    pub fn unicode_breaks(&self) -> &[usize] {
        self.unicode_breaks
            .get_or_init(|| unicode_break_opportunities(&self.chars))
    }

    fn splice(&mut self, offset: usize, len: usize, replacement: Vec<char>) {
        let _removed: Vec<char> = self
            .chars
            .splice(offset..offset + len, replacement)
            .collect();
        self.unicode_breaks = OnceCell::new();
        self.preferred_widths = OnceCell::new();
    }
}

/// What an item is.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// The containing block itself; only ever [`ItemId::BLOCK`].
    Block,
    /// A text node.
    Text(TextItem),
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// An atomic inline with a fixed intrinsic size.
    Replaced {
        /// Content width, excluding margins.
        width: f32,
        /// Content height, excluding margins.
        height: f32,
    },
    /// A floated box. The size is the margin box.
    Float {
        /// Which side the float goes to.
        side: FloatSide,
        /// Margin box width.
        width: f32,
        /// Margin box height.
        height: f32,
    },
    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// An out-of-flow box whose offsets are `auto`; layout only computes its
    /// static position.
    Positioned {
        /// The box was inline-level before it was taken out of flow.
        inline_level: bool,
    },
    /// An inline container (`<span>`).
    Inline,
    /// A forced line break (`<br>`).
    LineBreak,
}

#[derive(Debug, Clone)]
struct Item {
    kind: ItemKind,
    style: InlineStyle,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    next_sibling: Option<ItemId>,
    prev_sibling: Option<ItemId>,
}

/// The inline content of one block.
#[derive(Debug, Clone)]
pub struct InlineContent {
    items: Vec<Item>,
    /// Open containers, innermost last. Always starts with the block.
    open: Vec<ItemId>,
}

impl InlineContent {
    /// Create content for a block with the given style.
    #[must_use]
    pub fn new(block_style: InlineStyle) -> Self {
        Self {
            items: vec![Item {
                kind: ItemKind::Block,
                style: block_style,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
            open: vec![ItemId::BLOCK],
        }
    }

    /// Number of items, including the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the block has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_child(ItemId::BLOCK).is_none()
    }

    fn current_container(&self) -> ItemId {
        self.open.last().copied().unwrap_or(ItemId::BLOCK)
    }

    /// Append an item as the last child of `parent`.
    ///
    /// `parent` must be an open container (the block or an inline that has
    /// not been closed). Containers nested inside `parent` are closed first,
    /// so the new item follows everything appended so far. An appended
    /// inline container is left open.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotAContainer`] if `parent` is not an open
    /// container.
    pub fn append_item(
        &mut self,
        parent: ItemId,
        kind: ItemKind,
        style: InlineStyle,
    ) -> Result<ItemId, ContentError> {
        if self.item(parent).is_none() {
            return Err(ContentError::UnknownItem(parent));
        }
        let Some(depth) = self.open.iter().position(|&id| id == parent) else {
            return Err(ContentError::NotAContainer(parent));
        };
        self.open.truncate(depth + 1);

        let is_inline = matches!(kind, ItemKind::Inline);
        let kind = match kind {
            ItemKind::Text(text) => ItemKind::Text(TextItem::new(text.chars)),
            other => other,
        };
        let id = self.push_child(parent, kind, style);
        if is_inline {
            self.open.push(id);
        }
        Ok(id)
    }

    fn push_child(&mut self, parent: ItemId, kind: ItemKind, style: InlineStyle) -> ItemId {
        let id = ItemId(self.items.len());
        let prev_last_child = self.items[parent.0].children.last().copied();
        self.items.push(Item {
            kind,
            style,
            parent: Some(parent),
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: prev_last_child,
        });
        if let Some(prev) = prev_last_child {
            self.items[prev.0].next_sibling = Some(id);
        }
        self.items[parent.0].children.push(id);
        id
    }

    fn append_to_current(&mut self, kind: ItemKind, style: InlineStyle) -> ItemId {
        let parent = self.current_container();
        self.push_child(parent, kind, style)
    }

    /// Append a text item, applying the style's `text-transform`.
    pub fn append_text(&mut self, text: &str, style: InlineStyle) -> ItemId {
        let chars = style.text_transform.apply(text);
        self.append_to_current(ItemKind::Text(TextItem::new(chars)), style)
    }

    /// Append an atomic inline of the given content size.
    pub fn append_replaced(&mut self, width: f32, height: f32, style: InlineStyle) -> ItemId {
        self.append_to_current(ItemKind::Replaced { width, height }, style)
    }

    /// Append a float with the given margin-box size.
    pub fn append_float(
        &mut self,
        side: FloatSide,
        width: f32,
        height: f32,
        style: InlineStyle,
    ) -> ItemId {
        self.append_to_current(
            ItemKind::Float {
                side,
                width,
                height,
            },
            style,
        )
    }

    /// Append an absolutely positioned box with `auto` offsets.
    pub fn append_positioned(&mut self, inline_level: bool, style: InlineStyle) -> ItemId {
        self.append_to_current(ItemKind::Positioned { inline_level }, style)
    }

    /// Append a forced line break. The style's `clear` is honored.
    pub fn append_line_break(&mut self, style: InlineStyle) -> ItemId {
        self.append_to_current(ItemKind::LineBreak, style)
    }

    /// Open an inline container; subsequent items become its children
    /// until the matching [`InlineContent::close_inline`].
    pub fn open_inline(&mut self, style: InlineStyle) -> ItemId {
        let id = self.append_to_current(ItemKind::Inline, style);
        self.open.push(id);
        id
    }

    /// Close the innermost open inline container.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnbalancedInline`] if only the block is open.
    pub fn close_inline(&mut self) -> Result<ItemId, ContentError> {
        if self.open.len() <= 1 {
            return Err(ContentError::UnbalancedInline);
        }
        self.open.pop().ok_or(ContentError::UnbalancedInline)
    }

    fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0)
    }

    /// The kind of an item.
    #[must_use]
    pub fn kind(&self, id: ItemId) -> Option<&ItemKind> {
        self.item(id).map(|item| &item.kind)
    }

    /// The computed style of an item.
    ///
    /// Unknown ids fall back to the block's style.
    #[must_use]
    pub fn style(&self, id: ItemId) -> &InlineStyle {
        self.item(id).map_or(&self.items[0].style, |item| &item.style)
    }

    /// The block's own style.
    #[must_use]
    pub fn block_style(&self) -> &InlineStyle {
        &self.items[0].style
    }

    /// Replace the style of an item.
    pub fn set_style(&mut self, id: ItemId, style: InlineStyle) {
        if let Some(item) = self.items.get_mut(id.0) {
            item.style = style;
        }
    }

    /// The parent of an item.
    #[must_use]
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|item| item.parent)
    }

    /// Children of an item.
    #[must_use]
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.item(id).map_or(&[], |item| item.children.as_slice())
    }

    /// The first child of an item.
    #[must_use]
    pub fn first_child(&self, id: ItemId) -> Option<ItemId> {
        self.children(id).first().copied()
    }

    /// The last child of an item.
    #[must_use]
    pub fn last_child(&self, id: ItemId) -> Option<ItemId> {
        self.children(id).last().copied()
    }

    /// The next sibling of an item.
    #[must_use]
    pub fn next_sibling(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|item| item.next_sibling)
    }

    /// The previous sibling of an item.
    #[must_use]
    pub fn prev_sibling(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|item| item.prev_sibling)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: ItemId, ancestor: ItemId) -> bool {
        let mut current = self.parent(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The text item behind an id, if it is text.
    #[must_use]
    pub fn text_item(&self, id: ItemId) -> Option<&TextItem> {
        match self.kind(id) {
            Some(ItemKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The characters of a text item; empty for every other kind.
    #[must_use]
    pub fn text(&self, id: ItemId) -> &[char] {
        self.text_item(id).map_or(&[], TextItem::chars)
    }

    /// Returns true for text items.
    #[must_use]
    pub fn is_text(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::Text(_)))
    }

    /// Returns true for inline containers.
    #[must_use]
    pub fn is_inline(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::Inline))
    }

    /// Returns true for forced line breaks.
    #[must_use]
    pub fn is_line_break(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::LineBreak))
    }

    /// Returns true for floats.
    #[must_use]
    pub fn is_float(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::Float { .. }))
    }

    /// Returns true for positioned boxes.
    #[must_use]
    pub fn is_positioned(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::Positioned { .. }))
    }

    /// Returns true for floats and positioned boxes.
    #[must_use]
    pub fn is_floating_or_positioned(&self, id: ItemId) -> bool {
        self.is_float(id) || self.is_positioned(id)
    }

    /// Returns true for atomic inlines (replaced boxes).
    #[must_use]
    pub fn is_replaced(&self, id: ItemId) -> bool {
        matches!(self.kind(id), Some(ItemKind::Replaced { .. }))
    }

    /// The number of positions inside an item: the character count for
    /// text, one for every other kind.
    #[must_use]
    pub fn length(&self, id: ItemId) -> usize {
        match self.kind(id) {
            Some(ItemKind::Text(text)) => text.chars.len(),
            Some(_) => 1,
            None => 0,
        }
    }

    /// UAX #14 break opportunities for a text item.
    #[must_use]
    pub fn unicode_breaks(&self, id: ItemId) -> &[usize] {
        self.text_item(id).map_or(&[], TextItem::unicode_breaks)
    }

    /// [§ 4.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
    ///
    /// The min-content and max-content widths of a text item, memoized
    /// until the text changes.
    #[must_use]
    pub fn preferred_widths(&self, id: ItemId, metrics: &dyn FontMetrics) -> PreferredWidths {
        let Some(text) = self.text_item(id) else {
            return PreferredWidths::default();
        };
        let style = self.style(id);
        *text.preferred_widths.get_or_init(|| {
            let chars = &text.chars;
            let max = metrics.width(chars, 0, chars.len(), 0.0, style);
            let mut min: f32 = 0.0;
            let mut word_start = 0;
            for (i, &ch) in chars.iter().enumerate() {
                if matches!(ch, ' ' | '\t' | '\n') {
                    min = min.max(metrics.width(chars, word_start, i - word_start, 0.0, style));
                    word_start = i + 1;
                }
            }
            min = min.max(metrics.width(
                chars,
                word_start,
                chars.len() - word_start,
                0.0,
                style,
            ));
            PreferredWidths { min, max }
        })
    }

    /// Measure `len` characters of a text item starting at `start`.
    ///
    /// Requests for the entire text reuse the memoized max-content width
    /// unless the style preserves newlines.
    #[must_use]
    pub fn text_width(
        &self,
        id: ItemId,
        start: usize,
        len: usize,
        x: f32,
        metrics: &dyn FontMetrics,
    ) -> f32 {
        let chars = self.text(id);
        if len == 0 || start >= chars.len() {
            return 0.0;
        }
        let style = self.style(id);
        if start == 0 && len == chars.len() && !style.preserve_newline() {
            return self.preferred_widths(id, metrics).max;
        }
        metrics.width(chars, start, len, x, style)
    }

    /// Replace `len` characters at `offset` in a text item with `text`,
    /// applying the item's `text-transform` to the inserted text.
    ///
    /// Returns the change in length.
    pub(crate) fn splice_text(
        &mut self,
        id: ItemId,
        offset: usize,
        len: usize,
        text: &str,
    ) -> Result<isize, ContentError> {
        let item = self
            .items
            .get_mut(id.0)
            .ok_or(ContentError::UnknownItem(id))?;
        let transform = item.style.text_transform;
        let ItemKind::Text(text_item) = &mut item.kind else {
            return Err(ContentError::NotText(id));
        };
        let old_len = text_item.chars.len();
        let end = offset.saturating_add(len);
        if end > old_len {
            return Err(ContentError::OffsetOutOfRange {
                offset,
                end,
                len: old_len,
            });
        }
        let replacement = transform.apply(text);
        let inserted = replacement.len();
        text_item.splice(offset, len, replacement);
        let grown = isize::try_from(inserted).unwrap_or(isize::MAX);
        let shrunk = isize::try_from(len).unwrap_or(isize::MAX);
        Ok(grown - shrunk)
    }

    /// Change the margin-box size of a float.
    pub(crate) fn resize_float(
        &mut self,
        id: ItemId,
        new_width: f32,
        new_height: f32,
    ) -> Result<(), ContentError> {
        let item = self
            .items
            .get_mut(id.0)
            .ok_or(ContentError::UnknownItem(id))?;
        match &mut item.kind {
            ItemKind::Float { width, height, .. } => {
                *width = new_width;
                *height = new_height;
                Ok(())
            }
            _ => Err(ContentError::NotAFloat(id)),
        }
    }

    /// The margin-box size of a float.
    #[must_use]
    pub fn float_size(&self, id: ItemId) -> Option<(FloatSide, f32, f32)> {
        match self.kind(id) {
            Some(&ItemKind::Float {
                side,
                width,
                height,
            }) => Some((side, width, height)),
            _ => None,
        }
    }

    /// The content size of an atomic inline.
    #[must_use]
    pub fn replaced_size(&self, id: ItemId) -> Option<(f32, f32)> {
        match self.kind(id) {
            Some(&ItemKind::Replaced { width, height }) => Some((width, height)),
            _ => None,
        }
    }

    /// Returns true for a positioned box that was inline-level before it
    /// was taken out of flow.
    #[must_use]
    pub fn is_inline_level_positioned(&self, id: ItemId) -> bool {
        matches!(
            self.kind(id),
            Some(ItemKind::Positioned { inline_level: true })
        )
    }

    /// All floats in document order.
    pub fn floats(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len())
            .map(ItemId)
            .filter(|&id| self.is_float(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::ApproximateFontMetrics;
    use crate::style::TextTransform;

    #[test]
    fn test_builder_nesting_and_order() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("a", InlineStyle::default());
        let span = content.open_inline(InlineStyle::default());
        let b = content.append_text("b", InlineStyle::default());
        assert_eq!(content.close_inline(), Ok(span));
        let c = content.append_text("c", InlineStyle::default());

        assert!(a < span && span < b && b < c);
        assert_eq!(content.parent(b), Some(span));
        assert_eq!(content.next_sibling(a), Some(span));
        assert_eq!(content.prev_sibling(c), Some(span));
        assert!(content.is_descendant_of(b, ItemId::BLOCK));
        assert!(!content.is_descendant_of(c, span));
    }

    #[test]
    fn test_close_without_open_is_error() {
        let mut content = InlineContent::new(InlineStyle::default());
        assert_eq!(content.close_inline(), Err(ContentError::UnbalancedInline));
    }

    #[test]
    fn test_append_to_text_is_error() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("a", InlineStyle::default());
        let result = content.append_item(a, ItemKind::LineBreak, InlineStyle::default());
        assert_eq!(result, Err(ContentError::NotAContainer(a)));
    }

    #[test]
    fn test_text_transform_applied_on_insert() {
        let mut content = InlineContent::new(InlineStyle::default());
        let style = InlineStyle {
            text_transform: TextTransform::Uppercase,
            ..InlineStyle::default()
        };
        let a = content.append_text("abc", style);
        assert_eq!(content.text(a), &['A', 'B', 'C']);
        assert_eq!(content.splice_text(a, 1, 1, "xy"), Ok(1));
        assert_eq!(content.text(a), &['A', 'X', 'Y', 'C']);
    }

    #[test]
    fn test_splice_out_of_range() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("abc", InlineStyle::default());
        assert!(matches!(
            content.splice_text(a, 2, 5, ""),
            Err(ContentError::OffsetOutOfRange { .. })
        ));
        let br = content.append_line_break(InlineStyle::default());
        assert_eq!(content.splice_text(br, 0, 0, "x"), Err(ContentError::NotText(br)));
    }

    #[test]
    fn test_preferred_widths() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("ab abcd", InlineStyle::default());
        let widths = content.preferred_widths(a, &ApproximateFontMetrics);
        let advance = 16.0 * 0.6;
        assert!((widths.max - 7.0 * advance).abs() < 1e-3);
        assert!((widths.min - 4.0 * advance).abs() < 1e-3);
    }

    #[test]
    fn test_lengths() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("", InlineStyle::default());
        let img = content.append_replaced(10.0, 10.0, InlineStyle::default());
        assert_eq!(content.length(a), 0);
        assert_eq!(content.length(img), 1);
    }
}
