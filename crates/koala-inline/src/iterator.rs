//! Positions in the logical content stream of one block.
//!
//! An [`InlineIterator`] names a character offset inside a content item.
//! Walking the iterator visits, in document order, every leaf the line
//! breaker cares about: text, atomic inlines, floats, positioned boxes,
//! forced breaks and empty inline containers. Non-empty inline containers
//! are stepped through, optionally reporting the explicit embeddings their
//! `unicode-bidi` opens and closes.

use std::cmp::Ordering;

use serde::Serialize;

use crate::classify::{Direction, bidi_class};
use crate::content::{InlineContent, ItemId, ItemKind};
use crate::style::{TextDirection, UnicodeBidi};

/// A position in the inline content: an item and an offset inside it.
///
/// Equality and ordering ignore the cached break hint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct InlineIterator {
    /// The item, or `None` past the end of the content.
    pub item: Option<ItemId>,
    /// Character offset (always 0 for non-text items).
    pub pos: usize,
    /// Cached result of the last break opportunity lookup in `item`.
    #[serde(skip)]
    pub next_breakable: Option<usize>,
}

impl PartialEq for InlineIterator {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item && self.pos == other.pos
    }
}

impl Eq for InlineIterator {}

impl PartialOrd for InlineIterator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InlineIterator {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |it: &Self| (it.item.map_or(usize::MAX, |id| id.0), it.pos);
        key(self).cmp(&key(other))
    }
}

impl InlineIterator {
    /// An iterator at `pos` inside `item`.
    #[must_use]
    pub const fn new(item: Option<ItemId>, pos: usize) -> Self {
        Self {
            item,
            pos,
            next_breakable: None,
        }
    }

    /// An iterator at `pos` inside `item`.
    #[must_use]
    pub const fn at(item: ItemId, pos: usize) -> Self {
        Self::new(Some(item), pos)
    }

    /// The past-the-end iterator.
    #[must_use]
    pub const fn end() -> Self {
        Self::new(None, 0)
    }

    /// Returns true past the end of the content.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.item.is_none()
    }

    /// The character under the iterator.
    ///
    /// A forced line break reads as a newline; every other non-text item
    /// has no character.
    #[must_use]
    pub fn current(&self, content: &InlineContent) -> Option<char> {
        let item = self.item?;
        if content.is_line_break(item) {
            return (self.pos == 0).then_some('\n');
        }
        content.text(item).get(self.pos).copied()
    }

    /// The bidi class of the character under the iterator, or
    /// [`Direction::OtherNeutral`] when there is none.
    #[must_use]
    pub fn direction(&self, content: &InlineContent) -> Direction {
        self.current(content)
            .map_or(Direction::OtherNeutral, bidi_class)
    }

    /// Advance by one character, or to the next leaf.
    ///
    /// When `embeddings` is given, the explicit embeddings opened and
    /// closed by the inline containers stepped over are appended to it.
    pub fn increment(&mut self, content: &InlineContent, embeddings: Option<&mut Vec<Direction>>) {
        let Some(item) = self.item else {
            return;
        };
        if content.is_text(item) {
            self.pos += 1;
            if self.pos < content.length(item) {
                return;
            }
        }
        self.item = bidi_next(content, item, embeddings);
        self.pos = 0;
        self.next_breakable = None;
    }
}

/// The explicit embedding an inline container opens, if any.
///
/// [§ 2.2 the unicode-bidi property](https://www.w3.org/TR/css-writing-modes-3/#unicode-bidi)
fn opened_embedding(content: &InlineContent, item: ItemId) -> Option<Direction> {
    if !content.is_inline(item) {
        return None;
    }
    let style = content.style(item);
    match (style.unicode_bidi, style.direction) {
        (UnicodeBidi::Normal, _) => None,
        (UnicodeBidi::Embed, TextDirection::Ltr) => Some(Direction::LeftToRightEmbedding),
        (UnicodeBidi::Embed, TextDirection::Rtl) => Some(Direction::RightToLeftEmbedding),
        (UnicodeBidi::BidiOverride, TextDirection::Ltr) => Some(Direction::LeftToRightOverride),
        (UnicodeBidi::BidiOverride, TextDirection::Rtl) => Some(Direction::RightToLeftOverride),
    }
}

fn is_leaf(content: &InlineContent, item: ItemId) -> bool {
    match content.kind(item) {
        Some(ItemKind::Inline) => content.first_child(item).is_none(),
        Some(ItemKind::Block) | None => false,
        Some(_) => true,
    }
}

/// The leaf after `current` in document order, stepping into and out of
/// inline containers.
pub fn bidi_next(
    content: &InlineContent,
    current: ItemId,
    mut embeddings: Option<&mut Vec<Direction>>,
) -> Option<ItemId> {
    let mut current = current;
    loop {
        let mut next = None;

        // STEP 1: Descend into containers.
        if !content.is_floating_or_positioned(current) && !content.is_replaced(current) {
            next = content.first_child(current);
            if let (Some(child), Some(list)) = (next, embeddings.as_deref_mut()) {
                list.extend(opened_embedding(content, child));
            }
        }

        // STEP 2: Otherwise climb until a next sibling exists.
        if next.is_none() {
            let mut walker = Some(current);
            while let Some(item) = walker {
                if item == ItemId::BLOCK {
                    break;
                }
                if let (Some(list), Some(_)) =
                    (embeddings.as_deref_mut(), opened_embedding(content, item))
                {
                    list.push(Direction::PopDirectionalFormat);
                }
                next = content.next_sibling(item);
                if let Some(sibling) = next {
                    if let Some(list) = embeddings.as_deref_mut() {
                        list.extend(opened_embedding(content, sibling));
                    }
                    break;
                }
                walker = content.parent(item);
            }
        }

        // STEP 3: Stop at leaves.
        let candidate = next?;
        if is_leaf(content, candidate) {
            return Some(candidate);
        }
        current = candidate;
    }
}

/// The first leaf of the block.
pub fn bidi_first(
    content: &InlineContent,
    mut embeddings: Option<&mut Vec<Direction>>,
) -> Option<ItemId> {
    let first = content.first_child(ItemId::BLOCK)?;
    if let Some(list) = embeddings.as_deref_mut() {
        list.extend(opened_embedding(content, first));
    }
    if is_leaf(content, first) {
        Some(first)
    } else {
        bidi_next(content, first, embeddings)
    }
}
