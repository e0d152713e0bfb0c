//! Editing laid-out content.
//!
//! Edits keep the old lines and only mark the ones they touch dirty, so
//! the next layout can resume close to the edit and reuse the clean lines
//! after it.

use crate::content::{ContentError, ItemId};
use crate::iterator::InlineIterator;
use crate::layout::InlineBlock;
use crate::line_box::{InlineBox, RootLineBox, TextBox};

/// Apply `f` to every text box of `item` on `line`.
fn for_each_box_of(line: &mut RootLineBox, item: ItemId, f: &mut impl FnMut(&mut TextBox)) {
    fn visit(boxes: &mut [InlineBox], item: ItemId, f: &mut impl FnMut(&mut TextBox)) {
        for child in boxes {
            match child {
                InlineBox::Text(text) if text.item == item => f(text),
                InlineBox::Flow(flow) => visit(&mut flow.children, item, f),
                _ => {}
            }
        }
    }
    visit(&mut line.children, item, f);
}

impl InlineBlock {
    fn check_item(&self, item: ItemId) -> Result<(), ContentError> {
        if item.0 >= self.content.len() {
            return Err(ContentError::UnknownItem(item));
        }
        Ok(())
    }

    /// Index of the line holding the nearest item before `item` in the
    /// content.
    fn line_of_preceding_item(&self, item: ItemId) -> Option<usize> {
        (1..item.0).rev().map(ItemId).find_map(|before| {
            self.lines
                .iter()
                .rposition(|line| line.contains_item(before))
        })
    }

    /// Mark the line holding the nearest item before `item` dirty, or the
    /// first line if there is none.
    fn dirty_preceding_line(&mut self, item: ItemId) {
        let index = self.line_of_preceding_item(item).unwrap_or(0);
        if let Some(line) = self.lines.get_mut(index) {
            line.dirty = true;
        }
    }

    /// Replace `len` characters at `offset` in text item `item` with
    /// `text`.
    ///
    /// Every line whose extent, from the break that starts it through the
    /// break that ends it, meets the replaced range is marked dirty. A line
    /// ending inside the range therefore dirties the line after it too, so
    /// a stale break is never used to resume layout. Boxes and line breaks
    /// after the range move by the change in length.
    ///
    /// # Errors
    ///
    /// Fails if `item` does not exist, is not text, or the range runs past
    /// the end of the text.
    pub fn replace_text(
        &mut self,
        item: ItemId,
        offset: usize,
        len: usize,
        text: &str,
    ) -> Result<(), ContentError> {
        self.check_item(item)?;
        let delta = self.content.splice_text(item, offset, len, text)?;
        self.has_pending_change = true;
        // Last replaced character; an insertion counts the character at
        // `offset` as replaced.
        let last = if len == 0 { offset } else { offset + len - 1 };
        let range_start = InlineIterator::at(item, offset);
        let range_last = InlineIterator::at(item, last);

        let shift = |pos: usize| pos.checked_add_signed(delta).unwrap_or(0);
        let mut dirtied = false;
        let mut line_start = InlineIterator::at(ItemId::BLOCK, 0);
        for line in &mut self.lines {
            let line_end = line.line_break;
            if line_start <= range_last && line_end >= range_start {
                line.dirty = true;
                dirtied = true;
            }
            for_each_box_of(line, item, &mut |text| {
                if text.start > last {
                    text.start = shift(text.start);
                }
            });
            if line.line_break.item == Some(item) && line.line_break.pos > last {
                line.line_break.pos = shift(line.line_break.pos);
                line.line_break.next_breakable = None;
            }
            line_start = line_end;
        }

        // Past the last break: only the last line can grow into the edit.
        if !dirtied && let Some(line) = self.lines.last_mut() {
            line.dirty = true;
        }
        log::debug!("Replaced {len} characters at {offset} in {item:?} (delta {delta})");
        Ok(())
    }

    /// Change the margin-box size of float `item`.
    ///
    /// The lines beside the float are found and dirtied by the next
    /// layout.
    ///
    /// # Errors
    ///
    /// Fails if `item` does not exist or is not a float.
    pub fn set_float_size(&mut self, item: ItemId, width: f32, height: f32) -> Result<(), ContentError> {
        self.check_item(item)?;
        self.content.resize_float(item, width, height)?;
        self.has_pending_change = true;
        Ok(())
    }

    /// Mark the lines holding `item` dirty, or the line holding the nearest
    /// item before it when no line does.
    ///
    /// # Errors
    ///
    /// Fails if `item` does not exist.
    pub fn mark_dirty(&mut self, item: ItemId) -> Result<(), ContentError> {
        self.check_item(item)?;
        self.has_pending_change = true;
        let mut found = false;
        for line in &mut self.lines {
            if line.contains_item(item) {
                line.dirty = true;
                found = true;
            }
        }
        if !found {
            self.dirty_preceding_line(item);
        }
        Ok(())
    }
}
