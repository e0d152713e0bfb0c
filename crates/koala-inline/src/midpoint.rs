//! Midpoints: holes cut out of a line's logical content.
//!
//! [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
//!
//! "Any collapsible space immediately following another collapsible space
//! ... is collapsed to have zero advance width."
//!
//! The line breaker records collapsed spaces and hidden soft hyphens as
//! pairs of midpoints. An even-indexed midpoint *stops* the rendered
//! content (its offset is exclusive: characters before it are kept), and
//! the odd-indexed midpoint that follows *starts* it again (its offset is
//! the first kept character). When runs are emitted, every stop/start
//! pair becomes a gap.

use crate::classify::SOFT_HYPHEN;
use crate::content::{InlineContent, ItemId};
use crate::iterator::{InlineIterator, bidi_next};

/// Returns true if the stop at `stop` is the one recorded for a soft
/// hyphen, either inside its item or at the end of the item before it.
fn hides_soft_hyphen(content: &InlineContent, stop: InlineIterator) -> bool {
    let Some(item) = stop.item else {
        return false;
    };
    if !content.is_text(item) {
        return false;
    }
    let text = content.text(item);
    if stop.pos < text.len() {
        return text[stop.pos] == SOFT_HYPHEN;
    }
    bidi_next(content, item, None)
        .is_some_and(|next| content.is_text(next) && content.text(next).first() == Some(&SOFT_HYPHEN))
}

/// The midpoint list of the line being built, plus the cursor used while
/// the runs of that line are emitted.
#[derive(Debug, Clone, Default)]
pub struct MidpointState {
    points: Vec<InlineIterator>,
    /// Index of the next midpoint to consume while emitting runs.
    current: usize,
    /// A stop has been consumed but not its start.
    between: bool,
}

impl MidpointState {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            current: 0,
            between: false,
        }
    }

    /// Forget every midpoint and rewind the cursor.
    pub fn clear(&mut self) {
        self.points.clear();
        self.current = 0;
        self.between = false;
    }

    /// Rewind the emission cursor without dropping the midpoints.
    pub const fn reset_cursor(&mut self) {
        self.current = 0;
        self.between = false;
    }

    /// Number of midpoints recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no midpoint has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The recorded midpoints, stops at even indices.
    #[must_use]
    pub fn points(&self) -> &[InlineIterator] {
        &self.points
    }

    /// The most recent midpoint.
    #[must_use]
    pub fn last(&self) -> Option<&InlineIterator> {
        self.points.last()
    }

    /// Drop the most recent midpoint.
    pub fn pop(&mut self) -> Option<InlineIterator> {
        self.points.pop()
    }

    /// Stop rendering after the character (or object) at `pos`.
    pub fn stop_after(&mut self, item: ItemId, pos: usize) {
        debug_assert!(self.points.len() % 2 == 0, "stop recorded while stopped");
        self.points.push(InlineIterator::at(item, pos + 1));
    }

    /// Stop rendering before the character at `pos`.
    pub fn stop_before(&mut self, item: ItemId, pos: usize) {
        debug_assert!(self.points.len() % 2 == 0, "stop recorded while stopped");
        self.points.push(InlineIterator::at(item, pos));
    }

    /// Start rendering again at `it`.
    pub fn start_at(&mut self, it: InlineIterator) {
        debug_assert!(self.points.len() % 2 == 1, "start recorded while rendering");
        self.points.push(InlineIterator::new(it.item, it.pos));
    }

    /// Pull the last stop back by one character, so the trailing space it
    /// ended on is excluded as well.
    ///
    /// A stop that hides a soft hyphen already ends on visible content and
    /// is left alone.
    pub fn shave_last_stop(&mut self, content: &InlineContent) {
        if self.points.len() % 2 == 0 {
            return;
        }
        if let Some(stop) = self.points.last_mut()
            && !hides_soft_hyphen(content, *stop)
        {
            stop.pos = stop.pos.saturating_sub(1);
        }
    }

    /// Drop a stop placed right after a soft hyphen's preceding character
    /// (together with everything recorded after it), so the hyphen renders
    /// at the end of the line.
    pub fn chop_at(&mut self, item: ItemId, stop_pos: usize) {
        let found = self
            .points
            .iter()
            .enumerate()
            .rev()
            .find(|(i, point)| i % 2 == 0 && point.item == Some(item) && point.pos == stop_pos)
            .map(|(i, _)| i);
        if let Some(index) = found {
            self.points.truncate(index);
        }
    }

    /// Sanity check the midpoints against the final line break.
    ///
    /// If the last start point lies beyond `line_break`, the line ends
    /// while spaces are being collapsed: drop that start point, and also
    /// exclude the space the stop ended on unless it preceded a soft
    /// hyphen.
    pub fn check_against_break(&mut self, content: &InlineContent, line_break: &InlineIterator) {
        let count = self.points.len();
        if line_break.at_end() || count == 0 || count % 2 != 0 {
            return;
        }

        let stop = self.points[count - 2];
        let start = self.points[count - 1];
        let Some(stop_item) = stop.item else {
            return;
        };

        let mut walker = InlineIterator::at(stop_item, stop.pos.saturating_sub(1));
        while !walker.at_end() && walker != start && walker != *line_break {
            walker.increment(content, None);
        }
        if walker != *line_break {
            return;
        }

        // STEP 1: The break comes before the start point; shave it off.
        let _ = self.points.pop();

        // STEP 2: Also drop the space the stop ended on.
        if !content.style(stop_item).collapse_white_space() {
            return;
        }
        if content.is_text(stop_item) {
            let text = content.text(stop_item);
            if stop.pos < text.len() {
                if text[stop.pos] == SOFT_HYPHEN {
                    return;
                }
            } else if let Some(start_item) = start.item {
                if content.text(start_item).first() == Some(&SOFT_HYPHEN) {
                    return;
                }
            }
        }
        if let Some(stop) = self.points.last_mut() {
            stop.pos = stop.pos.saturating_sub(1);
        }
    }

    /// Split the range `start..end` of `item` around the midpoints,
    /// appending the kept sub-ranges to `out` in logical order.
    ///
    /// Consumes the midpoints belonging to `item`; calls must be made in
    /// logical order.
    pub fn kept_ranges(
        &mut self,
        item: ItemId,
        mut start: usize,
        end: usize,
        out: &mut Vec<(usize, usize)>,
    ) {
        if start > end {
            return;
        }
        loop {
            let next = self
                .points
                .get(self.current)
                .filter(|point| point.item == Some(item))
                .copied();

            if self.between {
                // STEP 1: Skip content until the start point, which may lie
                // in a later range of this item.
                let Some(point) = next.filter(|point| point.pos < end) else {
                    return;
                };
                self.between = false;
                self.current += 1;
                start = start.max(point.pos);
            } else {
                // STEP 2: Emit content up to the next stop in this item.
                match next {
                    Some(point) if point.pos <= end => {
                        self.between = true;
                        self.current += 1;
                        if point.pos > start {
                            out.push((start, point.pos));
                        }
                        start = point.pos;
                    }
                    _ => {
                        if end > start {
                            out.push((start, end));
                        }
                        return;
                    }
                }
            }
        }
    }
}
