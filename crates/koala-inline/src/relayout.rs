//! Reusing clean lines across layouts.
//!
//! After an edit only the lines around it are dirty. Layout resumes at the
//! line before the first dirty one and stops as soon as a freshly broken
//! line ends where an old clean line ended, with the same bidi status: from
//! there on the old lines would come out the same, so they are kept and
//! only moved vertically.

use crate::bidi::BidiStatus;
use crate::content::InlineContent;
use crate::float::FloatRegistry;
use crate::iterator::InlineIterator;
use crate::line_box::RootLineBox;

/// The vertical extent that must be repainted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RepaintRange {
    pub(crate) top: f32,
    pub(crate) bottom: f32,
}

impl RepaintRange {
    /// An empty range at `y`.
    pub(crate) const fn at(y: f32) -> Self {
        Self { top: y, bottom: y }
    }

    /// Grow to cover the overflow of `line`, moved by `delta`.
    pub(crate) fn include(&mut self, line: &RootLineBox, delta: f32) {
        self.top = self.top.min(line.overflow_top + delta.min(0.0));
        self.bottom = self.bottom.max(line.overflow_bottom + delta.max(0.0));
    }
}

/// Where layout resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StartPosition {
    /// Lines before this index are kept as they are.
    pub(crate) first_dirty: Option<usize>,
    /// Every line must be laid out again.
    pub(crate) full_layout: bool,
}

/// Mark the lines whose block height lies in `[top, bottom)` dirty,
/// together with the line just below that range.
pub(crate) fn mark_lines_dirty_in_vertical_range(lines: &mut [RootLineBox], top: f32, bottom: f32) {
    if top >= bottom || lines.is_empty() {
        return;
    }
    let mut lowest = lines.len() - 1;
    while lowest > 0 && lines[lowest - 1].block_height >= bottom {
        lowest -= 1;
    }
    for line in lines[..=lowest].iter_mut().rev() {
        if line.block_height < top {
            break;
        }
        line.dirty = true;
    }
}

/// Find the first line to lay out again.
///
/// Floats held by clean lines are checked against the content first: a
/// float that changed size dirties the lines beside it, and a float added
/// or removed before the last clean line forces a full layout. The line
/// before the first dirty one is laid out again too unless it ended at a
/// forced break, as is the last line when nothing is dirty.
pub(crate) fn determine_start_position(
    lines: &mut [RootLineBox],
    content: &InlineContent,
    full_layout: bool,
) -> StartPosition {
    if full_layout || lines.is_empty() {
        return StartPosition {
            first_dirty: None,
            full_layout: true,
        };
    }

    // STEP 1: Compare the floats of clean lines with the content.
    let floats: Vec<_> = content.floats().collect();
    let mut float_index = 0;
    let mut dirtied_by_float = false;
    let mut current = None;
    for index in 0..lines.len() {
        if lines[index].dirty {
            current = Some(index);
            break;
        }
        for f in 0..lines[index].floats.len() {
            let placed = lines[index].floats[f];
            if floats.get(float_index) != Some(&placed.item) {
                log::debug!("Float {:?} moved in the content, laying out everything", placed.item);
                return StartPosition {
                    first_dirty: None,
                    full_layout: true,
                };
            }
            if let Some((_, width, height)) = content.float_size(placed.item)
                && ((width - placed.margin_box.width).abs() > f32::EPSILON
                    || (height - placed.margin_box.height).abs() > f32::EPSILON)
            {
                lines[index].dirty = true;
                let block_height = lines[index].block_height;
                let bottom = placed.margin_box.y + height.max(placed.margin_box.height);
                mark_lines_dirty_in_vertical_range(lines, block_height, bottom);
                dirtied_by_float = true;
            }
            float_index += 1;
        }
        if dirtied_by_float {
            current = Some(index);
            break;
        }
    }
    if current.is_none() && float_index < floats.len() {
        log::debug!("A float was added after the last line, laying out everything");
        return StartPosition {
            first_dirty: None,
            full_layout: true,
        };
    }

    // STEP 2: Step back to a line that ended cleanly.
    let first_dirty = match current {
        Some(index) if index > 0 => {
            let prev = &lines[index - 1];
            let break_in_deleted_text = prev.line_break.item.is_some_and(|item| {
                content.is_text(item) && prev.line_break.pos >= content.length(item)
            });
            if !dirtied_by_float && (!prev.ends_with_break || break_in_deleted_text) {
                Some(index - 1)
            } else {
                Some(index)
            }
        }
        Some(index) => Some(index),
        None => lines
            .last()
            .filter(|last| !last.ends_with_break)
            .map(|_| lines.len() - 1),
    };
    StartPosition {
        first_dirty,
        full_layout: false,
    }
}

/// The clean lines at the end of the block, detached while the lines
/// before them are laid out again.
#[derive(Debug)]
pub(crate) struct CleanSuffix {
    /// Where the first clean line starts.
    pub(crate) start: InlineIterator,
    /// The bidi status there.
    pub(crate) status: BidiStatus,
    /// The block height above the first clean line.
    pub(crate) y: f32,
    /// The detached lines.
    pub(crate) lines: Vec<RootLineBox>,
}

/// Detach the longest run of clean lines after `first_dirty` that reaches
/// the end of the block.
pub(crate) fn determine_end_position(lines: &mut Vec<RootLineBox>, first_dirty: usize) -> Option<CleanSuffix> {
    let mut first_clean = None;
    for (index, line) in lines.iter().enumerate().skip(first_dirty + 1) {
        if line.dirty {
            first_clean = None;
        } else if first_clean.is_none() {
            first_clean = Some(index);
        }
    }
    let first_clean = first_clean?;
    let prev = &lines[first_clean - 1];
    let start = prev.line_break;
    let status = prev.line_break_status.clone();
    let y = prev.block_height;
    let detached = lines.split_off(first_clean);
    log::debug!("Detached {} clean lines starting at {start:?}", detached.len());
    Some(CleanSuffix {
        start,
        status,
        y,
        lines: detached,
    })
}

/// Returns true if a float ends in the band the clean lines would be moved
/// through.
fn floats_block_shift(suffix: &CleanSuffix, height: f32, floats: &FloatRegistry) -> bool {
    let delta = height - suffix.y;
    if delta == 0.0 || floats.is_empty() {
        return false;
    }
    let top = height.min(suffix.y);
    let bottom = suffix.lines.last().map_or(suffix.y, |line| line.block_height) + delta.abs();
    floats.floats().iter().any(|f| {
        let float_bottom = f.margin_box.bottom();
        float_bottom >= top && float_bottom < bottom
    })
}

/// Check whether the line about to start at `position` joins the clean
/// suffix.
///
/// The first clean line matches if it starts at `position` with `status`.
/// Otherwise up to `lookahead` clean lines are searched for one ending at
/// `position`; the lines up to it are dropped and the rest of the suffix
/// is kept. Clean lines are never moved across the bottom of a float.
pub(crate) fn matched_end_line(
    suffix: &mut CleanSuffix,
    position: &InlineIterator,
    status: &BidiStatus,
    height: f32,
    floats: &FloatRegistry,
    lookahead: usize,
    repaint: &mut RepaintRange,
) -> bool {
    if *position == suffix.start {
        return *status == suffix.status && !floats_block_shift(suffix, height, floats);
    }

    let Some(matched) = suffix
        .lines
        .iter()
        .take(lookahead)
        .position(|line| line.line_break == *position)
    else {
        return false;
    };
    if suffix.lines[matched].line_break_status != *status {
        return false;
    }
    if matched + 1 < suffix.lines.len() {
        suffix.y = suffix.lines[matched].block_height;
    }
    if floats_block_shift(suffix, height, floats) {
        return false;
    }

    // Drop the lines that did not resynchronize.
    for line in suffix.lines.drain(..=matched) {
        repaint.include(&line, 0.0);
    }
    if let Some(first) = suffix.lines.first() {
        log::debug!("Resynchronized with a clean line {} lines ahead", matched + 1);
        suffix.start = *position;
        debug_assert!(first.block_height >= suffix.y);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::style::{InlineStyle, TextDirection};

    fn status() -> BidiStatus {
        BidiStatus::new(TextDirection::Ltr, false)
    }

    fn line(block_height: f32, line_break: InlineIterator) -> RootLineBox {
        let mut line = RootLineBox::new(Vec::new(), status());
        line.rect = Rect::new(0.0, block_height - 10.0, 100.0, 10.0);
        line.overflow_top = block_height - 10.0;
        line.overflow_bottom = block_height;
        line.block_height = block_height;
        line.line_break = line_break;
        line
    }

    fn lines(content: &mut InlineContent, count: usize) -> Vec<RootLineBox> {
        let id = content.append_text(&"x".repeat(count * 10), InlineStyle::default());
        (1..=count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let bottom = i as f32 * 10.0;
                let end = if i == count {
                    InlineIterator::end()
                } else {
                    InlineIterator::at(id, i * 10)
                };
                line(bottom, end)
            })
            .collect()
    }

    #[test]
    fn test_steps_back_over_soft_break() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 5);
        all[2].dirty = true;
        let start = determine_start_position(&mut all, &content, false);
        assert_eq!(start.first_dirty, Some(1));
        assert!(!start.full_layout);
    }

    #[test]
    fn test_forced_break_is_a_safe_resume_point() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 5);
        all[1].ends_with_break = true;
        all[2].dirty = true;
        let start = determine_start_position(&mut all, &content, false);
        assert_eq!(start.first_dirty, Some(2));
    }

    #[test]
    fn test_clean_block_relays_only_an_unterminated_last_line() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 3);
        let start = determine_start_position(&mut all, &content, false);
        assert_eq!(start.first_dirty, Some(2));
        all[2].ends_with_break = true;
        let start = determine_start_position(&mut all, &content, false);
        assert_eq!(start.first_dirty, None);
    }

    #[test]
    fn test_end_position_takes_clean_tail() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 6);
        all[1].dirty = true;
        all[3].dirty = true;
        let suffix = determine_end_position(&mut all, 1).expect("clean tail");
        assert_eq!(all.len(), 4);
        assert_eq!(suffix.lines.len(), 2);
        assert!((suffix.y - 40.0).abs() < f32::EPSILON);
        assert_eq!(suffix.start, all[3].line_break);
    }

    #[test]
    fn test_no_clean_tail() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 3);
        all[2].dirty = true;
        assert!(determine_end_position(&mut all, 0).is_none());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_matches_first_clean_line() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 4);
        all[1].dirty = true;
        let mut suffix = determine_end_position(&mut all, 1).expect("clean tail");
        let floats = FloatRegistry::new(0.0, 100.0);
        let mut repaint = RepaintRange::at(0.0);
        let start = suffix.start;
        assert!(matched_end_line(&mut suffix, &start, &status(), 25.0, &floats, 8, &mut repaint));
        assert_eq!(suffix.lines.len(), 2);
    }

    #[test]
    fn test_lookahead_drops_unsynchronized_lines() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 5);
        all[0].dirty = true;
        let mut suffix = determine_end_position(&mut all, 0).expect("clean tail");
        assert_eq!(suffix.lines.len(), 4);
        let floats = FloatRegistry::new(0.0, 100.0);
        let mut repaint = RepaintRange::at(10.0);
        let position = suffix.lines[1].line_break;
        assert!(matched_end_line(&mut suffix, &position, &status(), 30.0, &floats, 8, &mut repaint));
        assert_eq!(suffix.lines.len(), 2);
        assert!((suffix.y - 30.0).abs() < f32::EPSILON);
        assert!((repaint.bottom - 30.0).abs() < f32::EPSILON);

        let mut suffix = CleanSuffix {
            lines: lines(&mut content, 3),
            ..suffix
        };
        let missing = InlineIterator::at(crate::content::ItemId(99), 0);
        assert!(!matched_end_line(&mut suffix, &missing, &status(), 30.0, &floats, 8, &mut repaint));
    }

    #[test]
    fn test_dirty_vertical_range() {
        let mut content = InlineContent::new(InlineStyle::default());
        let mut all = lines(&mut content, 5);
        mark_lines_dirty_in_vertical_range(&mut all, 20.0, 35.0);
        let dirty: Vec<bool> = all.iter().map(|line| line.dirty).collect();
        assert_eq!(dirty, vec![false, true, true, true, false]);
    }
}
