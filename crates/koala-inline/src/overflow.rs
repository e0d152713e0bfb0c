//! Text overflow ellipsis.
//!
//! [§ 2.1 Overflow Ellipsis: the text-overflow property](https://www.w3.org/TR/css-overflow-3/#text-overflow)
//!
//! "This property specifies rendering when inline content overflows its
//! end line box edge in the inline progression direction of its block
//! container element."
//!
//! "Implementations must hide characters and atomic inline-level elements
//! at the end edge of the line as necessary to fit the ellipsis."
//!
//! Only left-to-right lines are truncated.

use crate::classify::HORIZONTAL_ELLIPSIS;
use crate::content::InlineContent;
use crate::float::FloatRegistry;
use crate::font::FontMetrics;
use crate::line_box::{
    EllipsisBox, InlineBox, RootLineBox, TextBox, Truncation, for_each_text_box_mut,
};
use crate::style::TextOverflow;

/// Whether an ellipsis `ellipsis_width` wide fits before `block_edge`.
///
/// The line must be wide enough to give up that much space, and no
/// replaced box may overlap the area the ellipsis would cover.
#[must_use]
pub fn can_accommodate_ellipsis(line: &RootLineBox, block_edge: f32, ellipsis_width: f32) -> bool {
    let line_edge = line.rect.right();
    if line.rect.width - (line_edge - block_edge) < ellipsis_width {
        return false;
    }
    let ellipsis_left = block_edge - ellipsis_width;
    !any_replaced_overlaps(&line.children, ellipsis_left, block_edge)
}

fn any_replaced_overlaps(boxes: &[InlineBox], left: f32, right: f32) -> bool {
    boxes.iter().any(|child| match child {
        InlineBox::Flow(flow) => any_replaced_overlaps(&flow.children, left, right),
        InlineBox::Atomic(_) if child.is_replaced() => {
            child.x() < right && child.x() + child.width() > left
        }
        _ => false,
    })
}

/// Truncate the text of `line` so that an ellipsis fits before
/// `block_edge`, and record the ellipsis box.
pub fn place_ellipsis(
    line: &mut RootLineBox,
    content: &InlineContent,
    metrics: &dyn FontMetrics,
    block_edge: f32,
    ellipsis_width: f32,
) {
    let ellipsis_x = block_edge - ellipsis_width;
    let mut found = false;
    let mut placed = None;
    for_each_text_box_mut(&mut line.children, &mut |text| {
        let x = truncate_text_box(text, content, metrics, ellipsis_x, &mut found);
        if placed.is_none() {
            placed = x;
        }
    });
    line.ellipsis = Some(EllipsisBox {
        x: placed.unwrap_or(ellipsis_x),
        y: line.rect.y,
        width: ellipsis_width,
        height: line.rect.height,
    });
}

/// Truncate one text box against `ellipsis_x`. Returns where the ellipsis
/// goes if this box decides it.
fn truncate_text_box(
    text: &mut TextBox,
    content: &InlineContent,
    metrics: &dyn FontMetrics,
    ellipsis_x: f32,
    found: &mut bool,
) -> Option<f32> {
    if *found {
        text.truncation = Truncation::Full;
        return None;
    }
    if ellipsis_x <= text.x {
        *found = true;
        text.truncation = Truncation::Full;
        return None;
    }
    if ellipsis_x >= text.x + text.width || text.is_rtl() {
        return None;
    }

    *found = true;
    let available = ellipsis_x - text.x;
    let mut visible = 0;
    let mut visible_width = 0.0;
    for len in 1..=text.len {
        let width = content.text_width(text.item, text.start, len, text.x, metrics);
        if width > available {
            break;
        }
        visible = len;
        visible_width = width;
    }
    if visible == 0 {
        text.truncation = Truncation::Full;
        return Some(ellipsis_x.min(text.x));
    }
    text.truncation = Truncation::Partial(visible);
    Some(text.x + visible_width)
}

/// Clear old truncation and place an ellipsis on every line that overflows
/// the right edge of a block with `text-overflow: ellipsis`.
///
/// Returns the number of lines truncated.
pub(crate) fn apply_text_overflow(
    lines: &mut [RootLineBox],
    content: &InlineContent,
    metrics: &dyn FontMetrics,
    floats: &FloatRegistry,
) -> usize {
    for line in lines.iter_mut() {
        line.clear_truncation();
    }
    let block_style = content.block_style();
    if block_style.text_overflow != TextOverflow::Ellipsis || !block_style.direction.is_ltr() {
        return 0;
    }

    let ellipsis_width = metrics.width(&[HORIZONTAL_ELLIPSIS], 0, 1, 0.0, block_style);
    let mut truncated = 0;
    for line in lines {
        let block_edge = floats.right_offset_at(line.rect.y);
        if line.rect.right() > block_edge && can_accommodate_ellipsis(line, block_edge, ellipsis_width) {
            place_ellipsis(line, content, metrics, block_edge, ellipsis_width);
            truncated += 1;
        }
    }
    if truncated > 0 {
        log::debug!("Placed an ellipsis on {truncated} lines");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::BidiStatus;
    use crate::content::ItemId;
    use crate::font::MonospaceFontMetrics;
    use crate::geometry::Rect;
    use crate::line_box::{AtomicBox, AtomicKind};
    use crate::style::{InlineStyle, TextDirection};

    const METRICS: MonospaceFontMetrics = MonospaceFontMetrics::new(10.0, 8.0, 2.0);

    fn text_box(item: ItemId, start: usize, len: usize, x: f32) -> InlineBox {
        #[allow(clippy::cast_precision_loss)]
        let width = len as f32 * 10.0;
        InlineBox::Text(TextBox {
            item,
            start,
            len,
            level: 0,
            overriding: false,
            x,
            y: 0.0,
            width,
            height: 10.0,
            space_add: 0.0,
            truncation: Truncation::None,
        })
    }

    fn line_of(children: Vec<InlineBox>, width: f32) -> RootLineBox {
        let mut line = RootLineBox::new(children, BidiStatus::new(TextDirection::Ltr, false));
        line.rect = Rect::new(0.0, 0.0, width, 10.0);
        line
    }

    #[test]
    fn test_partial_truncation() {
        let mut content = InlineContent::new(InlineStyle::default());
        let id = content.append_text("abcdefghij", InlineStyle::default());
        let mut line = line_of(vec![text_box(id, 0, 10, 0.0)], 100.0);
        assert!(can_accommodate_ellipsis(&line, 60.0, 10.0));
        place_ellipsis(&mut line, &content, &METRICS, 60.0, 10.0);
        assert_eq!(line.text_boxes()[0].truncation, Truncation::Partial(5));
        let ellipsis = line.ellipsis.expect("ellipsis placed");
        assert!((ellipsis.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_later_boxes_are_hidden() {
        let mut content = InlineContent::new(InlineStyle::default());
        let first = content.append_text("abcd", InlineStyle::default());
        let second = content.append_text("efgh", InlineStyle::default());
        let mut line = line_of(
            vec![text_box(first, 0, 4, 0.0), text_box(second, 0, 4, 40.0)],
            80.0,
        );
        place_ellipsis(&mut line, &content, &METRICS, 40.0, 10.0);
        let boxes = line.text_boxes();
        assert_eq!(boxes[0].truncation, Truncation::Partial(3));
        assert_eq!(boxes[1].truncation, Truncation::Full);
    }

    #[test]
    fn test_replaced_box_blocks_ellipsis() {
        let mut content = InlineContent::new(InlineStyle::default());
        let img = content.append_replaced(30.0, 10.0, InlineStyle::default());
        let line = line_of(
            vec![InlineBox::Atomic(AtomicBox {
                item: img,
                kind: AtomicKind::Replaced,
                level: 0,
                x: 40.0,
                y: 0.0,
                width: 30.0,
                height: 10.0,
            })],
            70.0,
        );
        assert!(!can_accommodate_ellipsis(&line, 60.0, 10.0));
    }

    #[test]
    fn test_narrow_line_cannot_take_ellipsis() {
        let line = line_of(Vec::new(), 5.0);
        assert!(!can_accommodate_ellipsis(&line, 0.0, 10.0));
    }

    #[test]
    fn test_apply_only_with_ellipsis_style() {
        let mut content = InlineContent::new(InlineStyle::default());
        let id = content.append_text("abcdefghij", InlineStyle::default());
        let mut lines = vec![line_of(vec![text_box(id, 0, 10, 0.0)], 100.0)];
        let floats = FloatRegistry::new(0.0, 50.0);
        assert_eq!(apply_text_overflow(&mut lines, &content, &METRICS, &floats), 0);

        let block = InlineStyle {
            text_overflow: TextOverflow::Ellipsis,
            ..InlineStyle::default()
        };
        let mut content = InlineContent::new(block);
        let id = content.append_text("abcdefghij", InlineStyle::default());
        let mut lines = vec![line_of(vec![text_box(id, 0, 10, 0.0)], 100.0)];
        assert_eq!(apply_text_overflow(&mut lines, &content, &METRICS, &floats), 1);
        assert_eq!(lines[0].text_boxes()[0].truncation, Truncation::Partial(4));
    }
}
