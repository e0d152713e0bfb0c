//! Placing the boxes of a line.
//!
//! [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
//!
//! "This property describes how inline-level content of a block container
//! is aligned. ... If an inline box does not fit ... [it] may be split
//! into several boxes."
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "The height of each inline-level box in the line box is calculated.
//! ... The inline-level boxes are aligned vertically according to their
//! 'vertical-align' property. ... The line box height is the distance
//! between the uppermost box top and the lowermost box bottom."

use crate::classify::{NO_BREAK_SPACE, is_space_or_newline};
use crate::content::{InlineContent, ItemId};
use crate::font::FontMetrics;
use crate::line_box::{AtomicKind, InlineBox, RootLineBox, TextBox, for_each_text_box_mut};
use crate::style::{InlineStyle, TextAlign, VerticalAlign};

/// Inputs of horizontal placement that come from the block.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HorizontalContext<'a> {
    /// Style of the containing block.
    pub(crate) block_style: &'a InlineStyle,
    /// Left edge available to the line.
    pub(crate) left: f32,
    /// Width available to the line.
    pub(crate) available_width: f32,
    /// The line ends the content.
    pub(crate) reached_end: bool,
    /// `(item, start)` of the text box holding the hanging trailing
    /// spaces, if any.
    pub(crate) trailing_space: Option<(ItemId, usize)>,
}

/// Places the boxes of one line.
pub(crate) struct LinePlacer<'a> {
    pub(crate) content: &'a InlineContent,
    pub(crate) metrics: &'a dyn FontMetrics,
}

/// Word spacing treats these like spaces.
const fn treat_as_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | NO_BREAK_SPACE)
}

/// Which of the classic alignments applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Auto,
    Left,
    Right,
    Center,
    Justify,
}

impl LinePlacer<'_> {
    /// Width of a text run, with `word-spacing` added after every word
    /// inside it.
    fn text_run_width(&self, item: ItemId, start: usize, len: usize, x: f32) -> f32 {
        let width = self.content.text_width(item, start, len, x, self.metrics);
        let word_spacing = self.content.style(item).word_spacing;
        if word_spacing == 0.0 || len == 0 {
            return width;
        }
        let text = self.content.text(item);
        let end = (start + len).min(text.len());
        let words = (start + 1..end)
            .filter(|&i| treat_as_space(text[i]) && !treat_as_space(text[i - 1]))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let extra = word_spacing * words as f32;
        width + extra
    }

    /// Sum of the margin, border and padding of every included flow edge.
    fn flow_spacing_width(&self, boxes: &[InlineBox]) -> f32 {
        boxes
            .iter()
            .map(|child| match child {
                InlineBox::Flow(flow) => {
                    let style = self.content.style(flow.item);
                    let mut width = self.flow_spacing_width(&flow.children);
                    if flow.include_left_edge {
                        width += style.margin.left + style.border.left + style.padding.left;
                    }
                    if flow.include_right_edge {
                        width += style.margin.right + style.border.right + style.padding.right;
                    }
                    width
                }
                _ => 0.0,
            })
            .sum()
    }

    /// Measure the leaves in visual order.
    ///
    /// Returns `(total width, interior space count)`.
    fn measure(
        &self,
        boxes: &mut [InlineBox],
        total: &mut f32,
        needs_word_spacing: &mut bool,
        justify: bool,
        trailing_space: Option<(ItemId, usize)>,
        spaces: &mut usize,
    ) {
        for child in boxes {
            match child {
                InlineBox::Text(text) => {
                    let chars = self.content.text(text.item);
                    if justify && trailing_space != Some((text.item, text.start)) {
                        *spaces += count_spaces(chars, text);
                    }
                    if !chars.is_empty() && text.len > 0 {
                        if text.start == 0 && *needs_word_spacing && is_space_or_newline(chars[0]) {
                            *total += self.content.style(text.item).word_spacing;
                        }
                        *needs_word_spacing =
                            !is_space_or_newline(chars[text.end() - 1]) && text.end() == chars.len();
                    }
                    text.width = self.text_run_width(text.item, text.start, text.len, *total);
                    *total += text.width;
                }
                InlineBox::Atomic(atomic) => {
                    if atomic.kind == AtomicKind::Replaced {
                        *total += self.content.style(atomic.item).margin.horizontal() + atomic.width;
                    }
                }
                InlineBox::Flow(flow) => {
                    self.measure(
                        &mut flow.children,
                        total,
                        needs_word_spacing,
                        justify,
                        trailing_space,
                        spaces,
                    );
                }
            }
        }
    }

    /// [§ 16.2](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Measure the line, align it and give every box its `x`.
    pub(crate) fn place_horizontally(&self, line: &mut RootLineBox, cx: HorizontalContext<'_>) {
        let ltr = cx.block_style.direction.is_ltr();
        let alignment = match cx.block_style.text_align {
            TextAlign::Start => Alignment::Auto,
            TextAlign::End if ltr => Alignment::Right,
            TextAlign::Left | TextAlign::End => Alignment::Left,
            TextAlign::Right => Alignment::Right,
            TextAlign::Center => Alignment::Center,
            TextAlign::Justify => Alignment::Justify,
        };

        // STEP 1: Total width, without justification.
        let mut total = self.flow_spacing_width(&line.children);
        let mut needs_word_spacing = false;
        let mut num_spaces = 0;
        self.measure(
            &mut line.children,
            &mut total,
            &mut needs_word_spacing,
            alignment == Alignment::Justify,
            cx.trailing_space,
            &mut num_spaces,
        );

        // STEP 2: Align. The trailing spaces of pre-wrap text hang: they
        // shrink to fit or vanish.
        let available = cx.available_width;
        let mut trailing_width = self.trailing_width(line, cx.trailing_space);
        let mut x = cx.left;
        let mut alignment = alignment;
        if alignment == Alignment::Justify {
            if num_spaces > 0 && !cx.reached_end && !line.ends_with_break {
                if let Some(width) = trailing_width {
                    total -= width;
                    trailing_width = Some(0.0);
                }
            } else {
                alignment = Alignment::Auto;
            }
        }
        if alignment != Alignment::Justify {
            num_spaces = 0;
        }
        // A right to left block aligns `start` like `right`.
        if alignment == Alignment::Auto && !ltr {
            alignment = Alignment::Right;
        }
        match alignment {
            Alignment::Justify => {}
            Alignment::Left | Alignment::Auto => {
                // Wide lines spill out on the side the block's direction
                // points to.
                if ltr {
                    if total > available
                        && let Some(width) = trailing_width
                    {
                        trailing_width = Some((width - total + available).max(0.0));
                    }
                } else if trailing_width.is_some() {
                    trailing_width = Some(0.0);
                } else if total > available {
                    x -= total - available;
                }
            }
            Alignment::Right => {
                if ltr {
                    if let Some(width) = trailing_width {
                        total -= width;
                        trailing_width = Some(0.0);
                    }
                    if total < available {
                        x += available - total;
                    }
                } else if total > available
                    && let Some(width) = trailing_width
                {
                    let shrunk = (width - total + available).max(0.0);
                    trailing_width = Some(shrunk);
                    total -= shrunk;
                } else {
                    x += available - total;
                }
            }
            Alignment::Center => {
                let mut hanging = 0.0;
                if let Some(width) = trailing_width {
                    total -= width;
                    hanging = width.min((available - total) / 2.0).max(0.0);
                    trailing_width = Some(hanging);
                }
                if ltr {
                    x += ((available - total) / 2.0).max(0.0);
                } else if total > available {
                    x += available - total;
                } else {
                    x += (available - total) / 2.0 - hanging;
                }
            }
        }
        if let (Some((item, start)), Some(width)) = (cx.trailing_space, trailing_width) {
            for_each_text_box_mut(&mut line.children, &mut |text| {
                if text.item == item && text.start == start {
                    text.width = width;
                }
            });
        }

        // STEP 3: Hand the leftover width to the spaces of collapsible
        // text.
        if num_spaces > 0 {
            let content = self.content;
            let mut remaining = num_spaces;
            for_each_text_box_mut(&mut line.children, &mut |text| {
                if remaining == 0 || cx.trailing_space == Some((text.item, text.start)) {
                    return;
                }
                let spaces = count_spaces(content.text(text.item), text);
                if content.style(text.item).collapse_white_space() {
                    #[allow(clippy::cast_precision_loss)]
                    let share = (available - total) * spaces as f32 / remaining as f32;
                    text.space_add = share;
                    text.width += share;
                    total += share;
                }
                remaining -= spaces;
            });
        }

        // STEP 4: Place every box.
        let mut left = x;
        let mut right = x;
        let mut needs_word_spacing = false;
        let end = self.place_boxes(&mut line.children, x, &mut left, &mut right, &mut needs_word_spacing);
        line.rect.x = x;
        line.rect.width = end - x;
        line.overflow_left = left.min(x);
        line.overflow_right = right.max(end);
    }

    fn trailing_width(&self, line: &RootLineBox, trailing: Option<(ItemId, usize)>) -> Option<f32> {
        let (item, start) = trailing?;
        line.text_boxes()
            .into_iter()
            .find(|text| text.item == item && text.start == start)
            .map(|text| text.width)
    }

    fn place_boxes(
        &self,
        boxes: &mut [InlineBox],
        mut x: f32,
        left: &mut f32,
        right: &mut f32,
        needs_word_spacing: &mut bool,
    ) -> f32 {
        for child in boxes {
            match child {
                InlineBox::Text(text) => {
                    let chars = self.content.text(text.item);
                    if text.len > 0 && text.end() <= chars.len() {
                        if *needs_word_spacing && is_space_or_newline(chars[text.start]) {
                            x += self.content.style(text.item).word_spacing;
                        }
                        *needs_word_spacing = !is_space_or_newline(chars[text.end() - 1]);
                    }
                    text.x = x;
                    *left = left.min(x);
                    *right = right.max(x + text.width);
                    x += text.width;
                }
                InlineBox::Atomic(atomic) => {
                    if atomic.kind == AtomicKind::Positioned {
                        // Only its static position matters.
                        atomic.x = x;
                        continue;
                    }
                    let margin = self.content.style(atomic.item).margin;
                    x += margin.left;
                    atomic.x = x;
                    *left = left.min(x);
                    *right = right.max(x + atomic.width);
                    x += atomic.width + margin.right;
                }
                InlineBox::Flow(flow) => {
                    let style = self.content.style(flow.item);
                    if flow.include_left_edge {
                        x += style.margin.left;
                    }
                    flow.x = x;
                    if flow.include_left_edge {
                        x += style.border.left + style.padding.left;
                    }
                    x = self.place_boxes(&mut flow.children, x, left, right, needs_word_spacing);
                    if flow.include_right_edge {
                        x += style.border.right + style.padding.right;
                    }
                    flow.width = x - flow.x;
                    *right = right.max(flow.x + flow.width);
                    if flow.include_right_edge {
                        x += style.margin.right;
                    }
                }
            }
        }
        x
    }

    /// Height above and below the baseline that a box's own layout box
    /// takes: the half-leading model for text and inline boxes, the margin
    /// box for replaced elements.
    fn layout_extent(&self, child: &InlineBox) -> (f32, f32) {
        match child {
            InlineBox::Atomic(atomic) if atomic.kind == AtomicKind::Replaced => {
                let margin = self.content.style(atomic.item).margin;
                (atomic.height + margin.top + margin.bottom, 0.0)
            }
            InlineBox::Atomic(atomic) if atomic.kind == AtomicKind::Positioned => (0.0, 0.0),
            _ => self.strut(self.content.style(child.item())),
        }
    }

    /// `(A + L/2, D + L/2)` for a style: ascent and descent plus half the
    /// leading.
    fn strut(&self, style: &InlineStyle) -> (f32, f32) {
        let ascent = self.metrics.ascent(style);
        let descent = self.metrics.descent(style);
        let half_leading = (self.metrics.line_height(style) - (ascent + descent)) / 2.0;
        (ascent + half_leading, descent + half_leading)
    }

    /// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
    ///
    /// Offset of a box's baseline below its parent's baseline.
    fn baseline_shift(&self, style: &InlineStyle, parent: &InlineStyle, extent: (f32, f32)) -> f32 {
        let (above, below) = extent;
        match style.vertical_align {
            VerticalAlign::Baseline | VerticalAlign::Top | VerticalAlign::Bottom => 0.0,
            VerticalAlign::Sub => parent.font_size / 5.0 + 1.0,
            VerticalAlign::Super => -(parent.font_size / 3.0 + 1.0),
            VerticalAlign::TextTop => above - self.metrics.ascent(parent),
            VerticalAlign::TextBottom => self.metrics.descent(parent) - below,
            VerticalAlign::Middle => (above - below) / 2.0 - self.metrics.x_height(parent) / 2.0,
            VerticalAlign::Length(length) => -length,
        }
    }

    /// Extent of a box and its aligned descendants relative to the box's
    /// baseline. Boxes aligned to the line's top or bottom are collected
    /// in `outliers` instead.
    fn subtree_extent(&self, child: &InlineBox, outliers: &mut Vec<(VerticalAlign, f32, f32)>) -> (f32, f32) {
        let (mut above, mut below) = self.layout_extent(child);
        if let InlineBox::Flow(flow) = child {
            let parent = self.content.style(flow.item);
            for grandchild in &flow.children {
                self.merge_child(grandchild, parent, &mut above, &mut below, outliers);
            }
        }
        (above, below)
    }

    fn merge_child(
        &self,
        child: &InlineBox,
        parent: &InlineStyle,
        above: &mut f32,
        below: &mut f32,
        outliers: &mut Vec<(VerticalAlign, f32, f32)>,
    ) {
        if matches!(child, InlineBox::Atomic(atomic) if atomic.kind == AtomicKind::Positioned) {
            return;
        }
        let style = self.content.style(child.item());
        let extent = self.subtree_extent(child, outliers);
        match style.vertical_align {
            VerticalAlign::Top | VerticalAlign::Bottom => {
                outliers.push((style.vertical_align, extent.0, extent.1));
            }
            _ => {
                let shift = self.baseline_shift(style, parent, self.layout_extent(child));
                *above = above.max(extent.0 - shift);
                *below = below.max(extent.1 + shift);
            }
        }
    }

    /// Align the boxes of a line whose top is at `top`. Returns the block
    /// height below the line.
    pub(crate) fn place_vertically(&self, line: &mut RootLineBox, top: f32, block_style: &InlineStyle) -> f32 {
        // STEP 1: The root inline box's strut and every aligned box.
        let (mut above, mut below) = self.strut(block_style);
        let mut outliers = Vec::new();
        for child in &line.children {
            self.merge_child(child, block_style, &mut above, &mut below, &mut outliers);
        }

        // STEP 2: Boxes aligned to the top or bottom may stretch the line.
        for &(align, box_above, box_below) in &outliers {
            let height = box_above + box_below;
            if height > above + below {
                if align == VerticalAlign::Top {
                    below = height - above;
                } else {
                    above = height - below;
                }
            }
        }

        // STEP 3: Give every box its position.
        let baseline = top + above;
        let bottom = baseline + below;
        line.rect.y = top;
        line.rect.height = above + below;
        line.baseline = baseline;
        let mut overflow = (top, bottom);
        self.place_children(&mut line.children, block_style, baseline, (top, bottom), &mut overflow);
        line.overflow_top = overflow.0;
        line.overflow_bottom = overflow.1;
        bottom
    }

    fn place_children(
        &self,
        boxes: &mut [InlineBox],
        parent: &InlineStyle,
        parent_baseline: f32,
        line: (f32, f32),
        overflow: &mut (f32, f32),
    ) {
        for child in boxes {
            let style = self.content.style(child.item());
            let own = self.layout_extent(child);
            let baseline = match style.vertical_align {
                VerticalAlign::Top | VerticalAlign::Bottom => {
                    let (above, below) = self.subtree_extent(child, &mut Vec::new());
                    if style.vertical_align == VerticalAlign::Top {
                        line.0 + above
                    } else {
                        line.1 - below
                    }
                }
                _ => parent_baseline + self.baseline_shift(style, parent, own),
            };

            match child {
                InlineBox::Text(text) => {
                    place_glyph_area(text, style, baseline, self.metrics);
                }
                InlineBox::Atomic(atomic) => match atomic.kind {
                    AtomicKind::Replaced => {
                        atomic.y = baseline - atomic.height - style.margin.bottom;
                    }
                    AtomicKind::LineBreak => {
                        atomic.y = baseline - self.metrics.ascent(style);
                        atomic.height = self.metrics.ascent(style) + self.metrics.descent(style);
                    }
                    AtomicKind::Positioned => {
                        atomic.y = line.0;
                        continue;
                    }
                },
                InlineBox::Flow(flow) => {
                    flow.y = baseline - self.metrics.ascent(style);
                    flow.height = self.metrics.ascent(style) + self.metrics.descent(style);
                    self.place_children(&mut flow.children, style, baseline, line, overflow);
                }
            }
            overflow.0 = overflow.0.min(child.y());
            overflow.1 = overflow.1.max(child.y() + child.height());
        }
    }

    /// Remove the placeholders of positioned boxes, returning each item
    /// with the `x` it was placed at.
    pub(crate) fn take_positioned(line: &mut RootLineBox) -> Vec<(ItemId, f32)> {
        fn take(boxes: &mut Vec<InlineBox>, out: &mut Vec<(ItemId, f32)>) {
            boxes.retain(|child| match child {
                InlineBox::Atomic(atomic) if atomic.kind == AtomicKind::Positioned => {
                    out.push((atomic.item, atomic.x));
                    false
                }
                _ => true,
            });
            for child in boxes {
                if let InlineBox::Flow(flow) = child {
                    take(&mut flow.children, out);
                }
            }
        }
        let mut out = Vec::new();
        take(&mut line.children, &mut out);
        out
    }
}

fn place_glyph_area(text: &mut TextBox, style: &InlineStyle, baseline: f32, metrics: &dyn FontMetrics) {
    let ascent = metrics.ascent(style);
    text.y = baseline - ascent;
    text.height = ascent + metrics.descent(style);
}

/// Spaces that justification may widen.
fn count_spaces(chars: &[char], text: &TextBox) -> usize {
    chars
        .get(text.start..text.end())
        .unwrap_or_default()
        .iter()
        .filter(|&&ch| matches!(ch, ' ' | '\n' | '\t'))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::BidiStatus;
    use crate::font::MonospaceFontMetrics;
    use crate::geometry::EdgeSizes;
    use crate::line_box::{AtomicBox, FlowBox, Truncation};
    use crate::style::TextDirection;

    const METRICS: MonospaceFontMetrics = MonospaceFontMetrics::new(10.0, 8.0, 2.0);

    fn text_box(item: ItemId, start: usize, len: usize) -> InlineBox {
        InlineBox::Text(TextBox {
            item,
            start,
            len,
            level: 0,
            overriding: false,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            space_add: 0.0,
            truncation: Truncation::None,
        })
    }

    fn line_of(children: Vec<InlineBox>) -> RootLineBox {
        RootLineBox::new(children, BidiStatus::new(TextDirection::Ltr, false))
    }

    fn context(block_style: &InlineStyle, width: f32) -> HorizontalContext<'_> {
        HorizontalContext {
            block_style,
            left: 0.0,
            available_width: width,
            reached_end: false,
            trailing_space: None,
        }
    }

    fn aligned(align: TextAlign) -> (InlineContent, ItemId, InlineStyle) {
        let style = InlineStyle {
            text_align: align,
            ..InlineStyle::default()
        };
        let mut content = InlineContent::new(style.clone());
        let id = content.append_text("ab cd", InlineStyle::default());
        (content, id, style)
    }

    #[test]
    fn test_alignments() {
        for (align, expected) in [
            (TextAlign::Start, 0.0),
            (TextAlign::Left, 0.0),
            (TextAlign::Right, 50.0),
            (TextAlign::End, 50.0),
            (TextAlign::Center, 25.0),
        ] {
            let (content, id, style) = aligned(align);
            let placer = LinePlacer {
                content: &content,
                metrics: &METRICS,
            };
            let mut line = line_of(vec![text_box(id, 0, 5)]);
            placer.place_horizontally(&mut line, context(&style, 100.0));
            assert!((line.rect.x - expected).abs() < 1e-4, "{align:?}");
            assert!((line.rect.width - 50.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_justify_spreads_leftover_width() {
        let (content, id, style) = aligned(TextAlign::Justify);
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![text_box(id, 0, 5)]);
        placer.place_horizontally(&mut line, context(&style, 100.0));
        let boxes = line.text_boxes();
        assert!((boxes[0].space_add - 50.0).abs() < 1e-4);
        assert!((line.rect.width - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_justify_skips_the_last_line() {
        let (content, id, style) = aligned(TextAlign::Justify);
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![text_box(id, 0, 5)]);
        let mut cx = context(&style, 100.0);
        cx.reached_end = true;
        placer.place_horizontally(&mut line, cx);
        assert!(line.text_boxes()[0].space_add.abs() < f32::EPSILON);
        assert!((line.rect.width - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_rtl_start_aligns_right() {
        let style = InlineStyle {
            direction: TextDirection::Rtl,
            ..InlineStyle::default()
        };
        let mut content = InlineContent::new(style.clone());
        let id = content.append_text("abc", InlineStyle::default());
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![text_box(id, 0, 3)]);
        placer.place_horizontally(&mut line, context(&style, 100.0));
        assert!((line.rect.x - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_flow_edges_take_space() {
        let mut content = InlineContent::new(InlineStyle::default());
        let span_style = InlineStyle {
            padding: EdgeSizes::uniform(5.0),
            ..InlineStyle::default()
        };
        let span = content.open_inline(span_style);
        let id = content.append_text("ab", InlineStyle::default());
        let _ = content.close_inline().expect("span is open");
        let flow = InlineBox::Flow(FlowBox {
            children: vec![text_box(id, 0, 2)],
            include_left_edge: true,
            include_right_edge: false,
            ..FlowBox::empty(span)
        });
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![flow]);
        placer.place_horizontally(&mut line, context(&InlineStyle::default(), 100.0));
        assert!((line.text_boxes()[0].x - 5.0).abs() < 1e-4);
        assert!((line.rect.width - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_baseline_alignment() {
        let mut content = InlineContent::new(InlineStyle::default());
        let id = content.append_text("ab", InlineStyle::default());
        let img = content.append_replaced(20.0, 30.0, InlineStyle::default());
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![
            text_box(id, 0, 2),
            InlineBox::Atomic(AtomicBox {
                item: img,
                kind: AtomicKind::Replaced,
                level: 0,
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 30.0,
            }),
        ]);
        let bottom = placer.place_vertically(&mut line, 100.0, &InlineStyle::default());
        // Image sits on the baseline: 30 above, the strut's 2 below.
        assert!((line.baseline - 130.0).abs() < 1e-4);
        assert!((bottom - 132.0).abs() < 1e-4);
        let text = line.text_boxes()[0];
        assert!((text.y - 122.0).abs() < 1e-4);
    }

    #[test]
    fn test_explicit_line_height_adds_half_leading() {
        let style = InlineStyle {
            line_height: Some(20.0),
            ..InlineStyle::default()
        };
        let mut content = InlineContent::new(style.clone());
        let id = content.append_text("ab", style.clone());
        let placer = LinePlacer {
            content: &content,
            metrics: &METRICS,
        };
        let mut line = line_of(vec![text_box(id, 0, 2)]);
        let bottom = placer.place_vertically(&mut line, 0.0, &style);
        assert!((bottom - 20.0).abs() < 1e-4);
        assert!((line.baseline - 13.0).abs() < 1e-4);
    }

    #[test]
    fn test_positioned_placeholders_are_taken() {
        let mut content = InlineContent::new(InlineStyle::default());
        let abs = content.append_positioned(true, InlineStyle::default());
        let mut line = line_of(vec![InlineBox::Atomic(AtomicBox {
            item: abs,
            kind: AtomicKind::Positioned,
            level: 0,
            x: 12.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        })]);
        assert_eq!(LinePlacer::take_positioned(&mut line), vec![(abs, 12.0)]);
        assert!(line.children.is_empty());
    }
}
