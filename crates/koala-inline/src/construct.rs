//! Building the box tree of one line from its bidi runs.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
//!
//! "When an inline box is split, margins, borders, and padding have no
//! visual effect where the split occurs."
//!
//! Runs arrive in visual order. Each run's box is nested inside flow boxes
//! for the inline containers around its item. A flow box is reused while
//! it is still the last box on the line's right spine, so consecutive runs
//! of one inline share a box; once anything else follows it on the line a
//! new piece is started.

use std::collections::HashMap;

use koala_common::warning::warn_once;

use crate::bidi::{BidiContext, BidiRun, BidiStatus, LineRuns};
use crate::classify::{Direction, is_collapsible_whitespace};
use crate::content::{InlineContent, ItemId};
use crate::iterator::{InlineIterator, bidi_next};
use crate::line_box::{AtomicBox, AtomicKind, FlowBox, InlineBox, RootLineBox, TextBox, Truncation};
use crate::style::{InlineStyle, TextAlign};

/// Where a line starts and ends in the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineBounds {
    /// The position the previous line broke at.
    pub(crate) start: InlineIterator,
    /// The position this line broke at.
    pub(crate) end: InlineIterator,
}

/// Separate the collapsible spaces at the end of the logically last run
/// and move them to the line's trailing edge.
///
/// [§ 4.1.3 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
///
/// "If there remains any sequence of white space ... at the end of a line,
/// it is removed (or hangs)."
///
/// Only `white-space: pre-wrap` keeps such spaces on the line. Returns the
/// visual index of the run holding just those spaces, if any.
pub(crate) fn split_trailing_space_run(
    content: &InlineContent,
    line: &mut LineRuns,
    block_style: &InlineStyle,
    base_context: &BidiContext,
) -> Option<usize> {
    let index = line.logically_last?;
    let run = line.runs.get(index)?;
    let style = content.style(run.item);
    if !style.break_only_after_white_space() || !style.auto_wrap() || !content.is_text(run.item) {
        return None;
    }

    // STEP 1: Find where the trailing spaces begin.
    let text = content.text(run.item);
    let mut first_space = run.stop;
    while first_space > run.start && is_collapsible_whitespace(text[first_space - 1], style) {
        first_space -= 1;
    }
    if first_space == run.stop {
        return None;
    }

    let ltr = block_style.direction.is_ltr();
    let trailing_edge = if ltr { line.runs.len() - 1 } else { 0 };
    let should_reorder = index != trailing_edge;

    // STEP 2: Split the spaces off into their own run at the base level,
    // placed on the trailing edge.
    if first_space != run.start {
        let left_aligned = matches!(block_style.text_align, TextAlign::Left | TextAlign::Start);
        let should_separate = !left_aligned || run.is_rtl() || !ltr || should_reorder;
        if should_separate {
            let item = run.item;
            let stop = run.stop;
            line.runs[index].stop = first_space;
            let spaces = BidiRun::new(item, first_space, stop, base_context, Direction::OtherNeutral);
            return Some(if ltr {
                line.runs.push(spaces);
                line.runs.len() - 1
            } else {
                line.runs.insert(0, spaces);
                0
            });
        }
    }

    // STEP 3: Otherwise move the whole run there.
    if !should_reorder {
        return Some(index);
    }
    let mut moved = line.runs.remove(index);
    Some(if ltr {
        moved.level = 0;
        line.runs.push(moved);
        line.runs.len() - 1
    } else {
        moved.level = 1;
        line.runs.insert(0, moved);
        0
    })
}

/// The box for one run.
fn leaf_box(content: &InlineContent, run: &BidiRun) -> Option<InlineBox> {
    let item = run.item;
    let visually_ordered = content.style(item).visually_ordered;
    let level = if visually_ordered { 0 } else { run.level };

    if content.is_text(item) {
        if run.is_empty() {
            return None;
        }
        return Some(InlineBox::Text(TextBox {
            item,
            start: run.start,
            len: run.len(),
            level,
            overriding: run.overriding || visually_ordered,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            space_add: 0.0,
            truncation: Truncation::None,
        }));
    }
    if content.is_inline(item) {
        // An empty inline: a flow box with nothing inside.
        return Some(InlineBox::Flow(FlowBox::empty(item)));
    }

    let (kind, width, height) = if let Some((width, height)) = content.replaced_size(item) {
        (AtomicKind::Replaced, width, height)
    } else if content.is_line_break(item) {
        (AtomicKind::LineBreak, 0.0, 0.0)
    } else if content.is_positioned(item) {
        (AtomicKind::Positioned, 0.0, 0.0)
    } else {
        return None;
    };
    Some(InlineBox::Atomic(AtomicBox {
        item,
        kind,
        level,
        x: 0.0,
        y: 0.0,
        width,
        height,
    }))
}

/// The inline containers around `item`, outermost first, capped at
/// `max_line_depth - 1` levels.
fn ancestor_chain(content: &InlineContent, item: ItemId, max_line_depth: usize) -> Vec<ItemId> {
    let mut chain = Vec::new();
    let mut parent = content.parent(item);
    while let Some(ancestor) = parent
        && ancestor != ItemId::BLOCK
    {
        chain.push(ancestor);
        parent = content.parent(ancestor);
    }

    let cap = max_line_depth.saturating_sub(1);
    if chain.len() > cap {
        // Skip the outer containers; the run hangs off the line directly.
        let _ = warn_once(
            "Layout",
            &format!("inline nesting exceeds {max_line_depth} levels; outer boxes skipped"),
        );
        chain.truncate(cap);
    }
    chain.reverse();
    chain
}

/// Append `leaf` along `chain`, reusing the flow boxes on the right spine.
fn attach(children: &mut Vec<InlineBox>, chain: &[ItemId], leaf: InlineBox) {
    let Some((&outer, rest)) = chain.split_first() else {
        children.push(leaf);
        return;
    };
    let reuse = matches!(children.last(), Some(InlineBox::Flow(flow)) if flow.item == outer);
    if !reuse {
        children.push(InlineBox::Flow(FlowBox::empty(outer)));
    }
    if let Some(InlineBox::Flow(flow)) = children.last_mut() {
        attach(&mut flow.children, rest, leaf);
    }
}

fn count_flows(boxes: &[InlineBox], counts: &mut HashMap<ItemId, usize>) {
    for child in boxes {
        if let InlineBox::Flow(flow) = child {
            *counts.entry(flow.item).or_default() += 1;
            count_flows(&flow.children, counts);
        }
    }
}

/// Decide on which sides each flow box shows its margin, border and
/// padding.
fn determine_edges(
    content: &InlineContent,
    boxes: &mut [InlineBox],
    bounds: LineBounds,
    counts: &HashMap<ItemId, usize>,
    seen: &mut HashMap<ItemId, usize>,
) {
    for child in boxes {
        let InlineBox::Flow(flow) = child else {
            continue;
        };
        let item = flow.item;
        let index = seen.entry(item).or_default();
        let is_first = *index == 0;
        *index += 1;
        let is_last = *index == counts.get(&item).copied().unwrap_or(1);

        if content.first_child(item).is_none() {
            // Empty inlines never split across lines.
            flow.include_left_edge = true;
            flow.include_right_edge = true;
        } else {
            let starts_here = bidi_next(content, item, None)
                .is_some_and(|first| InlineIterator::at(first, 0) >= bounds.start);
            let ends_here = bounds
                .end
                .item
                .is_none_or(|end| !content.is_descendant_of(end, item));
            if content.style(item).direction.is_ltr() {
                flow.include_left_edge = starts_here && is_first;
                flow.include_right_edge = ends_here && is_last;
            } else {
                flow.include_right_edge = starts_here && is_last;
                flow.include_left_edge = ends_here && is_first;
            }
        }
        determine_edges(content, &mut flow.children, bounds, counts, seen);
    }
}

/// Build the boxes of a line from its runs in visual order.
///
/// Returns `None` when no run produces a box.
pub(crate) fn construct_line(
    content: &InlineContent,
    runs: &[BidiRun],
    bounds: LineBounds,
    max_line_depth: usize,
    status: BidiStatus,
) -> Option<RootLineBox> {
    let mut children = Vec::new();
    for run in runs {
        let Some(leaf) = leaf_box(content, run) else {
            continue;
        };
        let chain = ancestor_chain(content, run.item, max_line_depth);
        attach(&mut children, &chain, leaf);
    }
    if children.is_empty() {
        return None;
    }

    let mut counts = HashMap::new();
    count_flows(&children, &mut counts);
    determine_edges(content, &mut children, bounds, &counts, &mut HashMap::new());

    Some(RootLineBox::new(children, status))
}
