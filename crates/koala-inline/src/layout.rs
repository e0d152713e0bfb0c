//! Laying out the inline content of one block into lines.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block. ... The
//! boxes may be aligned vertically in different ways ... The rectangular
//! area that contains the boxes that form a line is called a line box."
//!
//! Each pass over the block goes line by line:
//!
//! 1. Resume after the clean lines at the top, or start from scratch.
//! 2. Find where the next line breaks.
//! 3. Resolve the bidi runs of the line and build its boxes.
//! 4. Place the boxes horizontally and vertically.
//! 5. Stop early when the line ends where an old clean line ended, and
//!    reuse the old lines from there.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::bidi::{BidiContext, BidiResolver};
use crate::config::LayoutSettings;
use crate::construct::{LineBounds, construct_line, split_trailing_space_run};
use crate::content::{InlineContent, ItemId};
use crate::float::{ClearSide, FloatRegistry};
use crate::font::FontMetrics;
use crate::geometry::{EdgeSizes, Rect};
use crate::iterator::{InlineIterator, bidi_first};
use crate::line_box::{AtomicKind, InlineBox, RootLineBox};
use crate::line_breaker::{LineBreaker, LineEnd, StaticPosition};
use crate::midpoint::MidpointState;
use crate::overflow::apply_text_overflow;
use crate::placement::{HorizontalContext, LinePlacer};
use crate::relayout::{
    RepaintRange, determine_end_position, determine_start_position, matched_end_line,
};
use crate::style::UnicodeBidi;

/// The box edges of the block that holds the lines.
///
/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BlockGeometry {
    /// Width of the content box.
    pub content_width: f32,
    /// Border widths.
    pub border: EdgeSizes,
    /// Padding widths.
    pub padding: EdgeSizes,
}

impl BlockGeometry {
    /// Geometry of a block with a content box `content_width` wide.
    #[must_use]
    pub const fn new(content_width: f32, border: EdgeSizes, padding: EdgeSizes) -> Self {
        Self {
            content_width,
            border,
            padding,
        }
    }

    /// Left edge of the content box.
    #[must_use]
    pub fn content_left(&self) -> f32 {
        self.border.left + self.padding.left
    }

    /// Right edge of the content box.
    #[must_use]
    pub fn content_right(&self) -> f32 {
        self.content_left() + self.content_width
    }

    /// Top edge of the content box.
    #[must_use]
    pub fn content_top(&self) -> f32 {
        self.border.top + self.padding.top
    }

    /// Border and padding below the content box.
    #[must_use]
    pub fn bottom_edges(&self) -> f32 {
        self.border.bottom + self.padding.bottom
    }
}

/// Scratch state shared by the steps that lay out one line.
#[derive(Debug, Clone)]
pub struct LineLayoutState {
    /// Holes in the runs of the current line.
    pub midpoints: MidpointState,
    /// Nothing that needs a line box has been met on the current line.
    pub is_line_empty: bool,
    /// The previous line ended at a forced break.
    pub previous_line_broke_cleanly: bool,
}

impl LineLayoutState {
    /// State at the start of a block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            midpoints: MidpointState::new(),
            is_line_empty: true,
            previous_line_broke_cleanly: true,
        }
    }
}

impl Default for LineLayoutState {
    fn default() -> Self {
        Self::new()
    }
}

/// What one layout pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InlineLayoutResult {
    /// Top of the area that must be repainted.
    pub repaint_top: f32,
    /// Bottom of the area that must be repainted.
    pub repaint_bottom: f32,
    /// Lines built by this pass.
    pub lines_created: usize,
    /// Lines kept from the previous pass.
    pub lines_reused: usize,
    /// Static positions of out-of-flow items.
    pub static_positions: BTreeMap<ItemId, StaticPosition>,
    /// Height of the block's border box below its top border edge.
    pub height: f32,
}

/// A block container holding inline content, and the lines laid out from
/// it.
#[derive(Debug, Clone)]
pub struct InlineBlock {
    pub(crate) content: InlineContent,
    pub(crate) geometry: BlockGeometry,
    pub(crate) settings: LayoutSettings,
    pub(crate) floats: FloatRegistry,
    pub(crate) lines: Vec<RootLineBox>,
    /// Static positions recorded where no line box held the item.
    pub(crate) static_positions: BTreeMap<ItemId, StaticPosition>,
    pub(crate) height: f32,
    pub(crate) needs_full_layout: bool,
    pub(crate) has_pending_change: bool,
}

/// Move past a line: place the floats met on it and apply `clear`.
fn new_line(floats: &mut FloatRegistry, height: &mut f32, clear: Option<ClearSide>) {
    let _ = floats.position_pending_floats(*height);
    if let Some(side) = clear {
        *height = height.max(floats.clear_position(side));
    }
}

impl InlineBlock {
    /// A block with `content`, not laid out yet.
    #[must_use]
    pub fn new(content: InlineContent, geometry: BlockGeometry, settings: LayoutSettings) -> Self {
        Self {
            content,
            floats: FloatRegistry::new(geometry.content_left(), geometry.content_width),
            geometry,
            settings: settings.normalized(),
            lines: Vec::new(),
            static_positions: BTreeMap::new(),
            height: 0.0,
            needs_full_layout: true,
            has_pending_change: true,
        }
    }

    /// The content of the block.
    #[must_use]
    pub const fn content(&self) -> &InlineContent {
        &self.content
    }

    /// Mutable access to the content. Any change made through it is
    /// treated as structural and lays out every line again.
    pub const fn content_mut(&mut self) -> &mut InlineContent {
        self.needs_full_layout = true;
        &mut self.content
    }

    /// The lines of the last layout, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[RootLineBox] {
        &self.lines
    }

    /// The block geometry.
    #[must_use]
    pub const fn geometry(&self) -> &BlockGeometry {
        &self.geometry
    }

    /// Change the content width. Every line is laid out again.
    pub const fn set_content_width(&mut self, content_width: f32) {
        self.geometry.content_width = content_width;
        self.needs_full_layout = true;
    }

    /// The layout limits in use.
    #[must_use]
    pub const fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Height of the block after the last layout.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// The floats placed by the last layout.
    #[must_use]
    pub const fn floats(&self) -> &FloatRegistry {
        &self.floats
    }

    /// The `clear` of a forced break ending `line`.
    fn break_clear(&self, line: &RootLineBox) -> Option<ClearSide> {
        fn find_break(boxes: &[InlineBox]) -> Option<ItemId> {
            boxes.iter().find_map(|child| match child {
                InlineBox::Atomic(atomic) if atomic.kind == AtomicKind::LineBreak => {
                    Some(atomic.item)
                }
                InlineBox::Flow(flow) => find_break(&flow.children),
                _ => None,
            })
        }
        find_break(&line.children).and_then(|item| self.content.style(item).clear)
    }

    fn result(&self, repaint: RepaintRange, lines_created: usize, lines_reused: usize) -> InlineLayoutResult {
        let mut static_positions = self.static_positions.clone();
        for line in &self.lines {
            static_positions.extend(line.positioned.iter().copied());
        }
        InlineLayoutResult {
            repaint_top: repaint.top,
            repaint_bottom: repaint.bottom,
            lines_created,
            lines_reused,
            static_positions,
            height: self.height,
        }
    }

    /// Lay out the lines of the block.
    ///
    /// Lines untouched since the last pass are reused where possible;
    /// `relayout_all` discards them all. Layout never fails: malformed
    /// content degrades to a best-effort result.
    pub fn layout_inline_content(
        &mut self,
        metrics: &dyn FontMetrics,
        relayout_all: bool,
    ) -> InlineLayoutResult {
        if !relayout_all && !self.needs_full_layout && !self.has_pending_change {
            log::debug!("Inline content unchanged, reusing {} lines", self.lines.len());
            return self.result(RepaintRange::at(self.height), 0, self.lines.len());
        }

        let block_style = self.content.block_style().clone();
        let old_height = self.height;
        let mut height = self.geometry.content_top();

        // STEP 1: Find the first line to lay out.
        let start = determine_start_position(
            &mut self.lines,
            &self.content,
            relayout_all || self.needs_full_layout,
        );
        let full_layout = start.full_layout;
        let old_float_rects: HashMap<ItemId, Rect> = self
            .lines
            .iter()
            .flat_map(|line| &line.floats)
            .map(|f| (f.item, f.margin_box))
            .collect();
        if full_layout {
            self.lines.clear();
            self.static_positions.clear();
        }
        let first_dirty = if full_layout {
            0
        } else {
            start.first_dirty.unwrap_or(self.lines.len())
        };

        // STEP 2: Put back the floats of the kept lines and resume after
        // the last of them.
        self.floats = FloatRegistry::new(self.geometry.content_left(), self.geometry.content_width);
        for line in &self.lines[..first_dirty] {
            for &float in &line.floats {
                self.floats.restore_float(float, 0.0);
            }
        }
        let mut state = LineLayoutState::new();
        let mut resolver = match first_dirty.checked_sub(1).map(|index| &self.lines[index]) {
            Some(last) => {
                height = last.block_height;
                state.previous_line_broke_cleanly = last.ends_with_break;
                let mut resolver = BidiResolver::new(last.line_break_status.clone());
                resolver.set_position(last.line_break);
                resolver
            }
            None => {
                let mut resolver = BidiResolver::for_paragraph(
                    block_style.direction,
                    block_style.unicode_bidi == UnicodeBidi::BidiOverride,
                );
                let first = bidi_first(&self.content, Some(resolver.pending_embeddings()));
                resolver.set_position(InlineIterator::new(first, 0));
                resolver
            }
        }
        .with_max_embedding_level(self.settings.max_embedding_level);

        // STEP 3: Detach the clean lines below the dirty ones; they come
        // back if a new line resynchronizes with them.
        let mut suffix = match start.first_dirty {
            Some(first) if !full_layout => determine_end_position(&mut self.lines, first),
            _ => None,
        };
        let mut repaint = RepaintRange::at(if full_layout { 0.0 } else { height });
        for line in self.lines.drain(first_dirty..) {
            repaint.include(&line, 0.0);
        }
        let lines_kept = self.lines.len();

        let mut end = resolver.position();
        if !full_layout
            && let Some(last) = self.lines.last().filter(|line| line.ends_with_break)
            && let Some(clear) = self.break_clear(last)
        {
            new_line(&mut self.floats, &mut height, Some(clear));
        }

        // STEP 4: Lay out lines until the content ends or a line
        // resynchronizes with the clean suffix.
        let mut end_line_matched = false;
        let mut check_for_end_line_match = suffix.is_some();
        let mut check_floats_from_last_line = false;
        let mut last_height = height;
        let mut recorded_floats = self.floats.floats().len();
        let mut lines_created = 0;

        while !end.at_end() {
            if check_for_end_line_match
                && let Some(suffix) = suffix.as_mut()
                && matched_end_line(
                    suffix,
                    &resolver.position(),
                    resolver.status(),
                    height,
                    &self.floats,
                    self.settings.relayout_lookahead,
                    &mut repaint,
                )
            {
                end_line_matched = true;
                break;
            }

            state.is_line_empty = true;
            state.midpoints.clear();
            let line_start = resolver.position();
            let LineEnd {
                end: line_end,
                clear,
            } = LineBreaker {
                content: &self.content,
                metrics,
                geometry: &self.geometry,
                floats: &mut self.floats,
                height: &mut height,
                static_positions: &mut self.static_positions,
                state: &mut state,
                max_line_depth: self.settings.max_line_depth,
            }
            .find_next_line_break(&mut resolver);
            end = line_end;
            if resolver.position().at_end() {
                check_floats_from_last_line = true;
                break;
            }

            if !state.is_line_empty {
                let broke_cleanly = state.previous_line_broke_cleanly;
                let mut runs = resolver.create_runs_for_line(
                    &self.content,
                    end,
                    &mut state.midpoints,
                    block_style.visually_ordered,
                    broke_cleanly,
                );
                let trailing = if broke_cleanly {
                    None
                } else {
                    let base = BidiContext::root_of(resolver.context());
                    split_trailing_space_run(&self.content, &mut runs, &block_style, &base)
                };
                let trailing_space = trailing
                    .and_then(|index| runs.runs.get(index))
                    .map(|run| (run.item, run.start));

                let bounds = LineBounds {
                    start: line_start,
                    end,
                };
                if let Some(mut line) = construct_line(
                    &self.content,
                    &runs.runs,
                    bounds,
                    self.settings.max_line_depth,
                    resolver.status().clone(),
                ) {
                    line.ends_with_break = broke_cleanly;
                    let placer = LinePlacer {
                        content: &self.content,
                        metrics,
                    };
                    placer.place_horizontally(
                        &mut line,
                        HorizontalContext {
                            block_style: &block_style,
                            left: self.floats.left_offset_at(height),
                            available_width: self.floats.line_width_at(height),
                            reached_end: end.at_end(),
                            trailing_space,
                        },
                    );
                    let bottom = placer.place_vertically(&mut line, height, &block_style);

                    // Out-of-flow items keep only their static position.
                    let start_edge = if block_style.direction.is_ltr() {
                        self.geometry.content_left()
                    } else {
                        self.geometry.content_right()
                    };
                    for (item, x) in LinePlacer::take_positioned(&mut line) {
                        let position = if self.content.is_inline_level_positioned(item) {
                            StaticPosition { x, y: height }
                        } else {
                            StaticPosition {
                                x: start_edge,
                                y: bottom,
                            }
                        };
                        let _ = self.static_positions.remove(&item);
                        line.positioned.push((item, position));
                    }

                    height = bottom;
                    line.block_height = height;
                    line.set_line_break_info(end, resolver.status().clone());
                    repaint.include(&line, 0.0);
                    log::debug!(
                        "Line {} ends at {:?}:{} (y={}, height={})",
                        self.lines.len(),
                        end.item,
                        end.pos,
                        line.rect.y,
                        line.rect.height
                    );
                    #[cfg(feature = "layout-trace")]
                    eprintln!(
                        "[INLINE LINE] #{} x={} y={} w={} h={} runs={} break={:?}:{}",
                        self.lines.len(),
                        line.rect.x,
                        line.rect.y,
                        line.rect.width,
                        line.rect.height,
                        runs.len(),
                        end.item,
                        end.pos
                    );
                    lines_created += 1;
                    self.lines.push(line);
                }
                new_line(&mut self.floats, &mut height, clear);
            }

            // Floats placed since the last line belong to the line above
            // them. A float that moved rules out reusing clean lines.
            if let Some(line) = self.lines.last_mut() {
                for float in &self.floats.floats()[recorded_floats..] {
                    if float.margin_box.bottom() > last_height {
                        line.floats.push(*float);
                    }
                    if old_float_rects
                        .get(&float.item)
                        .is_some_and(|old| *old != float.margin_box)
                    {
                        check_for_end_line_match = false;
                    }
                }
                recorded_floats = self.floats.floats().len();
            }

            last_height = height;
            resolver.set_position(end);
        }

        // STEP 5: Reattach the clean suffix, or drop it.
        let mut lines_reused = lines_kept;
        if let Some(suffix) = suffix {
            if end_line_matched {
                let delta = height - suffix.y;
                for mut line in suffix.lines {
                    if delta != 0.0 {
                        repaint.include(&line, delta);
                        line.shift_vertically(delta);
                    }
                    for &float in &line.floats {
                        self.floats.restore_float(float, 0.0);
                    }
                    line.dirty = false;
                    lines_reused += 1;
                    self.lines.push(line);
                }
                if let Some(last) = self.lines.last() {
                    height = last.block_height;
                }
                recorded_floats = self.floats.floats().len();
            } else {
                for line in &suffix.lines {
                    repaint.include(line, 0.0);
                }
            }
        }

        // STEP 6: Floats met after the last line still belong to it.
        if (check_floats_from_last_line || self.floats.position_pending_floats(height))
            && let Some(line) = self.lines.last_mut()
        {
            for float in &self.floats.floats()[recorded_floats.min(self.floats.floats().len())..] {
                if float.margin_box.bottom() > last_height {
                    line.floats.push(*float);
                }
            }
        }

        // STEP 7: Bottom border and padding, and the height of an empty
        // block that keeps a line.
        height += self.geometry.bottom_edges();
        if self.lines.is_empty() && block_style.has_line_if_empty {
            height += metrics.line_height(&block_style);
        }

        // STEP 8: Truncate overflowing lines.
        let _ = apply_text_overflow(&mut self.lines, &self.content, metrics, &self.floats);

        if full_layout {
            repaint.bottom = repaint.bottom.max(height).max(old_height);
        }
        self.height = height;
        self.needs_full_layout = false;
        self.has_pending_change = false;

        log::debug!(
            "Laid out {} lines ({lines_created} new, {lines_reused} reused), height {height}",
            self.lines.len()
        );
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[INLINE LAYOUT] lines={} created={lines_created} reused={lines_reused} height={height}",
            self.lines.len()
        );

        self.result(repaint, lines_created, lines_reused)
    }
}
