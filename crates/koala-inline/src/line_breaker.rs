//! Finding the end of the next line.
//!
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "When inline-level content is laid out into lines, it is broken across
//! line boxes. Such a break is called a line break. When a line is broken
//! due to explicit line-breaking controls, or due to the start or end of a
//! block, it is a forced line break. When a line is broken due to content
//! wrapping, it is a soft wrap break."
//!
//! [§ 4.1.2 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
//!
//! "A sequence of collapsible spaces at the beginning of a line is removed.
//! ... If there remains any sequence of white space ... at the end of a
//! line, it is removed."
//!
//! The breaker walks the content one item at a time, and text one
//! character at a time, keeping two widths: `w`, the width committed up to
//! the last break opportunity, and `tmp_w`, the width accumulated since.
//! Collapsed spaces and hidden soft hyphens are recorded as midpoints so
//! the runs of the line can skip them later.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bidi::BidiResolver;
use crate::break_locator::is_breakable;
use crate::classify::{NO_BREAK_SPACE, SOFT_HYPHEN};
use crate::content::{InlineContent, ItemId};
use crate::float::{ClearSide, FloatRegistry};
use crate::font::FontMetrics;
use crate::iterator::{InlineIterator, bidi_next};
use crate::layout::{BlockGeometry, LineLayoutState};
use crate::style::{InlineStyle, NbspMode, WhiteSpace, WordBreak};

/// The static position of an out-of-flow box.
///
/// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// "The static position for 'left' is the distance from the left edge of
/// the containing block to the left margin edge of a hypothetical box that
/// would have been the first box of the element if its specified
/// 'position' value had been 'static'."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StaticPosition {
    /// Horizontal position of the inline-start edge.
    pub x: f32,
    /// Vertical position of the top edge.
    pub y: f32,
}

/// Where a line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEnd {
    /// The position the next line starts at.
    pub end: InlineIterator,
    /// The `clear` of the forced break that ended the line, if any.
    pub clear: Option<ClearSide>,
}

/// Scratch state of one line scan.
#[allow(clippy::struct_excessive_bools)]
struct Scan {
    /// Width available to the line.
    width: f32,
    /// Width committed up to the last break opportunity.
    w: f32,
    /// Width accumulated since the last break opportunity.
    tmp_w: f32,
    ignoring_spaces: bool,
    /// Where the current run of spaces began.
    ignore_start: InlineIterator,
    current_is_space: bool,
    current_is_ws: bool,
    trailing_space_object: Option<ItemId>,
    line_break: InlineIterator,
    /// The last in-flow item visited.
    last: ItemId,
    last_ws: WhiteSpace,
    at_start: bool,
    applied_start_width: bool,
    auto_wrap_was_ever_true: bool,
    floats_fit_on_line: bool,
    prev_line_broke_cleanly: bool,
}

/// How the scan continues after an item.
enum Step {
    /// Move on to the next item.
    Next,
    /// The line is full; finish at the recorded break.
    End,
    /// The line ends at a preserved newline.
    Done(InlineIterator),
}

/// Breaks the content of one block into lines.
///
/// Borrowed pieces of the block being laid out; the breaker moves the
/// block's vertical cursor when it has to slide a line below floats.
pub(crate) struct LineBreaker<'a> {
    pub(crate) content: &'a InlineContent,
    pub(crate) metrics: &'a dyn FontMetrics,
    pub(crate) geometry: &'a BlockGeometry,
    pub(crate) floats: &'a mut FloatRegistry,
    pub(crate) height: &'a mut f32,
    pub(crate) static_positions: &'a mut BTreeMap<ItemId, StaticPosition>,
    pub(crate) state: &'a mut LineLayoutState,
    pub(crate) max_line_depth: usize,
}

impl LineBreaker<'_> {
    fn block_style(&self) -> &InlineStyle {
        self.content.block_style()
    }

    fn line_width(&self) -> f32 {
        self.floats.line_width_at(*self.height)
    }

    fn text_width(&self, item: ItemId, start: usize, len: usize, x: f32) -> f32 {
        self.content.text_width(item, start, len, x, self.metrics)
    }

    /// White space handling of an item; atomic inlines follow their
    /// parent.
    fn white_space_of(&self, item: ItemId) -> WhiteSpace {
        let owner = if self.content.is_replaced(item) {
            self.content.parent(item).unwrap_or(ItemId::BLOCK)
        } else {
            item
        };
        self.content.style(owner).white_space
    }

    fn should_collapse_white_space(&self, style: &InlineStyle) -> bool {
        style.collapse_white_space()
            || (style.white_space == WhiteSpace::PreWrap
                && (!self.state.is_line_empty || !self.state.previous_line_broke_cleanly))
    }

    /// A no-break space in `nbsp-mode: space` is skipped like a space,
    /// except as the first character after a clean break.
    fn skip_non_breaking_space(&self, it: &InlineIterator) -> bool {
        let Some(item) = it.item else {
            return false;
        };
        if self.content.style(item).nbsp_mode != NbspMode::Space
            || it.current(self.content) != Some(NO_BREAK_SPACE)
        {
            return false;
        }
        !(self.state.is_line_empty && self.state.previous_line_broke_cleanly)
    }

    /// Returns true if an empty inline container needs a box of its own.
    fn inline_flow_requires_line_box(&self, item: ItemId) -> bool {
        self.content.is_inline(item)
            && self.content.first_child(item).is_none()
            && self
                .content
                .style(item)
                .has_horizontal_borders_padding_or_margin()
    }

    /// Returns true if the item under `it` would make the line non-empty.
    pub(crate) fn requires_line_box(&self, it: &InlineIterator) -> bool {
        let Some(item) = it.item else {
            return false;
        };
        if self.content.is_floating_or_positioned(item) {
            return false;
        }
        if self.content.is_inline(item) && !self.inline_flow_requires_line_box(item) {
            return false;
        }
        let style = self.content.style(item);
        if !self.should_collapse_white_space(style) || self.content.is_line_break(item) {
            return true;
        }
        let Some(current) = it.current(self.content) else {
            return true;
        };
        current != ' '
            && current != '\t'
            && current != SOFT_HYPHEN
            && (current != '\n' || style.preserve_newline())
            && !self.skip_non_breaking_space(it)
    }

    /// Record the static position of an out-of-flow box met where no line
    /// box will hold it.
    fn record_static_position(&mut self, item: ItemId) {
        let y = *self.height;
        let ltr = self.block_style().direction.is_ltr();
        let inline_level = self.content.is_inline_level_positioned(item);
        let x = match (inline_level, ltr) {
            (true, true) => self.floats.left_offset_at(y),
            (true, false) => self.floats.right_offset_at(y),
            (false, true) => self.geometry.content_left(),
            (false, false) => self.geometry.content_right(),
        };
        let _ = self.static_positions.insert(item, StaticPosition { x, y });
    }

    /// Skip the collapsible content at the start of a line, placing the
    /// floats met on the way. Returns the width available to the line.
    pub(crate) fn skip_leading_whitespace(&mut self, resolver: &mut BidiResolver) -> f32 {
        let mut available = self.line_width();
        loop {
            let position = resolver.position();
            let Some(item) = position.item else {
                break;
            };
            if self.requires_line_box(&position) {
                break;
            }
            if let Some((side, width, height)) = self.content.float_size(item) {
                self.floats.insert_float(item, side, width, height);
                let _ = self.floats.position_pending_floats(*self.height);
                available = self.line_width();
            } else if self.content.is_positioned(item) {
                self.record_static_position(item);
            }
            resolver.increment(self.content);
        }
        resolver.commit_explicit_embedding(self.content);
        available
    }

    /// Skip collapsible content after a break. Floats are registered but
    /// not positioned.
    pub(crate) fn skip_trailing_whitespace(&mut self, iterator: &mut InlineIterator) {
        while let Some(item) = iterator.item {
            if self.requires_line_box(iterator) {
                break;
            }
            if let Some((side, width, height)) = self.content.float_size(item) {
                self.floats.insert_float(item, side, width, height);
            } else if self.content.is_positioned(item) {
                self.record_static_position(item);
            }
            iterator.increment(self.content, None);
        }
    }

    /// If an empty inline at the start of the line is followed by
    /// collapsible white space, stop the line right after the inline so
    /// that space is dropped.
    fn should_skip_whitespace_after_start_object(&mut self, item: ItemId) -> bool {
        let Some(next) = bidi_next(self.content, item, None) else {
            return false;
        };
        if !self.content.is_text(next) {
            return false;
        }
        let Some(&first) = self.content.text(next).first() else {
            return false;
        };
        let style = self.content.style(next);
        let collapsible = match first {
            ' ' | '\t' => style.collapse_white_space(),
            '\n' => !style.preserve_newline(),
            _ => false,
        };
        if collapsible {
            self.state.midpoints.stop_after(item, 0);
            return true;
        }
        false
    }

    /// Slide the line down past float bottoms until `width_to_fit` fits,
    /// or no float is left. Moves the block's vertical cursor when that
    /// gains width.
    pub(crate) fn fit_below_floats(&mut self, width_to_fit: f32, available: &mut f32) {
        debug_assert!(width_to_fit > *available, "content already fits");
        let mut last_float_bottom = *self.height;
        let mut new_line_width = *available;
        while let Some(float_bottom) = self.floats.next_float_bottom_below(last_float_bottom) {
            new_line_width = self.floats.line_width_at(float_bottom);
            last_float_bottom = float_bottom;
            if new_line_width >= width_to_fit {
                break;
            }
        }
        if new_line_width > *available {
            *self.height = last_float_bottom;
            *available = new_line_width;
        }
    }

    /// The margin, border and padding of the inline containers `child`
    /// opens (`start`) or closes (`end`).
    pub(crate) fn inline_width(&self, child: ItemId, start: bool, end: bool) -> f32 {
        let mut depth = 1;
        let mut extra = 0.0;
        let mut child = child;
        while let Some(parent) = self.content.parent(child) {
            if !self.content.is_inline(parent) || depth >= self.max_line_depth {
                break;
            }
            depth += 1;
            let style = self.content.style(parent);
            if start && self.content.first_child(parent) == Some(child) {
                extra += style.start_edge_width();
            }
            if end && self.content.last_child(parent) == Some(child) {
                extra += style.end_edge_width();
            }
            child = parent;
        }
        extra
    }

    /// Find where the line starting at the resolver's position ends.
    ///
    /// Leading collapsible content is consumed first (moving the
    /// resolver). If nothing but collapsible content remains, the returned
    /// end equals the resolver's position, which is then at the end of
    /// the content.
    pub(crate) fn find_next_line_break(&mut self, resolver: &mut BidiResolver) -> LineEnd {
        let mut clear = None;
        let applied_start_width = resolver.position().pos > 0;

        // STEP 1: Skip collapsible content at the start of the line.
        let width = self.skip_leading_whitespace(resolver);
        let start = resolver.position();
        let Some(first) = start.item else {
            return LineEnd { end: start, clear };
        };

        let prev_line_broke_cleanly = self.state.previous_line_broke_cleanly;
        self.state.previous_line_broke_cleanly = false;

        let block_ws = self.block_style().white_space;
        let mut scan = Scan {
            width,
            w: 0.0,
            tmp_w: 0.0,
            ignoring_spaces: false,
            ignore_start: InlineIterator::default(),
            current_is_space: false,
            current_is_ws: false,
            trailing_space_object: None,
            line_break: start,
            last: first,
            last_ws: block_ws,
            at_start: true,
            applied_start_width,
            auto_wrap_was_ever_true: false,
            floats_fit_on_line: true,
            prev_line_broke_cleanly,
        };

        let mut current = Some(first);
        let mut pos = start.pos;
        let mut next_breakable = start.next_breakable;

        // STEP 2: Walk the items until one does not fit.
        'end: {
            while let Some(o) = current {
                let curr_ws = self.white_space_of(o);
                scan.last_ws = self.white_space_of(scan.last);
                let auto_wrap = curr_ws.auto_wrap();
                scan.auto_wrap_was_ever_true |= auto_wrap;

                let step = if self.content.is_line_break(o) {
                    self.break_at_line_break(&mut scan, o, &mut clear);
                    Step::End
                } else if self.content.is_floating_or_positioned(o) {
                    self.place_out_of_flow(&mut scan, o);
                    Step::Next
                } else if self.content.is_inline(o) {
                    self.add_empty_inline(&mut scan, o, start.item == Some(o));
                    Step::Next
                } else if self.content.is_replaced(o) {
                    self.add_replaced(&mut scan, o, auto_wrap);
                    Step::Next
                } else {
                    self.add_text(&mut scan, o, &mut pos, &mut next_breakable, curr_ws)
                };
                match step {
                    Step::Next => {}
                    Step::End => break 'end,
                    Step::Done(line_break) => return LineEnd { end: line_break, clear },
                }

                // STEP 3: Decide whether the next item may start a new
                // word, and stop if the pending width overflows.
                let next = bidi_next(self.content, o, None);
                if !self.check_for_break_after(&mut scan, o, next, auto_wrap, curr_ws) {
                    break 'end;
                }

                if !self.content.is_floating_or_positioned(o) {
                    scan.last = o;
                    if self.content.is_replaced(o) && auto_wrap {
                        scan.w += scan.tmp_w;
                        scan.tmp_w = 0.0;
                        scan.line_break = InlineIterator::new(next, 0);
                    }
                }

                current = next;
                next_breakable = None;

                // Inline preformatted text does not collapse with its
                // neighbours.
                if !curr_ws.collapse_white_space() {
                    scan.current_is_space = false;
                }

                pos = 0;
                scan.at_start = false;
            }

            // STEP 4: Everything fit.
            if scan.w + scan.tmp_w <= scan.width || scan.last_ws == WhiteSpace::Nowrap {
                scan.line_break = InlineIterator::end();
            }
        }

        LineEnd {
            end: self.finish_line_break(&mut scan, start, current, pos),
            clear,
        }
    }

    /// A forced break ends the line if the content before it fits.
    fn break_at_line_break(&mut self, scan: &mut Scan, o: ItemId, clear: &mut Option<ClearSide>) {
        if scan.w + scan.tmp_w > scan.width {
            return;
        }
        scan.line_break = InlineIterator::at(o, 0);
        scan.line_break.increment(self.content, None);

        // A break always keeps its line, but only counts as content after
        // a clean break; the space before it is not collapsed away.
        if scan.prev_line_broke_cleanly {
            self.state.is_line_empty = false;
        }
        scan.trailing_space_object = None;
        self.state.previous_line_broke_cleanly = true;

        if !self.state.is_line_empty {
            *clear = self.content.style(o).clear;
        }
    }

    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// "A float is a box that is shifted to the left or right on the
    /// current line."
    fn place_out_of_flow(&mut self, scan: &mut Scan, o: ItemId) {
        if let Some((side, width, height)) = self.content.float_size(o) {
            self.floats.insert_float(o, side, width, height);
            if scan.floats_fit_on_line && width + scan.w + scan.tmp_w <= scan.width {
                let _ = self.floats.position_pending_floats(*self.height);
                scan.width = self.line_width();
            } else {
                scan.floats_fit_on_line = false;
            }
            return;
        }

        // The box gets a placeholder on the line to capture its static
        // position; stop collapsing spaces around it.
        scan.trailing_space_object = None;
        scan.ignore_start = InlineIterator::at(o, 0);
        if scan.ignoring_spaces {
            self.state.midpoints.start_at(scan.ignore_start);
            self.state.midpoints.stop_after(o, 0);
        }
    }

    /// Empty inline containers only contribute their edges.
    fn add_empty_inline(&mut self, scan: &mut Scan, o: ItemId, starts_line: bool) {
        if self.inline_flow_requires_line_box(o) {
            self.state.is_line_empty = false;
            if scan.ignoring_spaces {
                scan.trailing_space_object = None;
                self.state.midpoints.start_at(InlineIterator::at(o, 0));
                self.state.midpoints.stop_after(o, 0);
            } else if self.block_style().collapse_white_space()
                && starts_line
                && self.should_skip_whitespace_after_start_object(o)
            {
                scan.current_is_space = true;
                scan.current_is_ws = true;
                scan.ignoring_spaces = true;
            }
        }
        let style = self.content.style(o);
        scan.tmp_w += style.margin.horizontal() + style.border.horizontal() + style.padding.horizontal();
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    fn add_replaced(&mut self, scan: &mut Scan, o: ItemId, auto_wrap: bool) {
        // Break before an atomic inline if either side wraps.
        if auto_wrap || scan.last_ws.auto_wrap() {
            scan.w += scan.tmp_w;
            scan.tmp_w = 0.0;
            scan.line_break = InlineIterator::at(o, 0);
        }

        if scan.ignoring_spaces {
            self.state.midpoints.start_at(InlineIterator::at(o, 0));
        }

        self.state.is_line_empty = false;
        scan.ignoring_spaces = false;
        scan.current_is_space = false;
        scan.current_is_ws = false;
        scan.trailing_space_object = None;

        let width = self.content.replaced_size(o).map_or(0.0, |(width, _)| width);
        let margin = self.content.style(o).margin.horizontal();
        scan.tmp_w += width + margin + self.inline_width(o, true, true);
    }

    /// The character loop over one text item.
    fn add_text(
        &mut self,
        scan: &mut Scan,
        o: ItemId,
        pos: &mut usize,
        next_breakable: &mut Option<usize>,
        curr_ws: WhiteSpace,
    ) -> Step {
        let content = self.content;
        if *pos == 0 {
            scan.applied_start_width = false;
        }

        let text = content.text(o);
        let strlen = text.len();
        let style = content.style(o);

        let auto_wrap = curr_ws.auto_wrap();
        let preserve_newline = curr_ws.preserve_newline();
        let collapse_white_space = curr_ws.collapse_white_space();

        let mut last_space = *pos;
        let word_spacing = style.word_spacing;
        let mut last_space_word_spacing = 0.0;

        let mut wrap_w = scan.tmp_w + self.inline_width(o, !scan.applied_start_width, true);
        let mut char_width = 0.0;
        let break_nbsp = auto_wrap && style.nbsp_mode == NbspMode::Space;
        // Mid-word breaks for `break-word` are only allowed while the word
        // is the first thing on the line.
        let mut break_words =
            style.break_words() && ((auto_wrap && scan.w == 0.0) || curr_ws == WhiteSpace::Pre);
        let mut mid_word_break = false;
        let break_all = style.word_break == WordBreak::BreakAll && auto_wrap;

        while *pos < strlen {
            let previous_is_space = scan.current_is_space;
            let previous_is_ws = scan.current_is_ws;
            let c = text[*pos];
            scan.current_is_space = c == ' ' || c == '\t' || (!preserve_newline && c == '\n');

            if !collapse_white_space || !scan.current_is_space {
                self.state.is_line_empty = false;
            }

            // STEP 1: Hide soft hyphens unless the line breaks at one.
            if c == SOFT_HYPHEN {
                if !scan.ignoring_spaces {
                    let midpoints = &mut self.state.midpoints;
                    // Two soft hyphens in a row share one hole.
                    if midpoints.last() == Some(&InlineIterator::at(o, *pos)) {
                        let _ = midpoints.pop();
                    } else if *pos > 0 {
                        midpoints.stop_before(o, *pos);
                    } else if scan.last == o {
                        midpoints.stop_before(o, 0);
                    } else {
                        midpoints.stop_before(scan.last, content.length(scan.last));
                    }

                    scan.tmp_w += self.text_width(o, last_space, *pos - last_space, scan.w + scan.tmp_w)
                        + last_space_word_spacing;

                    // The hyphen shows if the line breaks here, so it must
                    // fit.
                    if auto_wrap {
                        scan.tmp_w += self.text_width(o, *pos, 1, scan.w + scan.tmp_w);
                    }

                    let mut after = InlineIterator::at(o, *pos);
                    after.increment(content, None);
                    self.state.midpoints.start_at(after);
                }

                *pos += 1;
                last_space_word_spacing = 0.0;
                last_space = *pos;
                continue;
            }

            let mut apply_word_spacing = false;
            scan.current_is_ws = scan.current_is_space || (break_nbsp && c == NO_BREAK_SPACE);

            if (break_all || break_words) && !mid_word_break {
                wrap_w += char_width;
                char_width = self.text_width(o, *pos, 1, scan.w + wrap_w);
                mid_word_break = scan.w + wrap_w + char_width > scan.width;
            }

            let between_words = c == '\n'
                || (curr_ws != WhiteSpace::Pre
                    && !scan.at_start
                    && is_breakable(text, *pos, next_breakable, break_nbsp, || {
                        content.unicode_breaks(o)
                    }));

            if between_words || mid_word_break {
                if *pos > 0 && matches!(text[*pos - 1], '-' | '?') {
                    mid_word_break = true;
                }
                let mut stopped_ignoring_spaces = false;
                if scan.ignoring_spaces {
                    if scan.current_is_space {
                        // Keep collapsing.
                        *pos += 1;
                        continue;
                    }
                    // Resume at this character.
                    scan.ignoring_spaces = false;
                    last_space_word_spacing = 0.0;
                    last_space = *pos;
                    self.state.midpoints.start_at(InlineIterator::at(o, *pos));
                    stopped_ignoring_spaces = true;
                }

                let additional_tmp_w = self.text_width(o, last_space, *pos - last_space, scan.w + scan.tmp_w)
                    + last_space_word_spacing;
                scan.tmp_w += additional_tmp_w;
                if !scan.applied_start_width {
                    scan.tmp_w += self.inline_width(o, true, false);
                    scan.applied_start_width = true;
                }

                apply_word_spacing = word_spacing != 0.0 && scan.current_is_space && !previous_is_space;

                if scan.w == 0.0 && auto_wrap && scan.tmp_w > scan.width {
                    let mut width = scan.width;
                    self.fit_below_floats(scan.tmp_w, &mut width);
                    scan.width = width;
                }

                if auto_wrap || break_words {
                    // With `pre-wrap` the space after the last word hangs;
                    // if it alone overflows, break after it.
                    let mut line_was_too_wide = false;
                    if scan.w + scan.tmp_w <= scan.width
                        && scan.current_is_ws
                        && style.break_only_after_white_space()
                        && !mid_word_break
                    {
                        let space_width = self.text_width(o, *pos, 1, scan.w + scan.tmp_w)
                            + if apply_word_spacing { word_spacing } else { 0.0 };
                        if scan.w + scan.tmp_w + space_width > scan.width {
                            line_was_too_wide = true;
                            scan.line_break = InlineIterator {
                                item: Some(o),
                                pos: *pos,
                                next_breakable: *next_breakable,
                            };
                            let mut line_break = scan.line_break;
                            self.skip_trailing_whitespace(&mut line_break);
                            scan.line_break = line_break;
                        }
                    }
                    if line_was_too_wide || scan.w + scan.tmp_w > scan.width {
                        if let Some(break_item) = scan.line_break.item
                            && content.style(break_item).preserve_newline()
                            && content.text(break_item).get(scan.line_break.pos) == Some(&'\n')
                        {
                            if !stopped_ignoring_spaces && *pos > 0 {
                                self.state.midpoints.stop_before(o, *pos);
                                self.state.midpoints.start_at(InlineIterator::at(o, *pos));
                            }
                            scan.line_break.increment(content, None);
                            self.state.previous_line_broke_cleanly = true;
                        }
                        return Step::End;
                    }
                    if !between_words || (mid_word_break && !auto_wrap) {
                        scan.tmp_w -= additional_tmp_w;
                    }
                    if *pos > 0 && text[*pos - 1] == SOFT_HYPHEN {
                        // The line does not break at the hyphen after all.
                        scan.tmp_w -= self.text_width(o, *pos - 1, 1, scan.w + scan.tmp_w);
                    }
                }

                // STEP 2: A preserved newline is a forced break.
                if c == '\n' && preserve_newline {
                    if !stopped_ignoring_spaces && *pos > 0 {
                        self.state.midpoints.stop_before(o, *pos);
                        self.state.midpoints.start_at(InlineIterator::at(o, *pos));
                    }
                    let mut line_break = InlineIterator {
                        item: Some(o),
                        pos: *pos,
                        next_breakable: *next_breakable,
                    };
                    line_break.increment(content, None);
                    self.state.previous_line_broke_cleanly = true;
                    return Step::Done(line_break);
                }

                // STEP 3: Commit the word.
                if auto_wrap && between_words {
                    scan.w += scan.tmp_w;
                    wrap_w = 0.0;
                    scan.tmp_w = 0.0;
                    scan.line_break = InlineIterator {
                        item: Some(o),
                        pos: *pos,
                        next_breakable: *next_breakable,
                    };
                    // Once a word boundary was available, never split words.
                    break_words = false;
                }

                if mid_word_break {
                    // Remember the position in case the end width forces a
                    // break.
                    scan.line_break = InlineIterator {
                        item: Some(o),
                        pos: *pos,
                        next_breakable: *next_breakable,
                    };
                    mid_word_break &= break_words || break_all;
                }

                if between_words {
                    last_space_word_spacing = if apply_word_spacing { word_spacing } else { 0.0 };
                    last_space = *pos;
                }

                // STEP 4: A second space starts a collapsed sequence.
                if !scan.ignoring_spaces
                    && style.collapse_white_space()
                    && scan.current_is_space
                    && previous_is_space
                {
                    scan.ignoring_spaces = true;
                    if let Some(item) = scan.ignore_start.item {
                        self.state.midpoints.stop_after(item, scan.ignore_start.pos);
                    }
                }
            } else if scan.ignoring_spaces {
                // Resume at this character.
                scan.ignoring_spaces = false;
                last_space_word_spacing = if apply_word_spacing { word_spacing } else { 0.0 };
                last_space = *pos;
                self.state.midpoints.start_at(InlineIterator::at(o, *pos));
            }

            if scan.current_is_space && !previous_is_space {
                scan.ignore_start = InlineIterator::at(o, *pos);
            }

            if !scan.current_is_ws && previous_is_ws && auto_wrap && style.break_only_after_white_space() {
                scan.line_break = InlineIterator {
                    item: Some(o),
                    pos: *pos,
                    next_breakable: *next_breakable,
                };
            }

            if collapse_white_space && scan.current_is_space && !scan.ignoring_spaces {
                scan.trailing_space_object = Some(o);
            } else if !style.collapse_white_space() || !scan.current_is_space {
                scan.trailing_space_object = None;
            }

            *pos += 1;
            scan.at_start = false;
        }

        // `pos` is now the text length.
        if !scan.ignoring_spaces {
            scan.tmp_w += self.text_width(o, last_space, *pos - last_space, scan.w + scan.tmp_w)
                + last_space_word_spacing;
        }
        scan.tmp_w += self.inline_width(o, !scan.applied_start_width, true);
        Step::Next
    }

    /// Returns false if the line must end after `o`.
    fn check_for_break_after(
        &mut self,
        scan: &mut Scan,
        o: ItemId,
        next: Option<ItemId>,
        auto_wrap: bool,
        curr_ws: WhiteSpace,
    ) -> bool {
        let content = self.content;
        let mut check_for_break = auto_wrap;
        if scan.w != 0.0
            && scan.w + scan.tmp_w > scan.width
            && scan.line_break.item.is_some()
            && curr_ws == WhiteSpace::Nowrap
        {
            check_for_break = true;
        } else if let Some(next) = next.filter(|&next| content.is_text(o) && content.is_text(next))
            && (auto_wrap || content.style(next).auto_wrap())
        {
            if scan.current_is_space {
                check_for_break = true;
            } else {
                // Text that does not end in a space continues its word into
                // the next item, unless that one starts with a space.
                check_for_break = content.text(next).first().is_some_and(|&c| {
                    c == ' ' || c == '\t' || (c == '\n' && !content.style(next).preserve_newline())
                });
                let mut will_fit_on_line = scan.w + scan.tmp_w <= scan.width;
                if !will_fit_on_line && scan.w == 0.0 {
                    let mut width = scan.width;
                    self.fit_below_floats(scan.tmp_w, &mut width);
                    scan.width = width;
                    will_fit_on_line = scan.tmp_w <= scan.width;
                }
                let can_place_on_line = will_fit_on_line || !scan.auto_wrap_was_ever_true;
                if can_place_on_line && check_for_break {
                    scan.w += scan.tmp_w;
                    scan.tmp_w = 0.0;
                    scan.line_break = InlineIterator::at(next, 0);
                }
            }
        }

        if check_for_break && scan.w + scan.tmp_w > scan.width {
            if scan.current_is_space
                && !scan.ignoring_spaces
                && content.style(o).collapse_white_space()
            {
                scan.trailing_space_object = None;
            }
            if scan.w != 0.0 {
                return false;
            }

            // Sliding below floats may give the line room.
            let mut width = scan.width;
            self.fit_below_floats(scan.tmp_w, &mut width);
            scan.width = width;
            if scan.w + scan.tmp_w > scan.width {
                return false;
            }
        }
        true
    }

    /// Settle the break: guarantee progress, drop trailing spaces and fix
    /// up the midpoints around the break.
    fn finish_line_break(
        &mut self,
        scan: &mut Scan,
        start: InlineIterator,
        current: Option<ItemId>,
        pos: usize,
    ) -> InlineIterator {
        let content = self.content;
        let mut line_break = scan.line_break;

        // STEP 1: Nothing fit; put as much as possible on the line.
        let at_start = line_break == start
            && !line_break.item.is_some_and(|item| content.is_line_break(item));
        if at_start {
            if self.block_style().white_space == WhiteSpace::Pre {
                line_break = if pos != 0 {
                    InlineIterator::new(current, pos - 1)
                } else {
                    let length = if content.is_text(scan.last) {
                        content.length(scan.last)
                    } else {
                        0
                    };
                    InlineIterator::at(scan.last, length)
                };
            } else if line_break.item.is_some() {
                // Prefer breaking between items over breaking a word.
                line_break = if current == Some(scan.last) {
                    InlineIterator::new(current, pos)
                } else {
                    InlineIterator::new(current, 0)
                };
            }
        }

        // STEP 2: Consume at least one character or item.
        if line_break == start {
            line_break.increment(content, None);
        }

        // STEP 3: Sanity check the midpoints.
        self.state.midpoints.check_against_break(content, &line_break);

        // STEP 4: Let a trailing space collapse into the break.
        if let Some(trailing) = scan.trailing_space_object {
            if self.state.midpoints.len() % 2 == 1 {
                self.state.midpoints.shave_last_stop(content);
            } else if line_break.at_end() && content.is_text(trailing) {
                let length = content.length(trailing);
                self.state.midpoints.stop_before(trailing, length.saturating_sub(1));
            }
        }

        // STEP 5: A break past the end of an item points at the next one.
        if line_break.pos > 0 {
            line_break.pos -= 1;
            line_break.increment(content, None);
        }

        // STEP 6: A soft hyphen at the break renders; reopen its hole.
        if let Some(item) = line_break.item
            && line_break.pos >= 2
            && content.is_text(item)
            && content.text(item).get(line_break.pos - 1) == Some(&SOFT_HYPHEN)
        {
            self.state.midpoints.chop_at(item, line_break.pos - 1);
        }

        log::trace!(
            "Line from {:?}:{} breaks at {:?}:{} ({} midpoints)",
            start.item,
            start.pos,
            line_break.item,
            line_break.pos,
            self.state.midpoints.len()
        );
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE BREAK] {:?}:{} -> {:?}:{} (w={}, width={})",
            start.item, start.pos, line_break.item, line_break.pos, scan.w, scan.width
        );

        line_break
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::FloatSide;
    use crate::font::MonospaceFontMetrics;
    use crate::geometry::EdgeSizes;

    /// 10px per character.
    const METRICS: MonospaceFontMetrics = MonospaceFontMetrics::new(10.0, 8.0, 2.0);

    fn style() -> InlineStyle {
        InlineStyle::default()
    }

    struct Harness {
        content: InlineContent,
        floats: FloatRegistry,
        geometry: BlockGeometry,
        height: f32,
        static_positions: BTreeMap<ItemId, StaticPosition>,
        state: LineLayoutState,
        resolver: BidiResolver,
    }

    impl Harness {
        fn new(content: InlineContent, width: f32) -> Self {
            let mut resolver = BidiResolver::for_paragraph(content.block_style().direction, false);
            let first = crate::iterator::bidi_first(&content, Some(resolver.pending_embeddings()));
            resolver.set_position(InlineIterator::new(first, 0));
            Self {
                content,
                floats: FloatRegistry::new(0.0, width),
                geometry: BlockGeometry::new(width, EdgeSizes::default(), EdgeSizes::default()),
                height: 0.0,
                static_positions: BTreeMap::new(),
                state: LineLayoutState::new(),
                resolver,
            }
        }

        fn next_line(&mut self) -> LineEnd {
            self.state.midpoints.clear();
            self.state.is_line_empty = true;
            let mut breaker = LineBreaker {
                content: &self.content,
                metrics: &METRICS,
                geometry: &self.geometry,
                floats: &mut self.floats,
                height: &mut self.height,
                static_positions: &mut self.static_positions,
                state: &mut self.state,
                max_line_depth: 200,
            };
            breaker.find_next_line_break(&mut self.resolver)
        }

        /// The kept character ranges of `item` on the current line.
        fn kept(&mut self, item: ItemId, start: usize, end: usize) -> Vec<(usize, usize)> {
            let mut out = Vec::new();
            self.state.midpoints.reset_cursor();
            self.state.midpoints.kept_ranges(item, start, end, &mut out);
            out
        }
    }

    fn single_text(text: &str, width: f32, style: InlineStyle) -> (Harness, ItemId) {
        let mut content = InlineContent::new(style.clone());
        let id = content.append_text(text, style);
        (Harness::new(content, width), id)
    }

    #[test]
    fn test_everything_fits() {
        let (mut h, _) = single_text("Hello world", 1000.0, style());
        let line = h.next_line();
        assert!(line.end.at_end());
        assert!(!h.state.is_line_empty);
    }

    #[test]
    fn test_breaks_before_second_word() {
        let (mut h, id) = single_text("Hello world", 60.0, style());
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 5));
        assert_eq!(h.kept(id, 0, 5), vec![(0, 5)]);

        h.resolver.set_position(line.end);
        let line = h.next_line();
        assert!(line.end.at_end());
    }

    #[test]
    fn test_collapses_space_runs() {
        let (mut h, id) = single_text("a    b", 1000.0, style());
        let _ = h.next_line();
        assert_eq!(h.kept(id, 0, 6), vec![(0, 2), (5, 6)]);
    }

    #[test]
    fn test_leading_spaces_are_skipped() {
        let (mut h, id) = single_text("   ab", 1000.0, style());
        let _ = h.next_line();
        assert_eq!(h.resolver.position(), InlineIterator::at(id, 3));
    }

    #[test]
    fn test_whitespace_only_line_is_empty() {
        let (mut h, _) = single_text(" ", 1000.0, style());
        let line = h.next_line();
        assert!(line.end.at_end());
        assert!(h.resolver.position().at_end());
        assert!(h.state.is_line_empty);
    }

    #[test]
    fn test_long_word_overflows_but_progresses() {
        let (mut h, id) = single_text("abcdefgh ij", 30.0, style());
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 8));
    }

    #[test]
    fn test_break_all_splits_words() {
        let break_all = InlineStyle {
            word_break: WordBreak::BreakAll,
            ..style()
        };
        let (mut h, id) = single_text("abcdefgh", 30.0, break_all);
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 3));
    }

    #[test]
    fn test_break_word_splits_only_a_word_that_starts_the_line() {
        let break_word = InlineStyle {
            word_break: WordBreak::BreakWord,
            ..style()
        };
        let (mut h, id) = single_text("ab cdefghij", 30.0, break_word);
        // "cdefghij" follows "ab" on the first line: break at the space.
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 2));

        // Alone on the next line it is split after three characters.
        h.resolver.set_position(line.end);
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 6));
    }

    #[test]
    fn test_preserved_newline_is_forced_break() {
        let pre = InlineStyle {
            white_space: WhiteSpace::Pre,
            ..style()
        };
        let (mut h, id) = single_text("ab\ncd", 1000.0, pre);
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 3));
        assert!(h.state.previous_line_broke_cleanly);
    }

    #[test]
    fn test_line_break_item() {
        let mut content = InlineContent::new(style());
        let _a = content.append_text("ab", style());
        let br = content.append_line_break(InlineStyle {
            clear: Some(ClearSide::Both),
            ..style()
        });
        let c = content.append_text("cd", style());
        let mut h = Harness::new(content, 1000.0);
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(c, 0));
        assert_eq!(line.clear, Some(ClearSide::Both));
        assert!(h.content.is_line_break(br));
    }

    #[test]
    fn test_soft_hyphen_hidden_unless_broken_at() {
        let text = "ab\u{00AD}cd";
        let (mut h, id) = single_text(text, 1000.0, style());
        let _ = h.next_line();
        assert_eq!(h.kept(id, 0, 5), vec![(0, 2), (3, 5)]);

        // Break right after the hyphen: it shows at the end of the line.
        let (mut h, id) = single_text(text, 30.0, style());
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(id, 3));
        assert_eq!(h.kept(id, 0, 3), vec![(0, 3)]);
    }

    #[test]
    fn test_leading_float_narrows_the_line() {
        let mut content = InlineContent::new(style());
        let _float = content.append_float(FloatSide::Left, 40.0, 20.0, style());
        let text = content.append_text("abc def", style());
        let mut h = Harness::new(content, 80.0);
        let line = h.next_line();
        assert_eq!(line.end, InlineIterator::at(text, 3));
        assert!(!h.floats.is_empty());
    }

    #[test]
    fn test_wide_word_slides_below_float() {
        let mut content = InlineContent::new(style());
        let _float = content.append_float(FloatSide::Left, 80.0, 20.0, style());
        let _text = content.append_text("abcdefgh", style());
        let mut h = Harness::new(content, 100.0);
        // Only 20px are left beside the float; below it the word fits.
        let line = h.next_line();
        assert!(line.end.at_end());
        assert!((h.height - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_inline_width_counts_open_edges() {
        let mut content = InlineContent::new(style());
        let _span = content.open_inline(InlineStyle {
            padding: EdgeSizes::uniform(2.0),
            ..style()
        });
        let text = content.append_text("a", style());
        let _ = content.close_inline();
        let mut h = Harness::new(content, 100.0);
        let breaker = LineBreaker {
            content: &h.content,
            metrics: &METRICS,
            geometry: &h.geometry,
            floats: &mut h.floats,
            height: &mut h.height,
            static_positions: &mut h.static_positions,
            state: &mut h.state,
            max_line_depth: 200,
        };
        assert!((breaker.inline_width(text, true, true) - 4.0).abs() < 1e-4);
        assert!((breaker.inline_width(text, true, false) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_positioned_at_line_start_gets_static_position() {
        let mut content = InlineContent::new(style());
        let abs = content.append_positioned(true, style());
        let _text = content.append_text("x", style());
        let mut h = Harness::new(content, 100.0);
        let _ = h.next_line();
        assert_eq!(
            h.static_positions.get(&abs),
            Some(&StaticPosition { x: 0.0, y: 0.0 })
        );
    }
}
