//! Incremental bidi resolution over the content of one line.
//!
//! [UAX #9 § 3.3 Resolving Embedding Levels](https://www.unicode.org/reports/tr9/#Resolving_Embedding_Levels)
//!
//! The resolver walks the logical content one character at a time and
//! closes a run each time the resolved direction changes. The weak type
//! rules (W1-W7) and the neutral rules (N1-N2) are applied on the fly from
//! three remembered classes (the last character, the last strong
//! character, and the character that ended the open run) instead of over a
//! buffered paragraph. At the end of a line the resolver looks ahead past
//! the break to resolve trailing neutrals, then rewinds to the state it had
//! at the break, so the next line continues the same paragraph.

use std::rc::Rc;

use koala_common::warning::warn_once;

use crate::bidi::context::{BidiContext, MAX_EMBEDDING_LEVEL};
use crate::bidi::reorder::reorder_runs;
use crate::bidi::run::BidiRun;
use crate::bidi::status::BidiStatus;
use crate::classify::Direction;
use crate::content::InlineContent;
use crate::iterator::{InlineIterator, bidi_next};
use crate::midpoint::MidpointState;
use crate::style::TextDirection;

/// The runs of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRuns {
    /// Runs in visual order.
    pub runs: Vec<BidiRun>,
    /// Index in `runs` of the run that was last in logical order.
    pub logically_last: Option<usize>,
}

impl LineRuns {
    /// Number of runs on the line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns true if the line produced no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Cursor state that is rewound after the end-of-line lookahead.
#[derive(Debug, Clone)]
struct ResolverState {
    current: InlineIterator,
    /// Start of the open run.
    sor: InlineIterator,
    /// Last character of the open run; `end()` when none.
    eor: InlineIterator,
    last: InlineIterator,
    end_of_line: InlineIterator,
    last_before_et: InlineIterator,
    empty_run: bool,
    reached_end_of_line: bool,
    /// Direction of the open run.
    direction: Direction,
    status: BidiStatus,
}

const fn dir_of_level(level: u8) -> Direction {
    if level % 2 == 1 {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

const fn is_rtl_strong(dir: Direction) -> bool {
    matches!(dir, Direction::RightToLeft | Direction::ArabicLetter)
}

impl ResolverState {
    fn new(status: BidiStatus) -> Self {
        Self {
            current: InlineIterator::end(),
            sor: InlineIterator::end(),
            eor: InlineIterator::end(),
            last: InlineIterator::end(),
            end_of_line: InlineIterator::end(),
            last_before_et: InlineIterator::end(),
            empty_run: true,
            reached_end_of_line: false,
            direction: Direction::OtherNeutral,
            status,
        }
    }

    fn context_dir(&self) -> Direction {
        self.status.context.dir()
    }

    /// Close the run `[sor, eor]` and start the next one after `eor`.
    fn append_run(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>) {
        if self.empty_run
            || self.eor.at_end()
            || self.eor < self.sor
            || self.reached_end_of_line
        {
            return;
        }

        // STEP 1: Whole items between sor and eor.
        let mut start = self.sor.pos;
        let mut item = self.sor.item;
        while let Some(id) = item {
            if Some(id) == self.eor.item || Some(id) == self.end_of_line.item {
                break;
            }
            spans.push(BidiRun::new(
                id,
                start,
                content.length(id),
                &self.status.context,
                self.direction,
            ));
            start = 0;
            item = bidi_next(content, id, None);
        }

        // STEP 2: The item holding eor, clamped to the end of the line.
        if let Some(id) = item {
            let mut pos = (Some(id) == self.eor.item).then_some(self.eor.pos);
            if Some(id) == self.end_of_line.item && pos.is_none_or(|p| self.end_of_line.pos <= p) {
                self.reached_end_of_line = true;
                pos = Some(self.end_of_line.pos);
            }
            let end = if content.length(id) > 0 {
                pos.map_or(0, |p| p + 1)
            } else {
                0
            };
            spans.push(BidiRun::new(
                id,
                start,
                end,
                &self.status.context,
                self.direction,
            ));
        }

        self.eor.increment(content, None);
        self.sor = self.eor;
        self.direction = Direction::OtherNeutral;
        self.status.eor = Direction::OtherNeutral;
    }

    /// Neutrals between the end of the open run and `last` are resolved
    /// before an explicit level change (rule X10).
    fn raise_level(
        &mut self,
        content: &InlineContent,
        spans: &mut Vec<BidiRun>,
        from: Direction,
        to: Direction,
    ) {
        if !self.empty_run && self.eor != self.last {
            if self.direction == Direction::OtherNeutral {
                self.direction = to;
            }
            if to == Direction::LeftToRight {
                match self.status.eor {
                    Direction::EuropeanNumber => {
                        if self.status.last_strong != Direction::LeftToRight {
                            self.direction = Direction::EuropeanNumber;
                            self.append_run(content, spans);
                            if from != Direction::LeftToRight {
                                self.direction = Direction::RightToLeft;
                            }
                        }
                    }
                    Direction::ArabicNumber => {
                        self.direction = Direction::ArabicNumber;
                        self.append_run(content, spans);
                        if from != Direction::LeftToRight {
                            self.eor = self.last;
                            self.direction = Direction::RightToLeft;
                            self.append_run(content, spans);
                        }
                    }
                    Direction::LeftToRight => {}
                    _ => {
                        if from == Direction::LeftToRight
                            || self.status.last_strong == Direction::LeftToRight
                        {
                            self.append_run(content, spans);
                        } else {
                            self.direction = Direction::RightToLeft;
                        }
                    }
                }
            } else if !is_rtl_strong(self.status.eor) {
                if from == Direction::RightToLeft || is_rtl_strong(self.status.last_strong) {
                    self.append_run(content, spans);
                } else {
                    self.direction = Direction::LeftToRight;
                }
            }
            self.eor = self.last;
        }
        self.append_run(content, spans);
        self.empty_run = true;
        self.status.last = to;
        self.status.last_strong = to;
        self.status.eor = to;
        self.eor = InlineIterator::end();
    }

    fn lower_level(
        &mut self,
        content: &InlineContent,
        spans: &mut Vec<BidiRun>,
        from: Direction,
        to: Direction,
    ) {
        if !self.empty_run && self.eor != self.last {
            if self.direction == Direction::OtherNeutral {
                self.direction = from;
            }
            if from == Direction::LeftToRight {
                match self.status.eor {
                    Direction::EuropeanNumber => {
                        if self.status.last_strong != Direction::LeftToRight {
                            self.direction = Direction::EuropeanNumber;
                            self.append_run(content, spans);
                        }
                    }
                    Direction::ArabicNumber => {
                        self.direction = Direction::ArabicNumber;
                        self.append_run(content, spans);
                    }
                    Direction::LeftToRight => {}
                    _ => self.append_run(content, spans),
                }
            } else if !is_rtl_strong(self.status.eor) {
                self.append_run(content, spans);
            }
            self.eor = self.last;
        }
        self.append_run(content, spans);
        self.empty_run = true;
        self.status.last = from;
        self.status.last_strong = from;
        self.status.eor = to;
        self.eor = InlineIterator::end();
    }

    /// W7 / N1 / N2 for a strong left-to-right character.
    fn left_to_right(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>) {
        match self.status.last {
            Direction::RightToLeft
            | Direction::ArabicLetter
            | Direction::EuropeanNumber
            | Direction::ArabicNumber => {
                if self.status.last != Direction::EuropeanNumber
                    || self.status.last_strong != Direction::LeftToRight
                {
                    self.append_run(content, spans);
                }
            }
            last if last.is_neutral_or_separator() => match self.status.eor {
                Direction::EuropeanNumber => {
                    if self.status.last_strong != Direction::LeftToRight {
                        // The numbers sit one level higher; close them.
                        self.direction = Direction::EuropeanNumber;
                        self.append_run(content, spans);
                        if self.context_dir() != Direction::LeftToRight {
                            // Neutrals take the embedding direction.
                            self.eor = self.last;
                            self.direction = Direction::RightToLeft;
                            self.append_run(content, spans);
                        }
                    }
                }
                Direction::ArabicNumber => {
                    self.direction = Direction::ArabicNumber;
                    self.append_run(content, spans);
                    if self.context_dir() != Direction::LeftToRight {
                        self.eor = self.last;
                        self.direction = Direction::RightToLeft;
                        self.append_run(content, spans);
                    }
                }
                Direction::LeftToRight => {}
                _ => {
                    if self.context_dir() != Direction::LeftToRight
                        && self.status.last_strong != Direction::LeftToRight
                    {
                        self.eor = self.last;
                        self.direction = Direction::RightToLeft;
                    }
                    self.append_run(content, spans);
                }
            },
            _ => {}
        }
        self.eor = self.current;
        self.status.eor = Direction::LeftToRight;
        self.status.last_strong = Direction::LeftToRight;
        self.direction = Direction::LeftToRight;
    }

    /// Strong right-to-left character (R or AL).
    fn right_to_left(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>, dir: Direction) {
        match self.status.last {
            Direction::LeftToRight | Direction::EuropeanNumber | Direction::ArabicNumber => {
                self.append_run(content, spans);
            }
            last if last.is_neutral_or_separator() => {
                if !is_rtl_strong(self.status.eor) {
                    if self.context_dir() != Direction::RightToLeft
                        && !is_rtl_strong(self.status.last_strong)
                    {
                        self.eor = self.last;
                        self.direction = Direction::LeftToRight;
                    }
                    self.append_run(content, spans);
                }
            }
            _ => {}
        }
        self.eor = self.current;
        self.status.eor = Direction::RightToLeft;
        self.status.last_strong = dir;
        self.direction = Direction::RightToLeft;
    }

    fn european_number(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>) {
        match self.status.last {
            Direction::EuropeanNumber | Direction::LeftToRight => {}
            Direction::RightToLeft | Direction::ArabicLetter | Direction::ArabicNumber => {
                self.eor = self.last;
                self.append_run(content, spans);
                self.direction = Direction::EuropeanNumber;
            }
            Direction::EuropeanNumberSeparator | Direction::CommonNumberSeparator
                if self.status.eor == Direction::EuropeanNumber => {}
            last if last.is_neutral_or_separator() => {
                let neutral_end = if last == Direction::EuropeanNumberTerminator {
                    self.last_before_et
                } else {
                    self.last
                };
                if self.status.eor == Direction::RightToLeft {
                    // Neutrals go to R.
                    self.eor = neutral_end;
                    self.append_run(content, spans);
                    self.direction = Direction::EuropeanNumber;
                } else if self.status.eor != Direction::LeftToRight
                    && (self.status.eor != Direction::EuropeanNumber
                        || self.status.last_strong != Direction::LeftToRight)
                    && self.direction != Direction::LeftToRight
                {
                    // Numbers on both sides; the neutrals go right to left.
                    self.append_run(content, spans);
                    self.eor = neutral_end;
                    self.direction = Direction::RightToLeft;
                    self.append_run(content, spans);
                    self.direction = Direction::EuropeanNumber;
                }
            }
            _ => {}
        }
        self.eor = self.current;
        self.status.eor = Direction::EuropeanNumber;
        if self.direction == Direction::OtherNeutral {
            self.direction = Direction::LeftToRight;
        }
    }

    fn arabic_number(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>) {
        match self.status.last {
            Direction::LeftToRight => {
                if self.context_dir() == Direction::LeftToRight {
                    self.append_run(content, spans);
                }
            }
            Direction::ArabicNumber => {}
            Direction::RightToLeft | Direction::ArabicLetter | Direction::EuropeanNumber => {
                self.eor = self.last;
                self.append_run(content, spans);
            }
            Direction::CommonNumberSeparator if self.status.eor == Direction::ArabicNumber => {}
            last if last.is_neutral_or_separator() => {
                if !is_rtl_strong(self.status.eor) {
                    if self.context_dir() == Direction::RightToLeft
                        || is_rtl_strong(self.status.last_strong)
                    {
                        // Close the L run; the neutrals become an R run.
                        self.append_run(content, spans);
                        self.direction = Direction::RightToLeft;
                    } else {
                        // The neutrals join the L run.
                        self.direction = Direction::LeftToRight;
                    }
                }
                self.eor = self.last;
                self.append_run(content, spans);
            }
            _ => {}
        }
        self.eor = self.current;
        self.status.eor = Direction::ArabicNumber;
        if self.direction == Direction::OtherNeutral {
            self.direction = Direction::ArabicNumber;
        }
    }

    fn update_last(&mut self, dir: Direction) {
        match dir {
            Direction::EuropeanNumberTerminator => {
                if self.status.last != Direction::EuropeanNumber {
                    self.status.last = Direction::EuropeanNumberTerminator;
                }
            }
            Direction::EuropeanNumberSeparator
            | Direction::CommonNumberSeparator
            | Direction::SegmentSeparator
            | Direction::WhitespaceNeutral
            | Direction::OtherNeutral => {
                self.status.last = match self.status.last {
                    Direction::LeftToRight
                    | Direction::RightToLeft
                    | Direction::ArabicLetter
                    | Direction::EuropeanNumber
                    | Direction::ArabicNumber => dir,
                    _ => Direction::OtherNeutral,
                };
            }
            Direction::NonSpacingMark | Direction::BoundaryNeutral => {}
            explicit if explicit.is_explicit_formatting() => {}
            _ => self.status.last = dir,
        }
    }

    /// Close the open run at the end of the line using the class that
    /// ended it.
    fn close_line(&mut self, content: &InlineContent, spans: &mut Vec<BidiRun>) {
        if self.reached_end_of_line {
            return;
        }
        self.eor = self.end_of_line;
        self.direction = match self.status.eor {
            dir @ (Direction::LeftToRight | Direction::RightToLeft | Direction::ArabicNumber) => {
                dir
            }
            Direction::EuropeanNumber => {
                if self.status.last_strong == Direction::LeftToRight {
                    Direction::LeftToRight
                } else {
                    Direction::EuropeanNumber
                }
            }
            _ => self.context_dir(),
        };
        self.append_run(content, spans);
    }
}

/// The bidi resolver of one block.
#[derive(Debug, Clone)]
pub struct BidiResolver {
    state: ResolverState,
    /// Embeddings opened or closed by inline containers since the last
    /// commit.
    pending_embeddings: Vec<Direction>,
    /// Runs appended for the current line, in logical order, before
    /// midpoint holes are cut out.
    spans: Vec<BidiRun>,
    max_embedding_level: u8,
}

impl BidiResolver {
    /// A resolver positioned at the end of the content with `status`.
    #[must_use]
    pub fn new(status: BidiStatus) -> Self {
        Self {
            state: ResolverState::new(status),
            pending_embeddings: Vec::new(),
            spans: Vec::new(),
            max_embedding_level: MAX_EMBEDDING_LEVEL,
        }
    }

    /// A resolver for a paragraph with base direction `direction`.
    #[must_use]
    pub fn for_paragraph(direction: TextDirection, overriding: bool) -> Self {
        Self::new(BidiStatus::new(direction, overriding))
    }

    /// Lower the embedding cap. Levels above 60 are never allowed.
    #[must_use]
    pub fn with_max_embedding_level(mut self, level: u8) -> Self {
        self.max_embedding_level = level.min(MAX_EMBEDDING_LEVEL);
        self
    }

    /// The position resolution continues from.
    #[must_use]
    pub const fn position(&self) -> InlineIterator {
        self.state.current
    }

    /// Move to `position` without tracking the embeddings in between.
    pub const fn set_position(&mut self, position: InlineIterator) {
        self.state.current = position;
    }

    /// The status at the current position.
    #[must_use]
    pub const fn status(&self) -> &BidiStatus {
        &self.state.status
    }

    /// Replace the status, e.g. with the one stored on a clean line.
    pub fn set_status(&mut self, status: BidiStatus) {
        self.state.status = status;
    }

    /// The open embedding context.
    #[must_use]
    pub const fn context(&self) -> &Rc<BidiContext> {
        &self.state.status.context
    }

    /// Embeddings waiting to be committed; iterator walks append to it.
    pub fn pending_embeddings(&mut self) -> &mut Vec<Direction> {
        &mut self.pending_embeddings
    }

    /// Step the position forward, recording the embeddings crossed.
    pub fn increment(&mut self, content: &InlineContent) {
        self.state
            .current
            .increment(content, Some(&mut self.pending_embeddings));
    }

    /// Apply the pending embeddings to the context stack.
    ///
    /// [UAX #9 § 3.3.2](https://www.unicode.org/reports/tr9/#Explicit_Levels_and_Directions)
    ///
    /// "X2. With each RLE, perform the following steps: Compute the least
    /// odd embedding level greater than the embedding level of the last
    /// entry on the directional status stack. If this new level would be
    /// valid ... push an entry consisting of the new embedding level."
    pub fn commit_explicit_embedding(&mut self, content: &InlineContent) {
        if self.pending_embeddings.is_empty() {
            return;
        }
        let from_level = self.state.status.context.level();
        let mut to_context = Rc::clone(&self.state.status.context);

        for embedding in self.pending_embeddings.drain(..) {
            if embedding == Direction::PopDirectionalFormat {
                // X7: an unmatched PDF is ignored.
                if let Some(parent) = to_context.parent() {
                    to_context = Rc::clone(parent);
                }
                continue;
            }
            let rtl = matches!(
                embedding,
                Direction::RightToLeftEmbedding | Direction::RightToLeftOverride
            );
            let overriding = matches!(
                embedding,
                Direction::LeftToRightOverride | Direction::RightToLeftOverride
            );
            let level = if rtl {
                (to_context.level() + 1) | 1
            } else {
                (to_context.level() + 2) & !1
            };
            if level <= self.max_embedding_level {
                let direction = if rtl {
                    TextDirection::Rtl
                } else {
                    TextDirection::Ltr
                };
                to_context = BidiContext::push(&to_context, level, direction, overriding);
            } else {
                let _ = warn_once(
                    "Layout",
                    &format!(
                        "bidi embedding past level {} ignored",
                        self.max_embedding_level
                    ),
                );
            }
        }

        let to_level = to_context.level();
        let from = dir_of_level(from_level);
        let to = dir_of_level(to_level);
        if to_level > from_level {
            self.state.raise_level(content, &mut self.spans, from, to);
        } else if to_level < from_level {
            self.state.lower_level(content, &mut self.spans, from, to);
        }
        self.state.status.context = to_context;
    }

    /// Resolve the content from the current position up to `end` into
    /// runs, leaving the resolver at `end` with the status the next line
    /// starts from.
    ///
    /// `hard_line_break` is set when the line ended with a forced break,
    /// which also ends the bidi paragraph. Runs fall into midpoint holes
    /// are dropped, and floats never produce runs.
    pub fn create_runs_for_line(
        &mut self,
        content: &InlineContent,
        end: InlineIterator,
        midpoints: &mut MidpointState,
        visually_ordered: bool,
        hard_line_break: bool,
    ) -> LineRuns {
        self.spans.clear();
        if self.state.current == end {
            return LineRuns::default();
        }

        self.state.empty_run = true;
        self.state.reached_end_of_line = false;
        self.state.direction = Direction::OtherNeutral;
        self.state.eor = InlineIterator::end();
        self.state.last = self.state.current;

        let mut past_end = false;
        let mut state_at_end: Option<ResolverState> = None;

        loop {
            let mut dir_current;
            if past_end && (hard_line_break || self.state.current.at_end()) {
                let root = BidiContext::root_of(&self.state.status.context);
                dir_current = root.dir();
                if hard_line_break {
                    // A forced break resets the bidi state.
                    if let Some(saved) = state_at_end.as_mut() {
                        saved.status.reset_to_root();
                    }
                }
            } else {
                dir_current = self.state.current.direction(content);
                if self.state.status.context.is_override() && !dir_current.is_explicit_formatting()
                {
                    dir_current = self.state.status.context.dir();
                } else if dir_current == Direction::NonSpacingMark {
                    dir_current = self.state.status.last;
                }
            }

            match dir_current {
                explicit if explicit.is_explicit_formatting() => {
                    self.pending_embeddings.push(explicit);
                    self.commit_explicit_embedding(content);
                }
                Direction::LeftToRight => self.state.left_to_right(content, &mut self.spans),
                Direction::RightToLeft | Direction::ArabicLetter => {
                    self.state.right_to_left(content, &mut self.spans, dir_current);
                }
                Direction::EuropeanNumber
                    if self.state.status.last_strong != Direction::ArabicLetter =>
                {
                    self.state.european_number(content, &mut self.spans);
                }
                Direction::EuropeanNumber | Direction::ArabicNumber => {
                    // W2: after AL, EN becomes AN.
                    dir_current = Direction::ArabicNumber;
                    self.state.arabic_number(content, &mut self.spans);
                }
                Direction::EuropeanNumberTerminator => {
                    if self.state.status.last == Direction::EuropeanNumber {
                        dir_current = Direction::EuropeanNumber;
                        self.state.eor = self.state.current;
                        self.state.status.eor = dir_current;
                    } else if self.state.status.last != Direction::EuropeanNumberTerminator {
                        self.state.last_before_et = if self.state.empty_run {
                            self.state.eor
                        } else {
                            self.state.last
                        };
                    }
                }
                Direction::BoundaryNeutral => {
                    if self.state.eor == self.state.last {
                        self.state.eor = self.state.current;
                    }
                }
                _ => {}
            }

            if past_end && self.state.eor == self.state.current {
                self.state.close_line(content, &mut self.spans);
                self.finish_lookahead(state_at_end.take());
                break;
            }

            self.state.update_last(dir_current);
            self.state.last = self.state.current;

            if self.state.empty_run && !dir_current.is_explicit_formatting() {
                self.state.sor = self.state.current;
                self.state.empty_run = false;
            }

            self.increment(content);
            if !self.pending_embeddings.is_empty() {
                if past_end {
                    // The lookahead crossed an embedding boundary; the
                    // trailing neutrals end at the line's own level.
                    self.pending_embeddings.clear();
                    self.state.close_line(content, &mut self.spans);
                    self.finish_lookahead(state_at_end.take());
                    break;
                }
                self.commit_explicit_embedding(content);
            }

            if self.state.empty_run && dir_current.is_explicit_formatting() {
                // The embedding character itself never lands in a run.
                self.state.eor = InlineIterator::end();
                self.state.last = self.state.current;
                self.state.sor = self.state.current;
            }

            if !past_end && (self.state.current == end || self.state.current.at_end()) {
                if self.state.empty_run {
                    break;
                }
                state_at_end = Some(self.state.clone());
                self.state.end_of_line = self.state.last;
                past_end = true;
            }
        }

        self.state.end_of_line = InlineIterator::end();
        self.cut_runs(content, midpoints, visually_ordered)
    }

    fn finish_lookahead(&mut self, saved: Option<ResolverState>) {
        if let Some(saved) = saved {
            self.state = saved;
        }
        self.state.direction = Direction::OtherNeutral;
    }

    /// Split the appended spans around the midpoint holes, then reorder.
    fn cut_runs(
        &mut self,
        content: &InlineContent,
        midpoints: &mut MidpointState,
        visually_ordered: bool,
    ) -> LineRuns {
        let mut runs = Vec::with_capacity(self.spans.len());
        let mut ranges = Vec::new();
        for span in self.spans.drain(..) {
            if span.start > span.stop || content.is_float(span.item) {
                continue;
            }
            ranges.clear();
            midpoints.kept_ranges(span.item, span.start, span.stop, &mut ranges);
            for &(start, stop) in &ranges {
                log::trace!(
                    "bidi run {:?} [{start}, {stop}) level {}",
                    span.item,
                    span.level
                );
                runs.push(BidiRun {
                    start,
                    stop,
                    ..span.clone()
                });
            }
        }

        let logical_last = runs.last().cloned();
        if !visually_ordered {
            reorder_runs(&mut runs);
        }
        let logically_last =
            logical_last.and_then(|last| runs.iter().rposition(|run| *run == last));
        LineRuns {
            runs,
            logically_last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ItemId;
    use crate::style::{InlineStyle, UnicodeBidi};

    fn resolve(content: &InlineContent, start: ItemId) -> (LineRuns, BidiResolver) {
        let mut resolver = BidiResolver::for_paragraph(content.block_style().direction, false);
        resolver.set_position(InlineIterator::at(start, 0));
        let mut midpoints = MidpointState::new();
        let runs = resolver.create_runs_for_line(
            content,
            InlineIterator::end(),
            &mut midpoints,
            false,
            false,
        );
        (runs, resolver)
    }

    fn spans(runs: &LineRuns) -> Vec<(usize, usize, u8)> {
        runs.runs
            .iter()
            .map(|run| (run.start, run.stop, run.level))
            .collect()
    }

    #[test]
    fn test_ltr_text_is_one_run() {
        let mut content = InlineContent::new(InlineStyle::default());
        let text = content.append_text("Hello world", InlineStyle::default());
        let (runs, resolver) = resolve(&content, text);
        assert_eq!(spans(&runs), vec![(0, 11, 0)]);
        assert_eq!(runs.logically_last, Some(0));
        assert!(resolver.position().at_end());
    }

    #[test]
    fn test_mixed_direction_runs() {
        let mut content = InlineContent::new(InlineStyle::default());
        let text = content.append_text("abc \u{05E9}\u{05DC}\u{05D5}\u{05DD} def", InlineStyle::default());
        let (runs, _) = resolve(&content, text);
        // The neutral space between L and R takes the embedding direction.
        assert_eq!(spans(&runs), vec![(0, 4, 0), (4, 8, 1), (8, 12, 0)]);
    }

    #[test]
    fn test_european_number_in_rtl_paragraph() {
        let block = InlineStyle {
            direction: TextDirection::Rtl,
            ..InlineStyle::default()
        };
        let mut content = InlineContent::new(block);
        let text = content.append_text("\u{05D0} 12 \u{05D1}", InlineStyle::default());
        let (runs, _) = resolve(&content, text);
        // Visual order: the trailing letter, the number (level 2), the
        // leading letter.
        assert_eq!(spans(&runs), vec![(4, 6, 1), (2, 4, 2), (0, 2, 1)]);
    }

    #[test]
    fn test_css_embedding_opens_a_level() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("ab", InlineStyle::default());
        let _span = content.open_inline(InlineStyle {
            direction: TextDirection::Rtl,
            unicode_bidi: UnicodeBidi::Embed,
            ..InlineStyle::default()
        });
        let _b = content.append_text("cd", InlineStyle::default());
        let _ = content.close_inline();
        let _c = content.append_text("ef", InlineStyle::default());

        let (runs, resolver) = resolve(&content, a);
        let levels: Vec<u8> = runs.runs.iter().map(|run| run.level).collect();
        // "cd" is L inside an RTL embedding: level 2.
        assert_eq!(levels, vec![0, 2, 0]);
        assert_eq!(resolver.context().level(), 0);
    }

    #[test]
    fn test_embedding_cap() {
        let mut content = InlineContent::new(InlineStyle::default());
        let text = "\u{202A}".repeat(70) + "a";
        let id = content.append_text(&text, InlineStyle::default());
        let (runs, resolver) = resolve(&content, id);
        // Thirty LREs reach level 60; the other forty are ignored.
        assert_eq!(resolver.context().level(), MAX_EMBEDDING_LEVEL);
        assert!(runs.runs.iter().all(|run| run.level <= MAX_EMBEDDING_LEVEL + 2));
        assert!(
            runs.runs
                .iter()
                .all(|run| !(run.start..run.stop).contains(&0))
        );
    }

    #[test]
    fn test_rle_cap_stops_at_the_last_odd_level() {
        let mut content = InlineContent::new(InlineStyle::default());
        let text = "\u{202B}".repeat(61) + "a";
        let id = content.append_text(&text, InlineStyle::default());
        let (_, resolver) = resolve(&content, id);
        assert_eq!(resolver.context().level(), MAX_EMBEDDING_LEVEL - 1);
    }

    #[test]
    fn test_unmatched_pdf_is_ignored() {
        let mut content = InlineContent::new(InlineStyle::default());
        let id = content.append_text("\u{202C}ab\u{202C}c", InlineStyle::default());
        let (runs, resolver) = resolve(&content, id);
        assert!(!runs.runs.is_empty());
        assert!(runs.runs.iter().all(|run| run.level == 0));
        assert_eq!(resolver.context().level(), 0);
        assert!(resolver.context().parent().is_none());
    }

    #[test]
    fn test_hard_break_resets_status() {
        let mut content = InlineContent::new(InlineStyle::default());
        let text = content.append_text("\u{202B}\u{05D0}", InlineStyle::default());
        let mut resolver = BidiResolver::for_paragraph(TextDirection::Ltr, false);
        resolver.set_position(InlineIterator::at(text, 0));
        let mut midpoints = MidpointState::new();
        let _ = resolver.create_runs_for_line(
            &content,
            InlineIterator::end(),
            &mut midpoints,
            false,
            true,
        );
        assert_eq!(*resolver.status(), BidiStatus::new(TextDirection::Ltr, false));
    }

    #[test]
    fn test_visually_ordered_skips_reordering() {
        let mut content = InlineContent::new(InlineStyle::default());
        let a = content.append_text("\u{05D0}", InlineStyle::default());
        let _b = content.append_text("\u{05D1}", InlineStyle::default());
        let mut resolver = BidiResolver::for_paragraph(TextDirection::Ltr, false);
        resolver.set_position(InlineIterator::at(a, 0));
        let mut midpoints = MidpointState::new();
        let runs = resolver.create_runs_for_line(
            &content,
            InlineIterator::end(),
            &mut midpoints,
            true,
            false,
        );
        let items: Vec<ItemId> = runs.runs.iter().map(|run| run.item).collect();
        assert_eq!(items, vec![a, ItemId(2)]);
    }
}
