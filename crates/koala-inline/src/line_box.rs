//! Line boxes and the inline boxes they hold.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called
//! a line box."
//!
//! A [`RootLineBox`] owns the boxes of one line in visual order. Inline
//! containers become [`FlowBox`]es wrapping the boxes of their content;
//! text runs become [`TextBox`]es and everything atomic an [`AtomicBox`].

use serde::Serialize;

use crate::bidi::BidiStatus;
use crate::content::ItemId;
use crate::float::PlacedFloat;
use crate::geometry::Rect;
use crate::iterator::InlineIterator;
use crate::line_breaker::StaticPosition;

/// How much of a text box is cut off by an ellipsis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Truncation {
    /// Fully visible.
    #[default]
    None,
    /// Only the first `n` characters of the box are painted.
    Partial(usize),
    /// Hidden entirely.
    Full,
}

/// A run of text from one text item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBox {
    /// The text item.
    pub item: ItemId,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
    /// Resolved bidi level; odd levels paint right to left.
    pub level: u8,
    /// The characters are forced to the run's direction.
    pub overriding: bool,
    /// Horizontal position.
    pub x: f32,
    /// Top of the glyph area.
    pub y: f32,
    /// Advance width, including word spacing and justification.
    pub width: f32,
    /// Height of the glyph area.
    pub height: f32,
    /// Extra width given to this box by `text-align: justify`.
    pub space_add: f32,
    /// Ellipsis truncation.
    pub truncation: Truncation,
}

impl TextBox {
    /// Offset just past the last character.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns true if the box paints right to left.
    #[must_use]
    pub const fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}

/// What an [`AtomicBox`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AtomicKind {
    /// An atomic inline.
    Replaced,
    /// The placeholder of an out-of-flow box; removed once its static
    /// position is known.
    Positioned,
    /// A forced line break.
    LineBreak,
}

/// A box that is never split: a replaced element, a forced break, or the
/// placeholder of a positioned box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomicBox {
    /// The content item.
    pub item: ItemId,
    /// What the box is.
    pub kind: AtomicKind,
    /// Resolved bidi level.
    pub level: u8,
    /// Horizontal position of the border box.
    pub x: f32,
    /// Top of the border box.
    pub y: f32,
    /// Border box width.
    pub width: f32,
    /// Border box height.
    pub height: f32,
}

/// The box of an inline container on one line.
///
/// An inline split over several lines (or several bidi runs) gets one flow
/// box per piece. Its margin, border and padding only show on the edges
/// where the inline actually starts or ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowBox {
    /// The inline container.
    pub item: ItemId,
    /// Child boxes in visual order.
    pub children: Vec<InlineBox>,
    /// Horizontal position of the border box.
    pub x: f32,
    /// Top of the content area.
    pub y: f32,
    /// Border box width.
    pub width: f32,
    /// Height of the content area.
    pub height: f32,
    /// The left margin, border and padding are applied.
    pub include_left_edge: bool,
    /// The right margin, border and padding are applied.
    pub include_right_edge: bool,
}

impl FlowBox {
    /// A flow box for `item` with no children and no edges yet.
    #[must_use]
    pub const fn empty(item: ItemId) -> Self {
        Self {
            item,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            include_left_edge: false,
            include_right_edge: false,
        }
    }
}

/// One box on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InlineBox {
    /// A text run.
    Text(TextBox),
    /// An unsplittable box.
    Atomic(AtomicBox),
    /// An inline container.
    Flow(FlowBox),
}

impl InlineBox {
    /// The content item the box belongs to.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        match self {
            Self::Text(text) => text.item,
            Self::Atomic(atomic) => atomic.item,
            Self::Flow(flow) => flow.item,
        }
    }

    /// Horizontal position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        match self {
            Self::Text(text) => text.x,
            Self::Atomic(atomic) => atomic.x,
            Self::Flow(flow) => flow.x,
        }
    }

    /// Vertical position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        match self {
            Self::Text(text) => text.y,
            Self::Atomic(atomic) => atomic.y,
            Self::Flow(flow) => flow.y,
        }
    }

    /// Width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        match self {
            Self::Text(text) => text.width,
            Self::Atomic(atomic) => atomic.width,
            Self::Flow(flow) => flow.width,
        }
    }

    /// Height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        match self {
            Self::Text(text) => text.height,
            Self::Atomic(atomic) => atomic.height,
            Self::Flow(flow) => flow.height,
        }
    }

    /// The bounding rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x(), self.y(), self.width(), self.height())
    }

    /// Move the box and everything inside it down by `dy`.
    pub fn shift_vertically(&mut self, dy: f32) {
        match self {
            Self::Text(text) => text.y += dy,
            Self::Atomic(atomic) => atomic.y += dy,
            Self::Flow(flow) => {
                flow.y += dy;
                for child in &mut flow.children {
                    child.shift_vertically(dy);
                }
            }
        }
    }

    /// Returns true for replaced boxes.
    #[must_use]
    pub const fn is_replaced(&self) -> bool {
        matches!(
            self,
            Self::Atomic(AtomicBox {
                kind: AtomicKind::Replaced,
                ..
            })
        )
    }
}

/// Visit every text box under `boxes` mutably, in visual order.
pub(crate) fn for_each_text_box_mut(boxes: &mut [InlineBox], f: &mut impl FnMut(&mut TextBox)) {
    for child in boxes {
        match child {
            InlineBox::Text(text) => f(text),
            InlineBox::Flow(flow) => for_each_text_box_mut(&mut flow.children, f),
            InlineBox::Atomic(_) => {}
        }
    }
}

/// The `…` placed at the end of a truncated line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EllipsisBox {
    /// Horizontal position.
    pub x: f32,
    /// Top of the glyph area.
    pub y: f32,
    /// Width of the ellipsis glyph.
    pub width: f32,
    /// Height of the glyph area.
    pub height: f32,
}

/// One line of a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootLineBox {
    /// Boxes in visual order.
    pub children: Vec<InlineBox>,
    /// The line box: `x` is where the first box starts, `width` spans all
    /// boxes, `y` and `height` cover the line height.
    pub rect: Rect,
    /// Vertical position of the baseline.
    pub baseline: f32,
    /// Topmost point painted by any box on the line.
    pub overflow_top: f32,
    /// Bottommost point painted by any box on the line.
    pub overflow_bottom: f32,
    /// Leftmost point painted by any box on the line.
    pub overflow_left: f32,
    /// Rightmost point painted by any box on the line.
    pub overflow_right: f32,
    /// The line ended at a forced break.
    pub ends_with_break: bool,
    /// Where the next line starts.
    pub line_break: InlineIterator,
    /// Bidi state at `line_break`.
    #[serde(skip)]
    pub line_break_status: BidiStatus,
    /// Floats first placed while this line was laid out.
    pub floats: Vec<PlacedFloat>,
    /// Static positions of the out-of-flow items met on this line.
    pub positioned: Vec<(ItemId, StaticPosition)>,
    /// The line must be laid out again.
    pub dirty: bool,
    /// The block height once this line was placed.
    pub block_height: f32,
    /// The ellipsis, if the line was truncated.
    pub ellipsis: Option<EllipsisBox>,
}

impl RootLineBox {
    /// A line holding `children`, not yet placed.
    #[must_use]
    pub fn new(children: Vec<InlineBox>, status: BidiStatus) -> Self {
        Self {
            children,
            rect: Rect::default(),
            baseline: 0.0,
            overflow_top: 0.0,
            overflow_bottom: 0.0,
            overflow_left: 0.0,
            overflow_right: 0.0,
            ends_with_break: false,
            line_break: InlineIterator::end(),
            line_break_status: status,
            floats: Vec::new(),
            positioned: Vec::new(),
            dirty: false,
            block_height: 0.0,
            ellipsis: None,
        }
    }

    /// Record where the next line starts and the bidi state there.
    pub fn set_line_break_info(&mut self, line_break: InlineIterator, status: BidiStatus) {
        self.line_break = line_break;
        self.line_break_status = status;
    }

    /// Move the line down by `dy`.
    pub fn shift_vertically(&mut self, dy: f32) {
        self.rect.y += dy;
        self.baseline += dy;
        self.overflow_top += dy;
        self.overflow_bottom += dy;
        self.block_height += dy;
        for child in &mut self.children {
            child.shift_vertically(dy);
        }
        for float in &mut self.floats {
            float.margin_box.y += dy;
        }
        for (_, position) in &mut self.positioned {
            position.y += dy;
        }
        if let Some(ellipsis) = &mut self.ellipsis {
            ellipsis.y += dy;
        }
    }

    /// Returns true if any box on the line belongs to `item`.
    #[must_use]
    pub fn contains_item(&self, item: ItemId) -> bool {
        fn search(boxes: &[InlineBox], item: ItemId) -> bool {
            boxes.iter().any(|child| {
                child.item() == item
                    || matches!(child, InlineBox::Flow(flow) if search(&flow.children, item))
            })
        }
        search(&self.children, item)
    }

    /// Text boxes of the line, in visual order.
    #[must_use]
    pub fn text_boxes(&self) -> Vec<&TextBox> {
        fn collect<'a>(boxes: &'a [InlineBox], out: &mut Vec<&'a TextBox>) {
            for child in boxes {
                match child {
                    InlineBox::Text(text) => out.push(text),
                    InlineBox::Flow(flow) => collect(&flow.children, out),
                    InlineBox::Atomic(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    /// Drop the ellipsis and every truncation.
    pub fn clear_truncation(&mut self) {
        self.ellipsis = None;
        for_each_text_box_mut(&mut self.children, &mut |text| {
            text.truncation = Truncation::None;
        });
    }
}
