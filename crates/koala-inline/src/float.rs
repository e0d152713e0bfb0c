//! Float registry for one inline formatting context.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! The line breaker inserts floats as it encounters them and positions
//! them either immediately (when they fit on the current line) or after
//! the line is finished. Line widths are always measured at a single
//! vertical position: a float intrudes on a line at `y` iff
//! `top <= y < bottom`.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::content::ItemId;
use crate::geometry::Rect;

/// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ClearSide {
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

/// A float that has been placed in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedFloat {
    /// The content item that generated the float.
    pub item: ItemId,
    /// Which side this float is on.
    pub side: FloatSide,
    /// The margin box of the float, in block coordinates.
    pub margin_box: Rect,
}

/// A float that has been inserted but not yet positioned.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingFloat {
    item: ItemId,
    side: FloatSide,
    width: f32,
    height: f32,
}

/// Tracks the floats of one block while its lines are laid out.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "The current and subsequent line boxes created next to the float are
/// shortened as necessary to make room for the margin box of the float."
#[derive(Debug, Clone, Default)]
pub struct FloatRegistry {
    /// Placed floats, in placement order.
    placed: Vec<PlacedFloat>,
    /// Inserted floats awaiting [`FloatRegistry::position_pending_floats`].
    pending: Vec<PendingFloat>,
    /// Left edge of the containing block's content box.
    content_left: f32,
    /// Right edge of the containing block's content box.
    content_right: f32,
}

impl FloatRegistry {
    /// Create an empty registry for a content box spanning
    /// `[content_left, content_left + content_width)`.
    #[must_use]
    pub const fn new(content_left: f32, content_width: f32) -> Self {
        Self {
            placed: Vec::new(),
            pending: Vec::new(),
            content_left,
            content_right: content_left + content_width,
        }
    }

    /// Forget every float (placed and pending).
    pub fn clear(&mut self) {
        self.placed.clear();
        self.pending.clear();
    }

    /// Returns true if no float has been placed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// All placed floats, in placement order.
    #[must_use]
    pub fn floats(&self) -> &[PlacedFloat] {
        &self.placed
    }

    /// The margin box of a placed float.
    #[must_use]
    pub fn float_rect(&self, item: ItemId) -> Option<Rect> {
        self.placed
            .iter()
            .find(|f| f.item == item)
            .map(|f| f.margin_box)
    }

    /// Register a float encountered during line breaking.
    ///
    /// Inserting a float that is already placed or pending is a no-op, so
    /// the line breaker may revisit the same float when it retries a line.
    pub fn insert_float(&mut self, item: ItemId, side: FloatSide, width: f32, height: f32) {
        if self.placed.iter().any(|f| f.item == item) || self.pending.iter().any(|f| f.item == item)
        {
            return;
        }
        self.pending.push(PendingFloat {
            item,
            side,
            width,
            height,
        });
    }

    /// Put back a float placed by an earlier layout, shifted down by `dy`.
    ///
    /// Used when lines are reused: their floats keep their old positions.
    pub fn restore_float(&mut self, float: PlacedFloat, dy: f32) {
        self.pending.retain(|pending| pending.item != float.item);
        self.placed.retain(|placed| placed.item != float.item);
        let mut margin_box = float.margin_box;
        margin_box.y += dy;
        self.placed.push(PlacedFloat { margin_box, ..float });
    }

    /// Returns true if an inserted float still awaits positioning.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place every pending float at or below `y`. Returns true if any float
    /// was placed.
    ///
    /// - Rule 5: "The outer top of a floating box may not be higher than the
    ///   outer top of any block or floated box generated by an element
    ///   earlier in the source document."
    /// - Rule 8: "A floating box must be placed as high as possible."
    /// - Rule 9: "A left-floating box must be put as far to the left as
    ///   possible, a right-floating box as far to the right as possible."
    pub fn position_pending_floats(&mut self, y: f32) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let pending = std::mem::take(&mut self.pending);
        for float in pending {
            // STEP 1: Never above an earlier float.
            let mut top = self.placed.last().map_or(y, |f| y.max(f.margin_box.y));

            // STEP 2: Move down past float bottoms until the float fits.
            loop {
                let available = self.right_offset_at(top) - self.left_offset_at(top);
                if available >= float.width {
                    break;
                }
                match self.next_float_bottom_below(top) {
                    Some(bottom) => top = bottom,
                    None => break,
                }
            }

            // STEP 3: Push against the appropriate edge.
            let x = match float.side {
                FloatSide::Left => self.left_offset_at(top),
                FloatSide::Right => self.right_offset_at(top) - float.width,
            };
            self.placed.push(PlacedFloat {
                item: float.item,
                side: float.side,
                margin_box: Rect::new(x, top, float.width, float.height),
            });
        }
        true
    }

    /// Left edge available to a line at `y`.
    #[must_use]
    pub fn left_offset_at(&self, y: f32) -> f32 {
        self.placed
            .iter()
            .filter(|f| f.side == FloatSide::Left && f.margin_box.y <= y && f.margin_box.bottom() > y)
            .map(|f| f.margin_box.right())
            .fold(self.content_left, f32::max)
    }

    /// Right edge available to a line at `y`.
    #[must_use]
    pub fn right_offset_at(&self, y: f32) -> f32 {
        self.placed
            .iter()
            .filter(|f| f.side == FloatSide::Right && f.margin_box.y <= y && f.margin_box.bottom() > y)
            .map(|f| f.margin_box.x)
            .fold(self.content_right, f32::min)
    }

    /// Width available to a line at `y`, accounting for intruding floats.
    #[must_use]
    pub fn line_width_at(&self, y: f32) -> f32 {
        (self.right_offset_at(y) - self.left_offset_at(y)).max(0.0)
    }

    /// The nearest float bottom edge strictly below `y`, if any.
    #[must_use]
    pub fn next_float_bottom_below(&self, y: f32) -> Option<f32> {
        self.placed
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|&bottom| bottom > y)
            .reduce(f32::min)
    }

    /// The lowest bottom edge of the floats on `side`, or 0 with none.
    ///
    /// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any left-floating boxes."
    #[must_use]
    pub fn clear_position(&self, side: ClearSide) -> f32 {
        self.placed
            .iter()
            .filter(|f| match side {
                ClearSide::Left => f.side == FloatSide::Left,
                ClearSide::Right => f.side == FloatSide::Right,
                ClearSide::Both => true,
            })
            .map(|f| f.margin_box.bottom())
            .fold(0.0, f32::max)
    }

    /// The lowest bottom edge of all placed floats.
    ///
    /// [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    #[must_use]
    pub fn float_bottom(&self) -> f32 {
        self.clear_position(ClearSide::Both)
    }
}
