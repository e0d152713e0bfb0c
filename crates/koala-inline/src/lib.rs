//! Bidi resolution, line breaking and inline box layout for the Koala renderer.
//!
//! # Scope
//!
//! This crate lays out the inline content of one block container:
//! - **Bidi resolution** ([UAX #9](https://www.unicode.org/reports/tr9/))
//!   - Explicit embeddings and overrides, from both style and control characters
//!   - Weak and neutral type resolution, implicit levels
//!   - Visual reordering of each line
//!
//! - **Line breaking** ([CSS Text Level 3 § 5](https://www.w3.org/TR/css-text-3/#line-breaking))
//!   - Break opportunities ([UAX #14](https://www.unicode.org/reports/tr14/))
//!   - White space collapsing and `white-space` modes
//!   - `word-break`, soft hyphens, forced breaks with `clear`
//!   - Floats narrowing the lines beside them
//!
//! - **Line boxes** ([CSS 2.1 § 10.8](https://www.w3.org/TR/CSS2/visudet.html#line-height))
//!   - Nested inline boxes per line, with edges only where the box starts or ends
//!   - `text-align` including `justify`, `vertical-align`
//!   - Static positions of absolutely positioned boxes
//!   - `text-overflow: ellipsis`
//!
//! - **Incremental relayout**
//!   - Text edits and float resizes dirty only the lines they touch
//!   - Clean lines after an edit are reused once a new line resynchronizes with them
//!
//! # Not Yet Implemented
//!
//! - List markers and `::first-line` styles
//! - Vertical writing modes

/// The Unicode Bidirectional Algorithm per [UAX #9](https://www.unicode.org/reports/tr9/).
pub mod bidi;
/// Break opportunities per [UAX #14](https://www.unicode.org/reports/tr14/).
pub mod break_locator;
/// Character classification for bidi and white space processing.
pub mod classify;
/// Layout limits.
pub mod config;
/// The inline content tree.
pub mod content;
/// Floats per [CSS 2.1 § 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats).
pub mod float;
/// Font measurement.
pub mod font;
/// Rectangles and box edges.
pub mod geometry;
/// Walking the content in logical order.
pub mod iterator;
/// The line layout driver per [CSS 2.1 § 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting).
pub mod layout;
/// Line boxes.
pub mod line_box;
/// Finding where lines break.
pub mod line_breaker;
/// Holes in the runs of a line.
pub mod midpoint;
/// Text overflow per [CSS Overflow Level 3 § 2.1](https://www.w3.org/TR/css-overflow-3/#text-overflow).
pub mod overflow;
/// Inline style properties.
pub mod style;

mod construct;
mod edit;
mod placement;
mod relayout;

// Re-exports for convenience
pub use bidi::{BidiContext, BidiResolver, BidiRun, BidiStatus, MAX_EMBEDDING_LEVEL};
pub use config::LayoutSettings;
pub use content::{ContentError, InlineContent, ItemId, ItemKind};
pub use float::{ClearSide, FloatRegistry, FloatSide, PlacedFloat};
pub use font::{ApproximateFontMetrics, FontMetrics, MonospaceFontMetrics};
pub use geometry::{EdgeSizes, Rect};
pub use iterator::InlineIterator;
pub use layout::{BlockGeometry, InlineBlock, InlineLayoutResult, LineLayoutState};
pub use line_box::{AtomicBox, AtomicKind, EllipsisBox, FlowBox, InlineBox, RootLineBox, TextBox, Truncation};
pub use line_breaker::StaticPosition;
pub use overflow::{can_accommodate_ellipsis, place_ellipsis};
pub use style::{
    InlineStyle, NbspMode, TextAlign, TextDirection, TextOverflow, TextTransform, UnicodeBidi,
    VerticalAlign, WhiteSpace, WordBreak,
};
