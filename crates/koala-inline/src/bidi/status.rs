//! Resolver state carried from one line to the next.

use std::rc::Rc;

use crate::bidi::context::BidiContext;
use crate::classify::Direction;
use crate::style::TextDirection;

/// The bidi state at a line boundary.
///
/// A block is one bidi paragraph broken into lines, so resolution of a
/// line continues from the status the previous line ended with. Two lines
/// that start at the same content position with equal status resolve
/// identically, which is what incremental relayout relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidiStatus {
    /// Class of the character that ended the last run.
    pub eor: Direction,
    /// Class of the last strong character seen.
    pub last_strong: Direction,
    /// Class of the last character seen (neutrals folded).
    pub last: Direction,
    /// The open embedding context.
    pub context: Rc<BidiContext>,
}

impl BidiStatus {
    /// The status at the start of a paragraph with base direction
    /// `direction`.
    #[must_use]
    pub fn new(direction: TextDirection, overriding: bool) -> Self {
        let context = BidiContext::root(direction, overriding);
        let dir = context.dir();
        Self {
            eor: dir,
            last_strong: dir,
            last: dir,
            context,
        }
    }

    /// Reset to the paragraph context of the current stack.
    ///
    /// A forced line break ends the bidi paragraph on this line.
    pub fn reset_to_root(&mut self) {
        self.context = BidiContext::root_of(&self.context);
        let dir = self.context.dir();
        self.eor = dir;
        self.last_strong = dir;
        self.last = dir;
    }
}
