//! Explicit embedding contexts.
//!
//! [UAX #9 § 3.3.2 Explicit Levels and Directions](https://www.unicode.org/reports/tr9/#Explicit_Levels_and_Directions)
//!
//! Each embedding or override opens a context one or two levels deeper than
//! its parent. Contexts are immutable once created and shared between
//! every line status that refers to them.

use std::fmt;
use std::rc::Rc;

use crate::classify::Direction;
use crate::style::TextDirection;

/// "max_depth: the upper limit on embedding levels (125)" in current
/// UAX #9; this engine keeps the historical limit of 60 (X1-X9 of the
/// original algorithm allowed 61 levels, 0 through 60).
pub const MAX_EMBEDDING_LEVEL: u8 = 60;

/// One node of the embedding stack.
#[derive(Clone)]
pub struct BidiContext {
    level: u8,
    direction: TextDirection,
    overriding: bool,
    parent: Option<Rc<BidiContext>>,
}

impl BidiContext {
    /// The paragraph context for a block: level 0 for `ltr`, level 1 for
    /// `rtl`.
    #[must_use]
    pub fn root(direction: TextDirection, overriding: bool) -> Rc<Self> {
        Rc::new(Self {
            level: if direction.is_ltr() { 0 } else { 1 },
            direction,
            overriding,
            parent: None,
        })
    }

    /// Open a child context at `level`.
    #[must_use]
    pub fn push(
        parent: &Rc<Self>,
        level: u8,
        direction: TextDirection,
        overriding: bool,
    ) -> Rc<Self> {
        debug_assert!(level > parent.level, "embedding levels must increase");
        Rc::new(Self {
            level,
            direction,
            overriding,
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Embedding level of this context.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Embedding direction of this context.
    #[must_use]
    pub const fn direction(&self) -> TextDirection {
        self.direction
    }

    /// The embedding direction as a strong bidi class.
    #[must_use]
    pub const fn dir(&self) -> Direction {
        match self.direction {
            TextDirection::Ltr => Direction::LeftToRight,
            TextDirection::Rtl => Direction::RightToLeft,
        }
    }

    /// Returns true if this context forces its direction on every
    /// character (LRO/RLO).
    #[must_use]
    pub const fn is_override(&self) -> bool {
        self.overriding
    }

    /// The enclosing context, or `None` for the paragraph context.
    #[must_use]
    pub const fn parent(&self) -> Option<&Rc<Self>> {
        self.parent.as_ref()
    }

    /// The paragraph context at the bottom of the stack.
    #[must_use]
    pub fn root_of(context: &Rc<Self>) -> Rc<Self> {
        let mut current = context;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        Rc::clone(current)
    }

    /// Number of contexts from this one down to the paragraph context.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent();
        while let Some(context) = current {
            depth += 1;
            current = context.parent();
        }
        depth
    }
}

impl PartialEq for BidiContext {
    /// Contexts are equal when every node of both stacks agrees.
    fn eq(&self, other: &Self) -> bool {
        if self.level != other.level
            || self.direction != other.direction
            || self.overriding != other.overriding
        {
            return false;
        }
        match (&self.parent, &other.parent) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }
}

impl Eq for BidiContext {}

impl fmt::Debug for BidiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BidiContext(")?;
        let mut current = Some(self);
        let mut first = true;
        while let Some(context) = current {
            if !first {
                write!(f, " < ")?;
            }
            first = false;
            write!(
                f,
                "{}{}{}",
                context.level,
                context.direction,
                if context.overriding { "!" } else { "" }
            )?;
            current = context.parent.as_deref();
        }
        write!(f, ")")
    }
}
