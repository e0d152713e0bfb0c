//! Bidi runs: maximal spans of one content item at one resolved level.

use serde::Serialize;

use crate::bidi::context::BidiContext;
use crate::classify::Direction;
use crate::content::ItemId;

/// A span `[start, stop)` of one content item with its resolved embedding
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidiRun {
    /// The content item.
    pub item: ItemId,
    /// First character offset.
    pub start: usize,
    /// Offset just past the last character.
    pub stop: usize,
    /// Resolved embedding level (after I1/I2).
    pub level: u8,
    /// The run's characters are forced to its direction (LRO/RLO).
    pub overriding: bool,
}

impl BidiRun {
    /// Resolve the level of a run of class `direction` opened in
    /// `context`.
    ///
    /// [UAX #9 § 3.3.6 Resolving Implicit Levels](https://www.unicode.org/reports/tr9/#Resolving_Implicit_Levels)
    ///
    /// "I1. For all characters with an even (left-to-right) embedding
    /// level, those of type R go up one level and those of type AN or EN go
    /// up two levels.
    /// I2. For all characters with an odd (right-to-left) embedding level,
    /// those of type L, EN or AN go up one level."
    #[must_use]
    pub fn new(
        item: ItemId,
        start: usize,
        stop: usize,
        context: &BidiContext,
        direction: Direction,
    ) -> Self {
        let direction = if direction == Direction::OtherNeutral {
            context.dir()
        } else {
            direction
        };
        let mut level = context.level();
        if level % 2 == 1 {
            if matches!(
                direction,
                Direction::LeftToRight | Direction::EuropeanNumber | Direction::ArabicNumber
            ) {
                level += 1;
            }
        } else {
            match direction {
                Direction::RightToLeft | Direction::ArabicLetter => level += 1,
                Direction::EuropeanNumber | Direction::ArabicNumber => level += 2,
                _ => {}
            }
        }
        Self {
            item,
            start,
            stop,
            level,
            overriding: context.is_override(),
        }
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    /// Returns true for a run covering no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Returns true if the run is laid out right to left.
    #[must_use]
    pub const fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}
