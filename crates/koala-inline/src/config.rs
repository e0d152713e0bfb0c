//! Layout limits.

use serde::{Deserialize, Serialize};

use crate::bidi::MAX_EMBEDDING_LEVEL;

/// Structural caps and tuning knobs for inline layout.
///
/// Deserializes from a partial JSON object; missing fields keep their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Deepest chain of inline boxes built for one run. Deeper ancestors
    /// are skipped.
    pub max_line_depth: usize,
    /// Highest explicit embedding level. Values above the Unicode limit
    /// are clamped to it.
    pub max_embedding_level: u8,
    /// How many lines past a resume point incremental relayout may look for
    /// a line to resynchronize with.
    pub relayout_lookahead: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_line_depth: 200,
            max_embedding_level: MAX_EMBEDDING_LEVEL,
            relayout_lookahead: 8,
        }
    }
}

impl LayoutSettings {
    /// Clamp every field into its valid range.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.max_embedding_level > MAX_EMBEDDING_LEVEL {
            log::warn!(
                "max_embedding_level {} exceeds {MAX_EMBEDDING_LEVEL}, clamping",
                self.max_embedding_level
            );
        }
        Self {
            max_line_depth: self.max_line_depth.max(1),
            max_embedding_level: self.max_embedding_level.min(MAX_EMBEDDING_LEVEL),
            relayout_lookahead: self.relayout_lookahead,
        }
    }
}
