//! [UAX #9 § 3.4 Reordering Resolved Levels](https://www.unicode.org/reports/tr9/#Reordering_Resolved_Levels)
//!
//! "L2. From the highest level found in the text to the lowest odd level on
//! each line, including intermediate levels not actually present in the
//! text, reverse any contiguous sequence of characters that are at that
//! level or higher."

use crate::bidi::run::BidiRun;

/// Reorder the runs of one line from logical to visual order.
///
/// Only the order of the runs changes; the characters inside a right to
/// left run are reversed when it is painted.
pub fn reorder_runs(runs: &mut [BidiRun]) {
    let Some(mut level_high) = runs.iter().map(|run| run.level).max() else {
        return;
    };
    let Some(mut level_low) = runs.iter().map(|run| run.level).min() else {
        return;
    };

    // Reversal stops at the lowest odd level.
    if level_low % 2 == 0 {
        level_low += 1;
    }

    while level_high >= level_low {
        let mut i = 0;
        while i < runs.len() {
            // STEP 1: Skip runs below the current level.
            while i < runs.len() && runs[i].level < level_high {
                i += 1;
            }
            // STEP 2: Reverse the maximal sequence at or above it.
            let start = i;
            while i < runs.len() && runs[i].level >= level_high {
                i += 1;
            }
            runs[start..i].reverse();
        }
        level_high -= 1;
    }
}
