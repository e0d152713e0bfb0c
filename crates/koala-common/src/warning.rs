//! Layout warnings with colored terminal output.
//!
//! Layout never fails: pathological input (runaway nesting, embedding
//! levels past the bidi limit) is handled by falling back to a bounded
//! behavior. Those fallbacks are reported here, once per unique message,
//! so a page with ten thousand nested spans does not flood stderr.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Report a layout fallback (prints once per unique message).
///
/// The message is also forwarded to the `log` facade at `warn` level
/// so embedders with a logger installed see it in their own output.
/// Returns `true` if this call printed the warning.
///
/// # Example
/// ```
/// use koala_common::warning::warn_once;
///
/// let first = warn_once("Layout", "inline nesting exceeds 200 levels");
/// let second = warn_once("Layout", "inline nesting exceeds 200 levels");
/// assert!(first || !second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        log::warn!(target: "koala", "[{component}] {message}");
        eprintln!("{YELLOW}[Koala {component}] ⚠ {message}{RESET}");
    }
    should_print
}

/// Clear all recorded warnings (call before laying out a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Returns `true` if a warning with this component and message was reported.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "test_warn_once_deduplicates";
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
        assert!(was_warned("Test", message));
    }

    #[test]
    fn test_distinct_components_are_separate() {
        let message = "test_distinct_components_are_separate";
        assert!(warn_once("A", message));
        assert!(warn_once("B", message));
    }
}
