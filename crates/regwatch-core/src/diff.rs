//! Line-oriented diff generation
//!
//! Produces the unified delta stored as the content of an `Updated` change.
//! The delta is directional (old -> new) and deterministic for a given pair
//! of inputs; it doubles as the text fed to the classifier, so risk and
//! impact assessment of an update is scoped to what actually changed.

use similar::TextDiff;

/// Number of unchanged context lines around each hunk
const CONTEXT_LINES: usize = 3;

/// Generate a unified, line-based diff of `old` against `new`
///
/// Identical inputs yield an empty string. Either side may be empty, which
/// yields a delta describing a full insertion or deletion.
pub fn unified_diff(old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_inputs_yield_empty_delta() {
        assert_eq!(unified_diff("same\ntext\n", "same\ntext\n"), "");
        assert_eq!(unified_diff("", ""), "");
    }

    #[test]
    fn test_addition_is_marked() {
        let old = "Initial dosage 10mg.\n";
        let new = "Initial dosage 10mg.\nUpdated dosage 20mg due to new clinical trial data.\n";
        let delta = unified_diff(old, new);
        assert!(delta.contains("+Updated dosage 20mg"));
        assert!(!delta.contains("-Initial dosage 10mg"));
    }

    #[test]
    fn test_empty_old_is_full_insertion() {
        let delta = unified_diff("", "brand new page\n");
        assert!(delta.contains("+brand new page"));
    }

    #[test]
    fn test_empty_new_is_full_deletion() {
        let delta = unified_diff("withdrawn notice\n", "");
        assert!(delta.contains("-withdrawn notice"));
    }

    #[test]
    fn test_directional() {
        let a = "line one\nline two\n";
        let b = "line one\nline three\n";
        assert_ne!(unified_diff(a, b), unified_diff(b, a));
    }

    #[test]
    fn test_deterministic() {
        let a = "alpha\nbeta\ngamma\n";
        let b = "alpha\ndelta\ngamma\n";
        assert_eq!(unified_diff(a, b), unified_diff(a, b));
    }
}
