//! Terminal styling utilities
//!
//! Consistent color scheme for run output. Uses crossterm for cross-platform
//! terminal colors.

use crossterm::style::{StyledContent, Stylize};

/// Per-item indicator
/// - ok: green check
/// - failed: red cross
/// - dry-run: dim circle
pub fn item_indicator(ok: bool, dry_run: bool) -> StyledContent<&'static str> {
    match (ok, dry_run) {
        (false, _) => "✗".red(),
        (true, true) => "○".dark_grey(),
        (true, false) => "✓".green(),
    }
}

/// Succeeded count: green, dim when zero
pub fn count_succeeded(n: usize) -> StyledContent<String> {
    if n == 0 {
        n.to_string().dark_grey()
    } else {
        n.to_string().green()
    }
}

/// Failed count: red, dim when zero
pub fn count_failed(n: usize) -> StyledContent<String> {
    if n == 0 {
        n.to_string().dark_grey()
    } else {
        n.to_string().red()
    }
}

/// Section headers
pub fn header(text: &str) -> StyledContent<String> {
    text.to_string().bold()
}

/// Dim/muted text
pub fn dim(text: &str) -> StyledContent<String> {
    text.to_string().dark_grey()
}

/// Warning text
pub fn warning(text: &str) -> StyledContent<String> {
    text.to_string().yellow()
}

/// Error text
pub fn error(text: &str) -> StyledContent<String> {
    text.to_string().red()
}

/// Repository or tag names
pub fn item_name(name: &str) -> StyledContent<String> {
    name.to_string().cyan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators() {
        assert_eq!(*item_indicator(true, false).content(), "✓");
        assert_eq!(*item_indicator(false, true).content(), "✗");
        assert_eq!(*item_indicator(true, true).content(), "○");
    }

    #[test]
    fn test_counts_keep_value() {
        assert_eq!(count_succeeded(3).content(), "3");
        assert_eq!(count_failed(0).content(), "0");
    }
}
