//! Utility functions and helpers.
//!
//! - [`paths`]: absolute/relative path conversion
//! - [`should_ignore`]: name-based pruning during traversal

/// Path manipulation and resolution utilities
pub mod paths;

use glob::{MatchOptions, Pattern};
use std::ffi::OsStr;

/// Determines if an entry name matches any of the ignore patterns.
///
/// Patterns are matched against the final path component only, so `build`
/// prunes every directory called `build` and `*.bak` every backup file.
#[must_use]
pub fn should_ignore(name: &OsStr, patterns: &[Pattern]) -> bool {
    let name = name.to_string_lossy();
    patterns.iter().any(|pattern| pattern.matches(&name))
}

/// Match options mirroring Unix filename matching
#[must_use]
pub const fn match_options(case_sensitive: bool) -> MatchOptions {
    MatchOptions {
        case_sensitive,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}
