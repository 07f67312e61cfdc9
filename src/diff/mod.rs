//! Unified diff preview of a pending manifest write.
//!
//! Used by `--dry-run` to show what synchronization would change without
//! touching the project file.

use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::io::Write;
use std::path::Path;
use tracing::{Level, debug, span};

/// Configuration for unified diff generation
#[derive(Debug, Clone, Copy)]
pub struct UnifiedDiffConfig {
    /// Number of context lines around changes (typically 3)
    pub context_lines: usize,
    /// Diff algorithm to use (Myers, Patience, Histogram)
    pub algorithm: Algorithm,
    /// Whether to colorize the output
    pub colorize: bool,
}

impl Default for UnifiedDiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            algorithm: Algorithm::Myers,
            colorize: false,
        }
    }
}

/// Write a git-style unified diff of `old` against `new` for `path`.
///
/// Returns the number of changed (inserted or deleted) lines.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn generate_unified_diff(
    old: &str,
    new: &str,
    path: &Path,
    config: &UnifiedDiffConfig,
    writer: &mut dyn Write,
) -> std::io::Result<usize> {
    let span = span!(Level::DEBUG, "diff_generation", path = %path.display());
    let _guard = span.enter();

    let diff = TextDiff::configure()
        .algorithm(config.algorithm)
        .diff_lines(old, new);

    let mut changed = 0;
    let mut wrote_header = false;

    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        if !wrote_header {
            let old_header = format!("--- a/{}", path.display());
            let new_header = format!("+++ b/{}", path.display());
            if config.colorize {
                writeln!(writer, "{}", old_header.red())?;
                writeln!(writer, "{}", new_header.green())?;
            } else {
                writeln!(writer, "{old_header}")?;
                writeln!(writer, "{new_header}")?;
            }
            wrote_header = true;
        }

        let header = hunk.header().to_string();
        if config.colorize {
            writeln!(writer, "{}", header.cyan())?;
        } else {
            writeln!(writer, "{header}")?;
        }

        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => {
                    changed += 1;
                    let line = format!("-{change}");
                    if config.colorize { line.red().to_string() } else { line }
                }
                ChangeTag::Insert => {
                    changed += 1;
                    let line = format!("+{change}");
                    if config.colorize { line.green().to_string() } else { line }
                }
                ChangeTag::Equal => format!(" {change}"),
            };

            write!(writer, "{line}")?;
            if change.missing_newline() {
                writeln!(writer)?;
            }
        }
    }

    debug!(changed, "Diff generation complete");
    Ok(changed)
}
