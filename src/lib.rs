#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # ewpsync - IAR project synchronizer
//!
//! ewpsync keeps the group/file tree of an IAR Embedded Workbench project
//! (`.ewp`) in step with a source directory. Every file matching a pattern
//! gets a `file` entry whose name is the path relative to the project
//! directory behind the `$PROJ_DIR$` placeholder, inside one `group` per
//! directory level. Missing groups are created; existing groups and files
//! are reused, so a second run is a no-op.
//!
//! ## Architecture
//!
//! - [`manifest`]: ordered XML tree, entry helpers, group index, ISO-8859-1 codec
//! - [`scanner`]: directory walk producing candidate paths
//! - [`sync`]: group/file resolution against the tree
//! - [`commands`]: the load, synchronize, save pipeline
//! - [`config`]: immutable run configuration (CLI, TOML file, defaults)
//! - [`output`]: progress messages and verbosity
//!
//! ## Example Usage
//!
//! ```
//! use ewpsync::manifest::Document;
//! use ewpsync::sync::{SyncOptions, synchronize};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut doc = Document::from_xml("<project/>")?;
//! let report = synchronize(&mut doc, ["drivers/uart.c"], &SyncOptions::default())?;
//!
//! assert_eq!(report.created_groups, vec!["drivers"]);
//! assert!(doc.to_xml(2)?.contains("<name>$PROJ_DIR$/drivers/uart.c</name>"));
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations.
pub mod commands;

/// Run configuration: defaults, TOML file, CLI overrides.
pub mod config;

/// Unified diff rendering for dry runs.
pub mod diff;

/// Error taxonomy.
pub mod error;

/// Project manifest model and codec.
pub mod manifest;

/// Output formatting and verbosity.
pub mod output;

/// Filesystem scanning for candidate files.
pub mod scanner;

/// Group and file resolution.
pub mod sync;

/// Utility functions and helpers.
pub mod utils;

pub use error::{Result, SyncError};

/// Current version of the ewpsync binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder IAR substitutes with the project file's directory.
pub const PROJECT_DIR_TOKEN: &str = "$PROJ_DIR$";

/// Tag of the element holding an entry's display name.
pub const NAME_TAG: &str = "name";

/// Tag of group entries.
pub const GROUP_TAG: &str = "group";

/// Tag of file entries.
pub const FILE_TAG: &str = "file";

/// Filename pattern used when none is given (matches every file).
pub const DEFAULT_PATTERN: &str = "*";

/// Spaces per indentation level when writing the manifest.
pub const DEFAULT_INDENT: usize = 2;

/// Process exit code for a malformed manifest.
pub const EXIT_STRUCTURE: i32 = 2;

/// Process exit code for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a failed run.
///
/// A malformed manifest anywhere in the error chain maps to
/// [`EXIT_STRUCTURE`], anything else to [`EXIT_FAILURE`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let structural = err
        .chain()
        .filter_map(|e| e.downcast_ref::<SyncError>())
        .any(SyncError::is_structural);

    if structural { EXIT_STRUCTURE } else { EXIT_FAILURE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_structural_through_context() {
        let err: anyhow::Result<()> = Err(SyncError::structure("bad").into());
        let err = err.context("Failed to load project").unwrap_err();
        assert_eq!(exit_code(&err), EXIT_STRUCTURE);
    }

    #[test]
    fn test_exit_code_other() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(exit_code(&err), EXIT_FAILURE);
    }
}
