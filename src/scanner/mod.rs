//! Source tree enumeration.
//!
//! [`PathEnumerator`] walks the source directory and yields every regular
//! file whose name matches the configured pattern, expressed relative to the
//! manifest's directory. The walk is lazy and single-use; entries come in
//! file-name order within each directory.

use crate::config::{SyncConfig, compile_pattern};
use crate::error::{Result, SyncError};
use crate::utils::paths::{relative_to, resolve, to_slash};
use crate::utils::{match_options, should_ignore};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Finds candidate files under a root directory
#[derive(Debug, Clone)]
pub struct PathEnumerator {
    /// Directory being walked (absolute)
    root: PathBuf,
    /// Directory results are made relative to (absolute)
    base: PathBuf,
    /// Filename pattern
    pattern: Pattern,
    /// Case handling for `pattern`
    options: MatchOptions,
    /// Names pruned from the walk
    ignore_patterns: Vec<Pattern>,
    /// Whether to follow symbolic links
    follow_symlinks: bool,
}

impl PathEnumerator {
    /// Create an enumerator for `config.source_dir`, relative to the manifest's directory
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile or the current
    /// directory is needed and cannot be determined.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .map(String::as_str)
            .map(compile_pattern)
            .collect::<Result<Vec<_>>>()?;

        Self::with_patterns(
            &config.source_dir,
            config.base_dir(),
            compile_pattern(&config.pattern)?,
            ignore_patterns,
        )
        .map(|scanner| {
            scanner
                .case_sensitive(config.case_sensitive)
                .follow_symlinks(config.follow_symlinks)
        })
    }

    /// Create an enumerator from already compiled patterns
    ///
    /// # Errors
    ///
    /// Returns an error if `root` or `base` cannot be made absolute.
    pub fn with_patterns(
        root: &Path,
        base: &Path,
        pattern: Pattern,
        ignore_patterns: Vec<Pattern>,
    ) -> Result<Self> {
        let absolute = |path: &Path| {
            resolve(path).map_err(|e| {
                SyncError::io(path, std::io::Error::other(format!("{e:#}")))
            })
        };

        let root = absolute(root)?;
        let base = absolute(base)?;
        debug!(root = %root.display(), base = %base.display(), %pattern, "Scanner configured");

        Ok(Self {
            root,
            base,
            pattern,
            options: match_options(true),
            ignore_patterns,
            follow_symlinks: false,
        })
    }

    /// Toggle case-sensitive filename matching
    #[must_use]
    pub const fn case_sensitive(mut self, yes: bool) -> Self {
        self.options = match_options(yes);
        self
    }

    /// Toggle following symbolic links
    #[must_use]
    pub const fn follow_symlinks(mut self, yes: bool) -> Self {
        self.follow_symlinks = yes;
        self
    }

    /// Absolute directory being walked
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and yield relative candidate paths (`/`-separated)
    #[must_use]
    pub fn candidates(&self) -> Candidates<'_> {
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        Candidates {
            scanner: self,
            walker,
        }
    }

    /// Whether a walked entry is skipped together with its subtree
    fn is_pruned(&self, entry: &walkdir::DirEntry) -> bool {
        entry.depth() > 0 && should_ignore(entry.file_name(), &self.ignore_patterns)
    }

    /// Whether a regular file's name matches the pattern
    fn is_match(&self, entry: &walkdir::DirEntry) -> bool {
        self.pattern
            .matches_with(&entry.file_name().to_string_lossy(), self.options)
    }

    /// Path of `entry` relative to the base directory
    fn relative(&self, entry: &walkdir::DirEntry) -> Result<String> {
        let path = entry.path();
        relative_to(path, &self.base)
            .map(|rel| to_slash(&rel))
            .ok_or_else(|| {
                SyncError::io(
                    path,
                    std::io::Error::other(format!(
                        "cannot be expressed relative to {}",
                        self.base.display()
                    )),
                )
            })
    }
}

/// Lazy iterator returned by [`PathEnumerator::candidates`]
pub struct Candidates<'a> {
    /// Owning enumerator
    scanner: &'a PathEnumerator,
    /// Underlying directory walk
    walker: walkdir::IntoIter,
}

impl Iterator for Candidates<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.scanner.root.clone(), Path::to_path_buf);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    return Some(Err(SyncError::io(path, source)));
                }
            };

            if self.scanner.is_pruned(&entry) {
                if entry.file_type().is_dir() {
                    self.walker.skip_current_dir();
                }
                trace!(path = %entry.path().display(), "Ignored");
                continue;
            }

            if entry.file_type().is_file() && self.scanner.is_match(&entry) {
                return Some(self.scanner.relative(&entry));
            }
        }
    }
}
