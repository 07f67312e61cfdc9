//! Run configuration.
//!
//! A [`SyncConfig`] is built once per run from three layers, highest
//! precedence first: command-line flags, an optional TOML file
//! (`--config`), built-in defaults. It is immutable afterwards and handed to
//! the scanner and the synchronizer.

/// TOML configuration file parsing.
pub mod parser;

use crate::cli::Cli;
use crate::error::{Result, SyncError};
use crate::{DEFAULT_INDENT, DEFAULT_PATTERN, PROJECT_DIR_TOKEN};
use anyhow::Context;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted indentation width
pub const MAX_INDENT: usize = 8;

/// Where group names are looked up while resolving a candidate's directories
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupScope {
    /// Anywhere in the manifest; group names act as global identifiers
    #[default]
    Global,
    /// Only among the direct child groups of the current group
    Nested,
}

/// Separator used inside stored file names
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `$PROJ_DIR$/drivers/uart.c`
    #[default]
    Forward,
    /// `$PROJ_DIR$\drivers\uart.c`
    Backslash,
}

impl PathStyle {
    /// Separator character for this style
    #[must_use]
    pub const fn separator(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backslash => '\\',
        }
    }
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Directory traversal settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Manifest editing settings
    #[serde(default)]
    pub manifest: ManifestConfig,
}

/// `[scan]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Filename glob
    pub pattern: Option<String>,
    /// Names skipped during traversal
    pub ignore_patterns: Option<Vec<String>>,
    /// Follow symbolic links
    pub follow_symlinks: Option<bool>,
    /// Case-sensitive filename matching
    pub case_sensitive: Option<bool>,
}

/// `[manifest]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    /// Group lookup scope
    pub scope: Option<GroupScope>,
    /// Separator in stored file names
    pub path_style: Option<PathStyle>,
    /// Project-root placeholder token
    pub root_token: Option<String>,
    /// Spaces per indentation level when writing
    pub indent: Option<usize>,
}

/// Immutable settings for one synchronization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory scanned for source files
    pub source_dir: PathBuf,
    /// Manifest file to update
    pub project_path: PathBuf,
    /// Filename glob, matched against file names only
    pub pattern: String,
    /// File or directory names pruned from the walk
    pub ignore_patterns: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Case-sensitive filename matching
    pub case_sensitive: bool,
    /// Group lookup scope
    pub scope: GroupScope,
    /// Separator in stored file names
    pub path_style: PathStyle,
    /// Project-root placeholder token
    pub root_token: String,
    /// Spaces per indentation level when writing
    pub indent: usize,
    /// Compute and show the change without writing it
    pub dry_run: bool,
}

impl SyncConfig {
    /// Defaults for synchronizing `source_dir` into `project_path`
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            project_path: project_path.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            case_sensitive: true,
            scope: GroupScope::default(),
            path_style: PathStyle::default(),
            root_token: PROJECT_DIR_TOKEN.to_string(),
            indent: DEFAULT_INDENT,
            dry_run: false,
        }
    }

    /// Build the configuration from parsed arguments, reading `--config` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if a positional argument is missing, the config file
    /// cannot be read or parsed, or the merged values are invalid.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let source_dir = cli.path.clone().context("Missing <path> argument")?;
        let project_path = cli
            .project_path
            .clone()
            .context("Missing <project_path> argument")?;

        let mut config = Self::new(source_dir, project_path);

        if let Some(path) = &cli.config {
            let file = parser::parse_config_file(path)?;
            config = config.with_file(file);
        }

        if let Some(pattern) = &cli.pattern {
            config.pattern.clone_from(pattern);
        }
        config.ignore_patterns.extend(cli.ignore.iter().cloned());
        if let Some(scope) = cli.scope {
            config.scope = scope;
        }
        if let Some(style) = cli.path_style {
            config.path_style = style;
        }
        if let Some(token) = &cli.root_token {
            config.root_token.clone_from(token);
        }
        if cli.follow_links {
            config.follow_symlinks = true;
        }
        if cli.ignore_case {
            config.case_sensitive = false;
        }
        config.dry_run = cli.dry_run;

        config.validate()?;
        Ok(config)
    }

    /// Overlay the values present in a configuration file
    #[must_use]
    pub fn with_file(mut self, file: FileConfig) -> Self {
        let FileConfig { scan, manifest } = file;

        if let Some(pattern) = scan.pattern {
            self.pattern = pattern;
        }
        if let Some(ignore) = scan.ignore_patterns {
            self.ignore_patterns = ignore;
        }
        if let Some(follow) = scan.follow_symlinks {
            self.follow_symlinks = follow;
        }
        if let Some(case_sensitive) = scan.case_sensitive {
            self.case_sensitive = case_sensitive;
        }
        if let Some(scope) = manifest.scope {
            self.scope = scope;
        }
        if let Some(style) = manifest.path_style {
            self.path_style = style;
        }
        if let Some(token) = manifest.root_token {
            self.root_token = token;
        }
        if let Some(indent) = manifest.indent {
            self.indent = indent;
        }
        self
    }

    /// Directory stored file names are relative to: the manifest's own directory
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        match self.project_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Check value ranges and compile every pattern once.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Pattern`] for a glob that does not compile and
    /// [`SyncError::Config`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.root_token.is_empty() {
            return Err(SyncError::Config {
                message: "root token cannot be empty".to_string(),
            });
        }
        if self.indent > MAX_INDENT {
            return Err(SyncError::Config {
                message: format!("indent must be between 0 and {MAX_INDENT}"),
            });
        }
        compile_pattern(&self.pattern)?;
        for pattern in &self.ignore_patterns {
            compile_pattern(pattern)?;
        }
        Ok(())
    }
}

/// Compile a glob, reporting which pattern failed.
///
/// # Errors
///
/// Returns [`SyncError::Pattern`] if `pattern` is not a valid glob.
pub fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| SyncError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
