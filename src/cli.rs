//! Command-line interface definitions for ewpsync.
//!
//! The clap definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation doubles as clap help text.

#![allow(clippy::missing_docs_in_private_items)]

use crate::config::{GroupScope, PathStyle};
use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for ewpsync.
#[derive(Parser, Debug)]
#[command(
    name = "ewpsync",
    version = crate::VERSION,
    about = "Import source files into an IAR project following the directory tree",
    long_about = "Walks a source directory and adds every file matching a pattern to an IAR \
                  Embedded Workbench project (.ewp), creating one group per directory. \
                  Existing groups and files are reused, so the command can be rerun safely."
)]
pub struct Cli {
    /// Path to the source directory to be added
    #[arg(value_name = "path", required_unless_present = "completions")]
    pub path: Option<PathBuf>,

    /// Path to the project file to update
    #[arg(value_name = "project_path", required_unless_present = "completions")]
    pub project_path: Option<PathBuf>,

    /// Unix filename pattern matched against file names [default: *]
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Skip files and directories whose name matches (repeatable)
    #[arg(short = 'i', long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Where existing groups are looked up [default: global]
    #[arg(long, value_enum)]
    pub scope: Option<GroupScope>,

    /// Separator used in stored file names [default: forward]
    #[arg(long, value_enum)]
    pub path_style: Option<PathStyle>,

    /// Placeholder for the project directory in stored file names [default: $PROJ_DIR$]
    #[arg(long, value_name = "TOKEN")]
    pub root_token: Option<String>,

    /// Follow symbolic links while scanning
    #[arg(short = 'L', long)]
    pub follow_links: bool,

    /// Match the pattern case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Read settings from a TOML file
    #[arg(short, long, value_name = "FILE", env = "EWPSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the resulting change as a diff instead of writing the project
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}
