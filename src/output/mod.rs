//! Progress and status messages for the ewpsync CLI.
//!
//! Routine progress ("created", "added") goes to stdout so it can be piped;
//! warnings and errors go to stderr. A global [`Verbosity`] filters what is
//! shown.

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Also report entries that were already present.
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the `--quiet`/`--verbose` flags
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    println!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    println!("{}", message.dimmed());
}

/// Prints a verbose message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    println!("{}", message.dimmed());
}

/// Prints a git-style action line: bold verb, plain subject.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    println!("{} {}", format!("{verb:>8}").green().bold(), message);
}
