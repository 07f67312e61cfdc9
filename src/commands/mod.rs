//! Command implementations.
//!
//! ewpsync has a single operation, [`sync::execute`], which runs the whole
//! `load -> resolve -> save` pipeline for one project file.

/// Synchronize a project file with a source directory.
pub mod sync;
