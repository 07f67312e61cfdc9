//! Manifest synchronization.
//!
//! For every candidate path the directory segments are resolved to groups,
//! creating the missing ones, and a file entry is appended to the innermost
//! group unless one with the same stored name is already there:
//!
//! ```text
//! drivers/uart/uart.c   ->   <group> drivers
//!                              <group> uart
//!                                <file> $PROJ_DIR$/drivers/uart/uart.c
//! ```
//!
//! With [`GroupScope::Global`] a segment matches a group of that name
//! anywhere in the manifest, not just below the current group. Two unrelated
//! directories called `common` therefore share one group. [`GroupScope::Nested`]
//! restricts matching to the direct children of the current group.

use crate::config::{GroupScope, PathStyle, SyncConfig};
use crate::error::{Result, SyncError};
use crate::manifest::{Document, EntryKind, GroupIndex, NodeId};
use crate::output;
use std::fmt;
use tracing::{Level, debug, span};

/// A file path split into normalized segments, the file name last.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are dropped;
/// `..` is kept in the stored name but never becomes a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidatePath {
    /// Normalized segments, never empty, last one is the file name
    segments: Vec<String>,
}

impl CandidatePath {
    /// Split and normalize a relative path
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidCandidate`] if nothing is left after
    /// normalization or the path ends in `..`.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<String> = raw
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect();

        match segments.last().map(String::as_str) {
            None | Some("..") => Err(SyncError::InvalidCandidate {
                path: raw.to_string(),
            }),
            Some(_) => Ok(Self { segments }),
        }
    }

    /// Final segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Directory segments that map to groups, outermost first
    pub fn group_segments(&self) -> impl Iterator<Item = &str> {
        self.segments[..self.segments.len() - 1]
            .iter()
            .map(String::as_str)
            .filter(|s| *s != "..")
    }

    /// Directory part joined with `/`, for messages
    #[must_use]
    pub fn dir_display(&self) -> String {
        self.segments[..self.segments.len() - 1].join("/")
    }

    /// Name stored in the file entry: `<token><sep><segments joined by sep>`
    #[must_use]
    pub fn stored_name(&self, root_token: &str, style: PathStyle) -> String {
        let sep = style.separator().to_string();
        format!("{root_token}{sep}{}", self.segments.join(&sep))
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Manifest-side settings of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Group lookup scope
    pub scope: GroupScope,
    /// Separator in stored file names
    pub path_style: PathStyle,
    /// Project-root placeholder token
    pub root_token: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            scope: GroupScope::default(),
            path_style: PathStyle::default(),
            root_token: crate::PROJECT_DIR_TOKEN.to_string(),
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            scope: config.scope,
            path_style: config.path_style,
            root_token: config.root_token.clone(),
        }
    }
}

/// What happened to a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// A new file entry was appended
    Added,
    /// An entry with the same stored name already existed
    AlreadyPresent,
}

/// Changes made by a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Stored names of appended file entries
    pub added_files: Vec<String>,
    /// Names of created groups
    pub created_groups: Vec<String>,
    /// Stored names that were already present
    pub skipped_files: Vec<String>,
}

impl SyncReport {
    /// Whether the document was left untouched
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added_files.is_empty() && self.created_groups.is_empty()
    }
}

/// Applies candidate paths to a document one at a time
pub struct Synchronizer<'a> {
    /// Document being mutated
    doc: &'a mut Document,
    /// Global group lookup, kept current as groups are created
    index: GroupIndex,
    /// Run settings
    options: &'a SyncOptions,
    /// Accumulated changes
    report: SyncReport,
}

impl<'a> Synchronizer<'a> {
    /// Prepare `doc` for synchronization.
    ///
    /// # Errors
    ///
    /// Returns a structural error if any group or file entry of `doc` is
    /// malformed; nothing has been mutated at that point.
    pub fn new(doc: &'a mut Document, options: &'a SyncOptions) -> Result<Self> {
        let index = GroupIndex::build(doc)?;
        Ok(Self {
            doc,
            index,
            options,
            report: SyncReport::default(),
        })
    }

    /// Ensure the groups and the file entry for `candidate` exist.
    ///
    /// # Errors
    ///
    /// Returns a structural error if an inspected entry is malformed. The
    /// document may already hold groups created for this candidate.
    pub fn add(&mut self, candidate: &CandidatePath) -> Result<FileOutcome> {
        let span = span!(Level::DEBUG, "add_file", path = %candidate);
        let _guard = span.enter();

        let mut context = self.doc.root();
        for segment in candidate.group_segments() {
            context = self.resolve_group(context, segment, candidate)?;
        }

        let stored = candidate.stored_name(&self.options.root_token, self.options.path_style);
        if self
            .doc
            .find_child_entry(context, EntryKind::File, &stored)?
            .is_some()
        {
            output::verbose(&format!("skipped {candidate}"));
            self.report.skipped_files.push(stored);
            return Ok(FileOutcome::AlreadyPresent);
        }

        self.doc.append_entry(context, EntryKind::File, &stored);
        debug!(name = %stored, "File entry appended");
        output::action("added", &candidate.to_string());
        self.report.added_files.push(stored);
        Ok(FileOutcome::Added)
    }

    /// Changes made so far
    #[must_use]
    pub const fn report(&self) -> &SyncReport {
        &self.report
    }

    /// Consume the synchronizer, returning what changed
    #[must_use]
    pub fn finish(self) -> SyncReport {
        self.report
    }

    /// Find the group named `segment` for the current context, creating it
    /// under `context` if the scope has none.
    fn resolve_group(
        &mut self,
        context: NodeId,
        segment: &str,
        candidate: &CandidatePath,
    ) -> Result<NodeId> {
        let existing = match self.options.scope {
            GroupScope::Global => self.index.lookup(segment),
            GroupScope::Nested => self
                .doc
                .find_child_entry(context, EntryKind::Group, segment)?,
        };

        if let Some(group) = existing {
            return Ok(group);
        }

        let group = self.doc.append_entry(context, EntryKind::Group, segment);
        self.index.record(segment.to_string(), group);
        debug!(group = segment, "Group created");
        output::action(
            "created",
            &format!("group {segment} (from {})", candidate.dir_display()),
        );
        self.report.created_groups.push(segment.to_string());
        Ok(group)
    }
}

/// Add every candidate path to `doc`.
///
/// Stops at the first error; the caller must not persist `doc` then.
///
/// # Errors
///
/// Returns an error for a malformed manifest or an unusable candidate path.
pub fn synchronize<I, S>(
    doc: &mut Document,
    candidates: I,
    options: &SyncOptions,
) -> Result<SyncReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut synchronizer = Synchronizer::new(doc, options)?;
    for raw in candidates {
        synchronizer.add(&CandidatePath::parse(raw.as_ref())?)?;
    }
    Ok(synchronizer.finish())
}
