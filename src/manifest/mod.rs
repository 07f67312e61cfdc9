//! IAR project manifest model.
//!
//! A manifest is an XML document whose `group` and `file` elements each carry
//! exactly one `name` child:
//!
//! ```xml
//! <project>
//!   <group>
//!     <name>drivers</name>
//!     <file>
//!       <name>$PROJ_DIR$/drivers/uart.c</name>
//!     </file>
//!   </group>
//! </project>
//! ```
//!
//! - [`document`]: the ordered element tree
//! - [`index`]: name lookup for groups
//! - [`codec`]: ISO-8859-1 XML load/save

/// ISO-8859-1 XML reader and writer for [`Document`].
pub mod codec;

/// Ordered arena tree holding the parsed manifest.
pub mod document;

/// Document-wide group name index.
pub mod index;

pub use document::{Document, NodeData, NodeId};
pub use index::GroupIndex;

use crate::error::{Result, SyncError};
use crate::{FILE_TAG, GROUP_TAG, NAME_TAG};

/// The two kinds of named manifest entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Folder-like container
    Group,
    /// Source file reference
    File,
}

impl EntryKind {
    /// Element tag used for this kind
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Group => GROUP_TAG,
            Self::File => FILE_TAG,
        }
    }

    /// Kind carried by an element tag, if any
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            GROUP_TAG => Some(Self::Group),
            FILE_TAG => Some(Self::File),
            _ => None,
        }
    }
}

impl Document {
    /// Entry kind of `id`, `None` for any other node
    #[must_use]
    pub fn entry_kind(&self, id: NodeId) -> Option<EntryKind> {
        self.tag(id).and_then(EntryKind::from_tag)
    }

    /// Display name of a group or file entry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Structure`] if the entry does not have exactly
    /// one `name` child or the `name` element nests other elements.
    pub fn entry_name(&self, id: NodeId) -> Result<String> {
        let mut names = self.child_elements(id, NAME_TAG);
        let (Some(name), None) = (names.next(), names.next()) else {
            return Err(SyncError::structure(format!(
                "{} must have exactly one <{NAME_TAG}> child",
                self.location(id)
            )));
        };

        if self.children(name).iter().any(|&c| self.tag(c).is_some()) {
            return Err(SyncError::structure(format!(
                "{} contains nested elements",
                self.location(name)
            )));
        }

        Ok(self.text(name))
    }

    /// Append `<kind><name>name</name></kind>` as the last child of `parent`
    pub fn append_entry(&mut self, parent: NodeId, kind: EntryKind, name: &str) -> NodeId {
        let entry = self.append_element(parent, kind.tag());
        let label = self.append_element(entry, NAME_TAG);
        self.append_text(label, name);
        entry
    }

    /// First direct child of `parent` of the given kind named `name`.
    ///
    /// # Errors
    ///
    /// Fails if any inspected child of that kind is malformed.
    pub fn find_child_entry(
        &self,
        parent: NodeId,
        kind: EntryKind,
        name: &str,
    ) -> Result<Option<NodeId>> {
        for child in self.child_elements(parent, kind.tag()) {
            if self.entry_name(child)? == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Every entry of `kind` in document order, with its name.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed entry.
    pub fn entries(&self, kind: EntryKind) -> Result<Vec<(NodeId, String)>> {
        self.descendants(self.root())
            .filter(|&id| self.entry_kind(id) == Some(kind))
            .map(|id| self.entry_name(id).map(|name| (id, name)))
            .collect()
    }
}
