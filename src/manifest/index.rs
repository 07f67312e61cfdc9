use super::{Document, EntryKind, NodeId};
use crate::error::Result;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Document-wide group name index.
///
/// Group names form one flat namespace: a name resolves to the first group
/// carrying it in document order, wherever that group sits in the tree. The
/// index is built once after load and kept current as groups are appended,
/// so every lookup is a single hash probe instead of a tree scan.
#[derive(Debug, Default, Clone)]
pub struct GroupIndex {
    /// Group name -> first group with that name
    by_name: HashMap<String, NodeId>,
}

impl GroupIndex {
    /// Build the index by walking `doc` in document order.
    ///
    /// Every `group` and `file` entry is validated on the way, so a malformed
    /// manifest is rejected before anything is mutated.
    ///
    /// # Errors
    ///
    /// Returns a structural error for the first malformed entry.
    pub fn build(doc: &Document) -> Result<Self> {
        let mut index = Self::default();

        for id in doc.descendants(doc.root()) {
            match doc.entry_kind(id) {
                Some(EntryKind::Group) => {
                    let name = doc.entry_name(id)?;
                    index.record(name, id);
                }
                Some(EntryKind::File) => {
                    doc.entry_name(id)?;
                }
                None => {}
            }
        }

        debug!(groups = index.len(), "Built group index");
        Ok(index)
    }

    /// Group registered under `name`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Register a group; an earlier group with the same name keeps precedence.
    ///
    /// Returns `true` if `name` was not known before.
    pub fn record(&mut self, name: String, id: NodeId) -> bool {
        match self.by_name.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    /// Number of distinct group names
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no group is indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_group_in_document_order_wins() {
        let mut doc = Document::new("project");
        let root = doc.root();
        let app = doc.append_entry(root, EntryKind::Group, "app");
        let nested = doc.append_entry(app, EntryKind::Group, "drivers");
        let top = doc.append_entry(root, EntryKind::Group, "drivers");

        let index = GroupIndex::build(&doc).unwrap();
        assert_eq!(index.lookup("drivers"), Some(nested));
        assert_ne!(index.lookup("drivers"), Some(top));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_record_keeps_existing() {
        let mut doc = Document::new("project");
        let root = doc.root();
        let first = doc.append_entry(root, EntryKind::Group, "x");
        let second = doc.append_entry(root, EntryKind::Group, "x");

        let mut index = GroupIndex::default();
        assert!(index.record("x".to_string(), first));
        assert!(!index.record("x".to_string(), second));
        assert_eq!(index.lookup("x"), Some(first));
    }

    #[test]
    fn test_build_rejects_malformed_file_entry() {
        let mut doc = Document::new("project");
        let root = doc.root();
        doc.append_element(root, "file");

        let err = GroupIndex::build(&doc).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_ignores_other_named_elements() {
        let mut doc = Document::new("project");
        let root = doc.root();
        let config = doc.append_element(root, "configuration");
        let name = doc.append_element(config, "name");
        doc.append_text(name, "Debug");

        let index = GroupIndex::build(&doc).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.lookup("Debug"), None);
    }
}
