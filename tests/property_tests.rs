use ewpsync::manifest::{Document, EntryKind};
use ewpsync::sync::{SyncOptions, synchronize};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Relative paths built from a small alphabet so directories collide often
fn candidate() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[a-c]{1,2}", 0..4),
        "[a-d]{1,3}\\.[ch]",
    )
        .prop_map(|(dirs, file)| {
            let mut parts = dirs;
            parts.push(file);
            parts.join("/")
        })
}

fn candidates() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(candidate(), 0..24)
}

fn stored_names(doc: &Document) -> Vec<String> {
    doc.entries(EntryKind::File)
        .unwrap()
        .into_iter()
        .map(|(_, name)| name)
        .collect()
}

/// For each group name, the set of stored file names directly inside it
fn membership(doc: &Document) -> HashMap<String, BTreeSet<String>> {
    let mut groups: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (id, name) in doc.entries(EntryKind::Group).unwrap() {
        let files = groups.entry(name).or_default();
        for child in doc.children(id) {
            if doc.entry_kind(*child) == Some(EntryKind::File) {
                files.insert(doc.entry_name(*child).unwrap());
            }
        }
    }
    groups
}

proptest! {
    #[test]
    fn test_second_pass_changes_nothing(paths in candidates()) {
        // Invariant: synchronizing the same paths twice is a no-op the second time
        let mut doc = Document::from_xml("<project/>").unwrap();
        let options = SyncOptions::default();

        synchronize(&mut doc, &paths, &options).unwrap();
        let first = doc.to_xml(2).unwrap();
        let report = synchronize(&mut doc, &paths, &options).unwrap();

        prop_assert!(report.is_unchanged());
        prop_assert_eq!(doc.to_xml(2).unwrap(), first);
    }

    #[test]
    fn test_every_candidate_is_present_once(paths in candidates()) {
        // Invariant: each distinct path yields exactly one file entry
        let mut doc = Document::from_xml("<project/>").unwrap();
        synchronize(&mut doc, &paths, &SyncOptions::default()).unwrap();

        let names = stored_names(&doc);
        let distinct: BTreeSet<String> =
            paths.iter().map(|p| format!("$PROJ_DIR$/{p}")).collect();

        prop_assert_eq!(names.len(), distinct.len());
        prop_assert_eq!(names.into_iter().collect::<BTreeSet<_>>(), distinct);
    }

    #[test]
    fn test_group_names_are_unique_in_global_scope(paths in candidates()) {
        // Invariant: a fresh manifest never gets two groups with the same name
        let mut doc = Document::from_xml("<project/>").unwrap();
        synchronize(&mut doc, &paths, &SyncOptions::default()).unwrap();

        let groups: Vec<String> = doc
            .entries(EntryKind::Group)
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        let unique: BTreeSet<&String> = groups.iter().collect();
        prop_assert_eq!(groups.len(), unique.len());
    }

    #[test]
    fn test_order_only_affects_sibling_order(paths in candidates()) {
        // Invariant: reversing the input gives the same group membership
        let mut forward = Document::from_xml("<project/>").unwrap();
        synchronize(&mut forward, &paths, &SyncOptions::default()).unwrap();

        let reversed_paths: Vec<String> = paths.iter().rev().cloned().collect();
        let mut reversed = Document::from_xml("<project/>").unwrap();
        synchronize(&mut reversed, &reversed_paths, &SyncOptions::default()).unwrap();

        prop_assert_eq!(membership(&forward), membership(&reversed));
    }

    #[test]
    fn test_serialized_output_reparses_identically(paths in candidates()) {
        // Invariant: writing then reading a synchronized manifest is lossless
        let mut doc = Document::from_xml("<project/>").unwrap();
        synchronize(&mut doc, &paths, &SyncOptions::default()).unwrap();

        let xml = doc.to_xml(2).unwrap();
        let reparsed = Document::from_xml(&xml).unwrap();
        prop_assert_eq!(reparsed.to_xml(2).unwrap(), xml);
    }
}
