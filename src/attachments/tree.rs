//! Index to tree conversion.
//!
//! The attachments index is a flat map of `/`-delimited paths. The viewer
//! navigates a hierarchy, so the flat map is converted once into a nested
//! tree of files and folders. The tree is derived from a full index
//! snapshot and never patched afterwards.

use super::index::{ATTACHMENTS_PREFIX, FileIndex};

/// A node of the attachments file tree.
///
/// Files keep the original, unstripped index key as `path` so the fetch
/// pipeline can look their byte range up again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    File {
        name: String,
        path: String,
        size: u64,
    },
    Folder {
        name: String,
        children: Vec<FileNode>,
    },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            FileNode::File { name, .. } | FileNode::Folder { name, .. } => name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileNode::File { .. })
    }
}

/// Build the file tree from an attachments index snapshot.
///
/// Entries with zero length or a trailing `/` (directory placeholders) are
/// skipped. A leading `attachments/` prefix is stripped before splitting;
/// intermediate segments become folders, reused when already present, and
/// the last segment becomes a file leaf. Sibling order follows first
/// insertion, it is never sorted. An empty index yields an empty tree,
/// which callers treat as "no attachments".
pub fn build_tree(index: &FileIndex) -> Vec<FileNode> {
    let mut roots = Vec::new();

    for (full_path, range) in index {
        if range.length() == 0 || full_path.ends_with('/') {
            continue;
        }

        let path = full_path
            .strip_prefix(ATTACHMENTS_PREFIX)
            .unwrap_or(full_path);
        let parts: Vec<&str> = path.split('/').collect();

        insert(&mut roots, &parts, full_path, range.length());
    }

    roots
}

fn insert(nodes: &mut Vec<FileNode>, parts: &[&str], full_path: &str, size: u64) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };

    if rest.is_empty() {
        nodes.push(FileNode::File {
            name: head.to_string(),
            path: full_path.to_string(),
            size,
        });
        return;
    }

    let pos = nodes
        .iter()
        .position(|n| matches!(n, FileNode::Folder { name, .. } if name == head))
        .unwrap_or_else(|| {
            nodes.push(FileNode::Folder {
                name: head.to_string(),
                children: Vec::new(),
            });
            nodes.len() - 1
        });

    if let FileNode::Folder { children, .. } = &mut nodes[pos] {
        insert(children, rest, full_path, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::index::ByteRange;

    fn index_of(entries: &[(&str, u64, u64)]) -> FileIndex {
        entries
            .iter()
            .map(|(path, offset, length)| (path.to_string(), ByteRange(*offset, *length)))
            .collect()
    }

    fn find<'a>(nodes: &'a [FileNode], name: &str) -> Option<&'a FileNode> {
        nodes.iter().find(|n| n.name() == name)
    }

    #[test]
    fn one_leaf_per_entry_reachable_by_path() {
        let index = index_of(&[
            ("attachments/metrics/loss.csv", 0, 100),
            ("attachments/metrics/acc.csv", 100, 50),
            ("attachments/readme.md", 150, 20),
        ]);
        let tree = build_tree(&index);

        assert_eq!(tree.len(), 2);

        let metrics = find(&tree, "metrics").unwrap();
        let FileNode::Folder { children, .. } = metrics else {
            panic!("expected folder");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(
            find(children, "loss.csv"),
            Some(&FileNode::File {
                name: "loss.csv".to_string(),
                path: "attachments/metrics/loss.csv".to_string(),
                size: 100,
            })
        );

        assert!(find(&tree, "readme.md").is_some_and(FileNode::is_file));
    }

    #[test]
    fn shared_prefix_reuses_one_folder() {
        let index = index_of(&[
            ("attachments/plots/a.png", 0, 10),
            ("attachments/plots/b.png", 10, 10),
        ]);
        let tree = build_tree(&index);

        assert_eq!(tree.len(), 1);
        let FileNode::Folder { name, children } = &tree[0] else {
            panic!("expected folder");
        };
        assert_eq!(name, "plots");
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn skips_empty_and_placeholder_entries() {
        let index = index_of(&[
            ("attachments/empty.txt", 0, 0),
            ("attachments/plots/", 0, 512),
            ("attachments/kept.txt", 0, 5),
        ]);
        let tree = build_tree(&index);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name(), "kept.txt");
    }

    #[test]
    fn leaf_keeps_unstripped_path() {
        let index = index_of(&[("attachments/logs/run.log", 7, 42)]);
        let tree = build_tree(&index);

        let FileNode::Folder { children, .. } = &tree[0] else {
            panic!("expected folder");
        };
        let FileNode::File { path, size, .. } = &children[0] else {
            panic!("expected file");
        };
        assert_eq!(path, "attachments/logs/run.log");
        assert_eq!(*size, 42);
    }

    #[test]
    fn path_without_folders_becomes_top_level_file() {
        let index = index_of(&[("notes.txt", 0, 9)]);
        let tree = build_tree(&index);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].is_file());
    }

    #[test]
    fn empty_index_yields_empty_tree() {
        assert!(build_tree(&FileIndex::new()).is_empty());
    }

    #[test]
    fn siblings_follow_first_insertion_order() {
        let index = index_of(&[
            ("attachments/z.txt", 0, 1),
            ("attachments/a/deep.txt", 1, 1),
            ("attachments/m.txt", 2, 1),
        ]);
        let tree = build_tree(&index);

        let names: Vec<_> = tree.iter().map(FileNode::name).collect();
        assert_eq!(names, vec!["z.txt", "a", "m.txt"]);
    }
}
