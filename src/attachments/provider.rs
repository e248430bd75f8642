use anyhow::Result;
use log::debug;

use super::index::{FileIndex, find_attachments_index_path, find_attachments_tar_path};
use super::tree::{FileNode, build_tree};
use crate::bucket::Downloader;

/// Attachments of one model: the parsed side index, the tar base offset
/// and the derived file tree.
///
/// Populated once from a model-level index snapshot and immutable after
/// construction; a model switch discards the whole value.
pub struct ModelAttachments {
    index: FileIndex,
    tar_base_offset: u64,
    tree: Vec<FileNode>,
}

impl ModelAttachments {
    /// Locate, fetch and parse the attachments of a model.
    ///
    /// Returns `Ok(None)` when the model-level index carries no attachments
    /// entries; that is a normal state, not an error.
    pub async fn init(
        downloader: &dyn Downloader,
        model_index: &FileIndex,
    ) -> Result<Option<Self>> {
        let Some(index_path) = find_attachments_index_path(model_index) else {
            return Ok(None);
        };

        let index = downloader
            .get_index_from_bucket(model_index, index_path)
            .await?;

        let Some(tar_path) = find_attachments_tar_path(model_index) else {
            return Ok(None);
        };
        let Some(tar_range) = model_index.get(tar_path) else {
            return Ok(None);
        };

        let tree = build_tree(&index);
        debug!(
            "attachments initialized: {} entries, tar at offset {}",
            index.len(),
            tar_range.offset()
        );

        Ok(Some(Self {
            index,
            tar_base_offset: tar_range.offset(),
            tree,
        }))
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    /// Absolute offset of the tar archive within the storage object.
    pub fn tar_base_offset(&self) -> u64 {
        self.tar_base_offset
    }

    pub fn tree(&self) -> &[FileNode] {
        &self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Look a file leaf up by its tree path (`folder/name`), accepting the
    /// unstripped index key as well.
    pub fn find_file(&self, path: &str) -> Option<&FileNode> {
        fn walk<'a>(nodes: &'a [FileNode], path: &str) -> Option<&'a FileNode> {
            for node in nodes {
                match node {
                    FileNode::File {
                        path: full_path, ..
                    } => {
                        if full_path == path {
                            return Some(node);
                        }
                    }
                    FileNode::Folder { name, children } => {
                        if let Some(rest) = path.strip_prefix(name.as_str())
                            && let Some(rest) = rest.strip_prefix('/')
                            && let Some(found) = walk(children, rest)
                        {
                            return Some(found);
                        }
                    }
                }
                if node.is_file() && node.name() == path {
                    return Some(node);
                }
            }
            None
        }

        walk(&self.tree, path).or_else(|| {
            // Unstripped keys carry the attachments/ prefix
            path.strip_prefix(super::index::ATTACHMENTS_PREFIX)
                .and_then(|stripped| walk(&self.tree, stripped))
        })
    }
}
