use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Byte range of one packed file: `[offset, length]` in the source JSON.
///
/// Offsets are relative to the blob the index describes: the storage
/// object for a model-level index, the tar archive for an attachments
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange(pub u64, pub u64);

impl ByteRange {
    pub fn offset(&self) -> u64 {
        self.0
    }

    pub fn length(&self) -> u64 {
        self.1
    }
}

/// Mapping from archive-relative path to the byte range holding its data.
///
/// Keys are unique. Insertion order is preserved so that the derived file
/// tree keeps deterministic sibling ordering.
pub type FileIndex = IndexMap<String, ByteRange>;

/// Suffix of the model-level entry holding the attachments tar archive.
pub const ATTACHMENTS_TAR_SUFFIX: &str = "attachments.tar";

/// Suffix of the model-level entry holding the attachments byte-range index.
pub const ATTACHMENTS_INDEX_SUFFIX: &str = "attachments.index.json";

/// Prefix under which entries of the attachments index are packed.
pub const ATTACHMENTS_PREFIX: &str = "attachments/";

/// Find the model-level entry for the attachments tar archive.
pub fn find_attachments_tar_path(model_index: &FileIndex) -> Option<&str> {
    model_index
        .keys()
        .find(|path| path.ends_with(ATTACHMENTS_TAR_SUFFIX))
        .map(String::as_str)
}

/// Find the model-level entry for the attachments index JSON.
pub fn find_attachments_index_path(model_index: &FileIndex) -> Option<&str> {
    model_index
        .keys()
        .find(|path| path.ends_with(ATTACHMENTS_INDEX_SUFFIX))
        .map(String::as_str)
}

/// Whether a model bundles an attachments archive at all.
pub fn has_attachments(model_index: &FileIndex) -> bool {
    find_attachments_tar_path(model_index).is_some()
}
