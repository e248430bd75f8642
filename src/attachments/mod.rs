//! Model attachments archive reading.
//!
//! A trained model is stored as one concatenated storage object. A
//! model-level [`FileIndex`] maps every packed file to its byte range
//! within that object. Attachments are bundled one level deeper: a tar
//! archive (`attachments.tar`) holds the auxiliary artifacts, and a side
//! JSON index (`attachments.index.json`) maps each artifact to its byte
//! range *within the tar*.
//!
//! ## Architecture
//!
//! The module is organized into three components:
//!
//! - [`index`]: the `FileIndex` data model and attachment entry discovery
//! - [`tree`]: converting the flat index into a hierarchical file tree
//! - [`provider`]: the initialization lifecycle tying both together
//!
//! Reading an artifact never touches the rest of the archive: its absolute
//! offset is `tar_base_offset + offset_within_archive`, fetched as a single
//! Range request. This makes listing and previewing attachments cheap even
//! for multi-gigabyte models.

mod index;
mod provider;
mod tree;

pub use index::{
    ByteRange, FileIndex, find_attachments_index_path, find_attachments_tar_path, has_attachments,
};
pub use provider::ModelAttachments;
pub use tree::{FileNode, build_tree};
