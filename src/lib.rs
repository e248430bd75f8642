//! # attar
//!
//! Reader for DataForce Studio model attachment archives.
//!
//! A trained model ships as one storage object; auxiliary artifacts live in
//! a tar archive packed inside it, indexed by a side JSON file of byte
//! ranges. This library locates that archive through the model-level file
//! index, rebuilds the artifact tree, and previews or downloads individual
//! files through single HTTP Range requests, so no more of the object is
//! transferred than the bytes actually looked at.
//!
//! ## Features
//!
//! - Read models from the local filesystem or HTTP/HTTPS buckets
//! - Hierarchical attachment tree from the flat byte-range index
//! - Per-type preview processing (text, images, media, tables)
//! - Strict cost-avoidance: empty, oversized and unsupported files are
//!   rejected before any network request
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use attar::{BucketClient, FileIndex, HttpRangeReader, ModelAttachments};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(
//!         HttpRangeReader::new("https://example.com/model.dfpack".to_string()).await?,
//!     );
//!     let client = BucketClient::new(reader);
//!
//!     let model_index: FileIndex =
//!         serde_json::from_str(r#"{"meta_artifacts/snap/attachments.tar": [0, 1024]}"#)?;
//!
//!     if let Some(attachments) = ModelAttachments::init(&client, &model_index).await? {
//!         for node in attachments.tree() {
//!             println!("{}", node.name());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod bucket;
pub mod cli;
pub mod io;
pub mod preview;

pub use attachments::{ByteRange, FileIndex, FileNode, ModelAttachments, build_tree, has_attachments};
pub use bucket::{BucketClient, Downloader};
pub use cli::Cli;
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use preview::{FileContent, FilePreview, FileType, PreviewError, PreviewSlot, PreviewState};
