//! Per-file preview pipeline.
//!
//! Three components, leaves first:
//!
//! - [`file_type`]: maps a file name to a rendering category
//! - [`fetch`]: range-fetches one attachment and processes its bytes
//! - [`state`]: coordinates the loading/error/success lifecycle of the
//!   currently selected file
//!
//! The pipeline is strictly cost-avoiding: unsupported, missing, empty and
//! oversized files are rejected before any network request is made.

mod fetch;
mod file_type;
mod state;

pub use fetch::{FileContent, MAX_PREVIEW_SIZE, PreviewError, fetch_file_content};
pub use file_type::FileType;
pub use state::{FilePreview, PreviewSlot, PreviewState};
