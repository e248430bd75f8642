use log::warn;
use thiserror::Error;

use super::file_type::FileType;
use crate::attachments::{FileIndex, FileNode};
use crate::bucket::Downloader;

/// Files above this size are rejected before any network request.
pub const MAX_PREVIEW_SIZE: u64 = 10 * 1024 * 1024;

/// Why a file could not be previewed.
///
/// All variants are recovered locally and surfaced as a state plus the
/// message below; none are fatal to the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("This file type is not supported for preview")]
    Unsupported,
    #[error("File not found in archive")]
    NotFound,
    #[error("File is empty")]
    Empty,
    #[error("File is too large for preview (max 10 MB)")]
    TooBig,
    #[error("Failed to load file")]
    Unknown,
}

/// Fetched and processed bytes of one attachment.
///
/// `blob` always holds the raw fetched bytes and backs both download and
/// the non-text renderers; `text` is set for text/code files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub file_type: FileType,
    pub blob: Vec<u8>,
    pub text: Option<String>,
}

/// Fetch the previewable content of a selected file.
///
/// Returns `Ok(None)` for nodes that are not previewable by construction
/// (folders); every other outcome is either content or a [`PreviewError`].
/// The checks run strictly in cost order: classification, index lookup and
/// size limits all short-circuit before the single Range request is issued.
/// The pipeline never propagates a transport error as-is; anything that
/// fails past the size checks surfaces as [`PreviewError::Unknown`].
pub async fn fetch_file_content(
    file: &FileNode,
    index: &FileIndex,
    tar_base_offset: u64,
    downloader: &dyn Downloader,
) -> Result<Option<FileContent>, PreviewError> {
    let FileNode::File { name, path, .. } = file else {
        return Ok(None);
    };

    let Some(file_type) = FileType::from_name(name) else {
        return Err(PreviewError::Unsupported);
    };

    let Some(range) = index.get(path) else {
        return Err(PreviewError::NotFound);
    };

    if range.length() == 0 {
        return Err(PreviewError::Empty);
    }

    if range.length() > MAX_PREVIEW_SIZE {
        return Err(PreviewError::TooBig);
    }

    let blob = downloader
        .get_file_from_bucket(index, path, tar_base_offset)
        .await
        .map_err(|e| {
            warn!("failed to fetch {path}: {e:#}");
            PreviewError::Unknown
        })?;

    let text = file_type
        .is_text()
        .then(|| String::from_utf8_lossy(&blob).into_owned());

    Ok(Some(FileContent {
        file_type,
        blob,
        text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::ByteRange;
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a canned payload and counts how often it is asked.
    struct CountingBucket {
        payload: Result<&'static [u8], ()>,
        calls: AtomicUsize,
    }

    impl CountingBucket {
        fn serving(payload: &'static [u8]) -> Self {
            Self {
                payload: Ok(payload),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                payload: Err(()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Downloader for CountingBucket {
        async fn get_file_from_bucket(
            &self,
            _index: &FileIndex,
            _file_name: &str,
            _outer_offset: u64,
        ) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.payload {
                Ok(bytes) => Ok(bytes.to_vec()),
                Err(()) => bail!("HTTP request failed with status: 500"),
            }
        }
    }

    fn file(name: &str, path: &str, size: u64) -> FileNode {
        FileNode::File {
            name: name.to_string(),
            path: path.to_string(),
            size,
        }
    }

    fn index_with(path: &str, length: u64) -> FileIndex {
        let mut index = FileIndex::new();
        index.insert(path.to_string(), ByteRange(0, length));
        index
    }

    #[tokio::test]
    async fn folder_yields_empty_result_without_error() {
        let bucket = CountingBucket::serving(b"");
        let folder = FileNode::Folder {
            name: "plots".to_string(),
            children: Vec::new(),
        };

        let result = fetch_file_content(&folder, &FileIndex::new(), 0, &bucket).await;
        assert_eq!(result, Ok(None));
        assert_eq!(bucket.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_extension_short_circuits_before_index() {
        let bucket = CountingBucket::serving(b"");
        // Index deliberately lacks the entry: classification must reject
        // the file before the lookup would report NotFound.
        let result = fetch_file_content(
            &file("tool.exe", "attachments/tool.exe", 10),
            &FileIndex::new(),
            0,
            &bucket,
        )
        .await;

        assert_eq!(result, Err(PreviewError::Unsupported));
        assert_eq!(bucket.calls(), 0);
    }

    #[tokio::test]
    async fn missing_index_entry_is_not_found() {
        let bucket = CountingBucket::serving(b"");
        let result = fetch_file_content(
            &file("a.txt", "attachments/a.txt", 10),
            &FileIndex::new(),
            0,
            &bucket,
        )
        .await;

        assert_eq!(result, Err(PreviewError::NotFound));
        assert_eq!(bucket.calls(), 0);
    }

    #[tokio::test]
    async fn zero_length_is_empty_without_network_call() {
        let bucket = CountingBucket::serving(b"");
        let index = index_with("attachments/a.txt", 0);

        let result =
            fetch_file_content(&file("a.txt", "attachments/a.txt", 0), &index, 0, &bucket).await;

        assert_eq!(result, Err(PreviewError::Empty));
        assert_eq!(bucket.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_entry_is_too_big_without_network_call() {
        let bucket = CountingBucket::serving(b"");
        let index = index_with("attachments/big.csv", MAX_PREVIEW_SIZE + 1);

        let result = fetch_file_content(
            &file("big.csv", "attachments/big.csv", MAX_PREVIEW_SIZE + 1),
            &index,
            0,
            &bucket,
        )
        .await;

        assert_eq!(result, Err(PreviewError::TooBig));
        assert_eq!(bucket.calls(), 0);
    }

    #[tokio::test]
    async fn exactly_at_the_cap_is_still_fetched() {
        static BLOB: &[u8] = &[0u8; 16];
        let bucket = CountingBucket::serving(BLOB);
        let index = index_with("attachments/edge.csv", MAX_PREVIEW_SIZE);

        let result = fetch_file_content(
            &file("edge.csv", "attachments/edge.csv", MAX_PREVIEW_SIZE),
            &index,
            0,
            &bucket,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(bucket.calls(), 1);
    }

    #[tokio::test]
    async fn text_file_is_decoded() {
        let bucket = CountingBucket::serving(b"epoch,loss\n1,0.5\n");
        let index = index_with("attachments/log.txt", 17);

        let content = fetch_file_content(
            &file("log.txt", "attachments/log.txt", 17),
            &index,
            100,
            &bucket,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(content.file_type, FileType::Text);
        assert_eq!(content.text.as_deref(), Some("epoch,loss\n1,0.5\n"));
        assert_eq!(content.blob, b"epoch,loss\n1,0.5\n");
    }

    #[tokio::test]
    async fn binary_preview_keeps_blob_without_text() {
        let bucket = CountingBucket::serving(&[0x89, 0x50, 0x4e, 0x47]);
        let index = index_with("attachments/loss.png", 4);

        let content = fetch_file_content(
            &file("loss.png", "attachments/loss.png", 4),
            &index,
            0,
            &bucket,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(content.file_type, FileType::Image);
        assert_eq!(content.text, None);
        assert_eq!(content.blob.len(), 4);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_unknown() {
        let bucket = CountingBucket::failing();
        let index = index_with("attachments/a.txt", 10);

        let result =
            fetch_file_content(&file("a.txt", "attachments/a.txt", 10), &index, 0, &bucket).await;

        assert_eq!(result, Err(PreviewError::Unknown));
        assert_eq!(bucket.calls(), 1);
    }
}
