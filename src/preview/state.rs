use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::fetch::{FileContent, PreviewError, fetch_file_content};
use crate::attachments::{FileIndex, FileNode};
use crate::bucket::Downloader;

/// Lifecycle state of the current preview. `Idle` doubles as the success
/// state: content fields carry the result once loading finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Loading,
    Unsupported,
    TooBig,
    Empty,
    Error,
}

impl From<PreviewError> for PreviewState {
    fn from(error: PreviewError) -> Self {
        match error {
            PreviewError::Unsupported => PreviewState::Unsupported,
            PreviewError::Empty => PreviewState::Empty,
            PreviewError::TooBig => PreviewState::TooBig,
            PreviewError::NotFound | PreviewError::Unknown => PreviewState::Error,
        }
    }
}

/// Everything the renderer needs for the currently selected file.
#[derive(Debug, Clone, Default)]
pub struct PreviewSlot {
    pub state: PreviewState,
    pub error: Option<String>,
    pub file_name: Option<String>,
    pub content: Option<FileContent>,
}

/// Preview coordinator for one attachments archive.
///
/// Each selection is tagged with a monotonically increasing request token;
/// a fetch that finishes after a newer selection started is discarded, so
/// selecting A then B always leaves the slot consistent with B. Clearing
/// the slot up front drops the previous content buffers (the object-URL
/// revoke of the browser world).
pub struct FilePreview<D: Downloader> {
    downloader: Arc<D>,
    seq: AtomicU64,
    slot: Mutex<PreviewSlot>,
}

impl<D: Downloader> FilePreview<D> {
    pub fn new(downloader: Arc<D>) -> Self {
        Self {
            downloader,
            seq: AtomicU64::new(0),
            slot: Mutex::new(PreviewSlot::default()),
        }
    }

    /// Select a file and load its preview. `None` resets to a clean slate.
    pub async fn select(
        &self,
        file: Option<&FileNode>,
        index: &FileIndex,
        tar_base_offset: u64,
    ) {
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(node) = file else {
            let mut slot = self.slot.lock().await;
            if self.seq.load(Ordering::SeqCst) == token {
                *slot = PreviewSlot::default();
            }
            return;
        };

        {
            let mut slot = self.slot.lock().await;
            // A newer selection may already own the slot; leaving its
            // result in place beats clobbering it with a stuck Loading
            if self.seq.load(Ordering::SeqCst) != token {
                return;
            }
            *slot = PreviewSlot::default();
            slot.state = PreviewState::Loading;
            slot.file_name = Some(node.name().to_string());
        }

        let result = fetch_file_content(node, index, tar_base_offset, &*self.downloader).await;

        let mut slot = self.slot.lock().await;
        if self.seq.load(Ordering::SeqCst) != token {
            // A newer selection owns the slot now
            return;
        }

        match result {
            Ok(content) => {
                slot.state = PreviewState::Idle;
                slot.content = content;
            }
            Err(error) => {
                slot.state = PreviewState::from(error);
                slot.error = Some(error.to_string());
            }
        }
    }

    /// Snapshot of the current slot.
    pub async fn slot(&self) -> PreviewSlot {
        self.slot.lock().await.clone()
    }

    /// Clear the slot and invalidate any in-flight fetch.
    pub async fn reset(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().await = PreviewSlot::default();
    }

    /// Save the already-fetched blob under its file name (save-as).
    pub async fn download_to(&self, dir: &Path) -> Result<PathBuf> {
        let slot = self.slot.lock().await;
        let content = slot.content.as_ref().context("no file content loaded")?;
        let file_name = slot.file_name.as_ref().context("no file selected")?;

        let output_path = dir.join(file_name);
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let mut out = fs::File::create(&output_path).await?;
        out.write_all(&content.blob).await?;
        // Tokio files buffer internally and are not flushed on drop
        out.flush().await?;

        Ok(output_path)
    }
}
