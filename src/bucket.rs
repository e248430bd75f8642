//! Bucket download abstraction.
//!
//! The preview pipeline addresses files by index entry and does not care
//! how the bytes actually arrive. [`Downloader`] is that seam; the concrete
//! [`BucketClient`] resolves an index entry to an absolute byte range and
//! delegates to any [`ReadAt`] source (local file or HTTP Range reader).

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::attachments::FileIndex;
use crate::io::ReadAt;

/// Range-addressed access to files packed inside a storage object.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the raw bytes of one packed file.
    ///
    /// `outer_offset` shifts the entry's range when the index describes an
    /// inner blob (the attachments tar) rather than the storage object
    /// itself; model-level lookups pass 0.
    async fn get_file_from_bucket(
        &self,
        index: &FileIndex,
        file_name: &str,
        outer_offset: u64,
    ) -> Result<Vec<u8>>;

    /// Fetch and parse one packed byte-range index (e.g. the attachments
    /// side index).
    async fn get_index_from_bucket(
        &self,
        index: &FileIndex,
        file_name: &str,
    ) -> Result<FileIndex> {
        let bytes = self.get_file_from_bucket(index, file_name, 0).await?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("{file_name} is not a valid file index"))
    }

    /// Render the HTTP `Range` header value for one packed file,
    /// `bytes=<start>-<end>` with an inclusive end.
    fn range_header(&self, index: &FileIndex, file_name: &str, outer_offset: u64) -> Result<String> {
        let range = index
            .get(file_name)
            .with_context(|| format!("{file_name} not present in file index"))?;

        if range.length() == 0 {
            bail!("{file_name} has an empty byte range");
        }

        let start = outer_offset + range.offset();
        let end = start + range.length() - 1;
        Ok(format!("bytes={start}-{end}"))
    }
}

/// [`Downloader`] over any random-access storage object.
pub struct BucketClient<R: ReadAt> {
    reader: Arc<R>,
}

impl<R: ReadAt> BucketClient<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R: ReadAt> Downloader for BucketClient<R> {
    async fn get_file_from_bucket(
        &self,
        index: &FileIndex,
        file_name: &str,
        outer_offset: u64,
    ) -> Result<Vec<u8>> {
        let range = index
            .get(file_name)
            .with_context(|| format!("{file_name} not present in file index"))?;

        let start = outer_offset + range.offset();
        let mut buf = vec![0u8; range.length() as usize];

        // ReadAt implementations may return short reads
        let mut received = 0;
        while received < buf.len() {
            let n = self
                .reader
                .read_at(start + received as u64, &mut buf[received..])
                .await?;
            if n == 0 {
                bail!("unexpected end of data while reading {file_name}");
            }
            received += n;
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::ByteRange;
    use crate::io::LocalFileReader;
    use std::io::Write;

    fn index_with(name: &str, offset: u64, length: u64) -> FileIndex {
        let mut index = FileIndex::new();
        index.insert(name.to_string(), ByteRange(offset, length));
        index
    }

    struct NeverReader;

    #[async_trait]
    impl ReadAt for NeverReader {
        async fn read_at(&self, _offset: u64, _buf: &mut [u8]) -> Result<usize> {
            bail!("should not be read");
        }

        fn size(&self) -> u64 {
            0
        }
    }

    #[test]
    fn range_header_adds_outer_offset() {
        let client = BucketClient::new(Arc::new(NeverReader));
        let index = index_with("attachments/a.txt", 50, 200);

        let header = client
            .range_header(&index, "attachments/a.txt", 1000)
            .unwrap();
        assert_eq!(header, "bytes=1050-1249");
    }

    #[test]
    fn range_header_rejects_unknown_and_empty_entries() {
        let client = BucketClient::new(Arc::new(NeverReader));

        let index = index_with("present", 0, 0);
        assert!(client.range_header(&index, "missing", 0).is_err());
        assert!(client.range_header(&index, "present", 0).is_err());
    }

    #[tokio::test]
    async fn parses_a_packed_side_index() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"--{"attachments/a.txt": [0, 7]}--"#).unwrap();

        let reader = Arc::new(LocalFileReader::new(tmp.path()).unwrap());
        let client = BucketClient::new(reader);
        let index = index_with("side.index.json", 2, 29);

        let parsed = client
            .get_index_from_bucket(&index, "side.index.json")
            .await
            .unwrap();
        assert_eq!(parsed["attachments/a.txt"], ByteRange(0, 7));

        let truncated = index_with("side.index.json", 2, 10);
        assert!(
            client
                .get_index_from_bucket(&truncated, "side.index.json")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn reads_exactly_the_indexed_range() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"xxxxhello worldyyyy").unwrap();

        let reader = Arc::new(LocalFileReader::new(tmp.path()).unwrap());
        let client = BucketClient::new(reader);
        let index = index_with("greeting.txt", 2, 11);

        let bytes = client
            .get_file_from_bucket(&index, "greeting.txt", 2)
            .await
            .unwrap();
        assert_eq!(bytes, b"hello world");
    }
}
