use crate::http::IMAGE_FIELD;
use crate::progress::ProgressReporter;
use crate::types::{FailureReason, FileContent, SelectedFile, TransportFailure};
use bytes::Bytes;
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::pin::Pin;
use tokio_util::io::ReaderStream;

/// Body chunks fed to the multipart part
type ChunkStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync>>;

/// Size of each body chunk handed to the HTTP client
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Builds the multipart body for an upload, counting bytes as they are pulled
#[derive(Debug, Clone)]
pub struct UploadRequestBuilder {
    chunk_size: usize,
}

impl UploadRequestBuilder {
    pub fn new() -> Self {
        Self {
            chunk_size: UPLOAD_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Multipart form with a single `image` field streaming the file
    pub async fn build_form(
        &self,
        file: &SelectedFile,
        mut progress: ProgressReporter,
    ) -> Result<Form, TransportFailure> {
        let total = file.byte_size();
        let chunks = self.chunk_stream(file).await?;

        progress.report_percent(0);
        let mut sent = 0_u64;
        let counted = chunks.inspect_ok(move |chunk| {
            sent += chunk.len() as u64;
            progress.report_bytes(sent, total);
        });

        let part = Part::stream_with_length(Body::wrap_stream(counted), total)
            .file_name(file.name().to_string())
            .mime_str(&file.mime_type())
            .map_err(|e| {
                TransportFailure::new(FailureReason::Io, format!("Could not prepare upload: {e}"))
            })?;

        Ok(Form::new().part(IMAGE_FIELD, part))
    }

    async fn chunk_stream(
        &self,
        file: &SelectedFile,
    ) -> Result<ChunkStream, TransportFailure> {
        match file.content() {
            FileContent::Path(path) => {
                let handle = tokio::fs::File::open(path).await.map_err(|e| {
                    TransportFailure::new(
                        FailureReason::Io,
                        format!("Could not read {}: {e}", path.display()),
                    )
                })?;
                Ok(Box::pin(ReaderStream::with_capacity(handle, self.chunk_size)))
            }
            FileContent::Memory(bytes) => {
                let chunks = split_chunks(bytes, self.chunk_size);
                Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
            }
        }
    }
}

impl Default for UploadRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-copy slices of at most `chunk_size` bytes
fn split_chunks(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect()
}
