//! Model asset resolution
//!
//! Normalizes the user-supplied model reference, either a string path/URL or
//! an in-memory file handle, into a byte buffer plus the short filename used
//! inside the module's virtual filesystem.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use shout_common::{Result, ShoutError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for model downloads; models run into the gigabytes
const FETCH_TIMEOUT: Duration = Duration::from_secs(3600);

/// User-supplied model reference
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Filesystem path or remote URL, fetched against the literal string
    Reference(String),

    /// File handle with its own name and retrievable bytes
    Memory(ModelFile),
}

impl ModelSource {
    /// Short name the model is stored under inside the module's filesystem
    ///
    /// For a string reference this is the final path segment, or the whole
    /// string when it has no separator. For a file handle it is the file's
    /// own name regardless of any path-like appearance.
    pub fn internal_filename(&self) -> String {
        match self {
            Self::Reference(reference) => reference
                .rsplit('/')
                .next()
                .unwrap_or(reference)
                .to_string(),
            Self::Memory(file) => file.name().to_string(),
        }
    }
}

impl From<&str> for ModelSource {
    fn from(reference: &str) -> Self {
        Self::Reference(reference.to_string())
    }
}

impl From<String> for ModelSource {
    fn from(reference: String) -> Self {
        Self::Reference(reference)
    }
}

impl From<ModelFile> for ModelSource {
    fn from(file: ModelFile) -> Self {
        Self::Memory(file)
    }
}

/// File-like model handle: a name plus retrievable bytes
///
/// Bytes either live in memory already or are read from a host path when
/// asked for, so retrieval may suspend.
#[derive(Debug, Clone)]
pub struct ModelFile {
    name: String,
    contents: FileContents,
}

#[derive(Debug, Clone)]
enum FileContents {
    Inline(Vec<u8>),
    Disk(PathBuf),
}

impl ModelFile {
    /// Create a file handle over an in-memory buffer
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents: FileContents::Inline(bytes),
        }
    }

    /// Create a file handle over a host path; the name is the final path
    /// component and bytes are read lazily
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ShoutError::file_read(format!("Path has no filename: {}", path.display()))
            })?
            .to_string();

        Ok(Self {
            name,
            contents: FileContents::Disk(path.to_path_buf()),
        })
    }

    /// The file's own name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieve the file's byte contents
    pub async fn bytes(&self) -> Result<Vec<u8>> {
        match &self.contents {
            FileContents::Inline(bytes) => Ok(bytes.clone()),
            FileContents::Disk(path) => tokio::fs::read(path).await.map_err(|e| {
                ShoutError::file_read(format!("Failed to read {}: {}", path.display(), e))
            }),
        }
    }
}

/// Model reference plus bytes, ready for installation into the module
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// Short name used inside the module's virtual filesystem
    pub filename: String,

    /// Raw model bytes
    pub bytes: Vec<u8>,
}

/// Retrieves bytes for a string-referenced model
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Default HTTP fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a long-download timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ShoutError::fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        info!("Fetching model from {}", reference);

        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| ShoutError::fetch(format!("Failed to fetch model: {}", e)))?;

        if !response.status().is_success() {
            return Err(ShoutError::fetch(format!(
                "Model fetch failed with status: {}",
                response.status()
            )));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ShoutError::fetch(format!("Download error: {}", e)))?;
            bytes.extend_from_slice(&chunk);
        }

        info!("Model fetch complete: {} bytes", bytes.len());

        Ok(bytes)
    }
}

/// Resolve a model source into (filename, bytes)
///
/// Runs exactly once per init; results are never cached across init calls.
/// A string reference goes through the fetcher against the literal reference;
/// a file handle is asked for its bytes and never touches the network, so no
/// fetcher is needed for it.
pub async fn resolve(
    source: &ModelSource,
    fetcher: Option<&dyn AssetFetcher>,
) -> Result<ResolvedAsset> {
    let filename = source.internal_filename();
    debug!("Resolving model asset as {}", filename);

    let bytes = match source {
        ModelSource::Reference(reference) => {
            let fetcher = fetcher.ok_or_else(|| {
                ShoutError::fetch(format!("No fetcher available for {}", reference))
            })?;
            fetcher.fetch(reference).await?
        }
        ModelSource::Memory(file) => file.bytes().await?,
    };

    Ok(ResolvedAsset { filename, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(Vec<u8>);

    #[async_trait]
    impl AssetFetcher for StaticFetcher {
        async fn fetch(&self, _reference: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl AssetFetcher for FailingFetcher {
        async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
            Err(ShoutError::fetch(format!("unreachable: {}", reference)))
        }
    }

    #[test]
    fn test_internal_filename_from_reference_with_separator() {
        let source = ModelSource::from("path/to/my-model.bin");
        assert_eq!(source.internal_filename(), "my-model.bin");
    }

    #[test]
    fn test_internal_filename_from_reference_without_separator() {
        let source = ModelSource::from("my-model.bin");
        assert_eq!(source.internal_filename(), "my-model.bin");
    }

    #[test]
    fn test_internal_filename_from_url() {
        let source = ModelSource::from("https://example.com/models/ggml-base.bin");
        assert_eq!(source.internal_filename(), "ggml-base.bin");
    }

    #[test]
    fn test_internal_filename_from_file_ignores_path_like_name() {
        let file = ModelFile::from_bytes("modelFilename.bin", vec![1, 2, 3]);
        let source = ModelSource::from(file);
        assert_eq!(source.internal_filename(), "modelFilename.bin");
    }

    #[test]
    fn test_model_file_from_path_derives_name() {
        let file = ModelFile::from_path("models/ggml-tiny.bin").unwrap();
        assert_eq!(file.name(), "ggml-tiny.bin");
    }

    #[tokio::test]
    async fn test_resolve_reference_uses_fetcher() {
        let source = ModelSource::from("path/to/my-model.bin");
        let asset = resolve(&source, Some(&StaticFetcher(vec![7; 8])))
            .await
            .unwrap();

        assert_eq!(asset.filename, "my-model.bin");
        assert_eq!(asset.bytes, vec![7; 8]);
    }

    #[tokio::test]
    async fn test_resolve_memory_file_needs_no_fetcher() {
        let file = ModelFile::from_bytes("modelFilename.bin", vec![1, 2, 3, 4]);
        let source = ModelSource::from(file);

        let asset = resolve(&source, None).await.unwrap();
        assert_eq!(asset.filename, "modelFilename.bin");
        assert_eq!(asset.bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_resolve_propagates_fetch_error() {
        let source = ModelSource::from("path/to/my-model.bin");
        let err = resolve(&source, Some(&FailingFetcher)).await.unwrap_err();
        assert!(matches!(err, ShoutError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_resolve_reference_without_fetcher_is_rejected() {
        let source = ModelSource::from("path/to/my-model.bin");
        let err = resolve(&source, None).await.unwrap_err();
        assert!(matches!(err, ShoutError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_missing_disk_file_is_file_read_error() {
        let file = ModelFile::from_path("nonexistent/model.bin").unwrap();
        let err = file.bytes().await.unwrap_err();
        assert!(matches!(err, ShoutError::FileRead(_)));
    }
}
