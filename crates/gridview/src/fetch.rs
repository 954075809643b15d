//! Snapshot sources.
//!
//! The monitor only needs something that can produce a [`Snapshot`] on demand. Network
//! transports live outside this crate; here we ship a file-backed source and a closure adapter.

use async_trait::async_trait;
use gridview_core::Snapshot;
use std::path::{Path, PathBuf};

/// Why a cycle produced no snapshot. Every variant is transient: the next cycle retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Snapshot source unavailable: {message}")]
    Unavailable { message: String },

    #[error("Snapshot fetch timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Malformed snapshot: {message}")]
    Malformed { message: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl From<gridview_core::Error> for FetchError {
    fn from(value: gridview_core::Error) -> Self {
        match value {
            gridview_core::Error::MalformedSnapshot { message } => Self::Malformed { message },
            other => Self::Malformed {
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;
}

#[async_trait]
impl<T: SnapshotFetcher + ?Sized> SnapshotFetcher for Box<T> {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        (**self).fetch_snapshot().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// `.yaml`/`.yml` are YAML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn parse(self, text: &str) -> Result<Snapshot, FetchError> {
        let snapshot = match self {
            Self::Json => Snapshot::from_json_str(text)?,
            Self::Yaml => Snapshot::from_yaml_str(text)?,
        };
        Ok(snapshot)
    }
}

/// Re-reads a snapshot document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSnapshotFetcher {
    path: PathBuf,
    format: SnapshotFormat,
}

impl FileSnapshotFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotFetcher for FileSnapshotFetcher {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let text = std::fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::Unavailable {
                    message: format!("{} does not exist", self.path.display()),
                }
            } else {
                FetchError::Io {
                    path: self.path.display().to_string(),
                    message: err.to_string(),
                }
            }
        })?;
        self.format.parse(&text)
    }
}

/// Adapts a synchronous closure into a fetcher.
pub struct FnFetcher<F>(F);

impl<F> FnFetcher<F>
where
    F: Fn() -> Result<Snapshot, FetchError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> SnapshotFetcher for FnFetcher<F>
where
    F: Fn() -> Result<Snapshot, FetchError> + Send + Sync,
{
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        (self.0)()
    }
}
