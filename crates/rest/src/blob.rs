//! Blob storage for uploaded files and generated audio.
//!
//! Blobs are addressed by a key of the form `users/{userId}/{uuid}-{name}`
//! and exposed under `{base_url}/files/{key}`. A user can only read keys
//! beneath their own prefix.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use wattle_persistence::user::UserId;

/// Route prefix under which blobs are served.
pub const FILES_ROUTE: &str = "/files";

/// Errors from blob storage.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No blob under this key.
    #[error("file not found: {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The key cannot address a file.
    #[error("invalid file key: {key}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// The URL does not point into this store.
    #[error("URL is not served by this store: {url}")]
    ForeignUrl {
        /// The rejected URL.
        url: String,
    },

    /// Filesystem failure.
    #[error("file storage error: {message}")]
    Io {
        /// Error description.
        message: String,
    },
}

/// A stored file.
#[derive(Debug, Clone)]
pub struct Blob {
    /// File name as uploaded (without the uuid prefix).
    pub filename: String,
    /// Content type guessed from the file name.
    pub content_type: mime::Mime,
    /// File bytes.
    pub bytes: Vec<u8>,
}

/// Storage for user files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` for `user` and returns the public URL.
    async fn put(&self, user: &UserId, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError>;

    /// Reads the blob at `key` if it belongs to `user`.
    async fn get(&self, user: &UserId, key: &str) -> Result<Blob, BlobError>;

    /// Removes the blob at `key` if it belongs to `user`. Removing a missing
    /// blob succeeds.
    async fn delete(&self, user: &UserId, key: &str) -> Result<(), BlobError>;

    /// Maps a URL returned by [`put`](Self::put) back to its key.
    fn key_from_url(&self, url: &str) -> Result<String, BlobError>;
}

/// Deletes the blobs behind `urls`, logging failures instead of returning them.
pub async fn delete_urls(blobs: &dyn BlobStore, user: &UserId, urls: &[String]) {
    for url in urls {
        let result = match blobs.key_from_url(url) {
            Ok(key) => blobs.delete(user, &key).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(url = %url, error = %e, "Failed to delete file");
        }
    }
}

/// Guesses a content type from a file name's extension.
pub fn content_type_for(filename: &str) -> mime::Mime {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "pdf" => mime::APPLICATION_PDF,
        "txt" | "md" => mime::TEXT_PLAIN_UTF_8,
        "csv" => mime::TEXT_CSV_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "xml" => mime::TEXT_XML,
        "mp3" => "audio/mpeg".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "wav" => "audio/wav".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "webm" => "audio/webm".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Replaces characters that are unsafe in a file name.
fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`, serving URLs below `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_prefix(&self) -> String {
        format!("{}{}/", self.base_url, FILES_ROUTE)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && !key.contains('\\')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(BlobError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Resolves `key` if it lies beneath `user`'s prefix. Foreign keys look
    /// missing.
    fn owned_path(&self, user: &UserId, key: &str) -> Result<PathBuf, BlobError> {
        let owner_prefix = format!("users/{}/", user);
        if !key.starts_with(&owner_prefix) {
            return Err(BlobError::NotFound {
                key: key.to_string(),
            });
        }
        self.path_for(key)
    }
}

fn io_error(context: &str, err: std::io::Error) -> BlobError {
    BlobError::Io {
        message: format!("{}: {}", context, err),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, user: &UserId, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let key = format!(
            "users/{}/{}-{}",
            user,
            uuid::Uuid::new_v4(),
            sanitize_filename(filename)
        );
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("failed to create directory", e))?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| io_error("failed to write file", e))?;

        debug!(key = %key, size = bytes.len(), "Stored blob");
        Ok(format!("{}{}", self.url_prefix(), key))
    }

    async fn get(&self, user: &UserId, key: &str) -> Result<Blob, BlobError> {
        let path = self.owned_path(user, key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound {
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(io_error("failed to read file", e)),
        };

        let stored_name = key.rsplit('/').next().unwrap_or_default();
        // Strip the 36-character uuid and its dash.
        let filename = stored_name
            .get(37..)
            .filter(|n| !n.is_empty())
            .unwrap_or(stored_name)
            .to_string();

        Ok(Blob {
            content_type: content_type_for(&filename),
            filename,
            bytes,
        })
    }

    async fn delete(&self, user: &UserId, key: &str) -> Result<(), BlobError> {
        let path = self.owned_path(user, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("failed to delete file", e)),
        }
    }

    fn key_from_url(&self, url: &str) -> Result<String, BlobError> {
        url.strip_prefix(&self.url_prefix())
            .map(str::to_string)
            .ok_or_else(|| BlobError::ForeignUrl {
                url: url.to_string(),
            })
    }
}
