//! Durable storage for generated invoices.
//!
//! [`BlobStorage`] is the seam to the object store. [`PersistenceAdapter`]
//! writes the PDF to a local file, uploads it, and falls back to the local
//! file when the upload fails.

use std::path::Path;

use async_trait::async_trait;

#[cfg(feature = "cloudinary")]
pub mod cloudinary;
mod persist;

pub use persist::PersistenceAdapter;

/// How the object store should treat an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceType {
    /// Opaque bytes, served as-is. Used for PDFs.
    #[default]
    Raw,
    Image,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Image => "image",
        }
    }
}

/// Parameters of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Folder inside the store, e.g. "invoices".
    pub folder: String,
    pub resource_type: ResourceType,
    /// Key of the object inside `folder`. Uploading the same key again
    /// replaces the previous object.
    pub public_id: String,
}

/// A stored object as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    /// Public HTTPS URL of the object.
    pub secure_url: String,
    /// Full storage key, including the folder.
    pub public_id: String,
}

/// Errors reported by a [`BlobStorage`] backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The file to upload could not be read.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection, TLS or timeout failure.
    #[error("storage network error: {0}")]
    Network(String),

    /// The store answered with an error.
    #[error("storage API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The store's answer could not be understood.
    #[error("storage response parse error: {0}")]
    Parse(String),
}

/// Object store that invoices are uploaded to.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Upload the file at `path` and return where it can be fetched.
    async fn upload(&self, path: &Path, options: &UploadOptions)
    -> Result<UploadedBlob, StorageError>;
}
