use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::OwnedMutexGuard;

use super::{BlobStorage, ResourceType, UploadOptions};
use crate::core::{
    InvoiceConfig, InvoiceError, InvoiceResult, invoice_file_name, invoice_public_id,
    validate_invoice_number,
};
use crate::render::RenderedDocument;

/// Writes rendered invoices to disk and uploads them.
///
/// The local file is a temporary: it is removed after a successful upload
/// and kept (and linked to) when the upload fails. Calls for the same
/// invoice number are serialized; different numbers proceed in parallel.
pub struct PersistenceAdapter {
    storage: Arc<dyn BlobStorage>,
    config: InvoiceConfig,
    locks: KeyedLocks,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("output_dir", &self.config.output_dir)
            .field("storage_folder", &self.config.storage_folder)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn BlobStorage>, config: &InvoiceConfig) -> Self {
        Self {
            storage,
            config: config.clone(),
            locks: KeyedLocks::default(),
        }
    }

    /// Directory invoice files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Store a rendered invoice and report where it ended up.
    ///
    /// Upload failures are not errors: the result then points at the local
    /// file under the fallback URL prefix and carries no storage key.
    ///
    /// # Errors
    ///
    /// `InvoiceError::InvalidNumber` if the number is unsafe as a file name,
    /// `InvoiceError::Io` if the local file cannot be written.
    #[tracing::instrument(
        name = "persist_invoice",
        skip(self, document, issued_at),
        fields(bytes = document.as_bytes().len())
    )]
    pub async fn persist(
        &self,
        document: &RenderedDocument,
        invoice_number: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<InvoiceResult, InvoiceError> {
        validate_invoice_number(invoice_number)?;
        let _held = self.locks.lock(invoice_number).await;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let file_name = invoice_file_name(invoice_number);
        let path = self.config.output_dir.join(&file_name);

        let temp = TempFile::new(path);
        write_synced(temp.path(), document.as_bytes()).await?;

        let options = UploadOptions {
            folder: self.config.storage_folder.clone(),
            resource_type: ResourceType::Raw,
            public_id: invoice_public_id(invoice_number),
        };

        match self.storage.upload(temp.path(), &options).await {
            Ok(blob) => {
                let path = temp.disarm();
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove uploaded invoice file");
                }
                tracing::info!(url = %blob.secure_url, public_id = %blob.public_id, "Invoice uploaded");
                Ok(InvoiceResult {
                    invoice_number: invoice_number.to_string(),
                    url: blob.secure_url,
                    cloudinary_id: Some(blob.public_id),
                    issued_at,
                })
            }
            Err(e) => {
                let path = temp.disarm();
                tracing::error!(error = %e, "Invoice upload failed");
                let url = self.config.fallback_url(&file_name);
                tracing::warn!(path = %path.display(), url = %url, "Serving invoice from local fallback");
                Ok(InvoiceResult {
                    invoice_number: invoice_number.to_string(),
                    url,
                    cloudinary_id: None,
                    issued_at,
                })
            }
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Removes its file when dropped unless disarmed.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path.
    fn disarm(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// One async mutex per key, created on demand and dropped once unused.
#[derive(Debug, Default)]
struct KeyedLocks {
    entries: Mutex<HashMap<String, LockSlot>>,
}

#[derive(Debug, Default)]
struct LockSlot {
    mutex: Arc<tokio::sync::Mutex<()>>,
    /// Callers holding or waiting for the mutex.
    users: usize,
}

impl KeyedLocks {
    async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Registered before waiting, so a cancelled waiter still releases.
        let (ticket, mutex) = self.register(key);
        let guard = mutex.lock_owned().await;
        KeyGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    fn register(&self, key: &str) -> (Ticket<'_>, Arc<tokio::sync::Mutex<()>>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = entries.entry(key.to_string()).or_default();
        slot.users += 1;
        let ticket = Ticket {
            locks: self,
            key: key.to_string(),
        };
        (ticket, Arc::clone(&slot.mutex))
    }

    fn release(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = entries.get_mut(key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                entries.remove(key);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Counts one caller against its key until dropped.
struct Ticket<'a> {
    locks: &'a KeyedLocks,
    key: String,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.key);
    }
}

/// Fields drop in order: the mutex is unlocked before the ticket is released.
struct KeyGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _ticket: Ticket<'a>,
}
