//! Cloudinary upload API client.
//!
//! Uploads are signed: the request parameters are sorted, joined as
//! `key=value&...`, suffixed with the API secret and hashed with SHA-1.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{BlobStorage, StorageError, UploadOptions, UploadedBlob};
use crate::core::InvoiceError;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Credentials and endpoint for a Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API root without the cloud name. Overridable for tests.
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Read `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET`.
    pub fn from_env() -> Result<Self, InvoiceError> {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| InvoiceError::Config(format!("{name} is not set")))
        };
        Ok(Self::new(
            var("CLOUDINARY_CLOUD_NAME")?,
            var("CLOUDINARY_API_KEY")?,
            var("CLOUDINARY_API_SECRET")?,
        ))
    }

    fn upload_url(&self, resource_type: &str) -> String {
        format!(
            "{}/{}/{resource_type}/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`BlobStorage`] backed by Cloudinary.
#[derive(Debug, Clone)]
pub struct CloudinaryStorage {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self, InvoiceError> {
        let config = CloudinaryConfig::from_env()?;
        Self::new(config).map_err(|e| InvoiceError::Config(e.to_string()))
    }
}

#[async_trait]
impl BlobStorage for CloudinaryStorage {
    async fn upload(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadedBlob, StorageError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.pdf", options.public_id));

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params = [
            ("folder", options.folder.as_str()),
            ("overwrite", "true"),
            ("public_id", options.public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign(&params, &self.config.api_secret);

        let mut form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key.to_string(), value.to_string());
        }
        form = form.part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );

        let url = self.config.upload_url(options.resource_type.as_str());
        tracing::debug!(url = %url, public_id = %options.public_id, "Uploading to Cloudinary");

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse =
            serde_json::from_str(&body).map_err(|e| StorageError::Parse(e.to_string()))?;
        Ok(UploadedBlob {
            secure_url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}

/// Cloudinary request signature over `params`.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_over_sorted_params() {
        let params = [
            ("timestamp", "1718444400"),
            ("public_id", "invoice-INV-202406-BK1"),
            ("folder", "invoices"),
            ("overwrite", "true"),
        ];
        assert_eq!(
            sign(&params, "secret"),
            "b7e88ec66f1030850f0d1549ca5205df90611d95"
        );
    }

    #[test]
    fn upload_url_includes_cloud_and_resource_type() {
        let config = CloudinaryConfig::new("demo", "key", "secret");
        assert_eq!(
            config.upload_url("raw"),
            "https://api.cloudinary.com/v1_1/demo/raw/upload"
        );
    }

    #[test]
    fn debug_hides_secret() {
        let config = CloudinaryConfig::new("demo", "key", "topsecret");
        assert!(!format!("{config:?}").contains("topsecret"));
    }

    #[test]
    fn error_body_parses() {
        let body = r#"{"error":{"message":"Invalid Signature"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Invalid Signature");
    }
}
