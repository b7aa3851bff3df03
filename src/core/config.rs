use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Seller details printed in the header, company block and footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    /// Brand shown in the header band.
    pub brand_name: String,
    pub tagline: String,
    /// Registered company name (first line of the company block).
    pub legal_name: String,
    pub street: String,
    /// Postal code, city and country, e.g. "80331 München, Deutschland".
    pub city_line: String,
    pub phone: String,
    pub email: String,
    /// USt-IdNr.
    pub vat_id: String,
    /// Legal/contact lines centered in the footer of the last page.
    pub footer_lines: [String; 3],
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            brand_name: "WohnmobilTraum".into(),
            tagline: "Ihr Partner für unvergessliche Reiseerlebnisse".into(),
            legal_name: "WohnmobilTraum GmbH".into(),
            street: "Hauptstraße 123".into(),
            city_line: "80331 München, Deutschland".into(),
            phone: "+49 89 1234567".into(),
            email: "info@wohnmobiltraum.de".into(),
            vat_id: "DE123456789".into(),
            footer_lines: [
                "WohnmobilTraum GmbH | Hauptstraße 123 | 80331 München | Tel: +49 89 1234567 | Email: info@wohnmobiltraum.de".into(),
                "Geschäftsführer: Max Mustermann | Amtsgericht München HRB 123456 | USt-IdNr: DE123456789".into(),
                "Bankverbindung: Deutsche Bank | IBAN: DE89 3704 0044 0532 0130 00 | BIC: COBADEFFXXX".into(),
            ],
        }
    }
}

/// Configuration for invoice generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    pub company: CompanyProfile,
    /// Directory the PDF is written to before upload. Also where it stays
    /// when the upload fails.
    pub output_dir: PathBuf,
    /// Folder in durable storage.
    pub storage_folder: String,
    /// URL path under which the deployment serves `output_dir`.
    pub fallback_url_prefix: String,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            company: CompanyProfile::default(),
            output_dir: PathBuf::from("uploads").join("invoices"),
            storage_folder: "invoices".into(),
            fallback_url_prefix: "/uploads/invoices".into(),
        }
    }
}

impl InvoiceConfig {
    /// Local fallback URL for a file name, e.g. `/uploads/invoices/invoice-X.pdf`.
    pub fn fallback_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.fallback_url_prefix.trim_end_matches('/'))
    }
}

/// Builder for [`InvoiceConfig`].
///
/// # Example
///
/// ```
/// use rental_invoice::core::InvoiceConfigBuilder;
///
/// let config = InvoiceConfigBuilder::new()
///     .output_dir("/var/lib/rental/invoices")
///     .fallback_url_prefix("/static/invoices")
///     .build()
///     .unwrap();
/// assert_eq!(config.fallback_url("invoice-A.pdf"), "/static/invoices/invoice-A.pdf");
/// ```
#[derive(Debug, Default)]
pub struct InvoiceConfigBuilder {
    config: InvoiceConfig,
}

impl InvoiceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the seller profile.
    pub fn company(mut self, company: CompanyProfile) -> Self {
        self.config.company = company;
        self
    }

    /// Set the directory for generated files.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the durable storage folder.
    pub fn storage_folder(mut self, folder: impl Into<String>) -> Self {
        self.config.storage_folder = folder.into();
        self
    }

    /// Set the URL path prefix for local fallback links.
    pub fn fallback_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.fallback_url_prefix = prefix.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<InvoiceConfig, InvoiceError> {
        let config = self.config;
        if config.output_dir.as_os_str().is_empty() {
            return Err(InvoiceError::Config("output_dir must not be empty".into()));
        }
        if config.storage_folder.trim().is_empty() {
            return Err(InvoiceError::Config(
                "storage_folder must not be empty".into(),
            ));
        }
        if !config.fallback_url_prefix.starts_with('/') {
            return Err(InvoiceError::Config(format!(
                "fallback_url_prefix must be an absolute path, got '{}'",
                config.fallback_url_prefix
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fallback_url() {
        let config = InvoiceConfig::default();
        assert_eq!(
            config.fallback_url("invoice-INV-1.pdf"),
            "/uploads/invoices/invoice-INV-1.pdf"
        );
    }

    #[test]
    fn builder_rejects_relative_prefix() {
        let err = InvoiceConfigBuilder::new()
            .fallback_url_prefix("uploads")
            .build()
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Config(_)));
    }

    #[test]
    fn builder_rejects_empty_folder() {
        assert!(
            InvoiceConfigBuilder::new()
                .storage_folder(" ")
                .build()
                .is_err()
        );
    }
}
