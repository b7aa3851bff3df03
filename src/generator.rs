//! Invoice generation entry point.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{
    Booking, InvoiceConfig, InvoiceError, InvoiceIdentity, InvoiceResult, build_breakdown,
};
use crate::render::{DocumentRenderer, RenderedDocument};
use crate::storage::{BlobStorage, PersistenceAdapter};

/// Turns bookings into stored invoice PDFs.
///
/// One generator is meant to be shared (e.g. behind an `Arc`) by every
/// request handler, so that concurrent regenerations of the same invoice
/// are serialized by its persistence adapter.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rental_invoice::generator::InvoiceGenerator;
/// use rental_invoice::storage::BlobStorage;
/// use rental_invoice::{Booking, InvoiceConfig, InvoiceError};
///
/// async fn issue(storage: Arc<dyn BlobStorage>, booking: &Booking) -> Result<(), InvoiceError> {
///     let generator = InvoiceGenerator::new(InvoiceConfig::default(), storage);
///     let result = generator.generate(booking).await?;
///     println!("{} -> {}", result.invoice_number, result.url);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct InvoiceGenerator {
    config: InvoiceConfig,
    adapter: PersistenceAdapter,
}

impl InvoiceGenerator {
    pub fn new(config: InvoiceConfig, storage: Arc<dyn BlobStorage>) -> Self {
        let adapter = PersistenceAdapter::new(storage, &config);
        Self { config, adapter }
    }

    pub fn config(&self) -> &InvoiceConfig {
        &self.config
    }

    /// Generate and store the invoice for `booking`, issued now.
    pub async fn generate(&self, booking: &Booking) -> Result<InvoiceResult, InvoiceError> {
        self.generate_at(booking, Utc::now()).await
    }

    /// Generate and store the invoice for `booking` with a fixed issue time.
    ///
    /// The pricing breakdown and invoice number are checked before anything
    /// is drawn or written, so invalid bookings leave no files behind.
    ///
    /// # Errors
    ///
    /// - `InvoiceError::Precondition` for pricing that cannot be presented
    /// - `InvoiceError::InvalidNumber` for an unusable stored invoice number
    /// - `InvoiceError::Render` / `InvoiceError::Io` if drawing or writing fails
    ///
    /// An unreachable object store is not an error; see
    /// [`InvoiceResult::is_local_fallback`].
    #[tracing::instrument(
        name = "generate_invoice",
        skip(self, booking, issued_at),
        fields(booking_number = %booking.booking_number)
    )]
    pub async fn generate_at(
        &self,
        booking: &Booking,
        issued_at: DateTime<Utc>,
    ) -> Result<InvoiceResult, InvoiceError> {
        let (identity, document) = self.prepare(booking, issued_at)?;

        let result = self
            .adapter
            .persist(&document, &identity.number, issued_at)
            .await?;

        if result.is_local_fallback() {
            tracing::warn!(invoice_number = %result.invoice_number, url = %result.url, "Invoice stored locally only");
        } else {
            tracing::info!(invoice_number = %result.invoice_number, pages = document.page_count(), "Invoice generated");
        }
        Ok(result)
    }

    /// Build the PDF without storing it.
    pub fn render(
        &self,
        booking: &Booking,
        issued_at: DateTime<Utc>,
    ) -> Result<RenderedDocument, InvoiceError> {
        self.prepare(booking, issued_at).map(|(_, document)| document)
    }

    fn prepare(
        &self,
        booking: &Booking,
        issued_at: DateTime<Utc>,
    ) -> Result<(InvoiceIdentity, RenderedDocument), InvoiceError> {
        let breakdown = build_breakdown(booking)?;
        let identity = InvoiceIdentity::for_booking(booking)?;
        let document = DocumentRenderer::new(&self.config.company).render(
            booking,
            &identity,
            &breakdown,
            issued_at.date_naive(),
        )?;
        Ok((identity, document))
    }
}
