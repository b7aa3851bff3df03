use thiserror::Error;

/// Errors that can occur while generating an invoice.
///
/// Upload failures are not represented here: they are absorbed into a
/// local-fallback [`InvoiceResult`](super::InvoiceResult) by the persistence
/// layer and never reach the caller as an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The booking violates a precondition of the pricing breakdown
    /// (e.g. insurance on a zero-day rental, negative amounts).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The invoice number cannot be used as a file name or storage key.
    #[error("invalid invoice number '{number}': {reason}")]
    InvalidNumber { number: String, reason: String },

    /// PDF assembly or serialization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Writing the invoice file failed. Unrecoverable for the current call.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvoiceError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub(crate) fn invalid_number(number: &str, reason: impl Into<String>) -> Self {
        Self::InvalidNumber {
            number: number.to_string(),
            reason: reason.into(),
        }
    }
}
