use chrono::Datelike;

use super::error::InvoiceError;
use super::types::Booking;

/// Prefix of numbers derived from a booking.
pub const INVOICE_PREFIX: &str = "INV-";

/// Longest invoice number accepted.
pub const MAX_NUMBER_LEN: usize = 200;

/// The resolved invoice number and the names derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceIdentity {
    pub number: String,
    pub booking_number: String,
}

impl InvoiceIdentity {
    /// Resolve and validate the invoice number for a booking.
    pub fn for_booking(booking: &Booking) -> Result<Self, InvoiceError> {
        Ok(Self {
            number: resolve_invoice_number(booking)?,
            booking_number: booking.booking_number.clone(),
        })
    }

    /// `invoice-{number}.pdf`.
    pub fn file_name(&self) -> String {
        invoice_file_name(&self.number)
    }

    /// `invoice-{number}`, the key under the storage folder.
    pub fn public_id(&self) -> String {
        invoice_public_id(&self.number)
    }
}

/// Invoice number for a booking.
///
/// A number already stored on the booking is reused unchanged, so
/// regenerating an invoice never renumbers it. Otherwise the number is
/// derived from the booking itself as `INV-{YYYY}{MM}-{bookingNumber}`,
/// using the month the booking was created. Booking numbers are unique,
/// so derived numbers are unique without any coordination, and the same
/// booking always yields the same number.
pub fn resolve_invoice_number(booking: &Booking) -> Result<String, InvoiceError> {
    let stored = booking
        .payment
        .invoice
        .as_ref()
        .and_then(|inv| inv.number.as_deref())
        .filter(|n| !n.trim().is_empty());

    let number = match stored {
        Some(n) => n.to_string(),
        None => derive_invoice_number(booking)?,
    };
    validate_invoice_number(&number)?;
    Ok(number)
}

fn derive_invoice_number(booking: &Booking) -> Result<String, InvoiceError> {
    let booking_number = booking.booking_number.trim();
    if booking_number.is_empty() {
        return Err(InvoiceError::precondition(
            "bookingNumber is required to derive an invoice number",
        ));
    }
    let created = booking.created_at;
    Ok(format!(
        "{INVOICE_PREFIX}{}{:02}-{booking_number}",
        created.year(),
        created.month()
    ))
}

/// Check that an invoice number is usable in a file name and storage key.
///
/// Allowed: ASCII letters, digits, `-`, `_` and `.`, without `..`, at most
/// [`MAX_NUMBER_LEN`] characters.
pub fn validate_invoice_number(number: &str) -> Result<(), InvoiceError> {
    if number.is_empty() {
        return Err(InvoiceError::invalid_number(number, "must not be empty"));
    }
    if number.len() > MAX_NUMBER_LEN {
        return Err(InvoiceError::invalid_number(
            number,
            format!("must not exceed {MAX_NUMBER_LEN} characters"),
        ));
    }
    if let Some(bad) = number
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(InvoiceError::invalid_number(
            number,
            format!("character {bad:?} is not allowed"),
        ));
    }
    if number.contains("..") {
        return Err(InvoiceError::invalid_number(number, "must not contain '..'"));
    }
    Ok(())
}

/// `invoice-{number}.pdf`.
pub fn invoice_file_name(number: &str) -> String {
    format!("invoice-{number}.pdf")
}

/// `invoice-{number}`.
pub fn invoice_public_id(number: &str) -> String {
    format!("invoice-{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_numbers() {
        assert!(validate_invoice_number("INV-202406-BK2406150001").is_ok());
        assert!(validate_invoice_number("INV-202406-0042").is_ok());
        assert!(validate_invoice_number("RE_2024.7").is_ok());
    }

    #[test]
    fn rejects_path_like_numbers() {
        assert!(validate_invoice_number("").is_err());
        assert!(validate_invoice_number("../etc/passwd").is_err());
        assert!(validate_invoice_number("a/b").is_err());
        assert!(validate_invoice_number("a..b").is_err());
        assert!(validate_invoice_number("INV 1").is_err());
        assert!(validate_invoice_number(&"9".repeat(201)).is_err());
    }

    #[test]
    fn file_and_public_names() {
        assert_eq!(invoice_file_name("INV-1"), "invoice-INV-1.pdf");
        assert_eq!(invoice_public_id("INV-1"), "invoice-INV-1");
    }
}
