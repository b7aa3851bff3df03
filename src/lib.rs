//! # rental-invoice
//!
//! Invoices for vehicle-rental bookings: a German pricing breakdown, a
//! fixed-layout paginated PDF, and durable storage with a local fallback.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Amounts are printed in German locale (`1.234,50 €`), dates as `DD.MM.YYYY`.
//!
//! ## Quick Start
//!
//! ```rust
//! use rental_invoice::*;
//! use rust_decimal_macros::dec;
//!
//! let booking: Booking = serde_json::from_str(r#"{
//!     "bookingNumber": "BK2406150001",
//!     "createdAt": "2024-06-15T09:30:00Z",
//!     "updatedAt": "2024-06-15T09:30:00Z",
//!     "user": { "firstName": "Anna", "lastName": "Schmidt" },
//!     "vehicle": { "name": "Hymer B-Klasse" },
//!     "dates": { "start": "2024-07-01T10:00:00Z", "end": "2024-07-06T10:00:00Z", "numberOfDays": 5 },
//!     "pricing": {
//!         "dailyRate": "90", "subtotal": "450",
//!         "taxes": { "rate": "0.19", "amount": "85.5" },
//!         "totalAmount": "535.5"
//!     },
//!     "payment": { "method": "card", "status": "completed" }
//! }"#).unwrap();
//!
//! let breakdown = build_breakdown(&booking).unwrap();
//! assert_eq!(breakdown.line_items[0].total_text, "450,00 €");
//! assert_eq!(breakdown.subtotal_before_tax + breakdown.tax_amount, dec!(535.5));
//! assert_eq!(resolve_invoice_number(&booking).unwrap(), "INV-202406-BK2406150001");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Booking types, formatting, pricing breakdown, numbering, config |
//! | `render` (default) | Fixed-layout PDF rendering |
//! | `persist` (default) | Blob storage seam, local fallback, [`generator::InvoiceGenerator`] |
//! | `cloudinary` | Cloudinary upload client |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "render")]
pub mod render;

#[cfg(feature = "persist")]
pub mod storage;

#[cfg(feature = "persist")]
pub mod generator;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
