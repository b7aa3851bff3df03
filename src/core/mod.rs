//! Booking types, German formatting, pricing breakdown and invoice numbering.
//!
//! Everything here is pure: no I/O, no PDF, no clock.

mod config;
mod error;
pub mod format;
mod numbering;
mod pricing;
mod types;

pub use config::*;
pub use error::*;
pub use numbering::*;
pub use pricing::*;
pub use types::*;
