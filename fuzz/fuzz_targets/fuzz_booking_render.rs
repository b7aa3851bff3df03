#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use rental_invoice::render::DocumentRenderer;
use rental_invoice::{Booking, CompanyProfile, InvoiceIdentity, build_breakdown};

fuzz_target!(|data: &[u8]| {
    // Booking JSON → breakdown → PDF must not panic. Errors are fine.
    let Ok(booking) = serde_json::from_slice::<Booking>(data) else {
        return;
    };
    let Ok(breakdown) = build_breakdown(&booking) else {
        return;
    };
    let Ok(identity) = InvoiceIdentity::for_booking(&booking) else {
        return;
    };
    let company = CompanyProfile::default();
    let issue_date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap_or_default();
    let _ = DocumentRenderer::new(&company).render(&booking, &identity, &breakdown, issue_date);
});
