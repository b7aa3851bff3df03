#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Accepted numbers must be safe as a single path component.
        if rental_invoice::validate_invoice_number(s).is_ok() {
            let name = rental_invoice::invoice_file_name(s);
            assert!(!name.contains('/') && !name.contains('\\') && !name.contains(".."));
        }
    }
});
