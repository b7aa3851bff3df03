#![cfg(feature = "render")]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rental_invoice::core::*;
use rental_invoice::render::*;
use rust_decimal_macros::dec;

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
}

fn booking() -> Booking {
    Booking {
        booking_number: "BK2406150001".into(),
        created_at: ts(2024, 6, 15),
        updated_at: ts(2024, 6, 16),
        user: Customer {
            first_name: Some("Anna".into()),
            last_name: Some("Schmidt".into()),
            email: Some("anna@example.de".into()),
            profile: Some(CustomerProfile {
                phone: Some("+49 30 555123".into()),
                address: Some(PostalAddress {
                    street: Some("Lindenweg 4".into()),
                    postal_code: Some("10115".into()),
                    city: Some("Berlin".into()),
                }),
            }),
            ..Default::default()
        },
        vehicle: Vehicle {
            name: "Hymer B-Klasse".into(),
        },
        dates: RentalPeriod {
            start: ts(2024, 7, 1),
            end: ts(2024, 7, 6),
            number_of_days: 5,
        },
        pricing: Pricing {
            daily_rate: dec!(90),
            subtotal: dec!(450),
            insurance: None,
            extras: vec![],
            fees: None,
            weekly_discount: None,
            monthly_discount: None,
            taxes: Taxes {
                rate: dec!(0.19),
                amount: dec!(85.50),
            },
            total_amount: dec!(535.50),
        },
        payment: Payment {
            method: PaymentMethod::Card,
            split_payment: None,
            status: "completed".into(),
            invoice: Some(InvoiceRecord {
                number: None,
                paid_at: Some(ts(2024, 6, 17)),
            }),
        },
    }
}

fn render(booking: &Booking) -> RenderedDocument {
    let company = CompanyProfile::default();
    let identity = InvoiceIdentity::for_booking(booking).unwrap();
    let breakdown = build_breakdown(booking).unwrap();
    DocumentRenderer::new(&company)
        .render(booking, &identity, &breakdown, issue_date())
        .unwrap()
}

fn runs_with<'a>(doc: &'a RenderedDocument, text: &str) -> Vec<&'a TextRun> {
    doc.text_runs().iter().filter(|r| r.text == text).collect()
}

// --- Document structure ---

#[test]
fn produces_a_loadable_pdf() {
    let doc = render(&booking());
    assert!(doc.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(doc.page_count(), 1);

    let pdf = lopdf::Document::load_mem(doc.as_bytes()).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);

    let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = pdf.get_dictionary(info_id).unwrap();
    assert_eq!(
        info.get(b"Title").unwrap().as_str().unwrap(),
        b"Rechnung INV-202406-BK2406150001"
    );
    assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"WohnmobilTraum");
}

#[test]
fn header_shows_number_and_booking() {
    let doc = render(&booking());
    assert!(doc.contains_text("RECHNUNG"));
    assert!(doc.has_line("Nr. INV-202406-BK2406150001"));
    assert!(doc.has_line("Buchung: BK2406150001"));

    let title = runs_with(&doc, "RECHNUNG")[0];
    assert_eq!(title.font, Font::Bold);
    assert_eq!(title.size, 24.0);
    let right_edge = title.x + Font::Bold.measure("RECHNUNG", 24.0);
    assert!((right_edge - (595.28 - 50.0)).abs() < 1e-6);
}

#[test]
fn company_and_customer_blocks() {
    let doc = render(&booking());
    assert!(doc.has_line("WohnmobilTraum GmbH Rechnung an:"));
    assert!(doc.has_line("Hauptstraße 123 Anna Schmidt"));
    assert!(doc.has_line("Tel: +49 89 1234567 +49 30 555123"));
    assert!(doc.has_line("Email: info@wohnmobiltraum.de Lindenweg 4"));
    assert!(doc.has_line("USt-IdNr: DE123456789 10115 Berlin"));
}

#[test]
fn customer_without_address_or_phone() {
    let mut booking = booking();
    booking.user.profile = None;
    let doc = render(&booking);
    assert!(doc.has_line("Tel: +49 89 1234567 N/A"));
    assert!(doc.has_line("Email: info@wohnmobiltraum.de"));
    assert!(!doc.contains_text("Berlin"));
}

#[test]
fn customer_contact_from_platform_user_json() {
    let mut booking = booking();
    booking.user = serde_json::from_value(serde_json::json!({
        "firstName": "Lena",
        "lastName": "Vogel",
        "email": "lena@example.de",
        "profile": {
            "phone": "+49 30 5551234",
            "address": { "street": "Kastanienallee 12", "postalCode": "10435", "city": "Berlin" }
        }
    }))
    .unwrap();
    let doc = render(&booking);
    assert!(doc.has_line("Hauptstraße 123 Lena Vogel"));
    assert!(doc.has_line("Tel: +49 89 1234567 +49 30 5551234"));
    assert!(doc.has_line("Email: info@wohnmobiltraum.de Kastanienallee 12"));
    assert!(doc.has_line("USt-IdNr: DE123456789 10435 Berlin"));
}

#[test]
fn customer_contact_from_flat_fields() {
    let mut booking = booking();
    booking.user.profile = None;
    booking.user.phone = Some("+49 40 987654".into());
    booking.user.address = Some(PostalAddress {
        street: Some("Elbchaussee 1".into()),
        postal_code: Some("22763".into()),
        city: Some("Hamburg".into()),
    });
    let doc = render(&booking);
    assert!(doc.has_line("Tel: +49 89 1234567 +49 40 987654"));
    assert!(doc.has_line("USt-IdNr: DE123456789 22763 Hamburg"));
}

#[test]
fn booking_details_grid() {
    let doc = render(&booking());
    assert!(doc.has_line("Rechnungsdatum: 20.06.2024 Buchungsdatum: 15.06.2024"));
    assert!(doc.has_line("Mietbeginn: 01.07.2024 Mietende: 06.07.2024"));
    assert!(doc.has_line("Fahrzeug: Hymer B-Klasse"));
}

// --- Table and summary ---

#[test]
fn reference_summary_lines() {
    let doc = render(&booking());
    assert!(doc.has_line("Zwischensumme: 450,00 €"));
    assert!(doc.has_line("MwSt. (19%): 85,50 €"));
    assert!(doc.has_line("Gesamtbetrag: 535,50 €"));

    let total = runs_with(&doc, "535,50 €")[0];
    assert_eq!(total.font, Font::Bold);
    assert_eq!(total.size, 14.0);
    assert_eq!(total.color, Color::from_hex(0x10B981));
}

#[test]
fn documented_reference_booking() {
    let mut booking = booking();
    booking.pricing.daily_rate = dec!(80);
    booking.pricing.subtotal = dec!(400);
    booking.pricing.insurance = Some(Insurance {
        kind: Some("standard".into()),
        price: dec!(50),
    });
    let doc = render(&booking);

    assert!(doc.has_line("Hymer B-Klasse - Miete 5 Tage 80,00 € 400,00 €"));
    assert!(doc.has_line("Standard-Versicherung 5 Tage 10,00 € 50,00 €"));
    assert!(doc.has_line("Zwischensumme: 450,00 €"));
    assert!(doc.has_line("MwSt. (19%): 85,50 €"));
    assert!(doc.has_line("Gesamtbetrag: 535,50 €"));
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn table_rows_snapshot() {
    let mut booking = booking();
    booking.pricing.insurance = Some(Insurance {
        kind: Some("basic".into()),
        price: dec!(50),
    });
    booking.pricing.extras = vec![Extra {
        name: "Campingstühle".into(),
        quantity: 2,
        price: dec!(5),
        total: dec!(10),
    }];
    booking.pricing.fees = Some(Fees {
        cleaning_fee: Some(dec!(89)),
        service_fee: None,
    });
    booking.pricing.weekly_discount = Some(dec!(30));
    let doc = render(&booking);

    let rows: Vec<String> = doc
        .text_lines()
        .into_iter()
        .skip_while(|l| l != "Beschreibung Menge/Tage Einzelpreis Gesamt")
        .take_while(|l| !l.starts_with("Zwischensumme"))
        .collect();
    insta::assert_debug_snapshot!(rows, @r#"
    [
        "Beschreibung Menge/Tage Einzelpreis Gesamt",
        "Hymer B-Klasse - Miete 5 Tage 90,00 € 450,00 €",
        "Basis-Versicherung 5 Tage 10,00 € 50,00 €",
        "Campingstühle 2x 5,00 € 10,00 €",
        "Endreinigung 1x 89,00 € 89,00 €",
        "Wochenrabatt 1x -30,00 € -30,00 €",
    ]
    "#);
}

#[test]
fn discount_row_is_red() {
    let mut booking = booking();
    booking.pricing.weekly_discount = Some(dec!(30));
    let doc = render(&booking);

    let amounts = runs_with(&doc, "-30,00 €");
    assert_eq!(amounts.len(), 2);
    assert!(amounts.iter().all(|r| r.color == Color::from_hex(0xDC2626)));
    assert_eq!(runs_with(&doc, "Wochenrabatt")[0].color, Color::from_hex(0xDC2626));
    assert_eq!(runs_with(&doc, "450,00 €")[0].color, Color::BLACK);
}

// --- Payment box ---

#[test]
fn card_payment_shows_status_and_paid_date() {
    let doc = render(&booking());
    assert!(doc.has_line("Zahlungsinformationen:"));
    assert!(doc.has_line("Zahlungsmethode: Online-Zahlung (Kreditkarte)"));
    assert!(doc.has_line("Status: Bezahlt"));
    assert!(doc.has_line("Bezahlt am: 17.06.2024"));
}

#[test]
fn paid_date_falls_back_to_last_update() {
    let mut booking = booking();
    booking.payment.invoice = None;
    booking.payment.status = "pending".into();
    let doc = render(&booking);
    assert!(doc.has_line("Status: Ausstehend"));
    assert!(doc.has_line("Bezahlt am: 16.06.2024"));
}

#[test]
fn split_payment_lists_online_and_cash_parts() {
    let mut booking = booking();
    booking.payment.method = PaymentMethod::SplitPayment;
    booking.payment.split_payment = Some(SplitPayment {
        enabled: true,
        online_amount: dec!(267.75),
        cash_amount: dec!(267.75),
    });
    let doc = render(&booking);

    assert!(doc.has_line("Zahlungsmethode: Teilzahlung (50% Online + 50% Bar)"));
    assert!(doc.has_line("Online bezahlt: 267,75 €"));
    assert!(doc.has_line("Bar zu zahlen: 267,75 € (bei Abholung)"));
    assert!(!doc.contains_text("Status:"));
    assert!(!doc.contains_text("Bezahlt am:"));
}

#[test]
fn disabled_split_payment_shows_status() {
    let mut booking = booking();
    booking.payment.method = PaymentMethod::Cash;
    booking.payment.split_payment = Some(SplitPayment {
        enabled: false,
        ..Default::default()
    });
    let doc = render(&booking);
    assert!(doc.has_line("Zahlungsmethode: Barzahlung"));
    assert!(doc.contains_text("Status:"));
}

// --- Pagination ---

fn many_extras(count: u32) -> Booking {
    let mut booking = booking();
    booking.pricing.extras = (1..=count)
        .map(|i| Extra {
            name: format!("Zubehör {i}"),
            quantity: 1,
            price: dec!(5),
            total: dec!(5),
        })
        .collect();
    booking
}

#[test]
fn payment_box_moves_to_next_page_when_it_does_not_fit() {
    // 1 rental + 6 extras: the summary ends too low for the payment box.
    let doc = render(&many_extras(6));
    assert_eq!(doc.page_count(), 2);

    let title = runs_with(&doc, "Zahlungsinformationen:")[0];
    assert_eq!(title.page, 1);
    assert_eq!(title.y, 50.0 + 15.0);
    assert_eq!(runs_with(&doc, "Gesamtbetrag:")[0].page, 0);
}

#[test]
fn long_tables_continue_with_repeated_header() {
    let doc = render(&many_extras(30));
    assert!(doc.page_count() >= 2);

    let headers = runs_with(&doc, "Beschreibung");
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[1].page, 1);

    // Every row appears exactly once, none inside the footer band.
    for i in 1..=30 {
        let rows = runs_with(&doc, &format!("Zubehör {i}"));
        assert_eq!(rows.len(), 1, "row {i}");
        assert!(rows[0].y + ROW_HEIGHT <= 750.0);
    }
}

#[test]
fn footer_only_on_last_page() {
    let doc = render(&many_extras(30));
    let last = doc.page_count() - 1;
    let footer = CompanyProfile::default().footer_lines;
    for line in &footer {
        let runs = runs_with(&doc, line);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].page, last);
        assert_eq!(runs[0].size, 8.0);
    }
}

#[test]
fn single_page_footer_sits_above_bottom_edge() {
    let doc = render(&booking());
    let footer = &CompanyProfile::default().footer_lines[0];
    let run = runs_with(&doc, footer)[0];
    assert!((run.y - (841.89 - 80.0 + 10.0)).abs() < 1e-6);
}

#[test]
fn long_vehicle_names_are_shortened_in_the_table() {
    let mut booking = booking();
    booking.vehicle.name = "Extrem luxuriöses Wohnmobil mit Panoramadach und Heckgarage XXL".into();
    let doc = render(&booking);
    let row = doc
        .text_runs()
        .iter()
        .find(|r| r.x == 60.0 && r.text.starts_with("Extrem"))
        .unwrap();
    assert!(row.text.ends_with("..."));
    assert!(Font::Regular.measure(&row.text, 9.0) <= 250.0);
}
