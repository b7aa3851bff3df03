use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::canvas::{Canvas, Color, DocumentInfo, TextRun, TextStyle};
use super::fonts::Font;
use super::layout::{
    Advance, LayoutEngine, PageGeometry, detail_columns, info_columns, table_columns,
};
use crate::core::format::{format_currency, format_date, format_naive_date};
use crate::core::{
    Booking, Breakdown, CompanyProfile, Customer, Emphasis, InvoiceError, InvoiceIdentity,
    LineItem, Payment, payment_status_label,
};

const BRAND: Color = Color::from_hex(0x10B981);
const BRAND_DARK: Color = Color::from_hex(0x059669);
const HEADER_MUTED: Color = Color::from_hex(0xE0E0E0);
const MUTED: Color = Color::from_hex(0x666666);
const LABEL: Color = Color::from_hex(0x374151);
const BOX_FILL: Color = Color::from_hex(0xF9FAFB);
const RULE: Color = Color::from_hex(0xE5E7EB);
const DEDUCTION: Color = Color::from_hex(0xDC2626);
const AMBER_FILL: Color = Color::from_hex(0xFEF3C7);
const AMBER_BORDER: Color = Color::from_hex(0xF59E0B);
const AMBER_TITLE: Color = Color::from_hex(0x92400E);
const AMBER_TEXT: Color = Color::from_hex(0x78350F);
const FOOTER_TEXT: Color = Color::from_hex(0x9CA3AF);

const HEADER_HEIGHT: f64 = 180.0;
const INFO_TOP: f64 = 200.0;
const INFO_LINE_OFFSETS: [f64; 5] = [15.0, 28.0, 41.0, 54.0, 67.0];
const DETAILS_TOP: f64 = 310.0;
const DETAILS_HEIGHT: f64 = 80.0;
const DETAILS_ROW: f64 = 25.0;
const TABLE_TOP: f64 = 420.0;
const TABLE_HEADER_HEIGHT: f64 = 30.0;
/// Cursor movement from the table header top to the first row.
const TABLE_HEADER_ADVANCE: f64 = 40.0;
pub const ROW_HEIGHT: f64 = 25.0;
const SUMMARY_ROW: f64 = 20.0;
/// Space the summary block needs from the last table row to below the total.
const SUMMARY_HEIGHT: f64 = 10.0 + 15.0 + 2.0 * SUMMARY_ROW + 15.0 + TOTAL_LINE;
const TOTAL_LINE: f64 = 17.0;
const PAYMENT_GAP: f64 = 30.0;
pub const PAYMENT_BOX_HEIGHT: f64 = 100.0;

/// A fully drawn invoice: serialized PDF bytes plus the placed text.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pdf: Vec<u8>,
    runs: Vec<TextRun>,
    page_count: usize,
}

impl RenderedDocument {
    /// The PDF file content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pdf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pdf
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Every piece of text in drawing order.
    pub fn text_runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Text grouped into visual lines: runs sharing a page and top edge,
    /// ordered left to right and joined by a space. Lines are ordered by
    /// page, then top to bottom.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines: BTreeMap<(usize, i64), Vec<&TextRun>> = BTreeMap::new();
        for run in &self.runs {
            let key = (run.page, (run.y * 100.0).round() as i64);
            lines.entry(key).or_default().push(run);
        }
        lines
            .into_values()
            .map(|mut runs| {
                runs.sort_by(|a, b| a.x.total_cmp(&b.x));
                runs.iter()
                    .map(|r| r.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Whether some visual line reads exactly `line`.
    pub fn has_line(&self, line: &str) -> bool {
        self.text_lines().iter().any(|l| l == line)
    }

    /// Whether any text run contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.runs.iter().any(|r| r.text.contains(needle))
    }
}

/// Draws the fixed invoice template.
///
/// Sections are drawn in a fixed order; later sections read the cursor
/// left behind by earlier ones.
#[derive(Debug, Clone)]
pub struct DocumentRenderer<'a> {
    company: &'a CompanyProfile,
    geometry: PageGeometry,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(company: &'a CompanyProfile) -> Self {
        Self {
            company,
            geometry: PageGeometry::a4(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Draw the complete invoice. The result is only produced once every
    /// section has been drawn and the PDF has been assembled.
    pub fn render(
        &self,
        booking: &Booking,
        identity: &InvoiceIdentity,
        breakdown: &Breakdown,
        issue_date: NaiveDate,
    ) -> Result<RenderedDocument, InvoiceError> {
        let mut canvas = Canvas::new(self.geometry.width, self.geometry.height);
        let mut layout = LayoutEngine::new(self.geometry);

        draw_header(&mut canvas, &mut layout, self.company, identity);
        draw_company_block(&mut canvas, &mut layout, self.company);
        draw_customer_block(&mut canvas, &mut layout, &booking.user);
        draw_booking_details(&mut canvas, &mut layout, booking, issue_date);
        draw_line_items(&mut canvas, &mut layout, &breakdown.line_items);
        draw_summary(&mut canvas, &mut layout, breakdown);
        draw_payment_info(&mut canvas, &mut layout, &booking.payment, booking);
        draw_footer(&mut canvas, &layout, self.company);

        let page_count = canvas.page_count();
        let info = DocumentInfo {
            title: format!("Rechnung {}", identity.number),
            author: self.company.brand_name.clone(),
            subject: format!("Rechnung für Buchung {}", identity.booking_number),
        };
        let (pdf, runs) = canvas.finish(&info)?;
        Ok(RenderedDocument {
            pdf,
            runs,
            page_count,
        })
    }
}

/// Keep the canvas on the page the cursor moved to.
fn follow(canvas: &mut Canvas, advance: Advance) -> Advance {
    if advance == Advance::NewPage {
        canvas.new_page();
    }
    advance
}

fn style(font: Font, size: f64, color: Color) -> TextStyle {
    TextStyle::new(font, size, color)
}

/// Full-width colored band with brand, tagline, title and reference numbers.
pub fn draw_header(
    canvas: &mut Canvas,
    layout: &mut LayoutEngine,
    company: &CompanyProfile,
    identity: &InvoiceIdentity,
) {
    let width = layout.geometry().width;
    canvas.fill_rect(0.0, 0.0, width, HEADER_HEIGHT, BRAND);
    canvas.fill_rect_translucent(0.0, 0.0, width, HEADER_HEIGHT, BRAND_DARK, 0.9);

    canvas.text(50.0, 40.0, &company.brand_name, style(Font::Bold, 32.0, Color::WHITE));
    canvas.text(50.0, 80.0, &company.tagline, style(Font::Regular, 12.0, Color::WHITE));

    let title_x = width - 200.0;
    canvas.text_right(title_x, 150.0, 40.0, "RECHNUNG", style(Font::Bold, 24.0, Color::WHITE));
    canvas.text_right(
        title_x,
        150.0,
        70.0,
        &format!("Nr. {}", identity.number),
        style(Font::Regular, 11.0, HEADER_MUTED),
    );
    canvas.text_right(
        title_x,
        150.0,
        90.0,
        &format!("Buchung: {}", identity.booking_number),
        style(Font::Regular, 10.0, HEADER_MUTED),
    );

    layout.move_to(HEADER_HEIGHT);
}

/// Seller address block, left column.
pub fn draw_company_block(canvas: &mut Canvas, layout: &mut LayoutEngine, company: &CompanyProfile) {
    let x = info_columns::COMPANY;
    canvas.text(x, INFO_TOP, &company.legal_name, style(Font::Bold, 10.0, Color::BLACK));

    let lines = [
        company.street.clone(),
        company.city_line.clone(),
        format!("Tel: {}", company.phone),
        format!("Email: {}", company.email),
        format!("USt-IdNr: {}", company.vat_id),
    ];
    let body = style(Font::Regular, 9.0, MUTED);
    for (line, offset) in lines.iter().zip(INFO_LINE_OFFSETS) {
        canvas.text(x, INFO_TOP + offset, line, body);
    }

    layout.move_to(INFO_TOP + INFO_LINE_OFFSETS[4]);
}

/// Customer block, right column. The postal address is printed only when
/// the customer record has one.
pub fn draw_customer_block(canvas: &mut Canvas, layout: &mut LayoutEngine, customer: &Customer) {
    let x = info_columns::CUSTOMER;
    canvas.text(x, INFO_TOP, "Rechnung an:", style(Font::Bold, 10.0, Color::BLACK));

    let body = style(Font::Regular, 9.0, MUTED);
    let name = customer.display_name();
    let contact = [
        non_empty(Some(name.as_str())),
        non_empty(customer.email.as_deref()),
        customer.contact_phone(),
    ];
    for (value, offset) in contact.into_iter().zip(INFO_LINE_OFFSETS) {
        canvas.text(x, INFO_TOP + offset, value.unwrap_or("N/A"), body);
    }

    let mut bottom = INFO_TOP + INFO_LINE_OFFSETS[2];
    if let Some(address) = customer.postal_address() {
        let street = address.street.as_deref().unwrap_or("").trim();
        let city = format!(
            "{} {}",
            address.postal_code.as_deref().unwrap_or(""),
            address.city.as_deref().unwrap_or("")
        );
        let city = city.trim();
        if !street.is_empty() || !city.is_empty() {
            canvas.text(x, INFO_TOP + INFO_LINE_OFFSETS[3], street, body);
            canvas.text(x, INFO_TOP + INFO_LINE_OFFSETS[4], city, body);
            bottom = INFO_TOP + INFO_LINE_OFFSETS[4];
        }
    }

    layout.move_to(layout.y().max(bottom));
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Bordered box with invoice date, booking date, rental period and vehicle.
pub fn draw_booking_details(
    canvas: &mut Canvas,
    layout: &mut LayoutEngine,
    booking: &Booking,
    issue_date: NaiveDate,
) {
    let geometry = *layout.geometry();
    canvas.fill_stroke_rect(
        geometry.left(),
        DETAILS_TOP - 10.0,
        geometry.content_width(),
        DETAILS_HEIGHT,
        BOX_FILL,
        RULE,
    );

    let label = style(Font::Bold, 9.0, LABEL);
    let value = style(Font::Regular, 9.0, Color::BLACK);
    let rows: [(f64, &str, String, Option<(&str, String)>); 3] = [
        (
            DETAILS_TOP,
            "Rechnungsdatum:",
            format_naive_date(issue_date),
            Some(("Buchungsdatum:", format_date(booking.created_at))),
        ),
        (
            DETAILS_TOP + DETAILS_ROW,
            "Mietbeginn:",
            format_date(booking.dates.start),
            Some(("Mietende:", format_date(booking.dates.end))),
        ),
        (
            DETAILS_TOP + 2.0 * DETAILS_ROW,
            "Fahrzeug:",
            fit_width(&booking.vehicle.name, Font::Regular, 9.0, 300.0),
            None,
        ),
    ];

    for (y, left_label, left_value, right) in rows {
        canvas.text(detail_columns::LEFT_LABEL, y, left_label, label);
        canvas.text(detail_columns::LEFT_VALUE, y, &left_value, value);
        if let Some((right_label, right_value)) = right {
            canvas.text(detail_columns::RIGHT_LABEL, y, right_label, label);
            canvas.text(detail_columns::RIGHT_VALUE, y, &right_value, value);
        }
    }

    layout.move_to(DETAILS_TOP - 10.0 + DETAILS_HEIGHT);
}

fn draw_table_header(canvas: &mut Canvas, layout: &mut LayoutEngine) {
    let geometry = *layout.geometry();
    let top = layout.y();
    canvas.fill_rect(geometry.left(), top, geometry.content_width(), TABLE_HEADER_HEIGHT, BRAND);

    let head = style(Font::Bold, 10.0, Color::WHITE);
    let y = top + 10.0;
    canvas.text(table_columns::DESCRIPTION, y, "Beschreibung", head);
    canvas.text(table_columns::QUANTITY, y, "Menge/Tage", head);
    canvas.text(table_columns::UNIT_PRICE, y, "Einzelpreis", head);
    canvas.text(table_columns::TOTAL, y, "Gesamt", head);

    layout.advance(TABLE_HEADER_ADVANCE);
}

/// Table header and one row per line item. Rows that would run into the
/// footer band continue on a new page below a repeated header.
pub fn draw_line_items(canvas: &mut Canvas, layout: &mut LayoutEngine, items: &[LineItem]) {
    layout.move_to(TABLE_TOP);
    draw_table_header(canvas, layout);

    for item in items {
        if follow(canvas, layout.ensure_space(ROW_HEIGHT)) == Advance::NewPage {
            draw_table_header(canvas, layout);
        }
        draw_table_row(canvas, layout.y(), item);
        follow(canvas, layout.advance(ROW_HEIGHT));
    }
}

fn draw_table_row(canvas: &mut Canvas, y: f64, item: &LineItem) {
    let color = match item.emphasis {
        Some(Emphasis::Deduction) => DEDUCTION,
        None => Color::BLACK,
    };
    let body = style(Font::Regular, 9.0, color);
    let description = fit_width(
        &item.description,
        Font::Regular,
        9.0,
        table_columns::DESCRIPTION_WIDTH,
    );
    canvas.text(table_columns::DESCRIPTION, y, &description, body);
    canvas.text(table_columns::QUANTITY, y, &item.quantity_label, body);
    canvas.text(table_columns::UNIT_PRICE, y, &item.unit_price_text, body);
    canvas.text(table_columns::TOTAL, y, &item.total_text, body);
}

/// Subtotal, tax and the emphasised total below the table.
pub fn draw_summary(canvas: &mut Canvas, layout: &mut LayoutEngine, breakdown: &Breakdown) {
    follow(canvas, layout.ensure_space(SUMMARY_HEIGHT));
    let geometry = *layout.geometry();

    layout.advance(10.0);
    canvas.hline(geometry.left(), geometry.right(), layout.y(), RULE, 1.0);
    layout.advance(15.0);

    let row = style(Font::Regular, 10.0, Color::BLACK);
    let rows = [
        (
            "Zwischensumme:".to_string(),
            format_currency(breakdown.subtotal_before_tax),
        ),
        (
            format!("MwSt. ({}%):", breakdown.tax_rate_percent),
            format_currency(breakdown.tax_amount),
        ),
    ];
    for (label, value) in rows {
        canvas.text(table_columns::SUMMARY_LABEL, layout.y(), &label, row);
        canvas.text(table_columns::TOTAL, layout.y(), &value, row);
        layout.advance(SUMMARY_ROW);
    }

    canvas.hline(geometry.left(), geometry.right(), layout.y(), BRAND, 2.0);
    layout.advance(15.0);

    let total = style(Font::Bold, 14.0, BRAND);
    canvas.text(table_columns::QUANTITY, layout.y(), "Gesamtbetrag:", total);
    canvas.text(
        table_columns::TOTAL,
        layout.y(),
        &format_currency(breakdown.total),
        total,
    );
    layout.advance(TOTAL_LINE);
}

/// Amber box describing how the invoice is paid. Split payments list the
/// online and cash parts; every other method shows status and payment date.
pub fn draw_payment_info(
    canvas: &mut Canvas,
    layout: &mut LayoutEngine,
    payment: &Payment,
    booking: &Booking,
) {
    follow(canvas, layout.advance(PAYMENT_GAP));
    follow(canvas, layout.ensure_space(PAYMENT_BOX_HEIGHT));

    let geometry = *layout.geometry();
    let top = layout.y();
    canvas.fill_stroke_rect(
        geometry.left(),
        top,
        geometry.content_width(),
        PAYMENT_BOX_HEIGHT,
        AMBER_FILL,
        AMBER_BORDER,
    );

    let x = geometry.left() + 10.0;
    let mut y = top + 15.0;
    canvas.text(x, y, "Zahlungsinformationen:", style(Font::Bold, 11.0, AMBER_TITLE));
    y += 20.0;

    let body = style(Font::Regular, 9.0, AMBER_TEXT);
    let mut lines = vec![format!("Zahlungsmethode: {}", payment.method.label())];
    match payment.split_payment.as_ref().filter(|s| s.enabled) {
        Some(split) => {
            lines.push(format!(
                "Online bezahlt: {}",
                format_currency(split.online_amount)
            ));
            lines.push(format!(
                "Bar zu zahlen: {} (bei Abholung)",
                format_currency(split.cash_amount)
            ));
        }
        None => {
            let paid_at = payment
                .invoice
                .as_ref()
                .and_then(|inv| inv.paid_at)
                .unwrap_or(booking.updated_at);
            lines.push(format!("Status: {}", payment_status_label(&payment.status)));
            lines.push(format!("Bezahlt am: {}", format_date(paid_at)));
        }
    }
    for line in &lines {
        canvas.text(x, y, line, body);
        y += 15.0;
    }

    layout.move_to(top + PAYMENT_BOX_HEIGHT);
}

/// Legal and contact lines, centered above the bottom edge of the last page.
pub fn draw_footer(canvas: &mut Canvas, layout: &LayoutEngine, company: &CompanyProfile) {
    let geometry = layout.geometry();
    let top = geometry.footer_top();
    canvas.hline(geometry.left(), geometry.right(), top, RULE, 1.0);

    let small = style(Font::Regular, 8.0, FOOTER_TEXT);
    for (i, line) in company.footer_lines.iter().enumerate() {
        let y = top + 10.0 + 15.0 * i as f64;
        canvas.text_centered(geometry.left(), geometry.content_width(), y, line, small);
    }
}

/// Shorten `text` with a trailing "..." so it fits `max_width`.
fn fit_width(text: &str, font: Font, size: f64, max_width: f64) -> String {
    if font.measure(text, size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - font.measure("...", size);
    let mut out = String::new();
    let mut used = 0.0;
    for ch in text.chars() {
        let w = font.char_width(ch) as f64 * size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    format!("{}...", out.trim_end())
}
