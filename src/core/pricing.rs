use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::format::{format_currency, format_negated_currency, format_percent};
use super::types::{Booking, Pricing};

/// What a line item bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemKind {
    Rental,
    Insurance,
    Extra,
    CleaningFee,
    ServiceFee,
    Discount,
}

/// Highlight applied to a line item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// Deductions, printed in red.
    Deduction,
}

/// One row of the itemized table. Texts are preformatted for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub description: String,
    /// "5 Tage", "2x", "1x".
    pub quantity_label: String,
    pub unit_price_text: String,
    pub total_text: String,
    /// Signed row amount; negative for discounts.
    pub amount: Decimal,
    pub emphasis: Option<Emphasis>,
}

/// Line items plus the summary figures printed below the table.
#[derive(Debug, Clone)]
pub struct Breakdown {
    pub line_items: Vec<LineItem>,
    /// `total - tax_amount`. Not the sum of the line items.
    pub subtotal_before_tax: Decimal,
    pub tax_rate_percent: u32,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl Breakdown {
    /// Sum of the signed row amounts. May differ from
    /// `subtotal_before_tax` when upstream data is inconsistent.
    pub fn line_items_sum(&self) -> Decimal {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

/// German name of an insurance package key.
pub fn insurance_label(kind: &str) -> &'static str {
    match kind {
        "basic" => "Basis-Versicherung",
        "standard" => "Standard-Versicherung",
        "premium" => "Premium-Versicherung",
        "comprehensive" => "Vollkasko-Versicherung",
        _ => "Versicherung",
    }
}

/// Decompose a booking's pricing into printable rows and summary figures.
///
/// Rows are emitted in a fixed order: rental, insurance, extras, cleaning
/// fee, service fee, discount. The upstream total is trusted as-is; the
/// pre-tax subtotal is derived from it by subtraction so that
/// `subtotal_before_tax + tax_amount == total` always holds exactly.
///
/// Fails before anything is drawn if the pricing cannot be presented
/// (insurance on a zero-day rental, negative amounts).
pub fn build_breakdown(booking: &Booking) -> Result<Breakdown, InvoiceError> {
    let pricing = &booking.pricing;
    check_amounts(pricing)?;

    let days = booking.dates.number_of_days;
    let mut items = Vec::with_capacity(4 + pricing.extras.len());

    items.push(LineItem {
        kind: LineItemKind::Rental,
        description: format!("{} - Miete", booking.vehicle.name),
        quantity_label: format!("{days} Tage"),
        unit_price_text: format_currency(pricing.daily_rate),
        total_text: format_currency(pricing.subtotal),
        amount: pricing.subtotal,
        emphasis: None,
    });

    if let Some(insurance) = &pricing.insurance {
        if let Some(kind) = insurance.kind.as_deref() {
            if days == 0 {
                return Err(InvoiceError::precondition(
                    "numberOfDays must be at least 1 to price insurance per day",
                ));
            }
            let per_day = insurance.price / Decimal::from(days);
            items.push(LineItem {
                kind: LineItemKind::Insurance,
                description: insurance_label(kind).to_string(),
                quantity_label: format!("{days} Tage"),
                unit_price_text: format_currency(per_day),
                total_text: format_currency(insurance.price),
                amount: insurance.price,
                emphasis: None,
            });
        }
    }

    for extra in &pricing.extras {
        items.push(LineItem {
            kind: LineItemKind::Extra,
            description: extra.name.clone(),
            quantity_label: format!("{}x", extra.quantity),
            unit_price_text: format_currency(extra.price),
            total_text: format_currency(extra.total),
            amount: extra.total,
            emphasis: None,
        });
    }

    let fees = pricing.fees.as_ref();
    if let Some(fee) = positive(fees.and_then(|f| f.cleaning_fee)) {
        items.push(single_charge(LineItemKind::CleaningFee, "Endreinigung", fee));
    }
    if let Some(fee) = positive(fees.and_then(|f| f.service_fee)) {
        items.push(single_charge(LineItemKind::ServiceFee, "Servicegebühr", fee));
    }

    // Weekly wins if upstream ever sets both.
    let discount = positive(pricing.weekly_discount)
        .map(|d| ("Wochenrabatt", d))
        .or_else(|| positive(pricing.monthly_discount).map(|d| ("Monatsrabatt", d)));
    if let Some((label, amount)) = discount {
        items.push(LineItem {
            kind: LineItemKind::Discount,
            description: label.to_string(),
            quantity_label: "1x".to_string(),
            unit_price_text: format_negated_currency(amount),
            total_text: format_negated_currency(amount),
            amount: -amount,
            emphasis: Some(Emphasis::Deduction),
        });
    }

    Ok(Breakdown {
        line_items: items,
        subtotal_before_tax: pricing.total_amount - pricing.taxes.amount,
        tax_rate_percent: format_percent(pricing.taxes.rate),
        tax_amount: pricing.taxes.amount,
        total: pricing.total_amount,
    })
}

fn single_charge(kind: LineItemKind, description: &str, amount: Decimal) -> LineItem {
    LineItem {
        kind,
        description: description.to_string(),
        quantity_label: "1x".to_string(),
        unit_price_text: format_currency(amount),
        total_text: format_currency(amount),
        amount,
        emphasis: None,
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| v.is_sign_positive() && !v.is_zero())
}

fn check_amounts(pricing: &Pricing) -> Result<(), InvoiceError> {
    let mut fields = vec![
        ("dailyRate", Some(pricing.daily_rate)),
        ("subtotal", Some(pricing.subtotal)),
        ("taxes.rate", Some(pricing.taxes.rate)),
        ("taxes.amount", Some(pricing.taxes.amount)),
        ("totalAmount", Some(pricing.total_amount)),
        ("weeklyDiscount", pricing.weekly_discount),
        ("monthlyDiscount", pricing.monthly_discount),
        ("insurance.price", pricing.insurance.as_ref().map(|i| i.price)),
    ];
    if let Some(fees) = &pricing.fees {
        fields.push(("fees.cleaningFee", fees.cleaning_fee));
        fields.push(("fees.serviceFee", fees.service_fee));
    }

    for (field, value) in fields {
        if let Some(v) = value.filter(|v| is_negative(*v)) {
            return Err(InvoiceError::precondition(format!(
                "{field} must not be negative (got {v})"
            )));
        }
    }

    for (i, extra) in pricing.extras.iter().enumerate() {
        if is_negative(extra.price) || is_negative(extra.total) {
            return Err(InvoiceError::precondition(format!(
                "extras[{i}] ('{}') must not have negative amounts",
                extra.name
            )));
        }
    }
    Ok(())
}

fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn insurance_labels() {
        assert_eq!(insurance_label("basic"), "Basis-Versicherung");
        assert_eq!(insurance_label("premium"), "Premium-Versicherung");
        assert_eq!(insurance_label("gold"), "Versicherung");
    }

    #[test]
    fn positive_filters_zero_and_negative() {
        assert_eq!(positive(Some(dec!(0))), None);
        assert_eq!(positive(Some(dec!(-1))), None);
        assert_eq!(positive(None), None);
        assert_eq!(positive(Some(dec!(0.01))), Some(dec!(0.01)));
    }
}
