use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A reservation record handed in by the booking service.
///
/// Owned by the caller and only read here. Field names follow the
/// platform's camelCase JSON so a booking document deserializes directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Globally unique booking reference, e.g. "BK2406150001".
    pub booking_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Customer,
    pub vehicle: Vehicle,
    pub dates: RentalPeriod,
    pub pricing: Pricing,
    pub payment: Payment,
}

/// The booking customer. Every field may be missing on legacy records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Legacy flat contact fields; `profile` takes precedence.
    pub phone: Option<String>,
    pub address: Option<PostalAddress>,
    pub profile: Option<CustomerProfile>,
}

/// Contact details nested under `user.profile` on the platform's user record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerProfile {
    pub phone: Option<String>,
    pub address: Option<PostalAddress>,
}

impl Customer {
    /// "First Last", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Phone number from the profile, else the flat field. Blank values count as missing.
    pub fn contact_phone(&self) -> Option<&str> {
        let profile = self.profile.as_ref().and_then(|p| p.phone.as_deref());
        [profile, self.phone.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// Postal address from the profile, else the flat field.
    pub fn postal_address(&self) -> Option<&PostalAddress> {
        self.profile
            .as_ref()
            .and_then(|p| p.address.as_ref())
            .filter(|a| !a.is_blank())
            .or(self.address.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl PostalAddress {
    /// True when street, postal code and city are all missing or blank.
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.postal_code, &self.city]
            .into_iter()
            .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Billable days. Must be at least 1 when insurance is booked.
    pub number_of_days: u32,
}

/// Pricing figures as computed upstream. Nothing here is recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub daily_rate: Decimal,
    /// Rental subtotal (daily rate × days), before extras and fees.
    pub subtotal: Decimal,
    #[serde(default)]
    pub insurance: Option<Insurance>,
    #[serde(default)]
    pub extras: Vec<Extra>,
    #[serde(default)]
    pub fees: Option<Fees>,
    #[serde(default)]
    pub weekly_discount: Option<Decimal>,
    #[serde(default)]
    pub monthly_discount: Option<Decimal>,
    pub taxes: Taxes,
    /// Authoritative gross total including tax.
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Insurance {
    /// Package key ("basic", "standard", ...). No insurance row without it.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Price for the whole rental period.
    #[serde(default)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extra {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fees {
    pub cleaning_fee: Option<Decimal>,
    pub service_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxes {
    /// Tax rate as a fraction (0.19 for 19 %).
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub split_payment: Option<SplitPayment>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub invoice: Option<InvoiceRecord>,
}

fn default_status() -> String {
    "pending".to_string()
}

/// How the customer pays. Anything the platform does not know as
/// split or cash payment is an online card payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    SplitPayment,
    Cash,
    #[default]
    #[serde(other)]
    Card,
}

impl PaymentMethod {
    /// German label printed in the payment box.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Card => "Online-Zahlung (Kreditkarte)",
            Self::SplitPayment => "Teilzahlung (50% Online + 50% Bar)",
            Self::Cash => "Barzahlung",
        }
    }
}

/// Payment status codes used by the booking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    PartialRefund,
    PartiallyPaid,
}

impl PaymentStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            "partial_refund" => Some(Self::PartialRefund),
            "partially_paid" => Some(Self::PartiallyPaid),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Ausstehend",
            Self::Processing => "In Bearbeitung",
            Self::Completed => "Bezahlt",
            Self::Failed => "Fehlgeschlagen",
            Self::Refunded => "Erstattet",
            Self::PartialRefund => "Teilweise erstattet",
            Self::PartiallyPaid => "Teilweise bezahlt",
        }
    }
}

/// German label for a raw status code; unknown codes are printed as-is.
pub fn payment_status_label(code: &str) -> &str {
    PaymentStatus::from_code(code).map_or(code, |s| s.label())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitPayment {
    pub enabled: bool,
    pub online_amount: Decimal,
    pub cash_amount: Decimal,
}

/// Invoice data already stored on the booking by an earlier run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceRecord {
    pub number: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Outcome of one invoice generation, handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResult {
    pub invoice_number: String,
    /// Durable storage URL, or the local fallback path if the upload failed.
    pub url: String,
    /// Storage key of the uploaded file; `None` on local fallback.
    pub cloudinary_id: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl InvoiceResult {
    /// True when the file only exists locally because the upload failed.
    pub fn is_local_fallback(&self) -> bool {
        self.cloudinary_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_skips_missing_parts() {
        let c = Customer {
            first_name: Some("Anna".into()),
            last_name: None,
            ..Default::default()
        };
        assert_eq!(c.display_name(), "Anna");
        assert_eq!(Customer::default().display_name(), "");
    }

    #[test]
    fn profile_contact_wins_over_flat_fields() {
        let c: Customer = serde_json::from_value(serde_json::json!({
            "phone": "+49 40 111",
            "address": { "city": "Hamburg" },
            "profile": {
                "phone": "+49 30 5551234",
                "address": { "street": "Lindenweg 4", "postalCode": "10115", "city": "Berlin" }
            }
        }))
        .unwrap();
        assert_eq!(c.contact_phone(), Some("+49 30 5551234"));
        assert_eq!(c.postal_address().unwrap().city.as_deref(), Some("Berlin"));
    }

    #[test]
    fn blank_profile_falls_back_to_flat_fields() {
        let c: Customer = serde_json::from_value(serde_json::json!({
            "phone": "+49 40 111",
            "address": { "city": "Hamburg" },
            "profile": { "phone": " ", "address": { "street": "" } }
        }))
        .unwrap();
        assert_eq!(c.contact_phone(), Some("+49 40 111"));
        assert_eq!(c.postal_address().unwrap().city.as_deref(), Some("Hamburg"));
        assert_eq!(Customer::default().contact_phone(), None);
        assert!(Customer::default().postal_address().is_none());
    }

    #[test]
    fn unknown_payment_method_is_card() {
        let m: PaymentMethod = serde_json::from_str("\"stripe\"").unwrap();
        assert_eq!(m, PaymentMethod::Card);
        let m: PaymentMethod = serde_json::from_str("\"split_payment\"").unwrap();
        assert_eq!(m, PaymentMethod::SplitPayment);
    }

    #[test]
    fn status_label_falls_back_to_code() {
        assert_eq!(payment_status_label("completed"), "Bezahlt");
        assert_eq!(payment_status_label("on_hold"), "on_hold");
    }
}
