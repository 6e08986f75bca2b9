use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use travelease_shared::{LineItem, Masked};
use uuid::Uuid;

/// Price breakdown shown next to the payment form
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<LineItem>,
    pub item_count: u64,
    pub subtotal: u64,
    pub taxes_and_fees: u64,
    pub total: u64,
    pub currency: String,
}

impl OrderSummary {
    /// Taxes and fees are `round(subtotal * tax_rate)`; a negative rate
    /// counts as zero. Amounts saturate at `u64::MAX`.
    pub fn from_lines(lines: &[LineItem], tax_rate: f64, currency: &str) -> Self {
        let subtotal = lines.iter().map(LineItem::line_total).fold(0, u64::saturating_add);
        let item_count: u64 = lines.iter().map(|line| u64::from(line.quantity)).sum();
        let taxes_and_fees = (subtotal as f64 * tax_rate.max(0.0)).round() as u64;

        Self {
            lines: lines.to_vec(),
            item_count,
            subtotal,
            taxes_and_fees,
            total: subtotal.saturating_add(taxes_and_fees),
            currency: currency.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What the customer typed into the payment form
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetails {
    pub cardholder_name: String,
    pub card_number: Masked<String>,
    pub expiry_date: String,
    pub cvv: Masked<String>,
}

/// Result of a successful checkout
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: Uuid,
    /// Short code quoted to the customer, e.g. `TE-20241220-1A2B3C4D`
    pub reference: String,
    pub payment_reference: String,
    pub customer_email: String,
    pub summary: OrderSummary,
    pub confirmed_at: DateTime<Utc>,
    pub message: String,
}

impl BookingConfirmation {
    pub const MESSAGE: &'static str = "Booking confirmed! Check your email for details.";

    pub fn new(
        booking_id: Uuid,
        payment_reference: String,
        customer_email: String,
        summary: OrderSummary,
    ) -> Self {
        let confirmed_at = Utc::now();
        Self {
            booking_id,
            reference: booking_reference(&booking_id, confirmed_at),
            payment_reference,
            customer_email,
            summary,
            confirmed_at,
            message: Self::MESSAGE.to_string(),
        }
    }
}

// Format: TE-{yyyymmdd}-{first 8 hex digits of the booking id}
fn booking_reference(booking_id: &Uuid, at: DateTime<Utc>) -> String {
    let short_id = &booking_id.simple().to_string()[..8];
    format!("TE-{}-{}", at.format("%Y%m%d"), short_id.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use travelease_shared::{BookableItem, ItemType};

    fn line(kind: ItemType, id: i64, price: u64, quantity: u32) -> LineItem {
        let mut line = LineItem::first(BookableItem::new(id, kind, price));
        line.quantity = quantity;
        line
    }

    #[test]
    fn test_summary_adds_ten_percent_taxes() {
        let lines = vec![line(ItemType::Flight, 1, 8999, 2)];
        let summary = OrderSummary::from_lines(&lines, 0.1, "INR");

        assert_eq!(summary.subtotal, 17998);
        assert_eq!(summary.taxes_and_fees, 1800);
        assert_eq!(summary.total, 19798);
        assert_eq!(summary.item_count, 2);
    }

    #[test]
    fn test_summary_rounds_half_up() {
        let lines = vec![line(ItemType::Hotel, 1, 15, 1)];
        let summary = OrderSummary::from_lines(&lines, 0.1, "INR");
        assert_eq!(summary.taxes_and_fees, 2);

        let lines = vec![line(ItemType::Hotel, 1, 14, 1)];
        let summary = OrderSummary::from_lines(&lines, 0.1, "INR");
        assert_eq!(summary.taxes_and_fees, 1);
    }

    #[test]
    fn test_empty_summary() {
        let summary = OrderSummary::from_lines(&[], 0.1, "INR");
        assert!(summary.is_empty());
        assert_eq!(summary.total, 0);

        let negative = OrderSummary::from_lines(&[line(ItemType::Flight, 1, 100, 1)], -0.5, "INR");
        assert_eq!(negative.total, 100);
    }

    #[test]
    fn test_summary_saturates_on_huge_prices() {
        let half = u64::MAX / 2 + 1;
        let lines = vec![line(ItemType::Flight, 1, half, 1), line(ItemType::Flight, 2, half, 1)];
        let summary = OrderSummary::from_lines(&lines, 0.1, "INR");

        assert_eq!(summary.subtotal, u64::MAX);
        assert!(summary.taxes_and_fees > 0);
        assert_eq!(summary.total, u64::MAX);
    }

    #[test]
    fn test_booking_reference_format() {
        let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 12, 20, 10, 0, 0).unwrap();
        assert_eq!(booking_reference(&id, at), "TE-20241220-1A2B3C4D");
    }
}
