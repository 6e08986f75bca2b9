use crate::models::PaymentDetails;

const MAX_CARD_DIGITS: usize = 16;

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Normalise card number input as the customer types: digits only, at most
/// 16 of them, grouped in fours.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = digits(input).chars().take(MAX_CARD_DIGITS).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalise expiry input to `MM/YY`.
pub fn format_expiry_date(input: &str) -> String {
    let digits = digits(input);
    if digits.len() >= 2 {
        let year: String = digits.chars().skip(2).take(2).collect();
        format!("{}/{}", &digits[..2], year)
    } else {
        digits
    }
}

/// Check the form before any money moves. Returns the first problem found.
pub fn validate(details: &PaymentDetails) -> Result<(), String> {
    if details.cardholder_name.trim().is_empty() {
        return Err("Cardholder name is required".to_string());
    }

    let card_digits = digits(details.card_number.expose()).len();
    if !(12..=19).contains(&card_digits) {
        return Err("Card number must have between 12 and 19 digits".to_string());
    }

    let expiry = format_expiry_date(&details.expiry_date);
    let month = expiry.get(..2).and_then(|m| m.parse::<u32>().ok());
    if expiry.len() != 5 || !matches!(month, Some(1..=12)) {
        return Err("Expiry date must be MM/YY".to_string());
    }

    let cvv = details.cvv.expose();
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err("CVV must be 3 or 4 digits".to_string());
    }

    Ok(())
}
