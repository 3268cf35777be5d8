use crate::form::parse_amount;

pub const RUPEE: &str = "₹";

/// Rupee amount with two decimals and Indian digit grouping
/// (`1234567.0` -> `₹12,34,567.00`). Negatives put the minus before the sign.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{RUPEE}NaN");
    }
    if amount < 0.0 {
        return format!("-{RUPEE}{}", format_magnitude(-amount));
    }
    format!("{RUPEE}{}", format_magnitude(amount))
}

fn format_magnitude(value: f64) -> String {
    if value.is_infinite() {
        return "∞".to_string();
    }
    let (whole, fraction) = round_to_cents(value.abs());
    format!("{}.{}", group_indian(&whole), fraction)
}

/// Rounds half away from zero on the shortest decimal form of `value`,
/// so `10.125` gives `10.13` and `1.005` gives `1.01`.
fn round_to_cents(value: f64) -> (String, String) {
    let shortest = value.to_string();
    let (whole, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let mut digits = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|digit| digit - b'0')
        .collect::<Vec<u8>>();

    if fraction.as_bytes().get(2).is_some_and(|digit| *digit >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let text = digits
        .iter()
        .map(|digit| char::from(b'0' + digit))
        .collect::<String>();
    let (whole, cents) = text.split_at(text.len() - 2);
    (whole.to_string(), cents.to_string())
}

/// Templates sometimes pass the amount as text, e.g. straight from a data
/// attribute.
pub fn format_currency_text(raw: &str) -> String {
    format_currency(parse_amount(raw).unwrap_or(f64::NAN))
}

/// Last three digits, then pairs: 1234567 -> 12,34,567.
fn group_indian(digits: &str) -> String {
    let reversed = digits.chars().rev().collect::<Vec<char>>();
    let mut out = Vec::with_capacity(reversed.len() + reversed.len() / 2);
    for (i, ch) in reversed.iter().enumerate() {
        if i == 3 || (i > 3 && (i - 3) % 2 == 0) {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_the_reference_amounts() {
        assert_eq!(format_currency(1234.5), "₹1,234.50");
        assert_eq!(format_currency(-1234.5), "-₹1,234.50");
    }

    #[test]
    fn groups_digits_the_indian_way() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.0), "₹999.00");
        assert_eq!(format_currency(1000.0), "₹1,000.00");
        assert_eq!(format_currency(100000.0), "₹1,00,000.00");
        assert_eq!(format_currency(1234567.0), "₹12,34,567.00");
        assert_eq!(format_currency(123456789.25), "₹12,34,56,789.25");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_currency(10.004), "₹10.00");
        assert_eq!(format_currency(10.006), "₹10.01");
        assert_eq!(format_currency(0.1 + 0.2), "₹0.30");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_currency(10.125), "₹10.13");
        assert_eq!(format_currency(0.125), "₹0.13");
        assert_eq!(format_currency(1234.625), "₹1,234.63");
        assert_eq!(format_currency(-1234.625), "-₹1,234.63");
        assert_eq!(format_currency(1.005), "₹1.01");
    }

    #[test]
    fn rounding_carries_into_the_whole_part() {
        assert_eq!(format_currency(9.995), "₹10.00");
        assert_eq!(format_currency(99999.999), "₹1,00,000.00");
        assert_eq!(format_currency(0.004), "₹0.00");
    }

    #[test]
    fn numeric_text_is_formatted_like_a_number() {
        assert_eq!(format_currency_text("1234.5"), "₹1,234.50");
        assert_eq!(format_currency_text(" -1234.5 "), "-₹1,234.50");
        assert_eq!(format_currency_text("abc"), "₹NaN");
        assert_eq!(format_currency_text(""), "₹NaN");
    }

    #[test]
    fn negative_output_mirrors_the_absolute_value() {
        for amount in [0.5, 7.0, 1234.5, 98765.432, 10000000.0] {
            let positive = format_currency(amount);
            let negative = format_currency(-amount);
            assert!(positive.starts_with('₹'));
            assert!(negative.starts_with("-₹"));
            assert_eq!(&negative[1..], positive.as_str());

            let decimals = positive.rsplit_once('.').map(|(_, d)| d.len());
            assert_eq!(decimals, Some(2), "{positive}");
        }
    }

    #[test]
    fn negative_zero_is_not_negative() {
        assert_eq!(format_currency(-0.0), "₹0.00");
    }

    #[test]
    fn non_finite_values_stay_readable() {
        assert_eq!(format_currency(f64::NAN), "₹NaN");
        assert_eq!(format_currency(f64::INFINITY), "₹∞");
        assert_eq!(format_currency(f64::NEG_INFINITY), "-₹∞");
    }
}
