//! Minor-unit amount formatting for the gateway's decimal-string fields.

use rust_decimal::Decimal;

/// Decimal exponent of an ISO-4217 currency code.
fn exponent(currency: &str) -> u32 {
    match currency {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
        | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// Formats an amount in minor units as the gateway's decimal string.
///
/// `(1000, "USD")` becomes `"10.00"`; zero-exponent currencies keep the raw
/// figure, so `(1000, "JPY")` stays `"1000"`.
#[must_use]
pub fn format_minor_units(amount: i64, currency: &str) -> String {
    Decimal::new(amount, exponent(currency)).to_string()
}

#[cfg(test)]
mod tests {
    use super::format_minor_units;

    #[test]
    fn two_exponent_currencies_get_a_decimal_point() {
        assert_eq!(format_minor_units(1000, "USD"), "10.00");
        assert_eq!(format_minor_units(5, "EUR"), "0.05");
    }

    #[test]
    fn zero_exponent_currencies_keep_the_raw_figure() {
        assert_eq!(format_minor_units(1000, "JPY"), "1000");
    }

    #[test]
    fn three_exponent_currencies_get_three_places() {
        assert_eq!(format_minor_units(1500, "BHD"), "1.500");
    }
}
