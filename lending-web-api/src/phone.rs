/// Phone normalisation for the two upstream providers. The gateway
/// wants `+254XXXXXXXXX`, the SMS API wants the bare `254XXXXXXXXX`.

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn format_gateway_phone(raw: &str) -> String {
    let digits = digits_of(raw);
    if let Some(rest) = digits.strip_prefix('0') {
        format!("+254{}", rest)
    } else if digits.starts_with("254") {
        format!("+{}", digits)
    } else {
        format!("+254{}", digits)
    }
}

pub fn format_sms_phone(raw: &str) -> String {
    let digits = digits_of(raw);
    if let Some(rest) = digits.strip_prefix('0') {
        format!("254{}", rest)
    } else if digits.starts_with("254") {
        digits
    } else {
        format!("254{}", digits)
    }
}

pub fn is_valid_phone(raw: &str) -> bool {
    digits_of(raw).len() >= 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_format_gets_country_code() {
        assert_eq!(format_gateway_phone("0712345678"), "+254712345678");
        assert_eq!(format_sms_phone("0712345678"), "254712345678");
    }

    #[test]
    fn international_format_passes_through() {
        assert_eq!(format_gateway_phone("+254712345678"), "+254712345678");
        assert_eq!(format_gateway_phone("254712345678"), "+254712345678");
        assert_eq!(format_sms_phone("254712345678"), "254712345678");
    }

    #[test]
    fn bare_subscriber_number_is_prefixed() {
        assert_eq!(format_gateway_phone("712345678"), "+254712345678");
        assert_eq!(format_sms_phone("712345678"), "254712345678");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(format_gateway_phone("0712-345 678"), "+254712345678");
    }

    #[test]
    fn short_numbers_are_invalid() {
        assert!(!is_valid_phone("12345"));
        assert!(is_valid_phone("0712345678"));
    }
}
