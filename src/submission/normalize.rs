//! Canonical display formats for the identifier fields on the form. Every
//! function is pure and total: malformed input falls back to the raw value,
//! never to an error.

use super::PLACEHOLDER;

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `NN.NNN.NNN/NNNN-NN` for exactly 14 digits; anything else passes through.
pub fn format_cnpj(raw: &str) -> String {
    let digits = digits_of(raw);
    if digits.len() == 14 {
        format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        )
    } else {
        raw.to_string()
    }
}

/// `NNNNN-NNN` from the first 8 digits; shorter input passes through.
pub fn format_cep(raw: &str) -> String {
    let digits = digits_of(raw);
    if digits.len() >= 8 {
        format!("{}-{}", &digits[0..5], &digits[5..8])
    } else {
        raw.to_string()
    }
}

/// Mobile numbers (`11` digits) get a five-digit prefix, landlines (`10`)
/// a four-digit one. Other lengths pass through; empty input renders the
/// placeholder.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_of(raw);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ if raw.trim().is_empty() => PLACEHOLDER.to_string(),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnpj_formats_exactly_fourteen_digits() {
        assert_eq!(format_cnpj("12345678000199"), "12.345.678/0001-99");
        assert_eq!(format_cnpj("12.345.678/0001-99"), "12.345.678/0001-99");
    }

    #[test]
    fn cnpj_passes_other_lengths_through_unchanged() {
        assert_eq!(format_cnpj("1234567800019"), "1234567800019");
        assert_eq!(format_cnpj("123456780001990"), "123456780001990");
        assert_eq!(format_cnpj("abc"), "abc");
        assert_eq!(format_cnpj(""), "");
    }

    #[test]
    fn cep_formats_first_eight_digits() {
        assert_eq!(format_cep("01310100"), "01310-100");
        assert_eq!(format_cep("01310-100"), "01310-100");
        assert_eq!(format_cep("013101009"), "01310-100");
    }

    #[test]
    fn cep_passes_short_input_through() {
        assert_eq!(format_cep("0131010"), "0131010");
        assert_eq!(format_cep(""), "");
    }

    #[test]
    fn phone_formats_mobile_and_landline_lengths() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
    }

    #[test]
    fn phone_falls_back_for_other_lengths() {
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone(""), "-");
        assert_eq!(format_phone("   "), "-");
    }
}
