//! Parsování kurzů a částek z lokalizovaného textu stránky

use regex::Regex;
use std::sync::OnceLock;

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid number regex"))
}

/// Decimální kurz z textu typu "1,45" / "1.45" / " 2.10 ".
/// Vrací `None` pro cokoli, co není konečné kladné číslo.
pub fn parse_decimal_odd(text: &str) -> Option<f64> {
    let raw = number_re().find(text.trim())?.as_str();
    let value: f64 = raw.replace(',', ".").parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Zůstatek / částka z textu typu "FCFA 1 490,50" nebo "FCFA 2,350.00".
///
/// Poslední oddělovač s max. dvěma číslicemi za ním je desetinný,
/// ostatní tečky, čárky a mezery jsou oddělovače tisíců.
pub fn parse_amount(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' ' | '\u{a0}'))
        .filter(|c| !c.is_whitespace())
        .collect();
    let digits = digits.trim_end_matches(['.', ',']);
    if digits.is_empty() {
        return None;
    }

    let normalized = match digits.rfind(['.', ',']) {
        Some(pos) if digits.len() - pos - 1 <= 2 => {
            let (int_part, frac_part) = digits.split_at(pos);
            let int_part: String = int_part.chars().filter(char::is_ascii_digit).collect();
            format!("{}.{}", int_part, &frac_part[1..])
        }
        _ => digits.chars().filter(char::is_ascii_digit).collect(),
    };

    let value: f64 = normalized.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Součin kurzů kombinovaného tiketu
pub fn combined_odds(odds: &[f64]) -> f64 {
    odds.iter().product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_dot_decimals() {
        assert_eq!(parse_decimal_odd("1,45"), Some(1.45));
        assert_eq!(parse_decimal_odd(" 2.10 "), Some(2.10));
        assert_eq!(parse_decimal_odd("@1.9"), Some(1.9));
    }

    #[test]
    fn rejects_unparsable_and_non_positive_odds() {
        assert_eq!(parse_decimal_odd(""), None);
        assert_eq!(parse_decimal_odd("—"), None);
        assert_eq!(parse_decimal_odd("0"), None);
        assert_eq!(parse_decimal_odd("0,00"), None);
    }

    #[test]
    fn parses_balance_formats() {
        assert_eq!(parse_amount("FCFA 490.00"), Some(490.0));
        assert_eq!(parse_amount("FCFA 1 490,50"), Some(1490.5));
        assert_eq!(parse_amount("2,350.00 XAF"), Some(2350.0));
        assert_eq!(parse_amount("1.234"), Some(1234.0));
        assert_eq!(parse_amount("Balance"), None);
    }

    #[test]
    fn combined_odds_is_product() {
        let total = combined_odds(&[1.4, 1.5, 2.0]);
        assert!((total - 4.2).abs() < 1e-9);
        assert_eq!(combined_odds(&[]), 1.0);
    }
}
