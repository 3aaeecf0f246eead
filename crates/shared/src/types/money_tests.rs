use super::*;
use rstest::rstest;
use rust_decimal_macros::dec;
use std::str::FromStr;

fn eur() -> CurrencyCode {
    CurrencyCode::from_str("EUR").unwrap()
}

#[test]
fn test_currency_code_display() {
    assert_eq!(eur().to_string(), "EUR");
}

#[test]
fn test_currency_code_normalizes_case() {
    let code = CurrencyCode::from_str(" usd ").unwrap();
    assert_eq!(code.as_str(), "USD");
    assert_eq!(code, "usd".parse().unwrap());
}

#[rstest]
#[case("")]
#[case("EU")]
#[case("EURO")]
#[case("E1R")]
fn test_currency_code_rejects(#[case] raw: &str) {
    assert!(CurrencyCode::from_str(raw).is_err());
}

#[test]
fn test_currency_code_serde_roundtrip() {
    let code: CurrencyCode = serde_json::from_str("\"try\"").unwrap();
    assert_eq!(code.as_str(), "TRY");
    assert_eq!(serde_json::to_string(&code).unwrap(), "\"TRY\"");
}

#[rstest]
#[case(dec!(2.345), dec!(2.35))]
#[case(dec!(2.344), dec!(2.34))]
#[case(dec!(-2.345), dec!(-2.35))]
#[case(dec!(0.005), dec!(0.01))]
#[case(dec!(100), dec!(100))]
fn test_round_money_is_half_away_from_zero(#[case] input: Decimal, #[case] expected: Decimal) {
    assert_eq!(round_money(input), expected);
}
