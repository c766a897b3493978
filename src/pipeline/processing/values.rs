use crate::constants::PLACEHOLDER_VALUE;
use crate::error::ParseError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Everything that cannot be part of a Brazilian-formatted amount
static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.,\-]").expect("static money regex is valid"));

/// Parse a `DD/MM/YYYY` sync date. Single-digit day and month are accepted,
/// the year must have four digits.
pub fn parse_sync_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();
    let invalid = || ParseError::Date(trimmed.to_string());

    // chrono's %Y also takes "24" as year 24
    let year = trimmed.rsplit('/').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").map_err(|_| invalid())
}

/// `YYYY-MM` bucket for a date.
pub fn month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parse a currency cell such as `R$ 1.234,56`.
///
/// Returns `Ok(None)` for empty cells and the `-` placeholder (also `R$ -`).
/// `.` is read as a thousands separator and `,` as the decimal mark.
pub fn parse_money(raw: &str) -> Result<Option<f64>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER_VALUE {
        return Ok(None);
    }

    let cleaned = NON_NUMERIC.replace_all(trimmed, "");
    if cleaned == PLACEHOLDER_VALUE {
        return Ok(None);
    }

    let normalized = cleaned.replace('.', "").replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ParseError::Money(trimmed.to_string())),
    }
}

/// Parse a whole number of days. An empty cell counts as zero.
pub fn parse_days(raw: &str) -> Result<i64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ParseError::Integer(trimmed.to_string()))
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_brazilian_format() {
        assert_eq!(parse_money("R$ 1.234,56").unwrap(), Some(1234.56));
        assert_eq!(parse_money("R$ 1.000.000,00").unwrap(), Some(1_000_000.0));
        assert_eq!(parse_money("  350,5 ").unwrap(), Some(350.5));
        assert_eq!(parse_money("-R$ 20,00").unwrap(), Some(-20.0));
        assert_eq!(parse_money("1.500").unwrap(), Some(1500.0));
    }

    #[test]
    fn test_parse_money_placeholders() {
        assert_eq!(parse_money("-").unwrap(), None);
        assert_eq!(parse_money(" - ").unwrap(), None);
        assert_eq!(parse_money("R$ -").unwrap(), None);
        assert_eq!(parse_money("").unwrap(), None);
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert_eq!(parse_money("a combinar"), Err(ParseError::Money("a combinar".to_string())));
        assert!(parse_money("1,2,3").is_err());
        assert!(parse_money("R$ 10-20").is_err());
    }

    #[test]
    fn test_parse_sync_date() {
        let date = parse_sync_date("05/03/2024").unwrap();
        assert_eq!(month_key(&date), "2024-03");

        let short = parse_sync_date("5/3/2024").unwrap();
        assert_eq!(short, date);

        assert!(parse_sync_date("2024-03-05").is_err());
        assert!(parse_sync_date("31/02/2024").is_err());
        assert!(parse_sync_date("").is_err());
    }

    #[test]
    fn test_parse_sync_date_needs_four_digit_year() {
        assert_eq!(parse_sync_date("10/01/24"), Err(ParseError::Date("10/01/24".to_string())));
        assert!(parse_sync_date("10/01/024").is_err());
        assert!(parse_sync_date("10/01/+2024").is_err());
        assert!(parse_sync_date("10/01/20245").is_err());
        assert_eq!(month_key(&parse_sync_date(" 10/01/2024 ").unwrap()), "2024-01");
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days("12").unwrap(), 12);
        assert_eq!(parse_days(" ").unwrap(), 0);
        assert!(parse_days("-").is_err());
        assert!(parse_days("3,5").is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
        assert_eq!(round_to(7.0 / 3.0, 1), 2.3);
    }
}
