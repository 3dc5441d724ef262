use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Operator input the shell refuses before anything reaches the store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Quantity must be a whole number greater than zero, got '{0}'")]
    Quantity(String),
    #[error("Stock must be a whole number, got '{0}'")]
    Stock(String),
    #[error("Invalid price '{0}'")]
    Price(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

pub fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(ValidationError::Quantity(raw.trim().to_string())),
    }
}

/// Initial stock; blank means none on hand.
pub fn parse_stock(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>().map_err(|_| ValidationError::Stock(raw.to_string()))
}

/// Accepts `,` as the decimal separator.
pub fn parse_price(raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    Decimal::from_str(&raw.replace(',', ".")).map_err(|_| ValidationError::Price(raw.to_string()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::Date(raw.to_string()))
}

pub fn required(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_must_be_positive() {
        assert_eq!(parse_quantity(" 3 "), Ok(3));
        assert_eq!(parse_quantity("0"), Err(ValidationError::Quantity("0".into())));
        assert!(parse_quantity("-2").is_err());
        assert!(parse_quantity("two").is_err());
    }

    #[test]
    fn test_price_accepts_comma() {
        assert_eq!(parse_price("12,50"), Ok(Decimal::new(1250, 2)));
        assert_eq!(parse_price("7.1"), Ok(Decimal::new(71, 1)));
        assert!(parse_price("cheap").is_err());
    }

    #[test]
    fn test_blank_stock_is_zero() {
        assert_eq!(parse_stock(""), Ok(0));
        assert_eq!(parse_stock("15"), Ok(15));
        assert!(parse_stock("-1").is_err());
    }

    #[test]
    fn test_date_format() {
        assert_eq!(parse_date("2024-03-09"), Ok(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
        assert!(parse_date("09/03/2024").is_err());
        assert_eq!(required("Code", "  "), Err(ValidationError::Empty("Code")));
    }
}
