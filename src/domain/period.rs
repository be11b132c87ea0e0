//! Monthly inventory period.

use crate::error::AppError;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(1900..=9999).contains(&year) {
            return Err(AppError::Validation(format!(
                "year must be between 1900 and 9999, got {}",
                year
            )));
        }
        Ok(Self { month, year })
    }

    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse_year_month(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        let year = y.parse().ok()?;
        let month = m.parse().ok()?;
        Self::new(month, year).ok()
    }
}

/// Validate a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", s)))
}

pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_month() {
        assert!(Period::new(0, 2024).is_err());
        assert!(Period::new(13, 2024).is_err());
        assert!(Period::new(12, 2024).is_ok());
    }

    #[test]
    fn parse_year_month() {
        assert_eq!(
            Period::parse_year_month("2024-03"),
            Some(Period { month: 3, year: 2024 })
        );
        assert_eq!(Period::parse_year_month("2024-13"), None);
        assert_eq!(Period::parse_year_month("march"), None);
    }

    #[test]
    fn parse_date_requires_iso_format() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("05/03/2024").is_err());
    }
}
