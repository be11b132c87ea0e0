//! Input checks shared by the use cases.

use crate::error::AppError;
use rusqlite::{Connection, OptionalExtension};

/// Trimmed, non-empty text field.
pub(crate) fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

/// Finite, non-negative amount (price, cost, quantity, ...).
pub(crate) fn require_amount(value: f64, field: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value)
}

/// Optional text: trimmed, empty becomes `None`.
pub(crate) fn opt_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn ensure_product(conn: &Connection, id: &str) -> Result<(), AppError> {
    ensure_row(conn, "products", "product", id)
}

pub(crate) fn ensure_branch(conn: &Connection, id: &str) -> Result<(), AppError> {
    ensure_row(conn, "branches", "branch", id)
}

fn ensure_row(conn: &Connection, table: &str, what: &str, id: &str) -> Result<(), AppError> {
    let found = conn
        .query_row(&format!("SELECT 1 FROM {} WHERE id = ?1", table), [id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("{} {}", what, id))),
    }
}

/// `%term%` for LIKE with `\` as escape character.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
