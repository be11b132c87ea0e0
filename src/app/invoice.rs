//! Invoice use cases. An invoice may be tied to a branch or stand alone.

use super::common::{ensure_branch, opt_text, require_amount, require_text};
use crate::domain::{parse_date, today};
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const INVOICE_COLUMNS: &str = "id, invoice_number, branch_id, supplier, total_amount, invoice_date, note, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreateReq {
    pub invoice_number: String,
    pub branch_id: Option<String>,
    pub supplier: Option<String>,
    pub total_amount: f64,
    /// `YYYY-MM-DD`; defaults to today.
    pub invoice_date: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
    pub id: String,
    pub invoice_number: String,
    pub branch_id: Option<String>,
    pub supplier: String,
    pub total_amount: f64,
    pub invoice_date: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdateReq {
    pub id: String,
    pub invoice_number: Option<String>,
    pub supplier: Option<String>,
    pub total_amount: Option<f64>,
    pub invoice_date: Option<String>,
    pub note: Option<String>,
}

fn row_to_invoice(row: &Row<'_>) -> rusqlite::Result<InvoiceDto> {
    Ok(InvoiceDto {
        id: row.get(0)?,
        invoice_number: row.get(1)?,
        branch_id: row.get(2)?,
        supplier: row.get(3)?,
        total_amount: row.get(4)?,
        invoice_date: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn invoice_create(pool: &DbPool, req: InvoiceCreateReq) -> Result<InvoiceDto, AppError> {
    let invoice_number = require_text(&req.invoice_number, "invoice_number")?;
    let total_amount = require_amount(req.total_amount, "total_amount")?;
    let invoice_date = match req.invoice_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => today(),
    };
    let branch_id = opt_text(req.branch_id);
    let supplier = req.supplier.unwrap_or_default().trim().to_string();
    let note = req.note.unwrap_or_default();
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    if let Some(branch_id) = &branch_id {
        ensure_branch(&conn, branch_id)?;
    }
    conn.execute(
        "INSERT INTO invoices (id, invoice_number, branch_id, supplier, total_amount, invoice_date, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![id, invoice_number, branch_id, supplier, total_amount, invoice_date, note, &now],
    )?;

    Ok(InvoiceDto {
        id,
        invoice_number,
        branch_id,
        supplier,
        total_amount,
        invoice_date,
        note,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn invoice_get(pool: &DbPool, id: &str) -> Result<InvoiceDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM invoices WHERE id = ?1", INVOICE_COLUMNS),
        [id],
        row_to_invoice,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("invoice {}", id)))
}

pub fn invoice_list(pool: &DbPool, branch_id: Option<&str>) -> Result<Vec<InvoiceDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM invoices WHERE (?1 IS NULL OR branch_id = ?1) ORDER BY invoice_date DESC, created_at DESC",
        INVOICE_COLUMNS
    ))?;
    let rows = stmt.query_map([branch_id], row_to_invoice)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn invoice_update(pool: &DbPool, req: InvoiceUpdateReq) -> Result<InvoiceDto, AppError> {
    let current = invoice_get(pool, &req.id)?;

    let invoice_number = match req.invoice_number.as_deref() {
        Some(n) => require_text(n, "invoice_number")?,
        None => current.invoice_number,
    };
    let total_amount = match req.total_amount {
        Some(a) => require_amount(a, "total_amount")?,
        None => current.total_amount,
    };
    let invoice_date = match req.invoice_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => current.invoice_date,
    };
    let supplier = req.supplier.map(|s| s.trim().to_string()).unwrap_or(current.supplier);
    let note = req.note.unwrap_or(current.note);
    let now = Utc::now().to_rfc3339();

    {
        let conn = get_connection(pool);
        conn.execute(
            "UPDATE invoices SET invoice_number = ?1, supplier = ?2, total_amount = ?3, invoice_date = ?4, note = ?5, updated_at = ?6 WHERE id = ?7",
            params![invoice_number, supplier, total_amount, invoice_date, note, now, req.id],
        )?;
    }

    invoice_get(pool, &req.id)
}

pub fn invoice_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn.execute("DELETE FROM invoices WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("invoice {}", id)));
    }
    Ok(())
}
