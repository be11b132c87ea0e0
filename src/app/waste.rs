//! Waste use cases.

use super::common::{ensure_branch, ensure_product, require_amount};
use crate::domain::{parse_date, today};
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const WASTE_COLUMNS: &str =
    "id, product_id, branch_id, quantity, reason, waste_date, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteCreateReq {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: f64,
    pub reason: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub waste_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WasteDto {
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    pub quantity: f64,
    pub reason: String,
    pub waste_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteUpdateReq {
    pub id: String,
    pub quantity: Option<f64>,
    pub reason: Option<String>,
    pub waste_date: Option<String>,
}

fn row_to_waste(row: &Row<'_>) -> rusqlite::Result<WasteDto> {
    Ok(WasteDto {
        id: row.get(0)?,
        product_id: row.get(1)?,
        branch_id: row.get(2)?,
        quantity: row.get(3)?,
        reason: row.get(4)?,
        waste_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn waste_create(pool: &DbPool, req: WasteCreateReq) -> Result<WasteDto, AppError> {
    let quantity = require_amount(req.quantity, "quantity")?;
    let waste_date = match req.waste_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => today(),
    };
    let reason = req.reason.unwrap_or_default().trim().to_string();
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    ensure_product(&conn, &req.product_id)?;
    ensure_branch(&conn, &req.branch_id)?;
    conn.execute(
        "INSERT INTO waste (id, product_id, branch_id, quantity, reason, waste_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![id, req.product_id, req.branch_id, quantity, reason, waste_date, &now],
    )?;

    Ok(WasteDto {
        id,
        product_id: req.product_id,
        branch_id: req.branch_id,
        quantity,
        reason,
        waste_date,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn waste_get(pool: &DbPool, id: &str) -> Result<WasteDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM waste WHERE id = ?1", WASTE_COLUMNS),
        [id],
        row_to_waste,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("waste {}", id)))
}

/// Newest first, optionally limited to one branch.
pub fn waste_list(pool: &DbPool, branch_id: Option<&str>) -> Result<Vec<WasteDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM waste WHERE (?1 IS NULL OR branch_id = ?1) ORDER BY waste_date DESC, created_at DESC",
        WASTE_COLUMNS
    ))?;
    let rows = stmt.query_map([branch_id], row_to_waste)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn waste_update(pool: &DbPool, req: WasteUpdateReq) -> Result<WasteDto, AppError> {
    let current = waste_get(pool, &req.id)?;

    let quantity = match req.quantity {
        Some(q) => require_amount(q, "quantity")?,
        None => current.quantity,
    };
    let waste_date = match req.waste_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => current.waste_date,
    };
    let reason = req.reason.map(|s| s.trim().to_string()).unwrap_or(current.reason);
    let now = Utc::now().to_rfc3339();

    {
        let conn = get_connection(pool);
        conn.execute(
            "UPDATE waste SET quantity = ?1, reason = ?2, waste_date = ?3, updated_at = ?4 WHERE id = ?5",
            params![quantity, reason, waste_date, now, req.id],
        )?;
    }

    waste_get(pool, &req.id)
}

pub fn waste_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn.execute("DELETE FROM waste WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("waste {}", id)));
    }
    Ok(())
}
