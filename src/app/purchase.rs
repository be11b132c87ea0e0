//! Purchase use cases.

use super::common::{ensure_branch, ensure_product, require_amount};
use crate::domain::{parse_date, today};
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PURCHASE_COLUMNS: &str = "id, product_id, branch_id, quantity, unit_cost, supplier, purchase_date, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreateReq {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: f64,
    pub unit_cost: Option<f64>,
    pub supplier: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub purchase_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDto {
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub supplier: String,
    pub purchase_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PurchaseDto {
    pub fn total_cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseUpdateReq {
    pub id: String,
    pub quantity: Option<f64>,
    pub unit_cost: Option<f64>,
    pub supplier: Option<String>,
    pub purchase_date: Option<String>,
}

fn row_to_purchase(row: &Row<'_>) -> rusqlite::Result<PurchaseDto> {
    Ok(PurchaseDto {
        id: row.get(0)?,
        product_id: row.get(1)?,
        branch_id: row.get(2)?,
        quantity: row.get(3)?,
        unit_cost: row.get(4)?,
        supplier: row.get(5)?,
        purchase_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn purchase_create(pool: &DbPool, req: PurchaseCreateReq) -> Result<PurchaseDto, AppError> {
    let quantity = require_amount(req.quantity, "quantity")?;
    let unit_cost = require_amount(req.unit_cost.unwrap_or(0.0), "unit_cost")?;
    let purchase_date = match req.purchase_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => today(),
    };
    let supplier = req.supplier.unwrap_or_default().trim().to_string();
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    ensure_product(&conn, &req.product_id)?;
    ensure_branch(&conn, &req.branch_id)?;
    conn.execute(
        "INSERT INTO purchases (id, product_id, branch_id, quantity, unit_cost, supplier, purchase_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![id, req.product_id, req.branch_id, quantity, unit_cost, supplier, purchase_date, &now],
    )?;

    Ok(PurchaseDto {
        id,
        product_id: req.product_id,
        branch_id: req.branch_id,
        quantity,
        unit_cost,
        supplier,
        purchase_date,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn purchase_get(pool: &DbPool, id: &str) -> Result<PurchaseDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM purchases WHERE id = ?1", PURCHASE_COLUMNS),
        [id],
        row_to_purchase,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("purchase {}", id)))
}

pub fn purchase_list(pool: &DbPool, branch_id: Option<&str>) -> Result<Vec<PurchaseDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM purchases WHERE (?1 IS NULL OR branch_id = ?1) ORDER BY purchase_date DESC, created_at DESC",
        PURCHASE_COLUMNS
    ))?;
    let rows = stmt.query_map([branch_id], row_to_purchase)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn purchase_update(pool: &DbPool, req: PurchaseUpdateReq) -> Result<PurchaseDto, AppError> {
    let current = purchase_get(pool, &req.id)?;

    let quantity = match req.quantity {
        Some(q) => require_amount(q, "quantity")?,
        None => current.quantity,
    };
    let unit_cost = match req.unit_cost {
        Some(c) => require_amount(c, "unit_cost")?,
        None => current.unit_cost,
    };
    let purchase_date = match req.purchase_date {
        Some(d) => parse_date(&d)?.format("%Y-%m-%d").to_string(),
        None => current.purchase_date,
    };
    let supplier = req.supplier.map(|s| s.trim().to_string()).unwrap_or(current.supplier);
    let now = Utc::now().to_rfc3339();

    {
        let conn = get_connection(pool);
        conn.execute(
            "UPDATE purchases SET quantity = ?1, unit_cost = ?2, supplier = ?3, purchase_date = ?4, updated_at = ?5 WHERE id = ?6",
            params![quantity, unit_cost, supplier, purchase_date, now, req.id],
        )?;
    }

    purchase_get(pool, &req.id)
}

pub fn purchase_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn.execute("DELETE FROM purchases WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("purchase {}", id)));
    }
    Ok(())
}
