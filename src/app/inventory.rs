//! Monthly inventory counts: one row per (product, branch, month, year).

use super::common::{ensure_branch, ensure_product, require_amount};
use crate::domain::Period;
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const INVENTORY_COLUMNS: &str =
    "id, product_id, branch_id, month, year, quantity, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpsertReq {
    pub product_id: String,
    pub branch_id: String,
    pub month: u32,
    pub year: i32,
    pub quantity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryDto {
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    pub month: u32,
    pub year: i32,
    pub quantity: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryDetailDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_category: String,
    pub measurement_unit: String,
    pub branch_id: String,
    pub branch_name: String,
    pub month: u32,
    pub year: i32,
    pub quantity: f64,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListReq {
    pub branch_id: Option<String>,
    pub product_id: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

fn row_to_inventory(row: &Row<'_>) -> rusqlite::Result<InventoryDto> {
    Ok(InventoryDto {
        id: row.get(0)?,
        product_id: row.get(1)?,
        branch_id: row.get(2)?,
        month: row.get(3)?,
        year: row.get(4)?,
        quantity: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Create the count for a period, or overwrite the quantity if one exists.
/// The row id is stable across updates.
pub fn inventory_upsert(pool: &DbPool, req: InventoryUpsertReq) -> Result<InventoryDto, AppError> {
    let period = Period::new(req.month, req.year)?;
    let quantity = require_amount(req.quantity, "quantity")?;
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    ensure_product(&conn, &req.product_id)?;
    ensure_branch(&conn, &req.branch_id)?;

    conn.execute(
        "INSERT INTO inventory (id, product_id, branch_id, month, year, quantity, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT (product_id, branch_id, month, year)
         DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at",
        params![
            Uuid::new_v4().to_string(),
            req.product_id,
            req.branch_id,
            period.month,
            period.year,
            quantity,
            now
        ],
    )
    .map_err(|e| AppError::from_write(e, "inventory"))?;

    conn.query_row(
        &format!(
            "SELECT {} FROM inventory WHERE product_id = ?1 AND branch_id = ?2 AND month = ?3 AND year = ?4",
            INVENTORY_COLUMNS
        ),
        params![req.product_id, req.branch_id, period.month, period.year],
        row_to_inventory,
    )
    .map_err(AppError::from)
}

pub fn inventory_get(pool: &DbPool, id: &str) -> Result<InventoryDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM inventory WHERE id = ?1", INVENTORY_COLUMNS),
        [id],
        row_to_inventory,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("inventory {}", id)))
}

pub fn inventory_get_by_product_branch_month(
    pool: &DbPool,
    product_id: &str,
    branch_id: &str,
    period: Period,
) -> Result<Option<InventoryDto>, AppError> {
    let conn = get_connection(pool);
    let found = conn
        .query_row(
            &format!(
                "SELECT {} FROM inventory WHERE product_id = ?1 AND branch_id = ?2 AND month = ?3 AND year = ?4",
                INVENTORY_COLUMNS
            ),
            params![product_id, branch_id, period.month, period.year],
            row_to_inventory,
        )
        .optional()?;
    Ok(found)
}

pub fn inventory_get_with_details(pool: &DbPool, id: &str) -> Result<InventoryDetailDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        "SELECT i.id, i.product_id, p.name, p.category, p.measurement_unit,
                i.branch_id, b.name, i.month, i.year, i.quantity, i.updated_at
         FROM inventory i
         JOIN products p ON p.id = i.product_id
         JOIN branches b ON b.id = i.branch_id
         WHERE i.id = ?1",
        [id],
        |r| {
            Ok(InventoryDetailDto {
                id: r.get(0)?,
                product_id: r.get(1)?,
                product_name: r.get(2)?,
                product_category: r.get(3)?,
                measurement_unit: r.get(4)?,
                branch_id: r.get(5)?,
                branch_name: r.get(6)?,
                month: r.get(7)?,
                year: r.get(8)?,
                quantity: r.get(9)?,
                updated_at: r.get(10)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("inventory {}", id)))
}

/// List counts, newest period first. Every filter is optional.
pub fn inventory_list(pool: &DbPool, req: InventoryListReq) -> Result<Vec<InventoryDto>, AppError> {
    let mut where_clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Value> = Vec::new();
    if let Some(branch_id) = req.branch_id {
        where_clauses.push("branch_id = ?");
        args.push(Value::Text(branch_id));
    }
    if let Some(product_id) = req.product_id {
        where_clauses.push("product_id = ?");
        args.push(Value::Text(product_id));
    }
    if let Some(month) = req.month {
        where_clauses.push("month = ?");
        args.push(Value::Integer(month as i64));
    }
    if let Some(year) = req.year {
        where_clauses.push("year = ?");
        args.push(Value::Integer(year as i64));
    }
    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };

    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM inventory {} ORDER BY year DESC, month DESC, created_at",
        INVENTORY_COLUMNS, where_sql
    ))?;
    let rows = stmt.query_map(params_from_iter(args), row_to_inventory)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn inventory_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn.execute("DELETE FROM inventory WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("inventory {}", id)));
    }
    Ok(())
}
