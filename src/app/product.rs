//! Product use cases.

use super::common::{like_pattern, opt_text, require_amount, require_text};
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, category, price, cost, measurement_unit, barcode, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateReq {
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub cost: f64,
    pub measurement_unit: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub cost: f64,
    pub measurement_unit: String,
    pub barcode: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update; `None` keeps the stored value. `barcode: Some("")` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateReq {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub measurement_unit: Option<String>,
    pub barcode: Option<String>,
}

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<ProductDto> {
    Ok(ProductDto {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        cost: row.get(4)?,
        measurement_unit: row.get(5)?,
        barcode: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn product_create(pool: &DbPool, req: ProductCreateReq) -> Result<ProductDto, AppError> {
    let name = require_text(&req.name, "name")?;
    let price = require_amount(req.price, "price")?;
    let cost = require_amount(req.cost, "cost")?;
    let category = req.category.unwrap_or_default().trim().to_string();
    let measurement_unit = req.measurement_unit.unwrap_or_default().trim().to_string();
    let barcode = opt_text(req.barcode);
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO products (id, name, category, price, cost, measurement_unit, barcode, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![id, name, category, price, cost, measurement_unit, barcode, &now],
    )
    .map_err(|e| AppError::from_write(e, "barcode already in use"))?;

    log::debug!("Created product {} ({})", id, name);
    Ok(ProductDto {
        id,
        name,
        category,
        price,
        cost,
        measurement_unit,
        barcode,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn product_get(pool: &DbPool, id: &str) -> Result<ProductDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
        [id],
        row_to_product,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
}

pub fn product_list(pool: &DbPool) -> Result<Vec<ProductDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products ORDER BY name COLLATE NOCASE, created_at",
        PRODUCT_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_product)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Case-insensitive substring match on name, category or barcode.
pub fn product_search(pool: &DbPool, query: &str) -> Result<Vec<ProductDto>, AppError> {
    let pattern = like_pattern(query);
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products
         WHERE name LIKE ?1 ESCAPE '\\' OR category LIKE ?1 ESCAPE '\\' OR barcode LIKE ?1 ESCAPE '\\'
         ORDER BY name COLLATE NOCASE, created_at",
        PRODUCT_COLUMNS
    ))?;
    let rows = stmt.query_map([&pattern], row_to_product)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Oldest product with exactly this (trimmed) name.
pub fn product_find_by_name(pool: &DbPool, name: &str) -> Result<Option<ProductDto>, AppError> {
    let conn = get_connection(pool);
    let found = conn
        .query_row(
            &format!(
                "SELECT {} FROM products WHERE name = ?1 ORDER BY created_at LIMIT 1",
                PRODUCT_COLUMNS
            ),
            [name.trim()],
            row_to_product,
        )
        .optional()?;
    Ok(found)
}

pub fn product_update(pool: &DbPool, req: ProductUpdateReq) -> Result<ProductDto, AppError> {
    let current = product_get(pool, &req.id)?;

    let name = match req.name.as_deref() {
        Some(n) => require_text(n, "name")?,
        None => current.name,
    };
    let price = match req.price {
        Some(p) => require_amount(p, "price")?,
        None => current.price,
    };
    let cost = match req.cost {
        Some(c) => require_amount(c, "cost")?,
        None => current.cost,
    };
    let category = req
        .category
        .map(|s| s.trim().to_string())
        .unwrap_or(current.category);
    let measurement_unit = req
        .measurement_unit
        .map(|s| s.trim().to_string())
        .unwrap_or(current.measurement_unit);
    let barcode = match req.barcode {
        Some(b) => opt_text(Some(b)),
        None => current.barcode,
    };
    let now = Utc::now().to_rfc3339();

    {
        let conn = get_connection(pool);
        conn.execute(
            "UPDATE products SET name = ?1, category = ?2, price = ?3, cost = ?4, measurement_unit = ?5, barcode = ?6, updated_at = ?7 WHERE id = ?8",
            params![name, category, price, cost, measurement_unit, barcode, now, req.id],
        )
        .map_err(|e| AppError::from_write(e, "barcode already in use"))?;
    } // release conn before calling product_get to avoid deadlock

    product_get(pool, &req.id)
}

pub fn product_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn
        .execute("DELETE FROM products WHERE id = ?1", [id])
        .map_err(|e| AppError::from_write(e, "product is still referenced"))?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("product {}", id)));
    }
    Ok(())
}
