//! Branch use cases.

use super::common::{like_pattern, require_text};
use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BRANCH_COLUMNS: &str = "id, name, location, manager, phone, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchCreateReq {
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchDto {
    pub id: String,
    pub name: String,
    pub location: String,
    pub manager: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchUpdateReq {
    pub id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
}

fn row_to_branch(row: &Row<'_>) -> rusqlite::Result<BranchDto> {
    Ok(BranchDto {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        manager: row.get(3)?,
        phone: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn branch_create(pool: &DbPool, req: BranchCreateReq) -> Result<BranchDto, AppError> {
    let name = require_text(&req.name, "name")?;
    let location = req.location.unwrap_or_default().trim().to_string();
    let manager = req.manager.unwrap_or_default().trim().to_string();
    let phone = req.phone.unwrap_or_default().trim().to_string();
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO branches (id, name, location, manager, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![id, name, location, manager, phone, &now],
    )?;

    log::debug!("Created branch {} ({})", id, name);
    Ok(BranchDto {
        id,
        name,
        location,
        manager,
        phone,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn branch_get(pool: &DbPool, id: &str) -> Result<BranchDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {} FROM branches WHERE id = ?1", BRANCH_COLUMNS),
        [id],
        row_to_branch,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("branch {}", id)))
}

pub fn branch_list(pool: &DbPool) -> Result<Vec<BranchDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM branches ORDER BY name COLLATE NOCASE, created_at",
        BRANCH_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_branch)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Case-insensitive substring match on name, location or manager.
pub fn branch_search(pool: &DbPool, query: &str) -> Result<Vec<BranchDto>, AppError> {
    let pattern = like_pattern(query);
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM branches
         WHERE name LIKE ?1 ESCAPE '\\' OR location LIKE ?1 ESCAPE '\\' OR manager LIKE ?1 ESCAPE '\\'
         ORDER BY name COLLATE NOCASE, created_at",
        BRANCH_COLUMNS
    ))?;
    let rows = stmt.query_map([&pattern], row_to_branch)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn branch_find_by_name(pool: &DbPool, name: &str) -> Result<Option<BranchDto>, AppError> {
    let conn = get_connection(pool);
    let found = conn
        .query_row(
            &format!(
                "SELECT {} FROM branches WHERE name = ?1 ORDER BY created_at LIMIT 1",
                BRANCH_COLUMNS
            ),
            [name.trim()],
            row_to_branch,
        )
        .optional()?;
    Ok(found)
}

pub fn branch_update(pool: &DbPool, req: BranchUpdateReq) -> Result<BranchDto, AppError> {
    let current = branch_get(pool, &req.id)?;

    let name = match req.name.as_deref() {
        Some(n) => require_text(n, "name")?,
        None => current.name,
    };
    let location = req.location.map(|s| s.trim().to_string()).unwrap_or(current.location);
    let manager = req.manager.map(|s| s.trim().to_string()).unwrap_or(current.manager);
    let phone = req.phone.map(|s| s.trim().to_string()).unwrap_or(current.phone);
    let now = Utc::now().to_rfc3339();

    {
        let conn = get_connection(pool);
        conn.execute(
            "UPDATE branches SET name = ?1, location = ?2, manager = ?3, phone = ?4, updated_at = ?5 WHERE id = ?6",
            params![name, location, manager, phone, now, req.id],
        )?;
    } // release conn before calling branch_get to avoid deadlock

    branch_get(pool, &req.id)
}

pub fn branch_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let changed = conn
        .execute("DELETE FROM branches WHERE id = ?1", [id])
        .map_err(|e| AppError::from_write(e, "branch is still referenced"))?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("branch {}", id)));
    }
    Ok(())
}
