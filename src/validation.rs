//! End-to-end smoke check of the persistence API.
//!
//! Each group drives a scripted create/read/update/delete sequence and fails on
//! the first unexpected result. A failing group does not stop the others.

use crate::app::{
    branch_create, branch_delete, branch_get, branch_update, inventory_delete, inventory_get,
    inventory_get_by_product_branch_month, inventory_get_with_details, inventory_list,
    inventory_upsert, product_create, product_delete, product_get, product_list, product_search,
    product_update, BranchCreateReq, BranchUpdateReq, InventoryListReq, InventoryUpsertReq,
    ProductCreateReq, ProductUpdateReq,
};
use crate::domain::Period;
use crate::error::AppError;
use crate::infra::DbPool;
use chrono::Local;
use rand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const LOAD_RECORDS: usize = 100;
pub const MAX_CREATION: Duration = Duration::from_secs(5);
pub const MAX_RETRIEVAL: Duration = Duration::from_secs(2);
pub const MAX_CLEANUP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct GroupResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub started_at: String,
    pub groups: Vec<GroupResult>,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.groups.iter().all(|g| g.passed)
    }
}

type Check = fn(&DbPool) -> Result<String, AppError>;

const GROUPS: &[(&str, Check)] = &[
    ("Product Operations", check_products),
    ("Branch Operations", check_branches),
    ("Inventory Operations", check_inventory),
    ("Load Performance", check_load_performance),
];

pub fn run_validation(pool: &DbPool) -> ValidationReport {
    let started_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut groups = Vec::with_capacity(GROUPS.len());
    for &(name, check) in GROUPS {
        log::info!("Running validation group: {}", name);
        let (passed, detail) = match check(pool) {
            Ok(detail) => (true, detail),
            Err(e) => {
                log::error!("{} failed: {}", name, e);
                (false, e.to_string())
            }
        };
        groups.push(GroupResult {
            name,
            passed,
            detail,
        });
    }
    ValidationReport { started_at, groups }
}

fn ensure(cond: bool, what: impl Into<String>) -> Result<(), AppError> {
    if cond {
        Ok(())
    } else {
        Err(AppError::Validation(what.into()))
    }
}

fn run_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

pub fn check_products(pool: &DbPool) -> Result<String, AppError> {
    let tag = run_tag();
    let name = format!("Validation Product {}", tag);
    let created = product_create(
        pool,
        ProductCreateReq {
            name: name.clone(),
            category: Some("Validation".into()),
            price: 100.0,
            cost: 50.0,
            measurement_unit: Some("piece".into()),
            barcode: Some(format!("VAL{}", tag)),
        },
    )?;
    log::info!("Created product {}", created.id);

    let outcome = product_steps(pool, &created.id, &name);
    match product_delete(pool, &created.id) {
        Ok(()) | Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    outcome
}

fn product_steps(pool: &DbPool, id: &str, name: &str) -> Result<String, AppError> {
    let fetched = product_get(pool, id)?;
    ensure(fetched.name == name, "retrieved product name does not match")?;

    let updated_name = format!("Updated {}", name);
    product_update(
        pool,
        ProductUpdateReq {
            id: id.to_string(),
            name: Some(updated_name.clone()),
            price: Some(120.0),
            ..Default::default()
        },
    )?;
    let updated = product_get(pool, id)?;
    ensure(
        updated.name == updated_name && updated.price == 120.0,
        "product update was not persisted",
    )?;

    let found = product_search(pool, &updated_name)?;
    ensure(
        found.iter().any(|p| p.id == id),
        "search did not return the updated product",
    )?;

    product_delete(pool, id)?;
    match product_get(pool, id) {
        Err(AppError::NotFound(_)) => {}
        Ok(_) => return Err(AppError::Validation("product was not deleted".into())),
        Err(e) => return Err(e),
    }

    Ok(format!("product {} created, updated, found and deleted", id))
}

pub fn check_branches(pool: &DbPool) -> Result<String, AppError> {
    let name = format!("Validation Branch {}", run_tag());
    let created = branch_create(
        pool,
        BranchCreateReq {
            name: name.clone(),
            location: Some("Validation Location".into()),
            manager: Some("Validation Manager".into()),
            phone: Some("123456789".into()),
        },
    )?;
    log::info!("Created branch {}", created.id);

    let outcome = branch_steps(pool, &created.id, &name);
    match branch_delete(pool, &created.id) {
        Ok(()) | Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    outcome
}

fn branch_steps(pool: &DbPool, id: &str, name: &str) -> Result<String, AppError> {
    let fetched = branch_get(pool, id)?;
    ensure(fetched.name == name, "retrieved branch name does not match")?;

    let updated_name = format!("Updated {}", name);
    branch_update(
        pool,
        BranchUpdateReq {
            id: id.to_string(),
            name: Some(updated_name.clone()),
            manager: Some("Updated Manager".into()),
            ..Default::default()
        },
    )?;
    let updated = branch_get(pool, id)?;
    ensure(
        updated.name == updated_name && updated.manager == "Updated Manager",
        "branch update was not persisted",
    )?;

    branch_delete(pool, id)?;
    match branch_get(pool, id) {
        Err(AppError::NotFound(_)) => {}
        Ok(_) => return Err(AppError::Validation("branch was not deleted".into())),
        Err(e) => return Err(e),
    }

    Ok(format!("branch {} created, updated and deleted", id))
}

pub fn check_inventory(pool: &DbPool) -> Result<String, AppError> {
    let tag = run_tag();
    let product = product_create(
        pool,
        ProductCreateReq {
            name: format!("Inventory Validation Product {}", tag),
            category: Some("Validation".into()),
            price: 100.0,
            cost: 50.0,
            measurement_unit: Some("piece".into()),
            barcode: None,
        },
    )?;
    let branch = branch_create(
        pool,
        BranchCreateReq {
            name: format!("Inventory Validation Branch {}", tag),
            location: Some("Validation Location".into()),
            manager: None,
            phone: None,
        },
    )?;

    let outcome = inventory_steps(pool, &product.id, &branch.id, &product.name);

    // Leave nothing behind, whichever step failed.
    let leftovers = inventory_list(
        pool,
        InventoryListReq {
            product_id: Some(product.id.clone()),
            ..Default::default()
        },
    )?;
    for row in leftovers {
        inventory_delete(pool, &row.id)?;
    }
    product_delete(pool, &product.id)?;
    branch_delete(pool, &branch.id)?;

    outcome
}

fn inventory_steps(
    pool: &DbPool,
    product_id: &str,
    branch_id: &str,
    product_name: &str,
) -> Result<String, AppError> {
    let period = Period::current();
    let upsert = |quantity: f64| {
        inventory_upsert(
            pool,
            InventoryUpsertReq {
                product_id: product_id.to_string(),
                branch_id: branch_id.to_string(),
                month: period.month,
                year: period.year,
                quantity,
            },
        )
    };

    let created = upsert(100.0)?;
    log::info!("Created inventory record {}", created.id);
    let fetched = inventory_get(pool, &created.id)?;
    ensure(fetched.quantity == 100.0, "retrieved quantity does not match")?;

    let updated = upsert(150.0)?;
    ensure(
        updated.id == created.id,
        "upsert for the same period created a new record",
    )?;
    let by_key = inventory_get_by_product_branch_month(pool, product_id, branch_id, period)?;
    ensure(
        by_key.map(|r| r.quantity) == Some(150.0),
        "inventory update was not persisted",
    )?;

    let details = inventory_get_with_details(pool, &created.id)?;
    ensure(
        details.product_name == product_name,
        "inventory details are missing the product name",
    )?;

    inventory_delete(pool, &created.id)?;
    match inventory_get(pool, &created.id) {
        Err(AppError::NotFound(_)) => {}
        Ok(_) => return Err(AppError::Validation("inventory record was not deleted".into())),
        Err(e) => return Err(e),
    }

    Ok(format!(
        "inventory {} upserted for {:02}/{} and deleted",
        created.id, period.month, period.year
    ))
}

/// Wall-clock timings of one bulk create / list / delete cycle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoadTiming {
    pub records: usize,
    pub retrieved: usize,
    pub creation: Duration,
    pub retrieval: Duration,
    pub cleanup: Duration,
}

impl LoadTiming {
    pub fn within_limits(&self) -> bool {
        self.creation < MAX_CREATION && self.retrieval < MAX_RETRIEVAL && self.cleanup < MAX_CLEANUP
    }
}

fn load_product(tag: &str, i: usize, rng: &mut impl Rng) -> ProductCreateReq {
    ProductCreateReq {
        name: format!("Load Test Product {} {}", tag, i),
        category: Some("Load Test".into()),
        price: rng.gen_range(10.0..1000.0),
        cost: rng.gen_range(5.0..500.0),
        measurement_unit: Some("piece".into()),
        barcode: Some(format!("LOAD{}{:06}", tag, i)),
    }
}

pub fn measure_load(pool: &DbPool, records: usize) -> Result<LoadTiming, AppError> {
    let tag = run_tag();
    let mut rng = rand::thread_rng();

    let start = Instant::now();
    let mut ids = Vec::with_capacity(records);
    let mut create_error = None;
    for i in 0..records {
        match product_create(pool, load_product(&tag, i, &mut rng)) {
            Ok(p) => ids.push(p.id),
            Err(e) => {
                create_error = Some(e);
                break;
            }
        }
    }
    let creation = start.elapsed();

    let start = Instant::now();
    let retrieved = match create_error {
        None => product_list(pool).map(|all| all.len()),
        Some(e) => Err(e),
    };
    let retrieval = start.elapsed();

    let start = Instant::now();
    for id in &ids {
        product_delete(pool, id)?;
    }
    let cleanup = start.elapsed();

    Ok(LoadTiming {
        records: ids.len(),
        retrieved: retrieved?,
        creation,
        retrieval,
        cleanup,
    })
}

pub fn check_load_performance(pool: &DbPool) -> Result<String, AppError> {
    let timing = measure_load(pool, LOAD_RECORDS)?;
    let summary = format!(
        "created {} in {:.2}s, retrieved {} in {:.2}s, deleted {} in {:.2}s",
        timing.records,
        timing.creation.as_secs_f64(),
        timing.retrieved,
        timing.retrieval.as_secs_f64(),
        timing.records,
        timing.cleanup.as_secs_f64()
    );
    ensure(
        timing.within_limits(),
        format!("too slow: {}", summary),
    )?;
    Ok(summary)
}
