//! Import a legacy local-storage export into the store.

use super::html::extract_localstorage_from_html;
use super::legacy::{
    EntityRef, LegacyBranch, LegacyInventory, LegacyInvoice, LegacyProduct, LegacyPurchase,
    LegacyWaste, RecordError,
};
use crate::app::{
    branch_create, branch_find_by_name, branch_get, inventory_upsert, invoice_create,
    product_create, product_find_by_name, product_get, purchase_create, waste_create,
    InventoryUpsertReq, InvoiceCreateReq, PurchaseCreateReq, WasteCreateReq,
};
use crate::domain::Category;
use crate::error::AppError;
use crate::infra::DbPool;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Outcome of one migration run. Counts may be partial even when `success` is
/// true: per-record failures land in `errors` and do not stop the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationResult {
    pub success: bool,
    pub products: usize,
    pub branches: usize,
    pub inventory: usize,
    pub waste: usize,
    pub purchases: usize,
    pub invoices: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationResult {
    /// The file could not be processed at all; nothing was written.
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            ..Default::default()
        }
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Products => self.products,
            Category::Branches => self.branches,
            Category::Inventory => self.inventory,
            Category::Waste => self.waste,
            Category::Purchases => self.purchases,
            Category::Invoices => self.invoices,
        }
    }

    fn count_mut(&mut self, category: Category) -> &mut usize {
        match category {
            Category::Products => &mut self.products,
            Category::Branches => &mut self.branches,
            Category::Inventory => &mut self.inventory,
            Category::Waste => &mut self.waste,
            Category::Purchases => &mut self.purchases,
            Category::Invoices => &mut self.invoices,
        }
    }

    pub fn total(&self) -> usize {
        Category::all().iter().map(|c| self.count(*c)).sum()
    }
}

/// Source format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Html,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("html") | Some("htm") => Ok(Self::Html),
            Some(other) => Err(AppError::UnsupportedFileType(format!(".{}", other))),
            None => Err(AppError::UnsupportedFileType(path.display().to_string())),
        }
    }
}

/// The category mapping, fully decoded before anything is written.
#[derive(Debug, Default)]
pub struct LegacyExport {
    records: HashMap<Category, Vec<Value>>,
}

impl LegacyExport {
    pub fn parse(json: &str) -> Result<Self, AppError> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| AppError::InvalidExport(format!("invalid JSON: {}", e)))?;
        let Value::Object(map) = root else {
            return Err(AppError::InvalidExport(
                "expected a JSON object keyed by category".into(),
            ));
        };

        let mut records = HashMap::new();
        for (key, value) in map {
            let Some(category) = Category::from_str(&key) else {
                log::debug!("Ignoring unknown export key '{}'", key);
                continue;
            };
            records.insert(category, Self::decode_records(&key, value)?);
        }
        Ok(Self { records })
    }

    /// localStorage values are strings, so a category may hold JSON-encoded text.
    fn decode_records(key: &str, value: Value) -> Result<Vec<Value>, AppError> {
        let value = match value {
            Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
            Value::String(s) => serde_json::from_str(&s).map_err(|e| {
                AppError::InvalidExport(format!("'{}' holds invalid JSON text: {}", key, e))
            })?,
            other => other,
        };
        match value {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::InvalidExport(format!(
                "'{}' must be a list of records",
                key
            ))),
        }
    }

    pub fn records(&self, category: Category) -> &[Value] {
        self.records.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Migrate from a `.json` or `.html` file.
pub fn migrate_from_file(pool: &DbPool, path: &Path) -> MigrationResult {
    match read_export(path) {
        Ok(json) => migrate_from_json(pool, &json),
        Err(e) => {
            log::error!("Cannot read export {}: {}", path.display(), e);
            MigrationResult::failure(&e)
        }
    }
}

fn read_export(path: &Path) -> Result<String, AppError> {
    let format = ExportFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("{}: {}", path.display(), e)))?;
    match format {
        ExportFormat::Json => Ok(content),
        ExportFormat::Html => extract_localstorage_from_html(&content),
    }
}

/// Migrate a JSON export. Categories are imported in `Category::all()` order so
/// that references to products and branches resolve against rows created
/// earlier in the same run.
pub fn migrate_from_json(pool: &DbPool, json: &str) -> MigrationResult {
    let export = match LegacyExport::parse(json) {
        Ok(export) => export,
        Err(e) => {
            log::error!("Migration aborted: {}", e);
            return MigrationResult::failure(&e);
        }
    };

    let mut result = MigrationResult {
        success: true,
        ..Default::default()
    };
    let mut importer = Importer::new(pool);

    for &category in Category::all() {
        let records = export.records(category);
        for (index, record) in records.iter().enumerate() {
            match importer.import(category, record) {
                Ok(()) => *result.count_mut(category) += 1,
                Err(failure) => {
                    let msg = failure.describe(category, index);
                    log::warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        }
        if !records.is_empty() {
            log::info!(
                "Imported {}/{} {}",
                result.count(category),
                records.len(),
                category.as_str()
            );
        }
    }

    result
}

struct RecordFailure {
    label: Option<String>,
    error: RecordError,
}

impl RecordFailure {
    fn describe(&self, category: Category, index: usize) -> String {
        match &self.label {
            Some(label) => format!("{}[{}] '{}': {}", category.as_str(), index, label, self.error),
            None => format!("{}[{}]: {}", category.as_str(), index, self.error),
        }
    }
}

fn fail(label: &Option<String>) -> impl Fn(RecordError) -> RecordFailure + '_ {
    move |error| RecordFailure {
        label: label.clone(),
        error,
    }
}

fn unlabeled(error: RecordError) -> RecordFailure {
    RecordFailure { label: None, error }
}

fn rejected(e: AppError) -> RecordError {
    RecordError::Rejected(e.to_string())
}

/// Per-run state: legacy product/branch ids mapped to the ids assigned on insert.
struct Importer<'a> {
    pool: &'a DbPool,
    products: HashMap<String, String>,
    branches: HashMap<String, String>,
}

impl<'a> Importer<'a> {
    fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            products: HashMap::new(),
            branches: HashMap::new(),
        }
    }

    fn import(&mut self, category: Category, record: &Value) -> Result<(), RecordFailure> {
        match category {
            Category::Products => {
                self.import_product(LegacyProduct::from_record(record).map_err(unlabeled)?)
            }
            Category::Branches => {
                self.import_branch(LegacyBranch::from_record(record).map_err(unlabeled)?)
            }
            Category::Inventory => {
                self.import_inventory(LegacyInventory::from_record(record).map_err(unlabeled)?)
            }
            Category::Waste => {
                self.import_waste(LegacyWaste::from_record(record).map_err(unlabeled)?)
            }
            Category::Purchases => {
                self.import_purchase(LegacyPurchase::from_record(record).map_err(unlabeled)?)
            }
            Category::Invoices => {
                self.import_invoice(LegacyInvoice::from_record(record).map_err(unlabeled)?)
            }
        }
    }

    fn import_product(&mut self, legacy: LegacyProduct) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let legacy_id = legacy.legacy_id();
        let req = legacy.into_request().map_err(fail(&label))?;
        let dto = product_create(self.pool, req).map_err(|e| fail(&label)(rejected(e)))?;
        if let Some(old) = legacy_id {
            self.products.insert(old, dto.id);
        }
        Ok(())
    }

    fn import_branch(&mut self, legacy: LegacyBranch) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let legacy_id = legacy.legacy_id();
        let req = legacy.into_request().map_err(fail(&label))?;
        let dto = branch_create(self.pool, req).map_err(|e| fail(&label)(rejected(e)))?;
        if let Some(old) = legacy_id {
            self.branches.insert(old, dto.id);
        }
        Ok(())
    }

    fn import_inventory(&mut self, legacy: LegacyInventory) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let staged = legacy.stage().map_err(fail(&label))?;
        let product_id = self.resolve_product(&staged.product).map_err(fail(&label))?;
        let branch_id = self.resolve_branch(&staged.branch).map_err(fail(&label))?;
        inventory_upsert(
            self.pool,
            InventoryUpsertReq {
                product_id,
                branch_id,
                month: staged.period.month,
                year: staged.period.year,
                quantity: staged.quantity,
            },
        )
        .map_err(|e| fail(&label)(rejected(e)))?;
        Ok(())
    }

    fn import_waste(&mut self, legacy: LegacyWaste) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let staged = legacy.stage().map_err(fail(&label))?;
        let product_id = self.resolve_product(&staged.product).map_err(fail(&label))?;
        let branch_id = self.resolve_branch(&staged.branch).map_err(fail(&label))?;
        waste_create(
            self.pool,
            WasteCreateReq {
                product_id,
                branch_id,
                quantity: staged.quantity,
                reason: staged.reason,
                waste_date: staged.waste_date,
            },
        )
        .map_err(|e| fail(&label)(rejected(e)))?;
        Ok(())
    }

    fn import_purchase(&mut self, legacy: LegacyPurchase) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let staged = legacy.stage().map_err(fail(&label))?;
        let product_id = self.resolve_product(&staged.product).map_err(fail(&label))?;
        let branch_id = self.resolve_branch(&staged.branch).map_err(fail(&label))?;
        purchase_create(
            self.pool,
            PurchaseCreateReq {
                product_id,
                branch_id,
                quantity: staged.quantity,
                unit_cost: staged.unit_cost,
                supplier: staged.supplier,
                purchase_date: staged.purchase_date,
            },
        )
        .map_err(|e| fail(&label)(rejected(e)))?;
        Ok(())
    }

    fn import_invoice(&mut self, legacy: LegacyInvoice) -> Result<(), RecordFailure> {
        let label = legacy.label();
        let staged = legacy.stage().map_err(fail(&label))?;
        let branch_id = match &staged.branch {
            Some(r) => Some(self.resolve_branch(r).map_err(fail(&label))?),
            None => None,
        };
        invoice_create(
            self.pool,
            InvoiceCreateReq {
                invoice_number: staged.invoice_number,
                branch_id,
                supplier: staged.supplier,
                total_amount: staged.total_amount,
                invoice_date: staged.invoice_date,
                note: staged.note,
            },
        )
        .map_err(|e| fail(&label)(rejected(e)))?;
        Ok(())
    }

    /// Legacy id from this run, then an existing row id, then an exact name.
    fn resolve_product(&self, r: &EntityRef) -> Result<String, RecordError> {
        if let Some(id) = &r.id {
            if let Some(new_id) = self.products.get(id) {
                return Ok(new_id.clone());
            }
            match product_get(self.pool, id) {
                Ok(row) => return Ok(row.id),
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(rejected(e)),
            }
        }
        if let Some(name) = &r.name {
            if let Some(p) = product_find_by_name(self.pool, name).map_err(rejected)? {
                return Ok(p.id);
            }
        }
        Err(unresolved(r, "product_id", "product_name"))
    }

    fn resolve_branch(&self, r: &EntityRef) -> Result<String, RecordError> {
        if let Some(id) = &r.id {
            if let Some(new_id) = self.branches.get(id) {
                return Ok(new_id.clone());
            }
            match branch_get(self.pool, id) {
                Ok(row) => return Ok(row.id),
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(rejected(e)),
            }
        }
        if let Some(name) = &r.name {
            if let Some(b) = branch_find_by_name(self.pool, name).map_err(rejected)? {
                return Ok(b.id);
            }
        }
        Err(unresolved(r, "branch_id", "branch_name"))
    }
}

fn unresolved(r: &EntityRef, id_field: &'static str, name_field: &'static str) -> RecordError {
    match (&r.id, &r.name) {
        (Some(id), _) => RecordError::Unresolved {
            field: id_field,
            value: id.clone(),
        },
        (None, Some(name)) => RecordError::Unresolved {
            field: name_field,
            value: name.clone(),
        },
        (None, None) => RecordError::Missing(id_field),
    }
}
