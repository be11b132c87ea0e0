//! Typed views of legacy export records.
//!
//! The browser app stored loosely-typed objects: numbers typed into form fields
//! often ended up as strings, field names drifted between snake_case and
//! camelCase, and ids were either `Date.now()` numbers or strings. Each record is
//! read into a `Legacy*` struct with every field optional, then checked once
//! into a staged value ready for the persistence API, or a `RecordError`.
//!
//! A field may appear under several names in the same record. Names are tried
//! in the order listed for the field and the first non-null value wins.

use crate::app::{BranchCreateReq, ProductCreateReq};
use crate::domain::{parse_date, Period};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a single record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("{field} '{value}' does not match any imported or existing record")]
    Unresolved { field: &'static str, value: String },

    #[error("rejected: {0}")]
    Rejected(String),
}

const PRODUCT_ID: &[&str] = &["product_id", "productId"];
const PRODUCT_NAME: &[&str] = &["product_name", "productName"];
const BRANCH_ID: &[&str] = &["branch_id", "branchId"];
const BRANCH_NAME: &[&str] = &["branch_name", "branchName"];
const QUANTITY: &[&str] = &["quantity", "qty"];

/// One legacy record as a JSON object.
#[derive(Debug, Clone, Copy)]
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn of(record: &'a Value) -> Result<Self, RecordError> {
        record.as_object().map(Fields).ok_or(RecordError::NotAnObject)
    }

    /// First non-null value among `names`.
    fn get(&self, names: &[&str]) -> Option<Value> {
        names
            .iter()
            .filter_map(|n| self.0.get(*n))
            .find(|v| !v.is_null())
            .cloned()
    }
}

/// A product or branch reference: a legacy id, a name, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl EntityRef {
    fn from_fields(
        id: Option<Value>,
        name: Option<Value>,
        (id_field, name_field): (&'static str, &'static str),
        required: bool,
    ) -> Result<Option<Self>, RecordError> {
        let r = Self {
            id: id_text(id.as_ref(), id_field)?,
            name: text(name.as_ref(), name_field)?,
        };
        match (&r.id, &r.name) {
            (None, None) if required => Err(RecordError::Missing(id_field)),
            (None, None) => Ok(None),
            _ => Ok(Some(r)),
        }
    }
}

const PRODUCT_REF: (&str, &str) = ("product_id", "product_name");
const BRANCH_REF: (&str, &str) = ("branch_id", "branch_name");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyProduct {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub category: Option<Value>,
    pub price: Option<Value>,
    pub cost: Option<Value>,
    pub measurement_unit: Option<Value>,
    pub barcode: Option<Value>,
}

impl LegacyProduct {
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            id: f.get(&["id"]),
            name: f.get(&["name"]),
            category: f.get(&["category"]),
            price: f.get(&["price"]),
            cost: f.get(&["cost"]),
            measurement_unit: f.get(&["measurement_unit", "measurementUnit", "unit"]),
            barcode: f.get(&["barcode"]),
        })
    }

    pub fn label(&self) -> Option<String> {
        label(self.name.as_ref())
    }

    pub fn legacy_id(&self) -> Option<String> {
        id_text(self.id.as_ref(), "id").ok().flatten()
    }

    pub fn into_request(self) -> Result<ProductCreateReq, RecordError> {
        let name = text(self.name.as_ref(), "name")?.ok_or(RecordError::Missing("name"))?;
        let price = required_amount(self.price.as_ref(), "price")?;
        let cost = required_amount(self.cost.as_ref(), "cost")?;
        Ok(ProductCreateReq {
            name,
            category: text(self.category.as_ref(), "category")?,
            price,
            cost,
            measurement_unit: text(self.measurement_unit.as_ref(), "measurement_unit")?,
            barcode: id_text(self.barcode.as_ref(), "barcode")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyBranch {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub location: Option<Value>,
    pub manager: Option<Value>,
    pub phone: Option<Value>,
}

impl LegacyBranch {
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            id: f.get(&["id"]),
            name: f.get(&["name"]),
            location: f.get(&["location"]),
            manager: f.get(&["manager"]),
            phone: f.get(&["phone"]),
        })
    }

    pub fn label(&self) -> Option<String> {
        label(self.name.as_ref())
    }

    pub fn legacy_id(&self) -> Option<String> {
        id_text(self.id.as_ref(), "id").ok().flatten()
    }

    pub fn into_request(self) -> Result<BranchCreateReq, RecordError> {
        let name = text(self.name.as_ref(), "name")?.ok_or(RecordError::Missing("name"))?;
        Ok(BranchCreateReq {
            name,
            location: text(self.location.as_ref(), "location")?,
            manager: text(self.manager.as_ref(), "manager")?,
            phone: id_text(self.phone.as_ref(), "phone")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyInventory {
    pub product_id: Option<Value>,
    pub product_name: Option<Value>,
    pub branch_id: Option<Value>,
    pub branch_name: Option<Value>,
    pub month: Option<Value>,
    pub year: Option<Value>,
    pub quantity: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedInventory {
    pub product: EntityRef,
    pub branch: EntityRef,
    pub period: Period,
    pub quantity: f64,
}

impl LegacyInventory {
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            product_id: f.get(PRODUCT_ID),
            product_name: f.get(PRODUCT_NAME),
            branch_id: f.get(BRANCH_ID),
            branch_name: f.get(BRANCH_NAME),
            month: f.get(&["month"]),
            year: f.get(&["year"]),
            quantity: f.get(QUANTITY),
        })
    }

    pub fn label(&self) -> Option<String> {
        label(self.product_name.as_ref())
    }

    pub fn stage(self) -> Result<StagedInventory, RecordError> {
        let product = EntityRef::from_fields(self.product_id, self.product_name, PRODUCT_REF, true)?
            .unwrap_or_default();
        let branch = EntityRef::from_fields(self.branch_id, self.branch_name, BRANCH_REF, true)?
            .unwrap_or_default();
        let period = period(self.month.as_ref(), self.year.as_ref())?;
        let quantity = required_amount(self.quantity.as_ref(), "quantity")?;
        Ok(StagedInventory {
            product,
            branch,
            period,
            quantity,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyWaste {
    pub product_id: Option<Value>,
    pub product_name: Option<Value>,
    pub branch_id: Option<Value>,
    pub branch_name: Option<Value>,
    pub quantity: Option<Value>,
    pub reason: Option<Value>,
    pub waste_date: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedWaste {
    pub product: EntityRef,
    pub branch: EntityRef,
    pub quantity: f64,
    pub reason: Option<String>,
    pub waste_date: Option<String>,
}

impl LegacyWaste {
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            product_id: f.get(PRODUCT_ID),
            product_name: f.get(PRODUCT_NAME),
            branch_id: f.get(BRANCH_ID),
            branch_name: f.get(BRANCH_NAME),
            quantity: f.get(QUANTITY),
            reason: f.get(&["reason"]),
            waste_date: f.get(&["waste_date", "wasteDate", "date"]),
        })
    }

    pub fn label(&self) -> Option<String> {
        label(self.product_name.as_ref())
    }

    pub fn stage(self) -> Result<StagedWaste, RecordError> {
        let product = EntityRef::from_fields(self.product_id, self.product_name, PRODUCT_REF, true)?
            .unwrap_or_default();
        let branch = EntityRef::from_fields(self.branch_id, self.branch_name, BRANCH_REF, true)?
            .unwrap_or_default();
        Ok(StagedWaste {
            product,
            branch,
            quantity: required_amount(self.quantity.as_ref(), "quantity")?,
            reason: text(self.reason.as_ref(), "reason")?,
            waste_date: date(self.waste_date.as_ref(), "waste_date")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPurchase {
    pub product_id: Option<Value>,
    pub product_name: Option<Value>,
    pub branch_id: Option<Value>,
    pub branch_name: Option<Value>,
    pub quantity: Option<Value>,
    pub unit_cost: Option<Value>,
    pub supplier: Option<Value>,
    pub purchase_date: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedPurchase {
    pub product: EntityRef,
    pub branch: EntityRef,
    pub quantity: f64,
    pub unit_cost: Option<f64>,
    pub supplier: Option<String>,
    pub purchase_date: Option<String>,
}

impl LegacyPurchase {
    /// `cost` on a purchase is the line total, so it is not read as `unit_cost`.
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            product_id: f.get(PRODUCT_ID),
            product_name: f.get(PRODUCT_NAME),
            branch_id: f.get(BRANCH_ID),
            branch_name: f.get(BRANCH_NAME),
            quantity: f.get(QUANTITY),
            unit_cost: f.get(&["unit_cost", "unitCost"]),
            supplier: f.get(&["supplier"]),
            purchase_date: f.get(&["purchase_date", "purchaseDate", "date"]),
        })
    }

    pub fn label(&self) -> Option<String> {
        label(self.product_name.as_ref())
    }

    pub fn stage(self) -> Result<StagedPurchase, RecordError> {
        let product = EntityRef::from_fields(self.product_id, self.product_name, PRODUCT_REF, true)?
            .unwrap_or_default();
        let branch = EntityRef::from_fields(self.branch_id, self.branch_name, BRANCH_REF, true)?
            .unwrap_or_default();
        Ok(StagedPurchase {
            product,
            branch,
            quantity: required_amount(self.quantity.as_ref(), "quantity")?,
            unit_cost: amount(self.unit_cost.as_ref(), "unit_cost")?,
            supplier: text(self.supplier.as_ref(), "supplier")?,
            purchase_date: date(self.purchase_date.as_ref(), "purchase_date")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyInvoice {
    pub invoice_number: Option<Value>,
    pub branch_id: Option<Value>,
    pub branch_name: Option<Value>,
    pub supplier: Option<Value>,
    pub total_amount: Option<Value>,
    pub invoice_date: Option<Value>,
    pub note: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedInvoice {
    pub invoice_number: String,
    pub branch: Option<EntityRef>,
    pub supplier: Option<String>,
    pub total_amount: f64,
    pub invoice_date: Option<String>,
    pub note: Option<String>,
}

impl LegacyInvoice {
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let f = Fields::of(record)?;
        Ok(Self {
            invoice_number: f.get(&["invoice_number", "invoiceNumber", "number"]),
            branch_id: f.get(BRANCH_ID),
            branch_name: f.get(BRANCH_NAME),
            supplier: f.get(&["supplier"]),
            total_amount: f.get(&["total_amount", "totalAmount", "total", "amount"]),
            invoice_date: f.get(&["invoice_date", "invoiceDate", "date"]),
            note: f.get(&["note", "notes"]),
        })
    }

    pub fn label(&self) -> Option<String> {
        id_text(self.invoice_number.as_ref(), "invoice_number").ok().flatten()
    }

    pub fn stage(self) -> Result<StagedInvoice, RecordError> {
        let invoice_number = id_text(self.invoice_number.as_ref(), "invoice_number")?
            .ok_or(RecordError::Missing("invoice_number"))?;
        let branch = EntityRef::from_fields(self.branch_id, self.branch_name, BRANCH_REF, false)?;
        Ok(StagedInvoice {
            invoice_number,
            branch,
            supplier: text(self.supplier.as_ref(), "supplier")?,
            total_amount: required_amount(self.total_amount.as_ref(), "total_amount")?,
            invoice_date: date(self.invoice_date.as_ref(), "invoice_date")?,
            note: text(self.note.as_ref(), "note")?,
        })
    }
}

// ── field coercion ──

/// Record label for error messages; never fails.
fn label(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-empty trimmed string. Blank strings count as absent; other types are invalid.
fn text(v: Option<&Value>, field: &'static str) -> Result<Option<String>, RecordError> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(other) => Err(RecordError::Invalid {
            field,
            reason: format!("expected text, got {}", other),
        }),
    }
}

/// Identifier-like text: strings, or numbers rendered as written.
fn id_text(v: Option<&Value>, field: &'static str) -> Result<Option<String>, RecordError> {
    match v {
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        other => text(other, field),
    }
}

/// A number, or a string holding one. Empty strings count as absent.
fn number(v: Option<&Value>, field: &'static str) -> Result<Option<f64>, RecordError> {
    let n = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(RecordError::Invalid {
                field,
                reason: format!("expected a number, got {}", other),
            })
        }
    };
    match n {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(RecordError::Invalid {
            field,
            reason: format!("expected a number, got {}", v.map(Value::to_string).unwrap_or_default()),
        }),
    }
}

fn amount(v: Option<&Value>, field: &'static str) -> Result<Option<f64>, RecordError> {
    match number(v, field)? {
        Some(n) if n < 0.0 => Err(RecordError::Invalid {
            field,
            reason: format!("must not be negative, got {}", n),
        }),
        other => Ok(other),
    }
}

fn required_amount(v: Option<&Value>, field: &'static str) -> Result<f64, RecordError> {
    amount(v, field)?.ok_or(RecordError::Missing(field))
}

fn integer(v: Option<&Value>, field: &'static str) -> Result<Option<i64>, RecordError> {
    match number(v, field)? {
        Some(n) if n.fract() != 0.0 => Err(RecordError::Invalid {
            field,
            reason: format!("expected a whole number, got {}", n),
        }),
        Some(n) => Ok(Some(n as i64)),
        None => Ok(None),
    }
}

/// `month` + `year`, or `month` as `"YYYY-MM"`.
fn period(month: Option<&Value>, year: Option<&Value>) -> Result<Period, RecordError> {
    if let Some(Value::String(s)) = month {
        if s.contains('-') {
            return Period::parse_year_month(s).ok_or_else(|| RecordError::Invalid {
                field: "month",
                reason: format!("expected YYYY-MM, got '{}'", s),
            });
        }
    }
    let month = integer(month, "month")?.ok_or(RecordError::Missing("month"))?;
    let year = integer(year, "year")?.ok_or(RecordError::Missing("year"))?;
    let month = u32::try_from(month).map_err(|_| RecordError::Invalid {
        field: "month",
        reason: format!("out of range: {}", month),
    })?;
    let year = i32::try_from(year).map_err(|_| RecordError::Invalid {
        field: "year",
        reason: format!("out of range: {}", year),
    })?;
    Period::new(month, year).map_err(|e| RecordError::Invalid {
        field: "month",
        reason: e.to_string(),
    })
}

/// `YYYY-MM-DD`, an RFC 3339 timestamp, or epoch milliseconds; normalized to `YYYY-MM-DD`.
fn date(v: Option<&Value>, field: &'static str) -> Result<Option<String>, RecordError> {
    let parsed: Option<NaiveDate> = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => parse_date(s).ok().or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.date_naive())
        }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Some(_) => None,
    };
    match parsed {
        Some(d) => Ok(Some(d.format("%Y-%m-%d").to_string())),
        None => Err(RecordError::Invalid {
            field,
            reason: format!(
                "expected YYYY-MM-DD, got {}",
                v.map(Value::to_string).unwrap_or_default()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(v: Value) -> Result<ProductCreateReq, RecordError> {
        LegacyProduct::from_record(&v)?.into_request()
    }

    #[test]
    fn product_accepts_numeric_strings_and_camel_case() {
        let req = product(json!({
            "name": " Rice ", "price": "12.5", "cost": 8, "measurementUnit": "kg"
        }))
        .unwrap();
        assert_eq!(req.name, "Rice");
        assert_eq!(req.price, 12.5);
        assert_eq!(req.cost, 8.0);
        assert_eq!(req.measurement_unit.as_deref(), Some("kg"));
    }

    #[test]
    fn synonyms_in_one_record_prefer_the_first_name() {
        let req = product(json!({
            "name": "Rice", "price": 1, "cost": 1, "unit": "bag", "measurement_unit": "kg"
        }))
        .unwrap();
        assert_eq!(req.measurement_unit.as_deref(), Some("kg"));

        let req = product(json!({
            "name": "Rice", "price": 1, "cost": 1, "measurement_unit": null, "unit": "bag"
        }))
        .unwrap();
        assert_eq!(req.measurement_unit.as_deref(), Some("bag"));
    }

    #[test]
    fn purchase_cost_is_not_unit_cost() {
        let p = LegacyPurchase::from_record(&json!({
            "product_id": 1, "branch_id": 1, "quantity": 4, "cost": 20
        }))
        .unwrap();
        assert_eq!(p.stage().unwrap().unit_cost, None);
    }

    #[test]
    fn non_object_record() {
        assert_eq!(
            LegacyBranch::from_record(&json!(["Main"])).unwrap_err(),
            RecordError::NotAnObject
        );
    }

    #[test]
    fn product_missing_price() {
        let err = product(json!({"name": "Rice", "cost": 1})).unwrap_err();
        assert_eq!(err, RecordError::Missing("price"));
        assert!(err.to_string().contains("'price'"));
    }

    #[test]
    fn product_blank_name_is_missing() {
        let err = product(json!({"name": "  ", "price": 1, "cost": 1})).unwrap_err();
        assert_eq!(err, RecordError::Missing("name"));
    }

    #[test]
    fn product_numeric_name_is_invalid() {
        let err = product(json!({"name": 123, "price": 1, "cost": 1})).unwrap_err();
        assert!(matches!(err, RecordError::Invalid { field: "name", .. }));
        assert!(err.to_string().contains("expected text"));
    }

    #[test]
    fn product_rejects_non_numeric_price() {
        let err = product(json!({"name": "Rice", "price": "cheap", "cost": 1})).unwrap_err();
        assert!(matches!(err, RecordError::Invalid { field: "price", .. }));
        let err = product(json!({"name": "Rice", "price": true, "cost": 1})).unwrap_err();
        assert!(matches!(err, RecordError::Invalid { field: "price", .. }));
    }

    #[test]
    fn product_rejects_negative_cost() {
        let err = product(json!({"name": "Rice", "price": 1, "cost": -2})).unwrap_err();
        assert!(matches!(err, RecordError::Invalid { field: "cost", .. }));
    }

    #[test]
    fn numeric_ids_become_text() {
        let p = LegacyProduct::from_record(&json!({"id": 1700000000123_i64, "name": "X"})).unwrap();
        assert_eq!(p.legacy_id().as_deref(), Some("1700000000123"));
    }

    #[test]
    fn inventory_period_from_year_month_string() {
        let inv = LegacyInventory::from_record(&json!({
            "productId": 1, "branchName": "Main", "month": "2024-03", "quantity": "4"
        }))
        .unwrap();
        let staged = inv.stage().unwrap();
        assert_eq!(staged.period, Period { month: 3, year: 2024 });
        assert_eq!(staged.product.id.as_deref(), Some("1"));
        assert_eq!(staged.branch.name.as_deref(), Some("Main"));
        assert_eq!(staged.quantity, 4.0);
    }

    #[test]
    fn inventory_requires_product_reference() {
        let inv = LegacyInventory::from_record(&json!({
            "branch_id": "b1", "month": 1, "year": 2024, "quantity": 1
        }))
        .unwrap();
        assert_eq!(inv.stage().unwrap_err(), RecordError::Missing("product_id"));
    }

    #[test]
    fn inventory_month_out_of_range() {
        let inv = LegacyInventory::from_record(&json!({
            "product_id": "p", "branch_id": "b", "month": 13, "year": 2024, "quantity": 1
        }))
        .unwrap();
        assert!(matches!(
            inv.stage().unwrap_err(),
            RecordError::Invalid { field: "month", .. }
        ));
    }

    #[test]
    fn dates_are_normalized() {
        assert_eq!(
            date(Some(&json!("2024-05-01T10:30:00.000Z")), "date").unwrap(),
            Some("2024-05-01".to_string())
        );
        assert_eq!(
            date(Some(&json!(1714557600000_i64)), "date").unwrap(),
            Some("2024-05-01".to_string())
        );
        assert!(date(Some(&json!("01/05/2024")), "date").is_err());
        assert_eq!(date(Some(&json!("")), "date").unwrap(), None);
    }

    #[test]
    fn invoice_branch_is_optional() {
        let inv = LegacyInvoice::from_record(&json!({
            "invoiceNumber": 1042, "total": "99.90"
        }))
        .unwrap();
        let staged = inv.stage().unwrap();
        assert_eq!(staged.invoice_number, "1042");
        assert_eq!(staged.branch, None);
        assert_eq!(staged.total_amount, 99.9);
    }
}
