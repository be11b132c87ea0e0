//! Product CRUD integration tests

use inventory_lib::app::{
    branch_create, inventory_upsert, product_create, product_delete, product_find_by_name,
    product_get, product_list, product_search, product_update, BranchCreateReq,
    InventoryUpsertReq, ProductCreateReq, ProductUpdateReq,
};
use inventory_lib::infra::db::init_test_db;

// ──────────────────────── Helper ────────────────────────

fn make_create_req(name: &str, barcode: Option<&str>) -> ProductCreateReq {
    ProductCreateReq {
        name: name.to_string(),
        category: Some("Grains".to_string()),
        price: 12.5,
        cost: 8.0,
        measurement_unit: Some("kg".to_string()),
        barcode: barcode.map(str::to_string),
    }
}

// ══════════════════════════════════════════════════════════
//  product_create
// ══════════════════════════════════════════════════════════

#[test]
fn create_product_returns_correct_fields() {
    let pool = init_test_db();
    let dto = product_create(&pool, make_create_req("Rice", Some("7501"))).unwrap();
    assert!(!dto.id.is_empty());
    assert_eq!(dto.name, "Rice");
    assert_eq!(dto.category, "Grains");
    assert_eq!(dto.price, 12.5);
    assert_eq!(dto.cost, 8.0);
    assert_eq!(dto.measurement_unit, "kg");
    assert_eq!(dto.barcode.as_deref(), Some("7501"));
    assert_eq!(dto.created_at, dto.updated_at);
}

#[test]
fn create_product_trims_name_and_drops_blank_barcode() {
    let pool = init_test_db();
    let dto = product_create(&pool, make_create_req("  Beans  ", Some("  "))).unwrap();
    assert_eq!(dto.name, "Beans");
    assert_eq!(dto.barcode, None);
}

#[test]
fn create_product_empty_name_fails() {
    let pool = init_test_db();
    let err = product_create(&pool, make_create_req("   ", None)).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn create_product_negative_price_fails() {
    let pool = init_test_db();
    let mut req = make_create_req("Rice", None);
    req.price = -1.0;
    let err = product_create(&pool, req).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(product_list(&pool).unwrap().is_empty());
}

#[test]
fn create_product_nan_cost_fails() {
    let pool = init_test_db();
    let mut req = make_create_req("Rice", None);
    req.cost = f64::NAN;
    assert_eq!(product_create(&pool, req).unwrap_err().code(), "VALIDATION_ERROR");
}

#[test]
fn create_product_duplicate_barcode_conflicts() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("Rice", Some("7501"))).unwrap();
    let err = product_create(&pool, make_create_req("Other", Some("7501"))).unwrap_err();
    assert_eq!(err.code(), "CONFLICT");
}

#[test]
fn products_without_barcode_do_not_conflict() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("A", None)).unwrap();
    product_create(&pool, make_create_req("B", None)).unwrap();
    assert_eq!(product_list(&pool).unwrap().len(), 2);
}

// ══════════════════════════════════════════════════════════
//  product_get / product_list
// ══════════════════════════════════════════════════════════

#[test]
fn get_product_roundtrips() {
    let pool = init_test_db();
    let created = product_create(&pool, make_create_req("Rice", None)).unwrap();
    let fetched = product_get(&pool, &created.id).unwrap();
    assert_eq!(fetched.name, "Rice");
    assert_eq!(fetched.id, created.id);
}

#[test]
fn get_missing_product_is_not_found() {
    let pool = init_test_db();
    let err = product_get(&pool, "no-such-id").unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn list_products_sorted_by_name() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("sugar", None)).unwrap();
    product_create(&pool, make_create_req("Beans", None)).unwrap();
    product_create(&pool, make_create_req("rice", None)).unwrap();
    let names: Vec<String> = product_list(&pool)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Beans", "rice", "sugar"]);
}

// ══════════════════════════════════════════════════════════
//  product_search / product_find_by_name
// ══════════════════════════════════════════════════════════

#[test]
fn search_matches_name_category_and_barcode() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("Basmati Rice", Some("ABC-1"))).unwrap();
    let mut req = make_create_req("Cola", Some("XYZ-2"));
    req.category = Some("Drinks".into());
    product_create(&pool, req).unwrap();

    assert_eq!(product_search(&pool, "rice").unwrap().len(), 1);
    assert_eq!(product_search(&pool, "drink").unwrap()[0].name, "Cola");
    assert_eq!(product_search(&pool, "abc").unwrap()[0].name, "Basmati Rice");
    assert!(product_search(&pool, "nothing").unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("100% Juice", None)).unwrap();
    product_create(&pool, make_create_req("Water", None)).unwrap();
    let found = product_search(&pool, "%").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "100% Juice");
    assert!(product_search(&pool, "_").unwrap().is_empty());
}

#[test]
fn find_by_name_is_exact() {
    let pool = init_test_db();
    let rice = product_create(&pool, make_create_req("Rice", None)).unwrap();
    product_create(&pool, make_create_req("Rice Flour", None)).unwrap();
    assert_eq!(product_find_by_name(&pool, " Rice ").unwrap().unwrap().id, rice.id);
    assert!(product_find_by_name(&pool, "Ric").unwrap().is_none());
}

// ══════════════════════════════════════════════════════════
//  product_update
// ══════════════════════════════════════════════════════════

#[test]
fn update_product_partial_fields() {
    let pool = init_test_db();
    let created = product_create(&pool, make_create_req("Rice", Some("7501"))).unwrap();
    let updated = product_update(
        &pool,
        ProductUpdateReq {
            id: created.id.clone(),
            price: Some(15.0),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.price, 15.0);
    assert_eq!(updated.name, "Rice");
    assert_eq!(updated.cost, 8.0);
    assert_eq!(updated.barcode.as_deref(), Some("7501"));
}

#[test]
fn update_product_clears_barcode_with_empty_string() {
    let pool = init_test_db();
    let created = product_create(&pool, make_create_req("Rice", Some("7501"))).unwrap();
    let updated = product_update(
        &pool,
        ProductUpdateReq {
            id: created.id,
            barcode: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.barcode, None);
}

#[test]
fn update_product_empty_name_fails() {
    let pool = init_test_db();
    let created = product_create(&pool, make_create_req("Rice", None)).unwrap();
    let err = product_update(
        &pool,
        ProductUpdateReq {
            id: created.id.clone(),
            name: Some(" ".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(product_get(&pool, &created.id).unwrap().name, "Rice");
}

#[test]
fn update_product_to_taken_barcode_conflicts() {
    let pool = init_test_db();
    product_create(&pool, make_create_req("Rice", Some("111"))).unwrap();
    let beans = product_create(&pool, make_create_req("Beans", Some("222"))).unwrap();
    let err = product_update(
        &pool,
        ProductUpdateReq {
            id: beans.id,
            barcode: Some("111".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");
}

#[test]
fn update_missing_product_is_not_found() {
    let pool = init_test_db();
    let err = product_update(
        &pool,
        ProductUpdateReq {
            id: "ghost".into(),
            name: Some("X".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

// ══════════════════════════════════════════════════════════
//  product_delete
// ══════════════════════════════════════════════════════════

#[test]
fn delete_product_removes_row() {
    let pool = init_test_db();
    let created = product_create(&pool, make_create_req("Rice", None)).unwrap();
    product_delete(&pool, &created.id).unwrap();
    assert_eq!(product_get(&pool, &created.id).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn delete_missing_product_is_not_found() {
    let pool = init_test_db();
    assert_eq!(product_delete(&pool, "ghost").unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn delete_referenced_product_conflicts() {
    let pool = init_test_db();
    let product = product_create(&pool, make_create_req("Rice", None)).unwrap();
    let branch = branch_create(
        &pool,
        BranchCreateReq {
            name: "Main".into(),
            location: None,
            manager: None,
            phone: None,
        },
    )
    .unwrap();
    inventory_upsert(
        &pool,
        InventoryUpsertReq {
            product_id: product.id.clone(),
            branch_id: branch.id,
            month: 3,
            year: 2024,
            quantity: 10.0,
        },
    )
    .unwrap();

    let err = product_delete(&pool, &product.id).unwrap_err();
    assert_eq!(err.code(), "CONFLICT");
    assert!(product_get(&pool, &product.id).is_ok());
}
