//! Branch CRUD integration tests

use inventory_lib::app::{
    branch_create, branch_delete, branch_find_by_name, branch_get, branch_list, branch_search,
    branch_update, invoice_create, BranchCreateReq, BranchUpdateReq, InvoiceCreateReq,
};
use inventory_lib::infra::db::init_test_db;

// ──────────────────────── Helper ────────────────────────

fn make_create_req(name: &str) -> BranchCreateReq {
    BranchCreateReq {
        name: name.to_string(),
        location: Some("Downtown".to_string()),
        manager: Some("Dana".to_string()),
        phone: Some("555-0100".to_string()),
    }
}

// ══════════════════════════════════════════════════════════
//  branch_create / branch_get
// ══════════════════════════════════════════════════════════

#[test]
fn create_branch_returns_correct_fields() {
    let pool = init_test_db();
    let dto = branch_create(&pool, make_create_req("Main Branch")).unwrap();
    assert!(!dto.id.is_empty());
    assert_eq!(dto.name, "Main Branch");
    assert_eq!(dto.location, "Downtown");
    assert_eq!(dto.manager, "Dana");
    assert_eq!(dto.phone, "555-0100");

    let fetched = branch_get(&pool, &dto.id).unwrap();
    assert_eq!(fetched.name, "Main Branch");
}

#[test]
fn create_branch_optional_fields_default_to_empty() {
    let pool = init_test_db();
    let dto = branch_create(
        &pool,
        BranchCreateReq {
            name: " North ".into(),
            location: None,
            manager: None,
            phone: None,
        },
    )
    .unwrap();
    assert_eq!(dto.name, "North");
    assert_eq!(dto.location, "");
    assert_eq!(dto.manager, "");
    assert_eq!(dto.phone, "");
}

#[test]
fn create_branch_empty_name_fails() {
    let pool = init_test_db();
    let err = branch_create(&pool, make_create_req("")).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn get_missing_branch_is_not_found() {
    let pool = init_test_db();
    assert_eq!(branch_get(&pool, "ghost").unwrap_err().code(), "NOT_FOUND");
}

// ══════════════════════════════════════════════════════════
//  branch_list / branch_search / branch_find_by_name
// ══════════════════════════════════════════════════════════

#[test]
fn list_branches_sorted_by_name() {
    let pool = init_test_db();
    branch_create(&pool, make_create_req("West")).unwrap();
    branch_create(&pool, make_create_req("east")).unwrap();
    let names: Vec<String> = branch_list(&pool).unwrap().into_iter().map(|b| b.name).collect();
    assert_eq!(names, vec!["east", "West"]);
}

#[test]
fn search_branches_by_location_and_manager() {
    let pool = init_test_db();
    branch_create(&pool, make_create_req("Main")).unwrap();
    branch_create(
        &pool,
        BranchCreateReq {
            name: "Airport".into(),
            location: Some("Terminal 2".into()),
            manager: Some("Lee".into()),
            phone: None,
        },
    )
    .unwrap();

    assert_eq!(branch_search(&pool, "terminal").unwrap()[0].name, "Airport");
    assert_eq!(branch_search(&pool, "DANA").unwrap()[0].name, "Main");
    assert!(branch_search(&pool, "harbor").unwrap().is_empty());
}

#[test]
fn find_branch_by_name_returns_oldest_match() {
    let pool = init_test_db();
    let first = branch_create(&pool, make_create_req("Main")).unwrap();
    branch_create(&pool, make_create_req("Main")).unwrap();
    let found = branch_find_by_name(&pool, "Main").unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(branch_find_by_name(&pool, "main").unwrap().is_none());
}

// ══════════════════════════════════════════════════════════
//  branch_update / branch_delete
// ══════════════════════════════════════════════════════════

#[test]
fn update_branch_partial_fields() {
    let pool = init_test_db();
    let created = branch_create(&pool, make_create_req("Main")).unwrap();
    let updated = branch_update(
        &pool,
        BranchUpdateReq {
            id: created.id.clone(),
            manager: Some("Robin".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.manager, "Robin");
    assert_eq!(updated.name, "Main");
    assert_eq!(updated.location, "Downtown");
}

#[test]
fn update_missing_branch_is_not_found() {
    let pool = init_test_db();
    let err = branch_update(
        &pool,
        BranchUpdateReq {
            id: "ghost".into(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn delete_branch_removes_row() {
    let pool = init_test_db();
    let created = branch_create(&pool, make_create_req("Main")).unwrap();
    branch_delete(&pool, &created.id).unwrap();
    assert_eq!(branch_get(&pool, &created.id).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(branch_delete(&pool, &created.id).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn delete_branch_with_invoices_conflicts() {
    let pool = init_test_db();
    let branch = branch_create(&pool, make_create_req("Main")).unwrap();
    invoice_create(
        &pool,
        InvoiceCreateReq {
            invoice_number: "INV-1".into(),
            branch_id: Some(branch.id.clone()),
            supplier: None,
            total_amount: 10.0,
            invoice_date: None,
            note: None,
        },
    )
    .unwrap();
    assert_eq!(branch_delete(&pool, &branch.id).unwrap_err().code(), "CONFLICT");
}
