//! File-based import: extension dispatch and HTML exports

use inventory_lib::app::{branch_list, product_list};
use inventory_lib::infra::db::init_test_db;
use inventory_lib::migration::{migrate_from_file, ExportFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ──────────────────────── Helper ────────────────────────

const PAYLOAD: &str =
    r#"{"products":[{"id":1,"name":"Rice","price":10,"cost":7}],"branches":[{"id":1,"name":"Main"}]}"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ══════════════════════════════════════════════════════════
//  ExportFormat
// ══════════════════════════════════════════════════════════

#[test]
fn format_from_extension() {
    assert_eq!(ExportFormat::from_path(Path::new("a.json")).unwrap(), ExportFormat::Json);
    assert_eq!(ExportFormat::from_path(Path::new("a.HTML")).unwrap(), ExportFormat::Html);
    assert_eq!(ExportFormat::from_path(Path::new("a.htm")).unwrap(), ExportFormat::Html);

    let err = ExportFormat::from_path(Path::new("a.csv")).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_FILE_TYPE");
    assert!(err.to_string().contains(".csv"));
    assert!(ExportFormat::from_path(Path::new("noext")).is_err());
}

// ══════════════════════════════════════════════════════════
//  migrate_from_file
// ══════════════════════════════════════════════════════════

#[test]
fn migrates_json_file() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let path = write(&dir, "backup.json", PAYLOAD);

    let result = migrate_from_file(&pool, &path);
    assert!(result.success, "{:?}", result);
    assert_eq!(result.products, 1);
    assert_eq!(result.branches, 1);
}

#[test]
fn migrates_html_with_script_tag() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let html = format!(
        "<html><body><h1>Backup</h1>\n<script id=\"localStorage-data\" type=\"application/json\">\n{}\n</script></body></html>",
        PAYLOAD
    );
    let path = write(&dir, "backup.html", &html);

    let result = migrate_from_file(&pool, &path);
    assert!(result.success, "{:?}", result);
    assert_eq!(product_list(&pool).unwrap()[0].name, "Rice");
    assert_eq!(branch_list(&pool).unwrap()[0].name, "Main");
}

#[test]
fn migrates_html_with_variable_assignment() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let html = format!(
        "<html><script>\nconst localStorageData = {};\nrender(localStorageData);\n</script></html>",
        PAYLOAD
    );
    let path = write(&dir, "backup.htm", &html);

    let result = migrate_from_file(&pool, &path);
    assert!(result.success, "{:?}", result);
    assert_eq!(result.total(), 2);
}

#[test]
fn migrates_html_with_set_item_calls() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let html = r#"<script>
        localStorage.setItem('products', '[{"name":"Rice","price":10,"cost":7}]');
        localStorage.setItem("branches", "[{\"name\":\"Main\"}]");
    </script>"#;
    let path = write(&dir, "backup.html", html);

    let result = migrate_from_file(&pool, &path);
    assert!(result.success, "{:?}", result);
    assert_eq!(result.products, 1);
    assert_eq!(result.branches, 1);
}

#[test]
fn html_without_payload_fails() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let path = write(&dir, "page.html", "<html><body><p>nothing here</p></body></html>");

    let result = migrate_from_file(&pool, &path);
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("localStorage"));
    assert!(product_list(&pool).unwrap().is_empty());
}

#[test]
fn unsupported_extension_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let path = write(&dir, "backup.txt", PAYLOAD);

    let result = migrate_from_file(&pool, &path);
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("Unsupported file type"));
    assert_eq!(result.total(), 0);
    assert!(product_list(&pool).unwrap().is_empty());
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let pool = init_test_db();
    let result = migrate_from_file(&pool, &dir.path().join("gone.json"));
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().starts_with("I/O error"));
}
