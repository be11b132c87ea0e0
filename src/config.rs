//! Runtime configuration shared by the binaries.

use std::path::PathBuf;

pub const DB_ENV_VAR: &str = "INVENTORY_DB";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const APP_DIR: &str = "inventory-tracker";
const DB_FILE: &str = "inventory.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Explicit path if given, else the per-user default.
    pub fn new(db_path: Option<PathBuf>, log_level: Option<String>) -> Self {
        Self {
            db_path: db_path.unwrap_or_else(default_db_path),
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn app_data_dir() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR)
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join(DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let cfg = AppConfig::new(Some(PathBuf::from("/tmp/x.db")), Some("debug".into()));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        let cfg = AppConfig::default();
        assert!(cfg.db_path.ends_with("inventory-tracker/inventory.db"));
        assert_eq!(cfg.log_level, DEFAULT_LOG_LEVEL);
    }
}
