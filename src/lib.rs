pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod migration;
pub mod validation;

pub use config::AppConfig;
pub use error::AppError;
pub use infra::{init_db, DbPool};
