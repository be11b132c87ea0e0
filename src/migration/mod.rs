//! One-shot import of the legacy browser local-storage exports.
//!
//! A legacy export is a JSON object keyed by category (`products`, `branches`,
//! `inventory`, `waste`, `purchases`, `invoices`), each holding a list of flat
//! records. HTML exports embed the same object somewhere in the page.
//!
//! Two tiers of failure:
//!
//! - the file itself cannot be processed (unsupported extension, unreadable,
//!   undecodable JSON, no payload in the HTML): `MigrationResult::success` is
//!   false and nothing is written;
//! - a single record is malformed or rejected by the store: it is skipped, one
//!   message is appended to `MigrationResult::errors`, and the run continues.
//!
//! Records already written stay written; there is no rollback.

mod html;
mod legacy;
mod migrate;

pub use html::extract_localstorage_from_html;
pub use legacy::{
    EntityRef, LegacyBranch, LegacyInventory, LegacyInvoice, LegacyProduct, LegacyPurchase,
    LegacyWaste, RecordError, StagedInventory, StagedInvoice, StagedPurchase, StagedWaste,
};
pub use migrate::{migrate_from_file, migrate_from_json, ExportFormat, LegacyExport, MigrationResult};
