//! Domain types shared by the use cases and the importer.

mod category;
mod period;

pub use category::Category;
pub use period::{parse_date, today, Period};
