//! Contact import from uploaded spreadsheets: parse, map columns, preview,
//! then validate and create in bulk.

pub mod importer;
pub mod mapper;
pub mod parser;
pub mod preview;
pub mod types;

pub use importer::bulk_import;
pub use mapper::{is_ready, map_columns};
pub use parser::{parse, parse_workbook};
pub use preview::preview;
pub use types::*;
