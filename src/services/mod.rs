pub mod csv_import;
pub mod dashboard;
pub mod export;
pub mod filters;
pub mod profile;
pub mod store;
pub mod validation;
