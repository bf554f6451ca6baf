//! Storage layer for the food wastage manager
//!
//! This module provides a clean abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Records, partial updates, filters and joined views
//! - `schema`: Database connection and schema management
//! - `queries`: CRUD and search operations
//! - `analysis`: The fixed report catalog
//! - `import`: Bulk load from CSV

pub mod analysis;
pub mod import;
pub mod models;
pub mod queries;
pub mod schema;

mod filters;

#[cfg(test)]
mod tests;

// Re-export the main types and database struct for easy access
pub use analysis::{Cell, Report, ReportDefinition, ReportTable};
pub use import::{ImportSources, ImportStats, ImportSummary};
pub use models::*;
pub use schema::{FoodDatabase, TableCounts};
