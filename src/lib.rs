//! Food Wastage Management Library
//!
//! Data-access layer for a food-sharing network: food donors (providers),
//! food receivers, food listings and claims, stored in a local SQLite file.
//!
//! ## Features
//!
//! - **CRUD**: Create, read, update and delete for all four record types,
//!   with referential checks and a block-on-dependents delete policy
//! - **Search**: AND-combined filters on city, provider, food and meal type,
//!   expiry range and quantity
//! - **Reports**: A fixed catalog of analytical queries returned as tables
//! - **Bulk Load**: Idempotent CSV import of the four standard data files
//!
//! ## Quick Start
//!
//! ```rust
//! use food_wastage::{storage::Provider, FoodDatabase, ProviderId, Report};
//!
//! # fn example() -> food_wastage::Result<()> {
//! let mut db = FoodDatabase::new_in_memory()?;
//! db.create_provider(&Provider {
//!     provider_id: ProviderId::new(1),
//!     name: "Green Grocer".to_string(),
//!     provider_type: "Grocery Store".to_string(),
//!     address: "12 Market Road".to_string(),
//!     city: "Delhi".to_string(),
//!     contact: "555-0101".to_string(),
//! })?;
//!
//! let table = db.run_report(Report::ProvidersReceiversByCity)?;
//! assert_eq!(table.rows.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Environment Configuration
//!
//! Point every command at a specific database file:
//! ```bash
//! export FOOD_WASTAGE_DB=/srv/food/food_management.db
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod storage;
pub mod util;

/// Environment variable naming the database file
pub const DATABASE_ENV_VAR: &str = "FOOD_WASTAGE_DB";

// Re-export commonly used types
pub use cli::types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};
pub use error::{FoodError, Result};
pub use storage::{FoodDatabase, Report};
