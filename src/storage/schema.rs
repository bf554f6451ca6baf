//! Database schema and connection management

use crate::error::{FoodError, Result};
use crate::DATABASE_ENV_VAR;
use dirs::data_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle to the food-sharing database.
///
/// Every data-access, analytics and import operation goes through an
/// explicitly passed `FoodDatabase`; there is no shared global connection.
pub struct FoodDatabase {
    pub(crate) conn: Connection,
}

impl FoodDatabase {
    /// Open (or create) the database file at `path` and ensure tables exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database with the full schema
    pub fn new_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Resolve where the database lives: explicit path, then the
    /// `FOOD_WASTAGE_DB` environment variable, then the platform data directory.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        Self::resolve_path_from(explicit, std::env::var(DATABASE_ENV_VAR).ok())
    }

    /// Same precedence as `resolve_path`, with the environment value passed in
    pub(crate) fn resolve_path_from(
        explicit: Option<PathBuf>,
        env_value: Option<String>,
    ) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }
        match env_value {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// Get the default path to the database file
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = data_dir().ok_or_else(|| FoodError::MissingDataDir {
            env_var: DATABASE_ENV_VAR.to_string(),
        })?;
        Ok(data_dir.join("food-wastage").join("food_management.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS providers (
                provider_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                provider_type TEXT NOT NULL,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                contact TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS receivers (
                receiver_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                receiver_type TEXT NOT NULL,
                city TEXT NOT NULL,
                contact TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS food_listings (
                food_id INTEGER PRIMARY KEY,
                food_name TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                expiry_date TEXT NOT NULL,
                provider_id INTEGER NOT NULL,
                location TEXT NOT NULL,
                food_type TEXT NOT NULL,
                meal_type TEXT NOT NULL,
                listed_at TEXT,
                FOREIGN KEY (provider_id) REFERENCES providers(provider_id) ON DELETE RESTRICT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS claims (
                claim_id INTEGER PRIMARY KEY,
                food_id INTEGER NOT NULL,
                receiver_id INTEGER NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('Pending', 'Completed', 'Cancelled')),
                claimed_at TEXT NOT NULL,
                FOREIGN KEY (food_id) REFERENCES food_listings(food_id) ON DELETE RESTRICT,
                FOREIGN KEY (receiver_id) REFERENCES receivers(receiver_id) ON DELETE RESTRICT
            )",
            [],
        )?;

        // Indexes for the search filters and analytics joins
        self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_providers_city ON providers(city);
             CREATE INDEX IF NOT EXISTS idx_providers_type ON providers(provider_type);
             CREATE INDEX IF NOT EXISTS idx_receivers_city ON receivers(city);
             CREATE INDEX IF NOT EXISTS idx_listings_provider ON food_listings(provider_id);
             CREATE INDEX IF NOT EXISTS idx_listings_location ON food_listings(location);
             CREATE INDEX IF NOT EXISTS idx_listings_food_type ON food_listings(food_type);
             CREATE INDEX IF NOT EXISTS idx_listings_meal_type ON food_listings(meal_type);
             CREATE INDEX IF NOT EXISTS idx_listings_expiry ON food_listings(expiry_date);
             CREATE INDEX IF NOT EXISTS idx_claims_food ON claims(food_id);
             CREATE INDEX IF NOT EXISTS idx_claims_receiver ON claims(receiver_id);
             CREATE INDEX IF NOT EXISTS idx_claims_status ON claims(status);",
        )?;

        debug!("schema ready");
        Ok(())
    }

    /// Row counts per table: providers, receivers, listings, claims
    pub fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<u64> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?)
        };

        Ok(TableCounts {
            providers: count("providers")?,
            receivers: count("receivers")?,
            food_listings: count("food_listings")?,
            claims: count("claims")?,
        })
    }
}

/// Number of rows stored in each table
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TableCounts {
    pub providers: u64,
    pub receivers: u64,
    pub food_listings: u64,
    pub claims: u64,
}
