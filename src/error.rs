//! Error types for the food wastage data layer

use std::fmt;
use thiserror::Error;


pub type Result<T> = std::result::Result<T, FoodError>;

/// The four stored record kinds, used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Provider,
    Receiver,
    FoodListing,
    Claim,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Entity::Provider => "Provider",
            Entity::Receiver => "Receiver",
            Entity::FoodListing => "Food listing",
            Entity::Claim => "Claim",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum FoodError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("{entity} {id} already exists")]
    DuplicateKey { entity: Entity, id: i64 },

    #[error("Cannot delete {entity} {id}: {count} dependent {dependent} record(s) exist")]
    ReferentialIntegrity {
        entity: Entity,
        id: i64,
        dependent: Entity,
        count: u64,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Invalid claim status: {status}")]
    InvalidStatus { status: String },

    #[error("Invalid date or timestamp: {value}")]
    InvalidDate { value: String },

    #[error("Unknown report: {name}")]
    UnknownReport { name: String },

    #[error("Could not determine data directory; pass --db or set {env_var}")]
    MissingDataDir { env_var: String },
}

impl FoodError {
    pub fn validation(message: impl Into<String>) -> Self {
        FoodError::Validation {
            message: message.into(),
        }
    }

    /// Map a SQLite constraint failure on `entity`'s table to the matching typed error.
    ///
    /// Anything that is not a primary-key, foreign-key or check violation is
    /// passed through as a database error.
    pub(crate) fn from_constraint(err: rusqlite::Error, entity: Entity, id: i64) -> Self {
        use rusqlite::ffi;

        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => match e.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    FoodError::DuplicateKey { entity, id }
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => FoodError::validation(format!(
                    "{} {} references a record that does not exist",
                    entity, id
                )),
                ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
                    FoodError::validation(
                        msg.clone()
                            .unwrap_or_else(|| format!("{} {} violates a constraint", entity, id)),
                    )
                }
                _ => FoodError::Database(err),
            },
            _ => FoodError::Database(err),
        }
    }
}
