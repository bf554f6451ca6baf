//! Command implementations for the food wastage CLI

pub mod common;
pub mod listings;
pub mod load;
pub mod records;
pub mod reports;


use std::path::PathBuf;

use crate::{
    storage::{FoodDatabase, ImportSources},
    Result,
};

/// Resolve the database location from the flag, env var or data directory, then open it
pub fn open_database(path: Option<PathBuf>) -> Result<(FoodDatabase, PathBuf)> {
    let path = FoodDatabase::resolve_path(path)?;
    let db = FoodDatabase::open(&path)?;
    Ok((db, path))
}

/// Standard file names inside `dir`, with any explicit file overriding its default
pub fn import_sources(
    dir: PathBuf,
    providers: Option<PathBuf>,
    receivers: Option<PathBuf>,
    food_listings: Option<PathBuf>,
    claims: Option<PathBuf>,
) -> ImportSources {
    let defaults = ImportSources::in_dir(dir);
    ImportSources {
        providers: providers.unwrap_or(defaults.providers),
        receivers: receivers.unwrap_or(defaults.receivers),
        food_listings: food_listings.unwrap_or(defaults.food_listings),
        claims: claims.unwrap_or(defaults.claims),
    }
}
