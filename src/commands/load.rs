//! Database initialization and CSV bulk load commands

use std::path::Path;

use tracing::info;

use crate::{
    storage::{FoodDatabase, ImportSources, ImportStats, TableCounts},
    Result,
};

use super::common::{format_table, print_json};

fn counts_table(counts: &TableCounts) -> String {
    let rows = vec![
        vec!["providers".to_string(), counts.providers.to_string()],
        vec!["receivers".to_string(), counts.receivers.to_string()],
        vec!["food_listings".to_string(), counts.food_listings.to_string()],
        vec!["claims".to_string(), counts.claims.to_string()],
    ];
    format_table(&["Table", "Rows"], &rows)
}

/// Handle `init`: the schema already exists once the database is open
pub fn handle_init(db: &FoodDatabase, path: &Path, as_json: bool) -> Result<()> {
    let counts = db.table_counts()?;
    if as_json {
        return print_json(&serde_json::json!({
            "database": path.display().to_string(),
            "tables": counts,
        }));
    }

    println!("✓ Database ready at {}", path.display());
    println!("{}", counts_table(&counts));
    Ok(())
}

/// Handle `load`
pub fn handle_load(db: &mut FoodDatabase, sources: &ImportSources, as_json: bool) -> Result<()> {
    info!(providers = %sources.providers.display(), "loading CSV files");
    let summary = db.import_all(sources)?;

    if as_json {
        return print_json(&serde_json::json!({
            "imported": summary,
            "tables": db.table_counts()?,
        }));
    }

    let line = |label: &str, stats: ImportStats| {
        vec![
            label.to_string(),
            stats.loaded.to_string(),
            stats.skipped.to_string(),
        ]
    };
    let rows = vec![
        line("providers", summary.providers),
        line("receivers", summary.receivers),
        line("food_listings", summary.food_listings),
        line("claims", summary.claims),
    ];
    println!("{}", format_table(&["File", "Loaded", "Skipped"], &rows));
    println!();
    println!("{}", counts_table(&db.table_counts()?));
    Ok(())
}
