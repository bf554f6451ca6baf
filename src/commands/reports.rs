//! Report command implementation

use serde::Serialize;

use crate::{
    storage::{FoodDatabase, Report},
    Result,
};

use super::common::{format_report, format_table, print_json};

#[derive(Debug, Serialize)]
struct CatalogEntry {
    name: &'static str,
    title: &'static str,
    columns: &'static [&'static str],
}

/// The report catalog as (name, title, columns) entries
fn catalog() -> Vec<CatalogEntry> {
    Report::ALL
        .iter()
        .map(|report| {
            let def = report.definition();
            CatalogEntry {
                name: def.name,
                title: def.title,
                columns: def.columns,
            }
        })
        .collect()
}

/// Handle `report`: list the catalog, run one report, or run them all
pub fn handle_report(
    db: &FoodDatabase,
    name: Option<String>,
    list: bool,
    as_json: bool,
) -> Result<()> {
    if list {
        let entries = catalog();
        if as_json {
            return print_json(&entries);
        }
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|e| vec![e.name.to_string(), e.title.to_string()])
            .collect();
        println!("{}", format_table(&["Report", "Description"], &rows));
        return Ok(());
    }

    let tables = match name {
        Some(name) => vec![db.run_report(name.parse::<Report>()?)?],
        None => db.run_all_reports()?,
    };

    if as_json {
        return match tables.as_slice() {
            [single] => print_json(single),
            _ => print_json(&tables),
        };
    }

    let rendered: Vec<String> = tables.iter().map(format_report).collect();
    println!("{}", rendered.join("\n\n"));
    Ok(())
}
