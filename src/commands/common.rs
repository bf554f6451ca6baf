//! Output helpers shared across commands.
//!
//! Every command renders either pretty JSON or a plain-text table; the
//! [`TableRow`] trait is how a record type describes its table layout.

use serde::Serialize;

use crate::{
    error::FoodError,
    storage::{Claim, ClaimDetail, FoodListing, ListingDetail, Provider, Receiver, ReportTable},
    Result,
};

/// A record that can be shown as one line of a text table
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Provider {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Type", "Address", "City", "Contact"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.provider_id.to_string(),
            self.name.clone(),
            self.provider_type.clone(),
            self.address.clone(),
            self.city.clone(),
            self.contact.clone(),
        ]
    }
}

impl TableRow for Receiver {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Type", "City", "Contact"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.receiver_id.to_string(),
            self.name.clone(),
            self.receiver_type.clone(),
            self.city.clone(),
            self.contact.clone(),
        ]
    }
}

impl TableRow for FoodListing {
    fn headers() -> &'static [&'static str] {
        &[
            "ID", "Food", "Qty", "Expiry", "Provider", "Location", "Food Type", "Meal Type",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.food_id.to_string(),
            self.food_name.clone(),
            self.quantity.to_string(),
            self.expiry_date.to_string(),
            self.provider_id.to_string(),
            self.location.clone(),
            self.food_type.clone(),
            self.meal_type.clone(),
        ]
    }
}

impl TableRow for Claim {
    fn headers() -> &'static [&'static str] {
        &["ID", "Food", "Receiver", "Status", "Claimed At"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.claim_id.to_string(),
            self.food_id.to_string(),
            self.receiver_id.to_string(),
            self.status.to_string(),
            self.claimed_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }
}

impl TableRow for ListingDetail {
    fn headers() -> &'static [&'static str] {
        &[
            "ID", "Food", "Qty", "Expiry", "Provider", "Provider Type", "Contact", "City",
            "Food Type", "Meal Type",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.food_id.to_string(),
            self.food_name.clone(),
            self.quantity.to_string(),
            self.expiry_date.to_string(),
            self.provider_name.clone(),
            self.provider_type.clone(),
            self.provider_contact.clone(),
            self.city.clone(),
            self.food_type.clone(),
            self.meal_type.clone(),
        ]
    }
}

impl TableRow for ClaimDetail {
    fn headers() -> &'static [&'static str] {
        &["ID", "Status", "Claimed At", "Food", "Receiver"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.claim_id.to_string(),
            self.status.to_string(),
            self.claimed_at.format("%Y-%m-%d %H:%M").to_string(),
            format!("{} ({})", self.food_name, self.food_id),
            format!("{} ({})", self.receiver_name, self.receiver_id),
        ]
    }
}

/// Lay out rows under headers, each column padded to its widest cell
pub fn format_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(headers.iter().map(|h| h.as_ref()).collect()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Text rendering of a report
pub fn format_report(table: &ReportTable) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    format!("{}\n{}", table.title, format_table(&table.columns, &rows))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a list of records as JSON or as a table
pub fn print_records<T: TableRow + Serialize>(records: &[T], as_json: bool) -> Result<()> {
    if as_json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No matching records.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.cells()).collect();
    println!("{}", format_table(T::headers(), &rows));
    println!("{} record(s)", records.len());
    Ok(())
}

/// Print a single record
pub fn print_record<T: TableRow + Serialize>(record: &T, as_json: bool) -> Result<()> {
    if as_json {
        return print_json(record);
    }
    println!("{}", format_table(T::headers(), &[record.cells()]));
    Ok(())
}

/// Unwrap a flag that `add` needs even though `update` treats it as optional
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| FoodError::validation(format!("--{} is required", flag)))
}
