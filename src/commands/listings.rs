//! Browse, summary, contacts and filter-option commands

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    storage::{FoodDatabase, ListingFilter, Provider, ProviderFilter, Receiver, ReceiverFilter},
    Result,
};

use super::common::{format_table, print_json, print_records};

/// How many soon-to-expire listings `summary` prints below the totals
const EXPIRING_PREVIEW: u32 = 10;

/// Handle `listings`
pub fn handle_listings(db: &FoodDatabase, filter: ListingFilter, as_json: bool) -> Result<()> {
    print_records(&db.browse_listings(&filter)?, as_json)
}

/// Handle `summary`
pub fn handle_summary(
    db: &FoodDatabase,
    filter: ListingFilter,
    as_of: NaiveDate,
    within_days: u32,
    as_json: bool,
) -> Result<()> {
    let summary = db.listing_summary(&filter, as_of, within_days)?;
    let expiring = db.expiring_listings(as_of, within_days, Some(EXPIRING_PREVIEW))?;

    if as_json {
        return print_json(&serde_json::json!({
            "summary": summary,
            "expiring": expiring,
        }));
    }

    println!("Listings:        {}", summary.listings);
    println!("Total quantity:  {}", summary.total_quantity);
    println!(
        "Expiring within {} day(s) of {}: {}",
        summary.within_days, summary.as_of, summary.expiring_soon
    );

    if !expiring.is_empty() {
        println!();
        println!("Soonest to expire (all listings):");
        print_records(&expiring, false)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Contacts {
    providers: Vec<Provider>,
    receivers: Vec<Receiver>,
}

/// Handle `contacts`: providers and receivers, optionally in one city
pub fn handle_contacts(db: &FoodDatabase, city: Option<String>, as_json: bool) -> Result<()> {
    let contacts = Contacts {
        providers: db.find_providers(&ProviderFilter {
            city: city.clone(),
            ..ProviderFilter::default()
        })?,
        receivers: db.find_receivers(&ReceiverFilter {
            city,
            ..ReceiverFilter::default()
        })?,
    };

    if as_json {
        return print_json(&contacts);
    }

    println!("Providers");
    print_records(&contacts.providers, false)?;
    println!();
    println!("Receivers");
    print_records(&contacts.receivers, false)
}

/// Handle `options`
pub fn handle_options(db: &FoodDatabase, as_json: bool) -> Result<()> {
    let options = db.filter_options()?;
    if as_json {
        return print_json(&options);
    }

    let groups = [
        ("Cities", &options.cities),
        ("Providers", &options.provider_names),
        ("Provider types", &options.provider_types),
        ("Food types", &options.food_types),
        ("Meal types", &options.meal_types),
    ];
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|(label, values)| vec![label.to_string(), values.join(", ")])
        .collect();
    println!("{}", format_table(&["Filter", "Values"], &rows));
    Ok(())
}
