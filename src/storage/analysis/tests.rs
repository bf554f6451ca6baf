//! Unit tests for the report catalog

use super::*;
use crate::cli::types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};
use crate::storage::models::{Claim, FoodListing, Provider, Receiver};
use chrono::NaiveDate;
use std::collections::HashSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_directory(db: &mut FoodDatabase) {
    for (id, name, kind, city) in [
        (1, "Green Grocer", "Grocery Store", "Delhi"),
        (2, "Spice Route", "Restaurant", "Mumbai"),
        (3, "Daily Bread", "Restaurant", "Delhi"),
    ] {
        db.create_provider(&Provider {
            provider_id: ProviderId::new(id),
            name: name.to_string(),
            provider_type: kind.to_string(),
            address: "1 Market Road".to_string(),
            city: city.to_string(),
            contact: "555-0100".to_string(),
        })
        .unwrap();
    }

    for (id, name, city) in [(1, "Hope Shelter", "Delhi"), (2, "Food for All", "Pune")] {
        db.create_receiver(&Receiver {
            receiver_id: ReceiverId::new(id),
            name: name.to_string(),
            receiver_type: "Shelter".to_string(),
            city: city.to_string(),
            contact: "555-0200".to_string(),
        })
        .unwrap();
    }
}

fn add_listing(
    db: &mut FoodDatabase,
    id: i64,
    provider: i64,
    name: &str,
    qty: u32,
    city: &str,
    food_type: &str,
    meal_type: &str,
) {
    db.create_listing(&FoodListing {
        food_id: FoodId::new(id),
        food_name: name.to_string(),
        quantity: qty,
        expiry_date: date(2025, 3, 10),
        provider_id: ProviderId::new(provider),
        location: city.to_string(),
        food_type: food_type.to_string(),
        meal_type: meal_type.to_string(),
        listed_at: None,
    })
    .unwrap();
}

fn add_claim(db: &mut FoodDatabase, id: i64, food: i64, receiver: i64, status: ClaimStatus, hour: u32) {
    db.create_claim(&Claim {
        claim_id: ClaimId::new(id),
        food_id: FoodId::new(food),
        receiver_id: ReceiverId::new(receiver),
        status,
        claimed_at: date(2025, 3, 8).and_hms_opt(hour, 30, 0).unwrap(),
    })
    .unwrap();
}

/// Three listings and ten claims: six completed, four pending
fn seeded_db() -> FoodDatabase {
    let mut db = FoodDatabase::new_in_memory().unwrap();
    seed_directory(&mut db);
    add_listing(&mut db, 1, 1, "Bread", 20, "Delhi", "Vegetarian", "Breakfast");
    add_listing(&mut db, 2, 2, "Biryani", 50, "Mumbai", "Non-Vegetarian", "Dinner");
    add_listing(&mut db, 3, 3, "Salad", 30, "Delhi", "Vegan", "Lunch");

    let claims = [
        (1, 1, 1, ClaimStatus::Completed, 9),
        (2, 1, 2, ClaimStatus::Completed, 9),
        (3, 1, 1, ClaimStatus::Pending, 12),
        (4, 2, 2, ClaimStatus::Completed, 18),
        (5, 2, 2, ClaimStatus::Completed, 18),
        (6, 2, 1, ClaimStatus::Pending, 18),
        (7, 3, 1, ClaimStatus::Pending, 12),
        (8, 3, 2, ClaimStatus::Pending, 12),
        (9, 1, 1, ClaimStatus::Completed, 9),
        (10, 2, 2, ClaimStatus::Completed, 20),
    ];
    for (id, food, receiver, status, hour) in claims {
        add_claim(&mut db, id, food, receiver, status, hour);
    }
    db
}

#[test]
fn test_catalog_names_are_unique_and_parse_back() {
    let mut names = HashSet::new();
    for report in Report::ALL {
        assert!(names.insert(report.name()), "duplicate name {}", report.name());
        assert_eq!(report.name().parse::<Report>().unwrap(), report);
        assert!(!report.definition().columns.is_empty());
    }
}

#[test]
fn test_report_parse_accepts_underscores_and_case() {
    assert_eq!(
        "Completion_Rate".parse::<Report>().unwrap(),
        Report::CompletionRate
    );
    assert!(matches!(
        "no-such-report".parse::<Report>(),
        Err(FoodError::UnknownReport { .. })
    ));
}

#[test]
fn test_every_report_runs_on_empty_database() {
    let db = FoodDatabase::new_in_memory().unwrap();
    for report in Report::ALL {
        let table = db.run_report(report).unwrap();
        assert_eq!(table.columns, report.definition().columns);
    }
}

#[test]
fn test_empty_aggregates_are_zero() {
    let db = FoodDatabase::new_in_memory().unwrap();

    let total = db.run_report(Report::TotalQuantity).unwrap();
    assert_eq!(total.rows.len(), 1);
    assert_eq!(total.value(0, "total_quantity").and_then(Cell::as_i64), Some(0));

    let rate = db.run_report(Report::CompletionRate).unwrap();
    assert_eq!(rate.value(0, "total_claims").and_then(Cell::as_i64), Some(0));
    assert_eq!(rate.value(0, "completion_rate").and_then(Cell::as_f64), Some(0.0));

    let timeliness = db.run_report(Report::ClaimTimeliness).unwrap();
    assert_eq!(
        timeliness
            .value(0, "avg_days_before_expiry")
            .and_then(Cell::as_f64),
        Some(0.0)
    );

    let grouped = db.run_report(Report::CompletionRateByCity).unwrap();
    assert!(grouped.rows.is_empty());
}

#[test]
fn test_completion_rate_six_of_ten() {
    let db = seeded_db();
    let table = db.run_report(Report::CompletionRate).unwrap();

    assert_eq!(table.value(0, "total_claims").and_then(Cell::as_i64), Some(10));
    assert_eq!(table.value(0, "completed_claims").and_then(Cell::as_i64), Some(6));
    assert_eq!(table.value(0, "completion_rate").and_then(Cell::as_f64), Some(0.6));
}

#[test]
fn test_completion_rate_by_city() {
    let db = seeded_db();
    let table = db.run_report(Report::CompletionRateByCity).unwrap();

    // Mumbai: listing 2 has claims 4,5,6,10 (3 completed of 4)
    // Delhi: listings 1 and 3 have claims 1,2,3,7,8,9 (3 completed of 6)
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.value(0, "city").and_then(Cell::as_str), Some("Mumbai"));
    assert_eq!(table.value(0, "completion_rate").and_then(Cell::as_f64), Some(0.75));
    assert_eq!(table.value(1, "city").and_then(Cell::as_str), Some("Delhi"));
    assert_eq!(table.value(1, "total_claims").and_then(Cell::as_i64), Some(6));
    assert_eq!(table.value(1, "completion_rate").and_then(Cell::as_f64), Some(0.5));
}

#[test]
fn test_completion_rate_by_provider_type() {
    let db = seeded_db();
    let table = db.run_report(Report::CompletionRateByProviderType).unwrap();

    // Grocery Store: listing 1 -> claims 1,2,3,9 (3 of 4)
    // Restaurant: listings 2,3 -> claims 4,5,6,7,8,10 (3 of 6)
    assert_eq!(
        table.value(0, "provider_type").and_then(Cell::as_str),
        Some("Grocery Store")
    );
    assert_eq!(table.value(0, "completed_claims").and_then(Cell::as_i64), Some(3));
    assert_eq!(
        table.value(1, "provider_type").and_then(Cell::as_str),
        Some("Restaurant")
    );
    assert_eq!(table.value(1, "completion_rate").and_then(Cell::as_f64), Some(0.5));
}

#[test]
fn test_claim_status_share() {
    let db = seeded_db();
    let table = db.run_report(Report::ClaimStatusShare).unwrap();

    assert_eq!(table.value(0, "status").and_then(Cell::as_str), Some("Completed"));
    assert_eq!(table.value(0, "claim_count").and_then(Cell::as_i64), Some(6));
    assert_eq!(table.value(0, "share").and_then(Cell::as_f64), Some(0.6));
    assert_eq!(table.value(1, "status").and_then(Cell::as_str), Some("Pending"));
    assert_eq!(table.value(1, "claim_count").and_then(Cell::as_i64), Some(4));
}

#[test]
fn test_quantity_by_provider_type() {
    let db = seeded_db();
    let table = db.run_report(Report::QuantityByProviderType).unwrap();

    assert_eq!(table.rows.len(), 2);
    assert_eq!(
        table.value(0, "provider_type").and_then(Cell::as_str),
        Some("Restaurant")
    );
    assert_eq!(table.value(0, "total_quantity").and_then(Cell::as_i64), Some(80));
    assert_eq!(table.value(1, "total_quantity").and_then(Cell::as_i64), Some(20));
}

#[test]
fn test_providers_receivers_by_city() {
    let db = seeded_db();
    let table = db.run_report(Report::ProvidersReceiversByCity).unwrap();

    // Delhi: 2 providers, 1 receiver; Mumbai: 1, 0; Pune: 0, 1
    let cities: Vec<&str> = table
        .rows
        .iter()
        .filter_map(|r| r[0].as_str())
        .collect();
    assert_eq!(cities, vec!["Delhi", "Mumbai", "Pune"]);
    assert_eq!(table.value(0, "provider_count").and_then(Cell::as_i64), Some(2));
    assert_eq!(table.value(0, "receiver_count").and_then(Cell::as_i64), Some(1));
    assert_eq!(table.value(2, "receiver_count").and_then(Cell::as_i64), Some(1));
}

#[test]
fn test_top_receivers_and_hours() {
    let db = seeded_db();

    let receivers = db.run_report(Report::TopReceiversByClaims).unwrap();
    // Both receivers have five claims; name breaks the tie
    assert_eq!(
        receivers.value(0, "receiver").and_then(Cell::as_str),
        Some("Food for All")
    );
    assert_eq!(receivers.value(0, "total_claims").and_then(Cell::as_i64), Some(5));

    let hours = db.run_report(Report::ClaimsByHour).unwrap();
    let labels: Vec<&str> = hours.rows.iter().filter_map(|r| r[0].as_str()).collect();
    assert_eq!(labels, vec!["09", "12", "18", "20"]);
    assert_eq!(hours.value(0, "claim_count").and_then(Cell::as_i64), Some(3));
}

#[test]
fn test_completed_food_and_meal_types() {
    let db = seeded_db();

    let food = db.run_report(Report::CompletedFoodTypes).unwrap();
    assert_eq!(food.rows.len(), 2);
    assert_eq!(food.value(0, "completed_claims").and_then(Cell::as_i64), Some(3));
    // Salad (Vegan) has no completed claims
    assert!(food.rows.iter().all(|r| r[0].as_str() != Some("Vegan")));

    let meals = db.run_report(Report::CompletedMealTypes).unwrap();
    let kinds: Vec<&str> = meals.rows.iter().filter_map(|r| r[0].as_str()).collect();
    assert_eq!(kinds, vec!["Breakfast", "Dinner"]);
}

#[test]
fn test_listed_vs_claimed() {
    let db = seeded_db();
    let table = db.run_report(Report::ListedVsClaimed).unwrap();

    // Bread (20) and Biryani (50) have completed claims, Salad (30) does not
    assert_eq!(table.value(0, "total_listed").and_then(Cell::as_i64), Some(100));
    assert_eq!(table.value(0, "total_claimed").and_then(Cell::as_i64), Some(70));
    assert_eq!(table.value(0, "unclaimed").and_then(Cell::as_i64), Some(30));
    assert_eq!(table.value(0, "claimed_share").and_then(Cell::as_f64), Some(0.7));
}

#[test]
fn test_claim_timeliness() {
    let db = seeded_db();
    let table = db.run_report(Report::ClaimTimeliness).unwrap();

    // Every completed claim was placed on 3/8 at :30 past the hour; expiry is 3/10
    let avg = table
        .value(0, "avg_days_before_expiry")
        .and_then(Cell::as_f64)
        .unwrap();
    assert!(avg > 1.0 && avg < 2.0, "unexpected average {}", avg);
}

#[test]
fn test_most_active_providers() {
    let mut db = seeded_db();
    add_listing(&mut db, 4, 1, "Buns", 5, "Delhi", "Vegetarian", "Snacks");

    let table = db.run_report(Report::MostActiveProviders).unwrap();
    assert_eq!(table.value(0, "provider").and_then(Cell::as_str), Some("Green Grocer"));
    assert_eq!(table.value(0, "listing_count").and_then(Cell::as_i64), Some(2));
    assert_eq!(table.value(0, "total_quantity").and_then(Cell::as_i64), Some(25));
}

#[test]
fn test_reports_are_deterministic() {
    let db = seeded_db();
    let first = db.run_all_reports().unwrap();
    let second = db.run_all_reports().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), Report::ALL.len());
}

#[test]
fn test_report_table_serializes_plain_values() {
    let db = seeded_db();
    let table = db.run_report(Report::CompletionRate).unwrap();
    let json = serde_json::to_value(&table).unwrap();

    assert_eq!(json["report"], "completion-rate");
    assert_eq!(json["columns"][2], "completion_rate");
    assert_eq!(json["rows"][0][0], 10);
    assert_eq!(json["rows"][0][2], 0.6);
}
