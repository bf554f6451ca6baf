//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};
use crate::error::{Entity, FoodError};
use chrono::{NaiveDate, NaiveDateTime};

fn create_test_db() -> FoodDatabase {
    FoodDatabase::new_in_memory().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn provider(id: i64, name: &str, provider_type: &str, city: &str) -> Provider {
    Provider {
        provider_id: ProviderId::new(id),
        name: name.to_string(),
        provider_type: provider_type.to_string(),
        address: format!("{} Main Street", id),
        city: city.to_string(),
        contact: format!("+1-555-010{}", id),
    }
}

fn receiver(id: i64, name: &str, city: &str) -> Receiver {
    Receiver {
        receiver_id: ReceiverId::new(id),
        name: name.to_string(),
        receiver_type: "NGO".to_string(),
        city: city.to_string(),
        contact: format!("recv{}@example.org", id),
    }
}

fn listing(id: i64, provider_id: i64, food_name: &str, city: &str, expiry: NaiveDate) -> FoodListing {
    FoodListing {
        food_id: FoodId::new(id),
        food_name: food_name.to_string(),
        quantity: 10,
        expiry_date: expiry,
        provider_id: ProviderId::new(provider_id),
        location: city.to_string(),
        food_type: "Vegetarian".to_string(),
        meal_type: "Lunch".to_string(),
        listed_at: None,
    }
}

fn claim(id: i64, food_id: i64, receiver_id: i64, status: ClaimStatus) -> Claim {
    Claim {
        claim_id: ClaimId::new(id),
        food_id: FoodId::new(food_id),
        receiver_id: ReceiverId::new(receiver_id),
        status,
        claimed_at: ts(2025, 3, 5, 10),
    }
}

/// Two providers, two receivers, three listings, two claims
fn create_seeded_db() -> FoodDatabase {
    let mut db = create_test_db();
    db.create_provider(&provider(1, "Green Grocer", "Grocery Store", "Delhi"))
        .unwrap();
    db.create_provider(&provider(2, "Spice Route", "Restaurant", "Mumbai"))
        .unwrap();
    db.create_receiver(&receiver(1, "Hope Shelter", "Delhi")).unwrap();
    db.create_receiver(&receiver(2, "Food for All", "Mumbai")).unwrap();

    db.create_listing(&listing(1, 1, "Bread", "Delhi", date(2025, 3, 10)))
        .unwrap();
    let mut rice = listing(2, 2, "Rice", "Mumbai", date(2025, 3, 8));
    rice.food_type = "Vegan".to_string();
    rice.meal_type = "Dinner".to_string();
    rice.quantity = 40;
    db.create_listing(&rice).unwrap();
    db.create_listing(&listing(3, 1, "Apples", "Delhi", date(2025, 3, 20)))
        .unwrap();

    db.create_claim(&claim(1, 1, 1, ClaimStatus::Completed)).unwrap();
    db.create_claim(&claim(2, 2, 2, ClaimStatus::Pending)).unwrap();
    db
}

#[test]
fn test_database_creation() {
    let db = create_test_db();
    let counts = db.table_counts().unwrap();
    assert_eq!(counts.providers, 0);
    assert_eq!(counts.claims, 0);
}

#[test]
fn test_schema_is_reusable() {
    let mut db = create_seeded_db();
    db.initialize_schema().unwrap();
    assert_eq!(db.table_counts().unwrap().food_listings, 3);
}

// -------------------------------------------------------------------------
// Create / Read
// -------------------------------------------------------------------------

#[test]
fn test_create_then_get_returns_equal_records() {
    let mut db = create_test_db();

    let p = provider(7, "Bakery Bros", "Restaurant", "Pune");
    db.create_provider(&p).unwrap();
    assert_eq!(db.get_provider(ProviderId::new(7)).unwrap(), p);

    let r = receiver(3, "Night Kitchen", "Pune");
    db.create_receiver(&r).unwrap();
    assert_eq!(db.get_receiver(ReceiverId::new(3)).unwrap(), r);

    let mut l = listing(11, 7, "Croissants", "Pune", date(2025, 4, 1));
    l.listed_at = Some(ts(2025, 3, 30, 18));
    db.create_listing(&l).unwrap();
    assert_eq!(db.get_listing(FoodId::new(11)).unwrap(), l);

    let c = claim(5, 11, 3, ClaimStatus::Pending);
    db.create_claim(&c).unwrap();
    assert_eq!(db.get_claim(ClaimId::new(5)).unwrap(), c);
}

#[test]
fn test_create_duplicate_provider_fails() {
    let mut db = create_seeded_db();

    let result = db.create_provider(&provider(1, "Someone Else", "Restaurant", "Goa"));
    match result {
        Err(FoodError::DuplicateKey { entity, id }) => {
            assert_eq!(entity, Entity::Provider);
            assert_eq!(id, 1);
        }
        other => panic!("Expected DuplicateKey, got {:?}", other),
    }

    // Original record untouched
    assert_eq!(db.get_provider(ProviderId::new(1)).unwrap().name, "Green Grocer");
}

#[test]
fn test_create_duplicate_claim_fails() {
    let mut db = create_seeded_db();
    let result = db.create_claim(&claim(1, 3, 2, ClaimStatus::Pending));
    assert!(matches!(
        result,
        Err(FoodError::DuplicateKey {
            entity: Entity::Claim,
            id: 1
        })
    ));
}

#[test]
fn test_create_listing_with_unknown_provider_fails() {
    let mut db = create_seeded_db();

    let result = db.create_listing(&listing(50, 99, "Soup", "Delhi", date(2025, 3, 9)));
    assert!(matches!(result, Err(FoodError::Validation { .. })));

    // No row inserted
    assert!(matches!(
        db.get_listing(FoodId::new(50)),
        Err(FoodError::NotFound { .. })
    ));
    assert_eq!(db.table_counts().unwrap().food_listings, 3);
}

#[test]
fn test_create_claim_with_unknown_references_fails() {
    let mut db = create_seeded_db();

    let unknown_listing = db.create_claim(&claim(9, 99, 1, ClaimStatus::Pending));
    assert!(matches!(unknown_listing, Err(FoodError::Validation { .. })));

    let unknown_receiver = db.create_claim(&claim(9, 1, 99, ClaimStatus::Pending));
    assert!(matches!(unknown_receiver, Err(FoodError::Validation { .. })));

    assert_eq!(db.table_counts().unwrap().claims, 2);
}

#[test]
fn test_create_rejects_blank_fields() {
    let mut db = create_test_db();
    let mut p = provider(1, "Name", "Restaurant", "Delhi");
    p.name = "   ".to_string();

    assert!(matches!(
        db.create_provider(&p),
        Err(FoodError::Validation { .. })
    ));
    assert_eq!(db.table_counts().unwrap().providers, 0);
}

#[test]
fn test_get_missing_record_is_not_found() {
    let db = create_test_db();
    match db.get_receiver(ReceiverId::new(404)) {
        Err(FoodError::NotFound { entity, id }) => {
            assert_eq!(entity, Entity::Receiver);
            assert_eq!(id, 404);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_find_with_no_filters_returns_everything() {
    let db = create_seeded_db();
    assert_eq!(db.find_providers(&ProviderFilter::default()).unwrap().len(), 2);
    assert_eq!(db.find_receivers(&ReceiverFilter::default()).unwrap().len(), 2);
    assert_eq!(db.find_listings(&ListingFilter::default()).unwrap().len(), 3);
    assert_eq!(db.find_claims(&ClaimFilter::default()).unwrap().len(), 2);
}

#[test]
fn test_find_with_unmatched_filter_returns_empty() {
    let db = create_seeded_db();
    let filter = ListingFilter {
        city: Some("Atlantis".to_string()),
        ..ListingFilter::default()
    };
    assert!(db.find_listings(&filter).unwrap().is_empty());
}

#[test]
fn test_text_filters_are_case_insensitive_and_trimmed() {
    let db = create_seeded_db();

    let filter = ProviderFilter {
        city: Some("  dElHi ".to_string()),
        ..ProviderFilter::default()
    };
    let providers = db.find_providers(&filter).unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].name, "Green Grocer");
}

#[test]
fn test_listing_filters_combine_with_and() {
    let db = create_seeded_db();

    let filter = ListingFilter {
        city: Some("delhi".to_string()),
        food_type: Some("VEGETARIAN".to_string()),
        ..ListingFilter::default()
    };
    let ids: Vec<i64> = db
        .find_listings(&filter)
        .unwrap()
        .iter()
        .map(|l| l.food_id.as_i64())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let narrower = ListingFilter {
        food_name: Some("apples".to_string()),
        ..filter
    };
    let listings = db.find_listings(&narrower).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].food_id, FoodId::new(3));
}

#[test]
fn test_listing_filter_by_provider_type_and_expiry_range() {
    let db = create_seeded_db();

    let by_type = ListingFilter {
        provider_type: Some("restaurant".to_string()),
        ..ListingFilter::default()
    };
    let listings = db.find_listings(&by_type).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].food_name, "Rice");

    let by_range = ListingFilter {
        expires_from: Some(date(2025, 3, 8)),
        expires_to: Some(date(2025, 3, 10)),
        ..ListingFilter::default()
    };
    let ids: Vec<i64> = db
        .find_listings(&by_range)
        .unwrap()
        .iter()
        .map(|l| l.food_id.as_i64())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_claim_filters() {
    let db = create_seeded_db();

    let pending = ClaimFilter {
        status: Some(ClaimStatus::Pending),
        ..ClaimFilter::default()
    };
    let claims = db.find_claims(&pending).unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].claim_id, ClaimId::new(2));

    let on_day = ClaimFilter {
        claimed_from: Some(date(2025, 3, 5)),
        claimed_to: Some(date(2025, 3, 5)),
        ..ClaimFilter::default()
    };
    assert_eq!(db.find_claims(&on_day).unwrap().len(), 2);

    let later = ClaimFilter {
        claimed_from: Some(date(2025, 3, 6)),
        ..ClaimFilter::default()
    };
    assert!(db.find_claims(&later).unwrap().is_empty());
}

// -------------------------------------------------------------------------
// Update
// -------------------------------------------------------------------------

#[test]
fn test_update_changes_only_supplied_fields() {
    let mut db = create_seeded_db();
    let before = db.get_provider(ProviderId::new(1)).unwrap();

    let update = ProviderUpdate {
        contact: Some("new-contact@example.org".to_string()),
        city: Some("Noida".to_string()),
        ..ProviderUpdate::default()
    };
    let returned = db.update_provider(ProviderId::new(1), update).unwrap();
    let after = db.get_provider(ProviderId::new(1)).unwrap();

    assert_eq!(returned, after);
    assert_eq!(after.contact, "new-contact@example.org");
    assert_eq!(after.city, "Noida");
    assert_eq!(after.provider_id, before.provider_id);
    assert_eq!(after.name, before.name);
    assert_eq!(after.provider_type, before.provider_type);
    assert_eq!(after.address, before.address);
}

#[test]
fn test_update_missing_record_is_not_found() {
    let mut db = create_test_db();
    let result = db.update_receiver(ReceiverId::new(1), ReceiverUpdate::default());
    assert!(matches!(result, Err(FoodError::NotFound { .. })));
}

#[test]
fn test_update_listing_quantity() {
    let mut db = create_seeded_db();
    let update = FoodListingUpdate {
        quantity: Some(0),
        ..FoodListingUpdate::default()
    };
    let updated = db.update_listing(FoodId::new(2), update).unwrap();
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.food_name, "Rice");
    assert_eq!(db.get_listing(FoodId::new(2)).unwrap().quantity, 0);
}

#[test]
fn test_update_listing_revalidates_provider() {
    let mut db = create_seeded_db();
    let update = FoodListingUpdate {
        provider_id: Some(ProviderId::new(99)),
        quantity: Some(3),
        ..FoodListingUpdate::default()
    };

    let result = db.update_listing(FoodId::new(1), update);
    assert!(matches!(result, Err(FoodError::Validation { .. })));

    // Nothing changed
    let stored = db.get_listing(FoodId::new(1)).unwrap();
    assert_eq!(stored.provider_id, ProviderId::new(1));
    assert_eq!(stored.quantity, 10);
}

#[test]
fn test_update_listing_to_existing_provider() {
    let mut db = create_seeded_db();
    let update = FoodListingUpdate {
        provider_id: Some(ProviderId::new(2)),
        ..FoodListingUpdate::default()
    };
    let updated = db.update_listing(FoodId::new(1), update).unwrap();
    assert_eq!(updated.provider_id, ProviderId::new(2));
}

#[test]
fn test_claim_status_moves_forward_only() {
    let mut db = create_seeded_db();

    let done = db
        .update_claim(
            ClaimId::new(2),
            ClaimUpdate {
                status: Some(ClaimStatus::Completed),
            },
        )
        .unwrap();
    assert_eq!(done.status, ClaimStatus::Completed);

    let back = db.update_claim(
        ClaimId::new(2),
        ClaimUpdate {
            status: Some(ClaimStatus::Pending),
        },
    );
    assert!(matches!(back, Err(FoodError::Validation { .. })));
    assert_eq!(
        db.get_claim(ClaimId::new(2)).unwrap().status,
        ClaimStatus::Completed
    );

    // Re-applying the same status is accepted
    let same = db.update_claim(
        ClaimId::new(2),
        ClaimUpdate {
            status: Some(ClaimStatus::Completed),
        },
    );
    assert!(same.is_ok());
}

// -------------------------------------------------------------------------
// Delete
// -------------------------------------------------------------------------

#[test]
fn test_delete_claim_then_get_is_not_found() {
    let mut db = create_seeded_db();
    db.delete_claim(ClaimId::new(2)).unwrap();

    assert!(matches!(
        db.get_claim(ClaimId::new(2)),
        Err(FoodError::NotFound { .. })
    ));
    let filter = ClaimFilter {
        food_id: Some(FoodId::new(2)),
        ..ClaimFilter::default()
    };
    assert!(db.find_claims(&filter).unwrap().is_empty());
}

#[test]
fn test_delete_missing_record_is_not_found() {
    let mut db = create_test_db();
    assert!(matches!(
        db.delete_provider(ProviderId::new(1)),
        Err(FoodError::NotFound { .. })
    ));
    assert!(matches!(
        db.delete_claim(ClaimId::new(1)),
        Err(FoodError::NotFound { .. })
    ));
}

#[test]
fn test_delete_provider_with_listings_is_blocked() {
    let mut db = create_seeded_db();

    match db.delete_provider(ProviderId::new(1)) {
        Err(FoodError::ReferentialIntegrity {
            entity,
            id,
            dependent,
            count,
        }) => {
            assert_eq!(entity, Entity::Provider);
            assert_eq!(id, 1);
            assert_eq!(dependent, Entity::FoodListing);
            assert_eq!(count, 2);
        }
        other => panic!("Expected ReferentialIntegrity, got {:?}", other),
    }
    assert!(db.get_provider(ProviderId::new(1)).is_ok());
    assert_eq!(db.table_counts().unwrap().food_listings, 3);
}

#[test]
fn test_delete_receiver_with_claims_is_blocked() {
    let mut db = create_seeded_db();
    assert!(matches!(
        db.delete_receiver(ReceiverId::new(1)),
        Err(FoodError::ReferentialIntegrity { .. })
    ));
}

#[test]
fn test_delete_listing_with_claims_is_blocked() {
    let mut db = create_seeded_db();
    assert!(matches!(
        db.delete_listing(FoodId::new(1)),
        Err(FoodError::ReferentialIntegrity { .. })
    ));

    // Listing 3 has no claims
    db.delete_listing(FoodId::new(3)).unwrap();
    assert!(matches!(
        db.get_listing(FoodId::new(3)),
        Err(FoodError::NotFound { .. })
    ));
}

#[test]
fn test_delete_provider_after_dependents_removed() {
    let mut db = create_seeded_db();
    db.delete_claim(ClaimId::new(2)).unwrap();
    db.delete_listing(FoodId::new(2)).unwrap();
    db.delete_provider(ProviderId::new(2)).unwrap();
    assert!(db.get_provider(ProviderId::new(2)).is_err());
}

// -------------------------------------------------------------------------
// Browse and lookups
// -------------------------------------------------------------------------

#[test]
fn test_browse_listings_joins_provider_and_orders_by_expiry() {
    let db = create_seeded_db();
    let rows = db.browse_listings(&ListingFilter::default()).unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.food_name.as_str()).collect();
    assert_eq!(names, vec!["Rice", "Bread", "Apples"]);
    assert_eq!(rows[0].provider_name, "Spice Route");
    assert_eq!(rows[0].provider_type, "Restaurant");
    assert_eq!(rows[0].city, "Mumbai");
}

#[test]
fn test_browse_listings_by_provider_name() {
    let db = create_seeded_db();
    let filter = ListingFilter {
        provider_name: Some("green grocer".to_string()),
        ..ListingFilter::default()
    };
    assert_eq!(db.browse_listings(&filter).unwrap().len(), 2);
}

#[test]
fn test_browse_claims_joins_names() {
    let db = create_seeded_db();
    let rows = db.browse_claims(&ClaimFilter::default()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].claim_id, ClaimId::new(2));
    assert_eq!(rows[0].food_name, "Rice");
    assert_eq!(rows[0].receiver_name, "Food for All");
}

#[test]
fn test_filter_options_are_distinct_and_sorted() {
    let mut db = create_seeded_db();
    db.create_receiver(&receiver(3, "Delhi Kitchen", "Delhi")).unwrap();

    let options = db.filter_options().unwrap();
    assert_eq!(options.cities, vec!["Delhi", "Mumbai"]);
    assert_eq!(options.provider_names, vec!["Green Grocer", "Spice Route"]);
    assert_eq!(options.provider_types, vec!["Grocery Store", "Restaurant"]);
    assert_eq!(options.food_types, vec!["Vegan", "Vegetarian"]);
    assert_eq!(options.meal_types, vec!["Dinner", "Lunch"]);
}

#[test]
fn test_listing_summary() {
    let db = create_seeded_db();
    let summary = db
        .listing_summary(&ListingFilter::default(), date(2025, 3, 8), 2)
        .unwrap();

    assert_eq!(summary.listings, 3);
    assert_eq!(summary.total_quantity, 60);
    // Rice (3/8) and Bread (3/10)
    assert_eq!(summary.expiring_soon, 2);
}

#[test]
fn test_listing_summary_counts_already_expired() {
    let db = create_seeded_db();
    let summary = db
        .listing_summary(&ListingFilter::default(), date(2025, 3, 12), 2)
        .unwrap();
    // Rice (3/8) and Bread (3/10) are past; Apples (3/20) is outside the window
    assert_eq!(summary.expiring_soon, 2);

    let later = db
        .listing_summary(&ListingFilter::default(), date(2025, 3, 30), 0)
        .unwrap();
    assert_eq!(later.expiring_soon, 3);
}

#[test]
fn test_listing_summary_on_empty_database() {
    let db = create_test_db();
    let summary = db
        .listing_summary(&ListingFilter::default(), date(2025, 3, 8), 2)
        .unwrap();
    assert_eq!(summary.listings, 0);
    assert_eq!(summary.total_quantity, 0);
    assert_eq!(summary.expiring_soon, 0);
}

#[test]
fn test_expiring_listings_respects_window_and_limit() {
    let db = create_seeded_db();

    // Rice expired on 3/8 but still needs attention
    let soon = db.expiring_listings(date(2025, 3, 9), 2, None).unwrap();
    let names: Vec<&str> = soon.iter().map(|r| r.food_name.as_str()).collect();
    assert_eq!(names, vec!["Rice", "Bread"]);

    let limited = db.expiring_listings(date(2025, 3, 1), 30, Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].food_name, "Rice");
}

#[test]
fn test_next_ids() {
    let db = create_seeded_db();
    assert_eq!(db.next_provider_id().unwrap(), ProviderId::new(3));
    assert_eq!(db.next_receiver_id().unwrap(), ReceiverId::new(3));
    assert_eq!(db.next_food_id().unwrap(), FoodId::new(4));
    assert_eq!(db.next_claim_id().unwrap(), ClaimId::new(3));

    let empty = create_test_db();
    assert_eq!(empty.next_claim_id().unwrap(), ClaimId::new(1));
}
