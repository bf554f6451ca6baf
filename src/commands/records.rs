//! Create, show, list, update and delete commands for the four record types

use chrono::{Local, NaiveDateTime};

use crate::{
    cli::{ClaimCmd, ListingCmd, ProviderCmd, ReceiverCmd},
    error::Entity,
    storage::{Claim, ClaimUpdate, FoodDatabase, FoodListing, Provider, Receiver},
    Result,
};

use super::common::{print_json, print_record, print_records, required};

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn report_deleted(entity: Entity, id: i64, as_json: bool) -> Result<()> {
    if as_json {
        print_json(&serde_json::json!({ "deleted": entity.to_string(), "id": id }))
    } else {
        println!("✓ {} {} deleted", entity, id);
        Ok(())
    }
}

/// Handle `provider <cmd>`
pub fn handle_provider(db: &mut FoodDatabase, cmd: ProviderCmd, as_json: bool) -> Result<()> {
    match cmd {
        ProviderCmd::Add { id, fields } => {
            let provider_id = match id {
                Some(id) => id,
                None => db.next_provider_id()?,
            };
            let provider = Provider {
                provider_id,
                name: required(fields.name, "name")?,
                provider_type: required(fields.provider_type, "type")?,
                address: required(fields.address, "address")?,
                city: required(fields.city, "city")?,
                contact: required(fields.contact, "contact")?,
            };
            db.create_provider(&provider)?;
            print_record(&provider, as_json)
        }
        ProviderCmd::Get { id } => print_record(&db.get_provider(id)?, as_json),
        ProviderCmd::List { filters } => {
            print_records(&db.find_providers(&filters.into())?, as_json)
        }
        ProviderCmd::Update { id, fields } => {
            print_record(&db.update_provider(id, fields.into())?, as_json)
        }
        ProviderCmd::Delete { id } => {
            db.delete_provider(id)?;
            report_deleted(Entity::Provider, id.as_i64(), as_json)
        }
    }
}

/// Handle `receiver <cmd>`
pub fn handle_receiver(db: &mut FoodDatabase, cmd: ReceiverCmd, as_json: bool) -> Result<()> {
    match cmd {
        ReceiverCmd::Add { id, fields } => {
            let receiver_id = match id {
                Some(id) => id,
                None => db.next_receiver_id()?,
            };
            let receiver = Receiver {
                receiver_id,
                name: required(fields.name, "name")?,
                receiver_type: required(fields.receiver_type, "type")?,
                city: required(fields.city, "city")?,
                contact: required(fields.contact, "contact")?,
            };
            db.create_receiver(&receiver)?;
            print_record(&receiver, as_json)
        }
        ReceiverCmd::Get { id } => print_record(&db.get_receiver(id)?, as_json),
        ReceiverCmd::List { filters } => {
            print_records(&db.find_receivers(&filters.into())?, as_json)
        }
        ReceiverCmd::Update { id, fields } => {
            print_record(&db.update_receiver(id, fields.into())?, as_json)
        }
        ReceiverCmd::Delete { id } => {
            db.delete_receiver(id)?;
            report_deleted(Entity::Receiver, id.as_i64(), as_json)
        }
    }
}

/// Handle `listing <cmd>`
pub fn handle_listing(db: &mut FoodDatabase, cmd: ListingCmd, as_json: bool) -> Result<()> {
    match cmd {
        ListingCmd::Add { id, fields } => {
            let food_id = match id {
                Some(id) => id,
                None => db.next_food_id()?,
            };
            let listing = FoodListing {
                food_id,
                food_name: required(fields.food_name, "food-name")?,
                quantity: required(fields.quantity, "quantity")?,
                expiry_date: required(fields.expiry, "expiry")?,
                provider_id: required(fields.provider_id, "provider-id")?,
                location: required(fields.location, "location")?,
                food_type: required(fields.food_type, "food-type")?,
                meal_type: required(fields.meal_type, "meal-type")?,
                listed_at: Some(now()),
            };
            db.create_listing(&listing)?;
            print_record(&listing, as_json)
        }
        ListingCmd::Get { id } => print_record(&db.get_listing(id)?, as_json),
        ListingCmd::List { filters } => print_records(&db.find_listings(&filters.into())?, as_json),
        ListingCmd::Update { id, fields } => {
            print_record(&db.update_listing(id, fields.into())?, as_json)
        }
        ListingCmd::Delete { id } => {
            db.delete_listing(id)?;
            report_deleted(Entity::FoodListing, id.as_i64(), as_json)
        }
    }
}

/// Handle `claim <cmd>`
pub fn handle_claim(db: &mut FoodDatabase, cmd: ClaimCmd, as_json: bool) -> Result<()> {
    match cmd {
        ClaimCmd::Add {
            id,
            food_id,
            receiver_id,
            status,
            at,
        } => {
            let claim_id = match id {
                Some(id) => id,
                None => db.next_claim_id()?,
            };
            let claim = Claim {
                claim_id,
                food_id,
                receiver_id,
                status,
                claimed_at: at.unwrap_or_else(now),
            };
            db.create_claim(&claim)?;
            print_record(&claim, as_json)
        }
        ClaimCmd::Get { id } => print_record(&db.get_claim(id)?, as_json),
        ClaimCmd::List { filters } => print_records(&db.browse_claims(&filters.into())?, as_json),
        ClaimCmd::Status { id, status } => {
            let claim = db.update_claim(
                id,
                ClaimUpdate {
                    status: Some(status),
                },
            )?;
            print_record(&claim, as_json)
        }
        ClaimCmd::Delete { id } => {
            db.delete_claim(id)?;
            report_deleted(Entity::Claim, id.as_i64(), as_json)
        }
    }
}
