//! Data models for the storage layer

use crate::cli::types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};
use crate::error::{FoodError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A food donor (restaurant, grocery store, caterer, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: ProviderId,
    pub name: String,
    pub provider_type: String,
    pub address: String,
    pub city: String,
    pub contact: String,
}

/// An organisation or person that claims donated food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub receiver_id: ReceiverId,
    pub name: String,
    pub receiver_type: String,
    pub city: String,
    pub contact: String,
}

/// A quantity of food offered by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    pub food_id: FoodId,
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: ProviderId,
    /// City the food can be collected in
    pub location: String,
    pub food_type: String,
    pub meal_type: String,
    pub listed_at: Option<NaiveDateTime>,
}

/// A receiver's reservation against a food listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub food_id: FoodId,
    pub receiver_id: ReceiverId,
    pub status: ClaimStatus,
    pub claimed_at: NaiveDateTime,
}

/// Partial update for a provider; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderUpdate {
    pub name: Option<String>,
    pub provider_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}

/// Partial update for a receiver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverUpdate {
    pub name: Option<String>,
    pub receiver_type: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}

/// Partial update for a food listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodListingUpdate {
    pub food_name: Option<String>,
    pub quantity: Option<u32>,
    pub expiry_date: Option<NaiveDate>,
    pub provider_id: Option<ProviderId>,
    pub location: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
    pub listed_at: Option<NaiveDateTime>,
}

/// Claims only ever change status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub status: Option<ClaimStatus>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FoodError::validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

impl Provider {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("type", &self.provider_type)?;
        require("address", &self.address)?;
        require("city", &self.city)?;
        require("contact", &self.contact)
    }

    pub(crate) fn apply(&mut self, update: ProviderUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.provider_type {
            self.provider_type = v;
        }
        if let Some(v) = update.address {
            self.address = v;
        }
        if let Some(v) = update.city {
            self.city = v;
        }
        if let Some(v) = update.contact {
            self.contact = v;
        }
    }
}

impl Receiver {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("type", &self.receiver_type)?;
        require("city", &self.city)?;
        require("contact", &self.contact)
    }

    pub(crate) fn apply(&mut self, update: ReceiverUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.receiver_type {
            self.receiver_type = v;
        }
        if let Some(v) = update.city {
            self.city = v;
        }
        if let Some(v) = update.contact {
            self.contact = v;
        }
    }
}

impl FoodListing {
    /// Field checks only; the provider reference is checked against the database.
    pub fn validate(&self) -> Result<()> {
        require("food name", &self.food_name)?;
        require("location", &self.location)?;
        require("food type", &self.food_type)?;
        require("meal type", &self.meal_type)
    }

    pub(crate) fn apply(&mut self, update: FoodListingUpdate) {
        if let Some(v) = update.food_name {
            self.food_name = v;
        }
        if let Some(v) = update.quantity {
            self.quantity = v;
        }
        if let Some(v) = update.expiry_date {
            self.expiry_date = v;
        }
        if let Some(v) = update.provider_id {
            self.provider_id = v;
        }
        if let Some(v) = update.location {
            self.location = v;
        }
        if let Some(v) = update.food_type {
            self.food_type = v;
        }
        if let Some(v) = update.meal_type {
            self.meal_type = v;
        }
        if let Some(v) = update.listed_at {
            self.listed_at = Some(v);
        }
    }
}

/// Search criteria for providers. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderFilter {
    pub name: Option<String>,
    pub provider_type: Option<String>,
    pub city: Option<String>,
}

/// Search criteria for receivers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverFilter {
    pub name: Option<String>,
    pub receiver_type: Option<String>,
    pub city: Option<String>,
}

/// Search criteria for food listings
///
/// Text fields match case-insensitively; the expiry bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub provider_id: Option<ProviderId>,
    pub provider_name: Option<String>,
    pub provider_type: Option<String>,
    pub city: Option<String>,
    pub food_name: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
    pub expires_from: Option<NaiveDate>,
    pub expires_to: Option<NaiveDate>,
    pub min_quantity: Option<u32>,
}

/// Search criteria for claims; the date bounds apply to `claimed_at` and are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimFilter {
    pub food_id: Option<FoodId>,
    pub receiver_id: Option<ReceiverId>,
    pub status: Option<ClaimStatus>,
    pub claimed_from: Option<NaiveDate>,
    pub claimed_to: Option<NaiveDate>,
}

/// A listing joined with its provider, as shown when browsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub food_id: FoodId,
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub provider_type: String,
    pub provider_contact: String,
    pub city: String,
    pub food_type: String,
    pub meal_type: String,
}

/// A claim joined with the food it reserves and the receiver that placed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDetail {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub claimed_at: NaiveDateTime,
    pub food_id: FoodId,
    pub food_name: String,
    pub receiver_id: ReceiverId,
    pub receiver_name: String,
}

/// Distinct values available for filtering, each sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub provider_names: Vec<String>,
    pub provider_types: Vec<String>,
    pub food_types: Vec<String>,
    pub meal_types: Vec<String>,
}

/// Headline numbers for a filtered set of listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub listings: u64,
    pub total_quantity: u64,
    /// Listings expiring on or before `as_of + within_days`
    pub expiring_soon: u64,
    pub as_of: NaiveDate,
    pub within_days: u32,
}
