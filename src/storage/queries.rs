//! CRUD and search operations over the four tables

use super::{filters::SqlFilter, models::*, schema::FoodDatabase};
use crate::cli::types::{ClaimId, FoodId, ProviderId, ReceiverId};
use crate::error::{Entity, FoodError, Result};
use chrono::{Days, NaiveDate};
use rusqlite::{params, OptionalExtension, Row, ToSql};

const PROVIDER_COLUMNS: &str = "provider_id, name, provider_type, address, city, contact";
const RECEIVER_COLUMNS: &str = "receiver_id, name, receiver_type, city, contact";
const LISTING_COLUMNS: &str = "f.food_id, f.food_name, f.quantity, f.expiry_date, f.provider_id,
     f.location, f.food_type, f.meal_type, f.listed_at";
const CLAIM_COLUMNS: &str = "claim_id, food_id, receiver_id, status, claimed_at";

impl FoodDatabase {
    // ---------------------------------------------------------------------
    // Providers
    // ---------------------------------------------------------------------

    /// Insert a new provider
    pub fn create_provider(&mut self, provider: &Provider) -> Result<()> {
        provider.validate()?;
        let id = provider.provider_id.as_i64();
        if self.exists("providers", "provider_id", id)? {
            return Err(FoodError::DuplicateKey {
                entity: Entity::Provider,
                id,
            });
        }

        self.conn
            .execute(
                "INSERT INTO providers (provider_id, name, provider_type, address, city, contact)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    provider.provider_id,
                    provider.name,
                    provider.provider_type,
                    provider.address,
                    provider.city,
                    provider.contact
                ],
            )
            .map_err(|e| FoodError::from_constraint(e, Entity::Provider, id))?;
        Ok(())
    }

    /// Fetch a single provider by id
    pub fn get_provider(&self, id: ProviderId) -> Result<Provider> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM providers WHERE provider_id = ?", PROVIDER_COLUMNS),
                params![id],
                Self::row_to_provider,
            )
            .optional()?
            .ok_or(FoodError::NotFound {
                entity: Entity::Provider,
                id: id.as_i64(),
            })
    }

    /// All providers matching `filter`, ordered by id
    pub fn find_providers(&self, filter: &ProviderFilter) -> Result<Vec<Provider>> {
        let mut f = SqlFilter::new();
        f.text_eq("name", filter.name.as_deref())
            .text_eq("provider_type", filter.provider_type.as_deref())
            .text_eq("city", filter.city.as_deref());

        let sql = format!(
            "SELECT {} FROM providers{} ORDER BY provider_id",
            PROVIDER_COLUMNS,
            f.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], Self::row_to_provider)?;

        let mut providers = Vec::new();
        for row in rows {
            providers.push(row?);
        }
        Ok(providers)
    }

    /// Apply the supplied fields to an existing provider and return the result
    pub fn update_provider(&mut self, id: ProviderId, update: ProviderUpdate) -> Result<Provider> {
        let mut provider = self.get_provider(id)?;
        provider.apply(update);
        provider.validate()?;

        self.conn.execute(
            "UPDATE providers
             SET name = ?, provider_type = ?, address = ?, city = ?, contact = ?
             WHERE provider_id = ?",
            params![
                provider.name,
                provider.provider_type,
                provider.address,
                provider.city,
                provider.contact,
                id
            ],
        )?;
        Ok(provider)
    }

    /// Delete a provider that has no food listings
    pub fn delete_provider(&mut self, id: ProviderId) -> Result<()> {
        self.delete_record(
            Entity::Provider,
            ("providers", "provider_id"),
            id.as_i64(),
            (Entity::FoodListing, "food_listings", "provider_id"),
        )
    }

    pub fn next_provider_id(&self) -> Result<ProviderId> {
        Ok(ProviderId::new(self.next_id("providers", "provider_id")?))
    }

    // ---------------------------------------------------------------------
    // Receivers
    // ---------------------------------------------------------------------

    /// Insert a new receiver
    pub fn create_receiver(&mut self, receiver: &Receiver) -> Result<()> {
        receiver.validate()?;
        let id = receiver.receiver_id.as_i64();
        if self.exists("receivers", "receiver_id", id)? {
            return Err(FoodError::DuplicateKey {
                entity: Entity::Receiver,
                id,
            });
        }

        self.conn
            .execute(
                "INSERT INTO receivers (receiver_id, name, receiver_type, city, contact)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    receiver.receiver_id,
                    receiver.name,
                    receiver.receiver_type,
                    receiver.city,
                    receiver.contact
                ],
            )
            .map_err(|e| FoodError::from_constraint(e, Entity::Receiver, id))?;
        Ok(())
    }

    pub fn get_receiver(&self, id: ReceiverId) -> Result<Receiver> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM receivers WHERE receiver_id = ?", RECEIVER_COLUMNS),
                params![id],
                Self::row_to_receiver,
            )
            .optional()?
            .ok_or(FoodError::NotFound {
                entity: Entity::Receiver,
                id: id.as_i64(),
            })
    }

    pub fn find_receivers(&self, filter: &ReceiverFilter) -> Result<Vec<Receiver>> {
        let mut f = SqlFilter::new();
        f.text_eq("name", filter.name.as_deref())
            .text_eq("receiver_type", filter.receiver_type.as_deref())
            .text_eq("city", filter.city.as_deref());

        let sql = format!(
            "SELECT {} FROM receivers{} ORDER BY receiver_id",
            RECEIVER_COLUMNS,
            f.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], Self::row_to_receiver)?;

        let mut receivers = Vec::new();
        for row in rows {
            receivers.push(row?);
        }
        Ok(receivers)
    }

    pub fn update_receiver(&mut self, id: ReceiverId, update: ReceiverUpdate) -> Result<Receiver> {
        let mut receiver = self.get_receiver(id)?;
        receiver.apply(update);
        receiver.validate()?;

        self.conn.execute(
            "UPDATE receivers
             SET name = ?, receiver_type = ?, city = ?, contact = ?
             WHERE receiver_id = ?",
            params![
                receiver.name,
                receiver.receiver_type,
                receiver.city,
                receiver.contact,
                id
            ],
        )?;
        Ok(receiver)
    }

    /// Delete a receiver that has no claims
    pub fn delete_receiver(&mut self, id: ReceiverId) -> Result<()> {
        self.delete_record(
            Entity::Receiver,
            ("receivers", "receiver_id"),
            id.as_i64(),
            (Entity::Claim, "claims", "receiver_id"),
        )
    }

    pub fn next_receiver_id(&self) -> Result<ReceiverId> {
        Ok(ReceiverId::new(self.next_id("receivers", "receiver_id")?))
    }

    // ---------------------------------------------------------------------
    // Food listings
    // ---------------------------------------------------------------------

    /// Insert a new food listing; its provider must already exist
    pub fn create_listing(&mut self, listing: &FoodListing) -> Result<()> {
        listing.validate()?;
        self.ensure_provider_exists(listing.provider_id)?;
        let id = listing.food_id.as_i64();
        if self.exists("food_listings", "food_id", id)? {
            return Err(FoodError::DuplicateKey {
                entity: Entity::FoodListing,
                id,
            });
        }

        self.conn
            .execute(
                "INSERT INTO food_listings
                 (food_id, food_name, quantity, expiry_date, provider_id,
                  location, food_type, meal_type, listed_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    listing.food_id,
                    listing.food_name,
                    listing.quantity,
                    listing.expiry_date,
                    listing.provider_id,
                    listing.location,
                    listing.food_type,
                    listing.meal_type,
                    listing.listed_at
                ],
            )
            .map_err(|e| FoodError::from_constraint(e, Entity::FoodListing, id))?;
        Ok(())
    }

    pub fn get_listing(&self, id: FoodId) -> Result<FoodListing> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM food_listings f WHERE f.food_id = ?",
                    LISTING_COLUMNS
                ),
                params![id],
                Self::row_to_listing,
            )
            .optional()?
            .ok_or(FoodError::NotFound {
                entity: Entity::FoodListing,
                id: id.as_i64(),
            })
    }

    /// All listings matching `filter`, ordered by id
    pub fn find_listings(&self, filter: &ListingFilter) -> Result<Vec<FoodListing>> {
        let f = Self::listing_filter(filter);
        let sql = format!(
            "SELECT {} FROM food_listings f
             JOIN providers p ON f.provider_id = p.provider_id{}
             ORDER BY f.food_id",
            LISTING_COLUMNS,
            f.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], Self::row_to_listing)?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    /// Apply the supplied fields to a listing, re-checking the provider if it changed
    pub fn update_listing(&mut self, id: FoodId, update: FoodListingUpdate) -> Result<FoodListing> {
        let mut listing = self.get_listing(id)?;
        let previous_provider = listing.provider_id;
        listing.apply(update);
        listing.validate()?;
        if listing.provider_id != previous_provider {
            self.ensure_provider_exists(listing.provider_id)?;
        }

        self.conn
            .execute(
                "UPDATE food_listings
                 SET food_name = ?, quantity = ?, expiry_date = ?, provider_id = ?,
                     location = ?, food_type = ?, meal_type = ?, listed_at = ?
                 WHERE food_id = ?",
                params![
                    listing.food_name,
                    listing.quantity,
                    listing.expiry_date,
                    listing.provider_id,
                    listing.location,
                    listing.food_type,
                    listing.meal_type,
                    listing.listed_at,
                    id
                ],
            )
            .map_err(|e| FoodError::from_constraint(e, Entity::FoodListing, id.as_i64()))?;
        Ok(listing)
    }

    /// Delete a listing that has no claims
    pub fn delete_listing(&mut self, id: FoodId) -> Result<()> {
        self.delete_record(
            Entity::FoodListing,
            ("food_listings", "food_id"),
            id.as_i64(),
            (Entity::Claim, "claims", "food_id"),
        )
    }

    pub fn next_food_id(&self) -> Result<FoodId> {
        Ok(FoodId::new(self.next_id("food_listings", "food_id")?))
    }

    /// Listings joined with their provider, soonest expiry first
    pub fn browse_listings(&self, filter: &ListingFilter) -> Result<Vec<ListingDetail>> {
        self.query_listing_details(filter, None)
    }

    /// Listings expiring on or before `as_of + within_days`, already expired included
    pub fn expiring_listings(
        &self,
        as_of: NaiveDate,
        within_days: u32,
        limit: Option<u32>,
    ) -> Result<Vec<ListingDetail>> {
        let filter = ListingFilter {
            expires_to: Some(horizon(as_of, within_days)),
            ..ListingFilter::default()
        };
        self.query_listing_details(&filter, limit)
    }

    /// Count, total quantity and soon-to-expire count for the filtered listings
    pub fn listing_summary(
        &self,
        filter: &ListingFilter,
        as_of: NaiveDate,
        within_days: u32,
    ) -> Result<ListingSummary> {
        let f = Self::listing_filter(filter);
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(f.quantity), 0),
                    COALESCE(SUM(CASE WHEN f.expiry_date <= ? THEN 1 ELSE 0 END), 0)
             FROM food_listings f
             JOIN providers p ON f.provider_id = p.provider_id{}",
            f.where_sql()
        );

        let until = horizon(as_of, within_days);
        let mut params: Vec<&dyn ToSql> = vec![&until];
        params.extend(f.params());

        let (listings, total_quantity, expiring_soon) =
            self.conn.query_row(&sql, &params[..], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;

        Ok(ListingSummary {
            listings,
            total_quantity,
            expiring_soon,
            as_of,
            within_days,
        })
    }

    // ---------------------------------------------------------------------
    // Claims
    // ---------------------------------------------------------------------

    /// Insert a new claim; the listing and receiver must already exist
    pub fn create_claim(&mut self, claim: &Claim) -> Result<()> {
        if !self.exists("food_listings", "food_id", claim.food_id.as_i64())? {
            return Err(FoodError::validation(format!(
                "food listing {} does not exist",
                claim.food_id
            )));
        }
        if !self.exists("receivers", "receiver_id", claim.receiver_id.as_i64())? {
            return Err(FoodError::validation(format!(
                "receiver {} does not exist",
                claim.receiver_id
            )));
        }
        let id = claim.claim_id.as_i64();
        if self.exists("claims", "claim_id", id)? {
            return Err(FoodError::DuplicateKey {
                entity: Entity::Claim,
                id,
            });
        }

        self.conn
            .execute(
                "INSERT INTO claims (claim_id, food_id, receiver_id, status, claimed_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    claim.claim_id,
                    claim.food_id,
                    claim.receiver_id,
                    claim.status,
                    claim.claimed_at
                ],
            )
            .map_err(|e| FoodError::from_constraint(e, Entity::Claim, id))?;
        Ok(())
    }

    pub fn get_claim(&self, id: ClaimId) -> Result<Claim> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM claims WHERE claim_id = ?", CLAIM_COLUMNS),
                params![id],
                Self::row_to_claim,
            )
            .optional()?
            .ok_or(FoodError::NotFound {
                entity: Entity::Claim,
                id: id.as_i64(),
            })
    }

    pub fn find_claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>> {
        let f = Self::claim_filter(filter, "");
        let sql = format!(
            "SELECT {} FROM claims{} ORDER BY claim_id",
            CLAIM_COLUMNS,
            f.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], Self::row_to_claim)?;

        let mut claims = Vec::new();
        for row in rows {
            claims.push(row?);
        }
        Ok(claims)
    }

    /// Change a claim's status. Completed and Cancelled claims are final.
    pub fn update_claim(&mut self, id: ClaimId, update: ClaimUpdate) -> Result<Claim> {
        let mut claim = self.get_claim(id)?;

        if let Some(next) = update.status {
            if !claim.status.can_transition_to(next) {
                return Err(FoodError::validation(format!(
                    "claim {} is {} and cannot become {}",
                    id, claim.status, next
                )));
            }
            claim.status = next;
        }

        self.conn.execute(
            "UPDATE claims SET status = ? WHERE claim_id = ?",
            params![claim.status, id],
        )?;
        Ok(claim)
    }

    pub fn delete_claim(&mut self, id: ClaimId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM claims WHERE claim_id = ?", params![id])?;
        if rows == 0 {
            return Err(FoodError::NotFound {
                entity: Entity::Claim,
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    pub fn next_claim_id(&self) -> Result<ClaimId> {
        Ok(ClaimId::new(self.next_id("claims", "claim_id")?))
    }

    /// Claims joined with food name and receiver name, newest first
    pub fn browse_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimDetail>> {
        let f = Self::claim_filter(filter, "c.");
        let sql = format!(
            "SELECT c.claim_id, c.status, c.claimed_at, c.food_id, f.food_name,
                    c.receiver_id, r.name
             FROM claims c
             JOIN food_listings f ON c.food_id = f.food_id
             JOIN receivers r ON c.receiver_id = r.receiver_id{}
             ORDER BY c.claim_id DESC",
            f.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], |row| {
            Ok(ClaimDetail {
                claim_id: row.get(0)?,
                status: row.get(1)?,
                claimed_at: row.get(2)?,
                food_id: row.get(3)?,
                food_name: row.get(4)?,
                receiver_id: row.get(5)?,
                receiver_name: row.get(6)?,
            })
        })?;

        let mut claims = Vec::new();
        for row in rows {
            claims.push(row?);
        }
        Ok(claims)
    }

    // ---------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------

    /// Distinct values used to populate filter choices
    pub fn filter_options(&self) -> Result<FilterOptions> {
        Ok(FilterOptions {
            cities: self.distinct(
                "SELECT city FROM providers UNION SELECT city FROM receivers ORDER BY 1",
            )?,
            provider_names: self.distinct("SELECT DISTINCT name FROM providers ORDER BY 1")?,
            provider_types: self
                .distinct("SELECT DISTINCT provider_type FROM providers ORDER BY 1")?,
            food_types: self.distinct("SELECT DISTINCT food_type FROM food_listings ORDER BY 1")?,
            meal_types: self.distinct("SELECT DISTINCT meal_type FROM food_listings ORDER BY 1")?,
        })
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn query_listing_details(
        &self,
        filter: &ListingFilter,
        limit: Option<u32>,
    ) -> Result<Vec<ListingDetail>> {
        let mut f = Self::listing_filter(filter);
        let mut sql = format!(
            "SELECT f.food_id, f.food_name, f.quantity, f.expiry_date, f.provider_id,
                    p.name, p.provider_type, p.contact, f.location, f.food_type, f.meal_type
             FROM food_listings f
             JOIN providers p ON f.provider_id = p.provider_id{}
             ORDER BY f.expiry_date ASC, f.food_id ASC",
            f.where_sql()
        );
        if let Some(l) = limit {
            sql.push_str(" LIMIT ?");
            f.push_param(l);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&f.params()[..], |row| {
            Ok(ListingDetail {
                food_id: row.get(0)?,
                food_name: row.get(1)?,
                quantity: row.get(2)?,
                expiry_date: row.get(3)?,
                provider_id: row.get(4)?,
                provider_name: row.get(5)?,
                provider_type: row.get(6)?,
                provider_contact: row.get(7)?,
                city: row.get(8)?,
                food_type: row.get(9)?,
                meal_type: row.get(10)?,
            })
        })?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    /// Listing conditions over `food_listings f JOIN providers p`
    fn listing_filter(filter: &ListingFilter) -> SqlFilter {
        let mut f = SqlFilter::new();
        f.eq("f.provider_id", filter.provider_id)
            .text_eq("p.name", filter.provider_name.as_deref())
            .text_eq("p.provider_type", filter.provider_type.as_deref())
            .text_eq("f.location", filter.city.as_deref())
            .text_eq("f.food_name", filter.food_name.as_deref())
            .text_eq("f.food_type", filter.food_type.as_deref())
            .text_eq("f.meal_type", filter.meal_type.as_deref())
            .at_least("f.expiry_date", filter.expires_from)
            .at_most("f.expiry_date", filter.expires_to)
            .at_least("f.quantity", filter.min_quantity);
        f
    }

    fn claim_filter(filter: &ClaimFilter, prefix: &str) -> SqlFilter {
        let mut f = SqlFilter::new();
        f.eq(&format!("{}food_id", prefix), filter.food_id)
            .eq(&format!("{}receiver_id", prefix), filter.receiver_id)
            .eq(&format!("{}status", prefix), filter.status)
            .at_least(&format!("DATE({}claimed_at)", prefix), filter.claimed_from)
            .at_most(&format!("DATE({}claimed_at)", prefix), filter.claimed_to);
        f
    }

    fn ensure_provider_exists(&self, provider_id: ProviderId) -> Result<()> {
        if !self.exists("providers", "provider_id", provider_id.as_i64())? {
            return Err(FoodError::validation(format!(
                "provider {} does not exist",
                provider_id
            )));
        }
        Ok(())
    }

    /// Shared delete path: not-found check, dependent check, then one DELETE.
    fn delete_record(
        &mut self,
        entity: Entity,
        (table, key): (&str, &str),
        id: i64,
        (dependent, dependent_table, dependent_key): (Entity, &str, &str),
    ) -> Result<()> {
        if !self.exists(table, key, id)? {
            return Err(FoodError::NotFound { entity, id });
        }

        let count = self.count_where(dependent_table, dependent_key, id)?;
        if count > 0 {
            return Err(FoodError::ReferentialIntegrity {
                entity,
                id,
                dependent,
                count,
            });
        }

        self.conn
            .execute(
                &format!("DELETE FROM {} WHERE {} = ?", table, key),
                params![id],
            )
            .map_err(|e| FoodError::from_constraint(e, entity, id))?;
        Ok(())
    }

    pub(crate) fn exists(&self, table: &str, key: &str, id: i64) -> Result<bool> {
        Ok(self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)", table, key),
            params![id],
            |row| row.get(0),
        )?)
    }

    fn count_where(&self, table: &str, key: &str, id: i64) -> Result<u64> {
        Ok(self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, key),
            params![id],
            |row| row.get(0),
        )?)
    }

    fn next_id(&self, table: &str, key: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            &format!("SELECT COALESCE(MAX({}), 0) + 1 FROM {}", key, table),
            [],
            |row| row.get(0),
        )?)
    }

    fn distinct(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }

    pub(crate) fn row_to_provider(row: &Row) -> rusqlite::Result<Provider> {
        Ok(Provider {
            provider_id: row.get(0)?,
            name: row.get(1)?,
            provider_type: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            contact: row.get(5)?,
        })
    }

    pub(crate) fn row_to_receiver(row: &Row) -> rusqlite::Result<Receiver> {
        Ok(Receiver {
            receiver_id: row.get(0)?,
            name: row.get(1)?,
            receiver_type: row.get(2)?,
            city: row.get(3)?,
            contact: row.get(4)?,
        })
    }

    pub(crate) fn row_to_listing(row: &Row) -> rusqlite::Result<FoodListing> {
        Ok(FoodListing {
            food_id: row.get(0)?,
            food_name: row.get(1)?,
            quantity: row.get(2)?,
            expiry_date: row.get(3)?,
            provider_id: row.get(4)?,
            location: row.get(5)?,
            food_type: row.get(6)?,
            meal_type: row.get(7)?,
            listed_at: row.get(8)?,
        })
    }

    pub(crate) fn row_to_claim(row: &Row) -> rusqlite::Result<Claim> {
        Ok(Claim {
            claim_id: row.get(0)?,
            food_id: row.get(1)?,
            receiver_id: row.get(2)?,
            status: row.get(3)?,
            claimed_at: row.get(4)?,
        })
    }
}

fn horizon(as_of: NaiveDate, within_days: u32) -> NaiveDate {
    as_of
        .checked_add_days(Days::new(u64::from(within_days)))
        .unwrap_or(NaiveDate::MAX)
}
