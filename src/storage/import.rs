//! Bulk load from the four CSV exports
//!
//! Rows are upserted on their id so loading the same files again never
//! duplicates anything. Rows that fail to parse, fail field validation, or
//! reference a provider/listing/receiver that is not stored are logged and
//! skipped. Each call runs in one transaction, so a failed `import_all`
//! leaves the database untouched. A stored claim that already reached a
//! terminal status keeps it on re-load.

use super::{models::*, schema::FoodDatabase};
use crate::cli::types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};
use crate::error::{FoodError, Result};
use crate::util::{non_blank, parse_date, parse_timestamp};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};


pub const PROVIDERS_FILE: &str = "providers_data.csv";
pub const RECEIVERS_FILE: &str = "receivers_data.csv";
pub const LISTINGS_FILE: &str = "food_listings_data.csv";
pub const CLAIMS_FILE: &str = "claims_data.csv";

/// Outcome of loading one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub loaded: usize,
    pub skipped: usize,
}

/// Outcome of loading all four files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub providers: ImportStats,
    pub receivers: ImportStats,
    pub food_listings: ImportStats,
    pub claims: ImportStats,
}

/// Locations of the four input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSources {
    pub providers: PathBuf,
    pub receivers: PathBuf,
    pub food_listings: PathBuf,
    pub claims: PathBuf,
}

impl ImportSources {
    /// The standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            providers: dir.join(PROVIDERS_FILE),
            receivers: dir.join(RECEIVERS_FILE),
            food_listings: dir.join(LISTINGS_FILE),
            claims: dir.join(CLAIMS_FILE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderRow {
    #[serde(rename = "Provider_ID", alias = "provider_id")]
    provider_id: i64,
    #[serde(rename = "Name", alias = "name")]
    name: String,
    #[serde(rename = "Type", alias = "type", alias = "provider_type")]
    provider_type: String,
    #[serde(rename = "Address", alias = "address")]
    address: String,
    #[serde(rename = "City", alias = "city")]
    city: String,
    #[serde(rename = "Contact", alias = "contact")]
    contact: String,
}

#[derive(Debug, Deserialize)]
struct ReceiverRow {
    #[serde(rename = "Receiver_ID", alias = "receiver_id")]
    receiver_id: i64,
    #[serde(rename = "Name", alias = "name")]
    name: String,
    #[serde(rename = "Type", alias = "type", alias = "receiver_type")]
    receiver_type: String,
    #[serde(rename = "City", alias = "city")]
    city: String,
    #[serde(rename = "Contact", alias = "contact")]
    contact: String,
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "Food_ID", alias = "food_id")]
    food_id: i64,
    #[serde(rename = "Food_Name", alias = "food_name")]
    food_name: String,
    #[serde(rename = "Quantity", alias = "quantity")]
    quantity: u32,
    #[serde(rename = "Expiry_Date", alias = "expiry_date")]
    expiry_date: String,
    #[serde(rename = "Provider_ID", alias = "provider_id")]
    provider_id: i64,
    #[serde(rename = "Location", alias = "location")]
    location: String,
    #[serde(rename = "Food_Type", alias = "food_type")]
    food_type: String,
    #[serde(rename = "Meal_Type", alias = "meal_type")]
    meal_type: String,
    #[serde(rename = "Listed_At", alias = "listed_at", default)]
    listed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaimRow {
    #[serde(rename = "Claim_ID", alias = "claim_id")]
    claim_id: i64,
    #[serde(rename = "Food_ID", alias = "food_id")]
    food_id: i64,
    #[serde(rename = "Receiver_ID", alias = "receiver_id")]
    receiver_id: i64,
    #[serde(rename = "Status", alias = "status")]
    status: String,
    #[serde(rename = "Timestamp", alias = "timestamp", alias = "claimed_at")]
    claimed_at: String,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = FoodError;

    fn try_from(row: ProviderRow) -> Result<Self> {
        let provider = Provider {
            provider_id: ProviderId::new(row.provider_id),
            name: row.name,
            provider_type: row.provider_type,
            address: row.address,
            city: row.city,
            contact: row.contact,
        };
        provider.validate()?;
        Ok(provider)
    }
}

impl TryFrom<ReceiverRow> for Receiver {
    type Error = FoodError;

    fn try_from(row: ReceiverRow) -> Result<Self> {
        let receiver = Receiver {
            receiver_id: ReceiverId::new(row.receiver_id),
            name: row.name,
            receiver_type: row.receiver_type,
            city: row.city,
            contact: row.contact,
        };
        receiver.validate()?;
        Ok(receiver)
    }
}

impl TryFrom<ListingRow> for FoodListing {
    type Error = FoodError;

    fn try_from(row: ListingRow) -> Result<Self> {
        let listed_at = match non_blank(row.listed_at.as_deref()) {
            Some(ts) => Some(parse_timestamp(ts)?),
            None => None,
        };
        let listing = FoodListing {
            food_id: FoodId::new(row.food_id),
            food_name: row.food_name,
            quantity: row.quantity,
            expiry_date: parse_date(&row.expiry_date)?,
            provider_id: ProviderId::new(row.provider_id),
            location: row.location,
            food_type: row.food_type,
            meal_type: row.meal_type,
            listed_at,
        };
        listing.validate()?;
        Ok(listing)
    }
}

impl TryFrom<ClaimRow> for Claim {
    type Error = FoodError;

    fn try_from(row: ClaimRow) -> Result<Self> {
        Ok(Claim {
            claim_id: ClaimId::new(row.claim_id),
            food_id: FoodId::new(row.food_id),
            receiver_id: ReceiverId::new(row.receiver_id),
            status: row.status.parse::<ClaimStatus>()?,
            claimed_at: parse_timestamp(&row.claimed_at)?,
        })
    }
}

impl FoodDatabase {
    /// Load all four files in dependency order, all or nothing
    pub fn import_all(&mut self, sources: &ImportSources) -> Result<ImportSummary> {
        let providers = File::open(&sources.providers)?;
        let receivers = File::open(&sources.receivers)?;
        let food_listings = File::open(&sources.food_listings)?;
        let claims = File::open(&sources.claims)?;

        let tx = self.conn.transaction()?;
        let summary = ImportSummary {
            providers: load_providers(&tx, providers)?,
            receivers: load_receivers(&tx, receivers)?,
            food_listings: load_listings(&tx, food_listings)?,
            claims: load_claims(&tx, claims)?,
        };
        tx.commit()?;

        info!(?summary, "bulk load finished");
        Ok(summary)
    }

    pub fn import_providers<R: Read>(&mut self, reader: R) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;
        let stats = load_providers(&tx, reader)?;
        tx.commit()?;
        Ok(stats)
    }

    pub fn import_receivers<R: Read>(&mut self, reader: R) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;
        let stats = load_receivers(&tx, reader)?;
        tx.commit()?;
        Ok(stats)
    }

    /// Listings whose provider is not stored are skipped
    pub fn import_listings<R: Read>(&mut self, reader: R) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;
        let stats = load_listings(&tx, reader)?;
        tx.commit()?;
        Ok(stats)
    }

    /// Claims whose listing or receiver is not stored are skipped
    pub fn import_claims<R: Read>(&mut self, reader: R) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;
        let stats = load_claims(&tx, reader)?;
        tx.commit()?;
        Ok(stats)
    }
}

fn load_providers<R: Read>(conn: &Connection, reader: R) -> Result<ImportStats> {
    load_rows::<ProviderRow, Provider, _, _, _>(
        conn,
        reader,
        "providers",
        |_, _| Ok(true),
        upsert_provider,
    )
}

fn load_receivers<R: Read>(conn: &Connection, reader: R) -> Result<ImportStats> {
    load_rows::<ReceiverRow, Receiver, _, _, _>(
        conn,
        reader,
        "receivers",
        |_, _| Ok(true),
        upsert_receiver,
    )
}

fn load_listings<R: Read>(conn: &Connection, reader: R) -> Result<ImportStats> {
    load_rows::<ListingRow, FoodListing, _, _, _>(
        conn,
        reader,
        "food listings",
        |conn, listing| {
            let ok = row_exists(conn, "providers", "provider_id", listing.provider_id.as_i64())?;
            if !ok {
                warn!(
                    food_id = %listing.food_id,
                    provider_id = %listing.provider_id,
                    "skipping listing: unknown provider"
                );
            }
            Ok(ok)
        },
        upsert_listing,
    )
}

fn load_claims<R: Read>(conn: &Connection, reader: R) -> Result<ImportStats> {
    load_rows::<ClaimRow, Claim, _, _, _>(
        conn,
        reader,
        "claims",
        |conn, claim| {
            let listing_ok = row_exists(conn, "food_listings", "food_id", claim.food_id.as_i64())?;
            let receiver_ok =
                row_exists(conn, "receivers", "receiver_id", claim.receiver_id.as_i64())?;
            if !listing_ok || !receiver_ok {
                warn!(
                    claim_id = %claim.claim_id,
                    food_id = %claim.food_id,
                    receiver_id = %claim.receiver_id,
                    "skipping claim: unknown food listing or receiver"
                );
            }
            Ok(listing_ok && receiver_ok)
        },
        upsert_claim,
    )
}

/// Shared CSV loop: parse, convert, check references, upsert.
///
/// Runs on the caller's transaction and never commits.
fn load_rows<Raw, Record, R, Check, Upsert>(
    conn: &Connection,
    reader: R,
    label: &str,
    references_ok: Check,
    upsert: Upsert,
) -> Result<ImportStats>
where
    Raw: for<'de> Deserialize<'de>,
    Record: TryFrom<Raw, Error = FoodError>,
    R: Read,
    Check: Fn(&Connection, &Record) -> rusqlite::Result<bool>,
    Upsert: Fn(&Connection, &Record) -> rusqlite::Result<usize>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut stats = ImportStats::default();

    for (idx, result) in csv_reader.deserialize::<Raw>().enumerate() {
        // Header is line 1
        let line = idx + 2;

        let record = match result
            .map_err(FoodError::from)
            .and_then(Record::try_from)
        {
            Ok(record) => record,
            Err(e) => {
                warn!(file = label, line, error = %e, "skipping malformed row");
                stats.skipped += 1;
                continue;
            }
        };

        if !references_ok(conn, &record)? {
            stats.skipped += 1;
            continue;
        }

        match upsert(conn, &record) {
            Ok(_) => stats.loaded += 1,
            Err(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                warn!(file = label, line, error = ?msg, "skipping row: constraint violation");
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(file = label, loaded = stats.loaded, skipped = stats.skipped, "loaded");
    Ok(stats)
}

fn row_exists(conn: &Connection, table: &str, key: &str, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)", table, key),
        params![id],
        |row| row.get(0),
    )
}

fn upsert_provider(conn: &Connection, p: &Provider) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO providers (provider_id, name, provider_type, address, city, contact)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(provider_id) DO UPDATE SET
             name = excluded.name,
             provider_type = excluded.provider_type,
             address = excluded.address,
             city = excluded.city,
             contact = excluded.contact",
        params![p.provider_id, p.name, p.provider_type, p.address, p.city, p.contact],
    )
}

fn upsert_receiver(conn: &Connection, r: &Receiver) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO receivers (receiver_id, name, receiver_type, city, contact)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(receiver_id) DO UPDATE SET
             name = excluded.name,
             receiver_type = excluded.receiver_type,
             city = excluded.city,
             contact = excluded.contact",
        params![r.receiver_id, r.name, r.receiver_type, r.city, r.contact],
    )
}

fn upsert_listing(conn: &Connection, l: &FoodListing) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO food_listings
         (food_id, food_name, quantity, expiry_date, provider_id,
          location, food_type, meal_type, listed_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(food_id) DO UPDATE SET
             food_name = excluded.food_name,
             quantity = excluded.quantity,
             expiry_date = excluded.expiry_date,
             provider_id = excluded.provider_id,
             location = excluded.location,
             food_type = excluded.food_type,
             meal_type = excluded.meal_type,
             listed_at = COALESCE(excluded.listed_at, food_listings.listed_at)",
        params![
            l.food_id,
            l.food_name,
            l.quantity,
            l.expiry_date,
            l.provider_id,
            l.location,
            l.food_type,
            l.meal_type,
            l.listed_at
        ],
    )
}

fn upsert_claim(conn: &Connection, c: &Claim) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO claims (claim_id, food_id, receiver_id, status, claimed_at)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(claim_id) DO UPDATE SET
             food_id = excluded.food_id,
             receiver_id = excluded.receiver_id,
             status = CASE
                 WHEN claims.status IN ('Completed', 'Cancelled') THEN claims.status
                 ELSE excluded.status
             END,
             claimed_at = excluded.claimed_at",
        params![c.claim_id, c.food_id, c.receiver_id, c.status, c.claimed_at],
    )
}
