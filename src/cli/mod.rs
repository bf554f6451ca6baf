//! CLI argument definitions and parsing.

pub mod types;


use crate::storage::{
    ClaimFilter, FoodListingUpdate, ListingFilter, ProviderFilter, ProviderUpdate,
    ReceiverFilter, ReceiverUpdate,
};
use crate::util::{parse_date, parse_timestamp};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use types::{ClaimId, ClaimStatus, FoodId, ProviderId, ReceiverId};

fn date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn timestamp_arg(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}

#[derive(Debug, Default, Args)]
pub struct ProviderFilterArgs {
    #[clap(long)]
    pub name: Option<String>,

    #[clap(long = "type")]
    pub provider_type: Option<String>,

    #[clap(long, short)]
    pub city: Option<String>,
}

impl From<ProviderFilterArgs> for ProviderFilter {
    fn from(args: ProviderFilterArgs) -> Self {
        ProviderFilter {
            name: args.name,
            provider_type: args.provider_type,
            city: args.city,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ReceiverFilterArgs {
    #[clap(long)]
    pub name: Option<String>,

    #[clap(long = "type")]
    pub receiver_type: Option<String>,

    #[clap(long, short)]
    pub city: Option<String>,
}

impl From<ReceiverFilterArgs> for ReceiverFilter {
    fn from(args: ReceiverFilterArgs) -> Self {
        ReceiverFilter {
            name: args.name,
            receiver_type: args.receiver_type,
            city: args.city,
        }
    }
}

/// Listing search arguments shared by `listings`, `summary` and `listing list`
#[derive(Debug, Default, Args)]
pub struct ListingFilterArgs {
    /// Only listings from this provider id.
    #[clap(long)]
    pub provider_id: Option<ProviderId>,

    /// Provider name (exact, case-insensitive).
    #[clap(long)]
    pub provider: Option<String>,

    /// Provider type, e.g. `Restaurant`.
    #[clap(long)]
    pub provider_type: Option<String>,

    /// City the food is located in.
    #[clap(long, short)]
    pub city: Option<String>,

    /// Food name.
    #[clap(long)]
    pub food_name: Option<String>,

    /// Food type, e.g. `Vegetarian`.
    #[clap(long)]
    pub food_type: Option<String>,

    /// Meal type, e.g. `Dinner`.
    #[clap(long)]
    pub meal_type: Option<String>,

    /// Earliest expiry date (inclusive).
    #[clap(long, value_parser = date_arg)]
    pub expires_from: Option<NaiveDate>,

    /// Latest expiry date (inclusive).
    #[clap(long, value_parser = date_arg)]
    pub expires_to: Option<NaiveDate>,

    /// Minimum quantity.
    #[clap(long)]
    pub min_quantity: Option<u32>,
}

impl From<ListingFilterArgs> for ListingFilter {
    fn from(args: ListingFilterArgs) -> Self {
        ListingFilter {
            provider_id: args.provider_id,
            provider_name: args.provider,
            provider_type: args.provider_type,
            city: args.city,
            food_name: args.food_name,
            food_type: args.food_type,
            meal_type: args.meal_type,
            expires_from: args.expires_from,
            expires_to: args.expires_to,
            min_quantity: args.min_quantity,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ClaimFilterArgs {
    /// Only claims against this listing.
    #[clap(long)]
    pub food_id: Option<FoodId>,

    /// Only claims placed by this receiver.
    #[clap(long)]
    pub receiver_id: Option<ReceiverId>,

    #[clap(long, value_enum, ignore_case = true)]
    pub status: Option<ClaimStatus>,

    /// Claimed on or after this date.
    #[clap(long, value_parser = date_arg)]
    pub from: Option<NaiveDate>,

    /// Claimed on or before this date.
    #[clap(long, value_parser = date_arg)]
    pub to: Option<NaiveDate>,
}

impl From<ClaimFilterArgs> for ClaimFilter {
    fn from(args: ClaimFilterArgs) -> Self {
        ClaimFilter {
            food_id: args.food_id,
            receiver_id: args.receiver_id,
            status: args.status,
            claimed_from: args.from,
            claimed_to: args.to,
        }
    }
}

/// Editable provider fields. Required on `add`, optional on `update`.
#[derive(Debug, Default, Args)]
pub struct ProviderFields {
    #[clap(long)]
    pub name: Option<String>,

    /// Restaurant, Grocery Store, Supermarket, Catering Service, ...
    #[clap(long = "type")]
    pub provider_type: Option<String>,

    #[clap(long)]
    pub address: Option<String>,

    #[clap(long)]
    pub city: Option<String>,

    #[clap(long)]
    pub contact: Option<String>,
}

impl From<ProviderFields> for ProviderUpdate {
    fn from(fields: ProviderFields) -> Self {
        ProviderUpdate {
            name: fields.name,
            provider_type: fields.provider_type,
            address: fields.address,
            city: fields.city,
            contact: fields.contact,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ReceiverFields {
    #[clap(long)]
    pub name: Option<String>,

    /// NGO, Shelter, Charity, Individual, ...
    #[clap(long = "type")]
    pub receiver_type: Option<String>,

    #[clap(long)]
    pub city: Option<String>,

    #[clap(long)]
    pub contact: Option<String>,
}

impl From<ReceiverFields> for ReceiverUpdate {
    fn from(fields: ReceiverFields) -> Self {
        ReceiverUpdate {
            name: fields.name,
            receiver_type: fields.receiver_type,
            city: fields.city,
            contact: fields.contact,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ListingFields {
    #[clap(long)]
    pub food_name: Option<String>,

    #[clap(long)]
    pub quantity: Option<u32>,

    /// Expiry date, `YYYY-MM-DD` or `M/D/YYYY`.
    #[clap(long, value_parser = date_arg)]
    pub expiry: Option<NaiveDate>,

    #[clap(long)]
    pub provider_id: Option<ProviderId>,

    /// City the food can be collected in.
    #[clap(long)]
    pub location: Option<String>,

    #[clap(long)]
    pub food_type: Option<String>,

    #[clap(long)]
    pub meal_type: Option<String>,
}

impl From<ListingFields> for FoodListingUpdate {
    fn from(fields: ListingFields) -> Self {
        FoodListingUpdate {
            food_name: fields.food_name,
            quantity: fields.quantity,
            expiry_date: fields.expiry,
            provider_id: fields.provider_id,
            location: fields.location,
            food_type: fields.food_type,
            meal_type: fields.meal_type,
            listed_at: None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ProviderCmd {
    /// Register a new provider
    Add {
        /// Explicit id; defaults to the next free id.
        #[clap(long)]
        id: Option<ProviderId>,

        #[clap(flatten)]
        fields: ProviderFields,
    },
    /// Show one provider
    Get { id: ProviderId },
    /// List providers matching the filters
    List {
        #[clap(flatten)]
        filters: ProviderFilterArgs,
    },
    /// Change the supplied fields of a provider
    Update {
        id: ProviderId,
        #[clap(flatten)]
        fields: ProviderFields,
    },
    /// Delete a provider that has no listings
    Delete { id: ProviderId },
}

#[derive(Debug, Subcommand)]
pub enum ReceiverCmd {
    /// Register a new receiver
    Add {
        /// Explicit id; defaults to the next free id.
        #[clap(long)]
        id: Option<ReceiverId>,

        #[clap(flatten)]
        fields: ReceiverFields,
    },
    /// Show one receiver
    Get { id: ReceiverId },
    /// List receivers matching the filters
    List {
        #[clap(flatten)]
        filters: ReceiverFilterArgs,
    },
    /// Change the supplied fields of a receiver
    Update {
        id: ReceiverId,
        #[clap(flatten)]
        fields: ReceiverFields,
    },
    /// Delete a receiver that has no claims
    Delete { id: ReceiverId },
}

#[derive(Debug, Subcommand)]
pub enum ListingCmd {
    /// Post a new food listing
    Add {
        /// Explicit id; defaults to the next free id.
        #[clap(long)]
        id: Option<FoodId>,

        #[clap(flatten)]
        fields: ListingFields,
    },
    /// Show one listing
    Get { id: FoodId },
    /// List listings matching the filters
    List {
        #[clap(flatten)]
        filters: ListingFilterArgs,
    },
    /// Change the supplied fields of a listing
    Update {
        id: FoodId,
        #[clap(flatten)]
        fields: ListingFields,
    },
    /// Delete a listing that has no claims
    Delete { id: FoodId },
}

#[derive(Debug, Subcommand)]
pub enum ClaimCmd {
    /// Claim a food listing for a receiver
    Add {
        /// Explicit id; defaults to the next free id.
        #[clap(long)]
        id: Option<ClaimId>,

        #[clap(long)]
        food_id: FoodId,

        #[clap(long)]
        receiver_id: ReceiverId,

        #[clap(long, value_enum, ignore_case = true, default_value_t = ClaimStatus::Pending)]
        status: ClaimStatus,

        /// Claim time; defaults to now.
        #[clap(long, value_parser = timestamp_arg)]
        at: Option<NaiveDateTime>,
    },
    /// Show one claim
    Get { id: ClaimId },
    /// List claims with food and receiver names, newest first
    List {
        #[clap(flatten)]
        filters: ClaimFilterArgs,
    },
    /// Move a claim to a new status (Pending -> Completed | Cancelled)
    Status {
        id: ClaimId,
        #[clap(value_enum, ignore_case = true)]
        status: ClaimStatus,
    },
    /// Delete a claim
    Delete { id: ClaimId },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database file and tables
    Init,

    /// Bulk load the four CSV files
    Load {
        /// Directory holding providers_data.csv, receivers_data.csv,
        /// food_listings_data.csv and claims_data.csv.
        #[clap(long, short, default_value = ".")]
        dir: PathBuf,

        /// Override the providers file.
        #[clap(long)]
        providers: Option<PathBuf>,

        /// Override the receivers file.
        #[clap(long)]
        receivers: Option<PathBuf>,

        /// Override the food listings file.
        #[clap(long)]
        listings: Option<PathBuf>,

        /// Override the claims file.
        #[clap(long)]
        claims: Option<PathBuf>,
    },

    /// Browse food listings with provider details, soonest expiry first
    Listings {
        #[clap(flatten)]
        filters: ListingFilterArgs,
    },

    /// Listing count, total quantity and listings expiring soon
    Summary {
        #[clap(flatten)]
        filters: ListingFilterArgs,

        /// Expiry horizon in days.
        #[clap(long, default_value_t = 2)]
        within_days: u32,

        /// Reference date; defaults to today.
        #[clap(long, value_parser = date_arg)]
        as_of: Option<NaiveDate>,
    },

    /// Provider and receiver contact directory
    Contacts {
        #[clap(long, short)]
        city: Option<String>,
    },

    /// Distinct cities, providers and food/meal types available for filtering
    Options,

    /// Manage providers
    Provider {
        #[clap(subcommand)]
        cmd: ProviderCmd,
    },

    /// Manage receivers
    Receiver {
        #[clap(subcommand)]
        cmd: ReceiverCmd,
    },

    /// Manage food listings
    Listing {
        #[clap(subcommand)]
        cmd: ListingCmd,
    },

    /// Manage claims
    Claim {
        #[clap(subcommand)]
        cmd: ClaimCmd,
    },

    /// Run an analytical report, or every report when no name is given
    Report {
        /// Report name, e.g. `completion-rate`.
        name: Option<String>,

        /// List the available reports instead of running one.
        #[clap(long)]
        list: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "food-wastage",
    about = "Local food wastage management: donors, receivers, listings and claims"
)]
pub struct FoodCli {
    /// Database file (or set `FOOD_WASTAGE_DB` env var).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output results as JSON instead of text tables.
    #[clap(long, global = true)]
    pub json: bool,

    /// Log progress to stderr.
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
