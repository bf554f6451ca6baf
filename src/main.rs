//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use food_wastage::{
    cli::{Commands, FoodCli},
    commands::{
        import_sources,
        listings::{handle_contacts, handle_listings, handle_options, handle_summary},
        load::{handle_init, handle_load},
        open_database,
        records::{handle_claim, handle_listing, handle_provider, handle_receiver},
        reports::handle_report,
    },
};
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over the `-v` default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the CLI.
fn main() -> anyhow::Result<()> {
    let app = FoodCli::parse();
    init_tracing(app.verbose);

    let (mut db, path) = open_database(app.db).context("Failed to open the database")?;
    let as_json = app.json;

    match app.command {
        Commands::Init => handle_init(&db, &path, as_json)?,

        Commands::Load {
            dir,
            providers,
            receivers,
            listings,
            claims,
        } => {
            let sources = import_sources(dir, providers, receivers, listings, claims);
            handle_load(&mut db, &sources, as_json).context("Bulk load failed")?
        }

        Commands::Listings { filters } => handle_listings(&db, filters.into(), as_json)?,

        Commands::Summary {
            filters,
            within_days,
            as_of,
        } => {
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            handle_summary(&db, filters.into(), as_of, within_days, as_json)?
        }

        Commands::Contacts { city } => handle_contacts(&db, city, as_json)?,

        Commands::Options => handle_options(&db, as_json)?,

        Commands::Provider { cmd } => handle_provider(&mut db, cmd, as_json)?,
        Commands::Receiver { cmd } => handle_receiver(&mut db, cmd, as_json)?,
        Commands::Listing { cmd } => handle_listing(&mut db, cmd, as_json)?,
        Commands::Claim { cmd } => handle_claim(&mut db, cmd, as_json)?,

        Commands::Report { name, list } => handle_report(&db, name, list, as_json)?,
    }

    Ok(())
}
