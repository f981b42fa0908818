//! Address Book CLI
//!
//! Inspect and seed a file-backed address book store.

use std::fs;
use std::path::PathBuf;

use addressbook::fetch::{FetchResponse, Fetcher};
use addressbook::{Config, Directory, EntityKind, RefreshOutcome, StoreError};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Address Book CLI
#[derive(Parser, Debug)]
#[command(name = "addressbook-cli")]
#[command(about = "Inspect and seed the address book entity store")]
#[command(version)]
struct Args {
    /// Data directory holding the persisted snapshot
    #[arg(short, long, default_value = "./addressbook_data")]
    data_dir: String,

    /// Storage key of the snapshot
    #[arg(short, long, default_value = "oim_addressbook")]
    key: String,

    /// API base URL used for placeholder photos
    #[arg(short, long, default_value = "")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a raw API payload file and replace a kind with it
    Import {
        /// users, locations, orgunits or orgtree
        kind: String,

        /// JSON file as returned by the API
        file: PathBuf,
    },

    /// List every record of a kind in display order
    List {
        /// users, locations or orgunits
        kind: String,
    },

    /// Show one record
    Get {
        /// users, locations or orgunits
        kind: String,

        /// Record id
        id: u64,
    },

    /// Users at a location
    AtLocation {
        /// Location id
        id: u64,
    },

    /// Print the org tree payload
    Tree,

    /// Record counts and status per kind
    Status,

    /// Delete the persisted snapshot
    Clear,
}

/// Serves a payload file as if it were the endpoint for one kind
struct FileFetcher {
    kind: EntityKind,
    path: PathBuf,
}

impl Fetcher for FileFetcher {
    fn fetch(&self, kind: EntityKind) -> addressbook::Result<FetchResponse> {
        if kind != self.kind {
            return Err(StoreError::network(format!("no payload file for {}", kind)));
        }
        let body = fs::read_to_string(&self.path)?;
        Ok(FetchResponse::json(body))
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,addressbook=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .storage_key(&args.key)
        .base_url(&args.base_url)
        .build();

    let directory = match Directory::open_file(config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&directory, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(directory: &Directory<addressbook::persistence::FileStorage>, command: Commands) -> addressbook::Result<()> {
    match command {
        Commands::Import { kind, file } => {
            let kind = parse_kind(&kind)?;
            let fetcher = FileFetcher { kind, path: file };
            match directory.refresh(kind, &fetcher)? {
                RefreshOutcome::Applied { count } => {
                    tracing::info!("Imported {} {}", count, kind);
                }
                RefreshOutcome::Superseded => {
                    tracing::warn!("Import of {} was superseded", kind);
                }
            }
        }
        Commands::List { kind } => match parse_kind(&kind)? {
            EntityKind::User => print_json(&directory.users_list())?,
            EntityKind::Location => print_json(&directory.locations_list())?,
            EntityKind::OrgUnit => print_json(&directory.org_units_list())?,
            EntityKind::OrgTree => print_json(&directory.org_tree())?,
        },
        Commands::Get { kind, id } => {
            let found = match parse_kind(&kind)? {
                EntityKind::User => directory.user(id).map(|r| print_json(&r)),
                EntityKind::Location => directory.location(id).map(|r| print_json(&r)),
                EntityKind::OrgUnit => directory.org_unit(id).map(|r| print_json(&r)),
                EntityKind::OrgTree => Some(print_json(&directory.org_tree())),
            };
            match found {
                Some(printed) => printed?,
                None => println!("(not found)"),
            }
        }
        Commands::AtLocation { id } => print_json(&directory.users_at_location(id))?,
        Commands::Tree => print_json(&directory.org_tree())?,
        Commands::Status => {
            println!("snapshot dir {}", directory.codec().backend().dir().display());
            for kind in EntityKind::ALL {
                println!(
                    "{:<10} {:>6} {:?}",
                    kind.to_string(),
                    directory.store().len(kind),
                    directory.status(kind)
                );
            }
        }
        Commands::Clear => {
            directory.codec().clear()?;
            let path = directory.codec().backend().slot_path(directory.codec().key());
            tracing::info!("Removed snapshot {}", path.display());
        }
    }
    Ok(())
}

fn parse_kind(name: &str) -> addressbook::Result<EntityKind> {
    EntityKind::parse(&name.to_ascii_lowercase())
        .ok_or_else(|| StoreError::Config(format!("unknown kind {:?}", name)))
}

fn print_json<T: Serialize>(value: &T) -> addressbook::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
