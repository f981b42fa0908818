//! # Address Book Store
//!
//! The client-side entity store behind the address book directory:
//! - Normalization of loosely-typed API payloads into canonical records
//! - Keyed, ordered in-memory cache per entity kind
//! - Write-through JSON persistence that degrades to empty on bad data
//! - Generation tickets so stale refreshes never clobber fresh ones
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Fetch transport (external)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ FetchResponse
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Directory                             │
//! │          (selectors, refresh, write-through)                │
//! └──────────┬───────────────────┬──────────────────┬───────────┘
//!            │                   │                  │
//!            ▼                   ▼                  ▼
//!   ┌────────────────┐   ┌──────────────┐   ┌───────────────┐
//!   │   Normalizer   │──▶│ EntityStore  │──▶│  Persistence  │
//!   │ (raw → record) │   │   (RwLock)   │   │    Codec      │
//!   └────────────────┘   └──────────────┘   └───────┬───────┘
//!                                                   │
//!                                                   ▼
//!                                           ┌───────────────┐
//!                                           │StorageBackend │
//!                                           │ (one JSON doc)│
//!                                           └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod normalize;
pub mod store;
pub mod persistence;
pub mod fetch;
pub mod directory;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::Config;
pub use directory::{Directory, RefreshOutcome, RefreshTicket};
pub use model::{Coordinates, EntityId, EntityKind, Location, OrgTree, OrgUnit, OrgUnitRef, User};
pub use store::{CollectionStatus, EntityStore, StoreState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
