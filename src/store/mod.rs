//! Store Module
//!
//! Authoritative in-memory cache of normalized records.
//!
//! ## Responsibilities
//! - O(1) lookup by id, stable display order per kind
//! - Whole-kind replacement as the only mutation
//! - Reject refresh results older than the last one applied
//!
//! ## Lifecycle per kind
//! ```text
//!   Empty ──hydrate──▶ Hydrated
//!     │                   │
//!     └──────replace──────┴──▶ Fresh ──replace──▶ Fresh
//! ```
//! Nothing expires on its own; callers decide when to refresh.

mod collection;
mod entity_store;

pub use collection::Collection;
pub use entity_store::{EntityStore, StoreState, StoredEntity};

/// Monotonic refresh ticket, per kind
pub type Generation = u64;

/// Where a kind's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStatus {
    /// Nothing loaded
    #[default]
    Empty,

    /// Restored from the persisted snapshot
    Hydrated,

    /// Replaced by a refresh in this session
    Fresh,
}
