//! Persistence Module
//!
//! Write-through snapshot of the store in durable key-value storage.
//!
//! ## Responsibilities
//! - Turn keyed maps into explicit `[id, record]` pair lists
//! - Overwrite the whole document on every save (no merging)
//! - Load best-effort: anything unreadable degrades to empty
//!
//! ## Document Format (version 1)
//! ```text
//! {
//!   "version": 1,
//!   "users":         [[id, {user}], ...],
//!   "usersOrder":    [id, ...],
//!   "locations":     [[id, {location}], ...],
//!   "locationsOrder":[id, ...],
//!   "orgUnits":      [[id, {org unit}], ...],
//!   "orgUnitsOrder": [id, ...],
//!   "orgTree":       <verbatim payload>
//! }
//! ```

mod backend;
mod codec;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use codec::{decode, encode, PersistenceCodec, FORMAT_VERSION};
