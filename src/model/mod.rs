//! Model Module
//!
//! Canonical entity records held by the store.
//!
//! ## Responsibilities
//! - Define one record type per entity kind
//! - Expose the canonical id used as the map key
//! - Stay backend-agnostic (raw payload names live in `normalize`)
//!
//! ## Cross-type references
//! `User::location_id`, `OrgUnit::parent_id` and `OrgUnit::children` are plain
//! ids. Kinds are refreshed independently, so any of them may dangle.

mod location;
mod org_unit;
mod user;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use location::{Coordinates, Location};
pub use org_unit::OrgUnit;
pub use user::{OrgUnitRef, User};

/// Canonical id of a record within its kind
pub type EntityId = u64;

/// The kinds of data the store tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Location,
    OrgUnit,
    OrgTree,
}

impl EntityKind {
    /// All kinds, in persisted document order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Location,
        EntityKind::OrgUnit,
        EntityKind::OrgTree,
    ];

    /// Field name of this kind in the persisted document
    pub fn document_key(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Location => "locations",
            EntityKind::OrgUnit => "orgUnits",
            EntityKind::OrgTree => "orgTree",
        }
    }

    /// Field name of the ordered id sequence (keyed kinds only)
    pub fn order_key(self) -> Option<&'static str> {
        match self {
            EntityKind::User => Some("usersOrder"),
            EntityKind::Location => Some("locationsOrder"),
            EntityKind::OrgUnit => Some("orgUnitsOrder"),
            EntityKind::OrgTree => None,
        }
    }

    /// Parse a CLI-style kind name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "user" | "users" => Some(EntityKind::User),
            "location" | "locations" => Some(EntityKind::Location),
            "orgunit" | "orgunits" | "org-unit" | "org-units" => Some(EntityKind::OrgUnit),
            "orgtree" | "org-tree" | "tree" => Some(EntityKind::OrgTree),
            _ => None,
        }
    }

    /// Dense index for per-kind tables
    pub(crate) fn slot(self) -> usize {
        match self {
            EntityKind::User => 0,
            EntityKind::Location => 1,
            EntityKind::OrgUnit => 2,
            EntityKind::OrgTree => 3,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_key())
    }
}

/// A keyed record type
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync {
    /// Kind this record type belongs to
    const KIND: EntityKind;

    /// Canonical id (map key)
    fn id(&self) -> EntityId;
}

/// Opaque org hierarchy, stored verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgTree(pub serde_json::Value);

impl OrgTree {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }

    /// True for the default (empty array) or a null payload
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

impl Default for OrgTree {
    fn default() -> Self {
        Self(serde_json::Value::Array(Vec::new()))
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
