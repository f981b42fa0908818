//! Persistence codec
//!
//! Mirrors `StoreState` into one JSON document and back.
//!
//! Saving never fails from the caller's point of view and loading never
//! fails at all: the snapshot is a warm cache, not a source of truth.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{EntityId, Location, OrgTree, OrgUnit, User};
use crate::store::{Collection, StoreState, StoredEntity};

use super::StorageBackend;

/// Version written into every saved document
pub const FORMAT_VERSION: u64 = 1;

/// Borrowed view of the state in document layout
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    version: u64,
    users: Vec<(EntityId, &'a User)>,
    users_order: &'a [EntityId],
    locations: Vec<(EntityId, &'a Location)>,
    locations_order: &'a [EntityId],
    org_units: Vec<(EntityId, &'a OrgUnit)>,
    org_units_order: &'a [EntityId],
    org_tree: &'a OrgTree,
}

/// Reads and writes the store snapshot under one fixed key
pub struct PersistenceCodec<B: StorageBackend> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> PersistenceCodec<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Overwrite the persisted document with `state`
    ///
    /// Failures are logged and swallowed; returns whether the write landed.
    pub fn save(&self, state: &StoreState) -> bool {
        match self.try_save(state) {
            Ok(bytes) => {
                debug!(key = %self.key, bytes, "persisted store snapshot");
                true
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to persist store snapshot");
                false
            }
        }
    }

    /// Fallible form of `save`, returning the document size
    pub fn try_save(&self, state: &StoreState) -> Result<usize> {
        let json = encode(state)?;
        self.backend.set_item(&self.key, &json)?;
        Ok(json.len())
    }

    /// Remove the persisted document
    pub fn clear(&self) -> Result<()> {
        self.backend.remove_item(&self.key)
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Read the persisted document, degrading to the empty state
    pub fn load(&self) -> StoreState {
        let text = match self.backend.get_item(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(key = %self.key, "no persisted snapshot");
                return StoreState::default();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read persisted snapshot");
                return StoreState::default();
            }
        };

        let state = decode(&text);
        info!(
            key = %self.key,
            users = state.users.len(),
            locations = state.locations.len(),
            org_units = state.org_units.len(),
            "loaded persisted snapshot"
        );
        state
    }
}

// =============================================================================
// Document Encoding
// =============================================================================

/// Serialize a state into the persisted document
pub fn encode(state: &StoreState) -> Result<String> {
    let document = Document {
        version: FORMAT_VERSION,
        users: state.users.pairs(),
        users_order: state.users.order(),
        locations: state.locations.pairs(),
        locations_order: state.locations.order(),
        org_units: state.org_units.pairs(),
        org_units_order: state.org_units.order(),
        org_tree: &state.org_tree,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Parse a persisted document, field by field
///
/// - unparsable text, a non-object root or an unknown version → empty state
/// - a missing or malformed kind → that kind empty, the others kept
/// - a malformed entry inside a pair list → that entry skipped
/// - no `version` and no pair list, but a `<kind>Order` of full records
///   (the format of older clients) → records rebuilt from that list
pub fn decode(text: &str) -> StoreState {
    let root: Value = match serde_json::from_str(text) {
        Ok(root) => root,
        Err(e) => {
            warn!(error = %e, "persisted snapshot is not valid JSON, starting empty");
            return StoreState::default();
        }
    };

    let Value::Object(fields) = root else {
        warn!("persisted snapshot is not an object, starting empty");
        return StoreState::default();
    };

    match fields.get("version") {
        None => debug!("unversioned snapshot, inferring shape per field"),
        Some(v) if v.as_u64() == Some(FORMAT_VERSION) => {}
        Some(v) => {
            warn!(version = %v, supported = FORMAT_VERSION, "unsupported snapshot version, starting empty");
            return StoreState::default();
        }
    }

    StoreState {
        users: decode_collection::<User>(&fields),
        locations: decode_collection::<Location>(&fields),
        org_units: decode_collection::<OrgUnit>(&fields),
        org_tree: fields
            .get("orgTree")
            .cloned()
            .map(OrgTree::new)
            .unwrap_or_default(),
    }
}

fn decode_collection<T: StoredEntity>(fields: &Map<String, Value>) -> Collection<T> {
    let kind = T::KIND;
    let order = kind.order_key().and_then(|key| fields.get(key));

    match fields.get(kind.document_key()) {
        Some(Value::Array(entries)) => {
            let pairs: Vec<(EntityId, T)> = entries.iter().filter_map(decode_pair::<T>).collect();
            let skipped = entries.len() - pairs.len();
            if skipped > 0 {
                warn!(%kind, skipped, "skipped malformed persisted entries");
            }
            let order = order.and_then(Value::as_array).map(|ids| {
                ids.iter().filter_map(as_id).collect::<Vec<_>>()
            });
            Collection::from_parts(pairs, order)
        }
        Some(_) => {
            warn!(%kind, "persisted pair list is not an array, defaulting to empty");
            Collection::new()
        }
        None => match order.and_then(Value::as_array) {
            Some(records) if records.iter().any(Value::is_object) => {
                let decoded: Vec<T> = records
                    .iter()
                    .filter_map(|record| <T as Deserialize>::deserialize(record).ok())
                    .collect();
                debug!(%kind, count = decoded.len(), "rebuilt collection from record order list");
                Collection::from_records(decoded)
            }
            _ => {
                debug!(%kind, "kind absent from snapshot, defaulting to empty");
                Collection::new()
            }
        },
    }
}

fn decode_pair<T: StoredEntity>(entry: &Value) -> Option<(EntityId, T)> {
    let [id, record] = entry.as_array()?.as_slice() else {
        return None;
    };
    let id = as_id(id)?;
    let record = <T as Deserialize>::deserialize(record).ok()?;
    Some((id, record))
}

fn as_id(value: &Value) -> Option<EntityId> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
