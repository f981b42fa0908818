//! Normalize Module
//!
//! Turns loosely-typed API payloads into canonical records.
//!
//! ## Responsibilities
//! - Keep every backend field name out of the store and the codec
//! - Survive missing nested groups (org data, location, cost centre)
//! - Drop records that cannot be keyed or placed, keep the rest
//!
//! ## Accepted batch shapes
//! ```text
//! [ {record}, ... ]                 (v2 endpoints)
//! { "objects": [ {record}, ... ] }  (legacy compact endpoint)
//! { "results": [ {record}, ... ] }  (paginated listing)
//! ```
//! Anything else is a `Schema` error for the whole batch.

mod locations;
mod org_units;
mod users;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::model::{EntityId, EntityKind, Location, OrgTree, OrgUnit, User};

pub use locations::parse_point;

type RawRecord = Map<String, Value>;

/// Stateless payload adapter
///
/// Holds only read-only settings taken from [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Fallback photo for users without one
    placeholder_photo: Option<String>,
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            placeholder_photo: config.placeholder_photo_url(),
        }
    }

    /// Normalize a user payload (v2 or legacy compact shape)
    pub fn normalize_users(&self, raw: &Value) -> Result<Vec<User>> {
        self.normalize_batch(raw, EntityKind::User, |record| self.user(record))
    }

    /// Normalize a location payload, dropping inactive or unplaceable sites
    pub fn normalize_locations(&self, raw: &Value) -> Result<Vec<Location>> {
        self.normalize_batch(raw, EntityKind::Location, |record| self.location(record))
    }

    /// Normalize an org unit payload
    pub fn normalize_org_units(&self, raw: &Value) -> Result<Vec<OrgUnit>> {
        self.normalize_batch(raw, EntityKind::OrgUnit, |record| self.org_unit(record))
    }

    /// The org tree is passed through untouched
    pub fn normalize_org_tree(&self, raw: &Value) -> OrgTree {
        OrgTree::new(raw.clone())
    }

    fn normalize_batch<T>(
        &self,
        raw: &Value,
        kind: EntityKind,
        convert: impl Fn(&RawRecord) -> Option<T>,
    ) -> Result<Vec<T>> {
        let items = batch_items(raw, kind)?;

        let mut out = Vec::with_capacity(items.len());
        let mut dropped = 0usize;
        for (index, item) in items.iter().enumerate() {
            if let Err(err) = record_id(item) {
                debug!(%kind, index, error = %err, "dropping unkeyed record");
                dropped += 1;
                continue;
            }
            match item.as_object().and_then(|record| convert(record)) {
                Some(record) => out.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(%kind, dropped, kept = out.len(), "dropped records during normalization");
        } else {
            debug!(%kind, kept = out.len(), "normalized batch");
        }

        Ok(out)
    }
}

// =============================================================================
// Field Helpers
// =============================================================================

/// Locate the record array inside a batch payload
fn batch_items(raw: &Value, kind: EntityKind) -> Result<&[Value]> {
    match raw {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Object(fields) => ["objects", "results"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                StoreError::Schema(format!("{} payload has no record array", kind))
            }),
        other => Err(StoreError::Schema(format!(
            "{} payload must be an array, got {}",
            kind,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An id from a number or a numeric string
fn as_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Check that one batch item is an object carrying its own id
///
/// Returns `RecordShape` for anything that cannot be keyed.
pub fn record_id(item: &Value) -> Result<EntityId> {
    let record = item.as_object().ok_or_else(|| {
        StoreError::RecordShape(format!("expected an object, got {}", json_type(item)))
    })?;
    own_id(record).ok_or_else(|| StoreError::RecordShape("record has no usable id".into()))
}

/// The record's own id (`id`, or `pk` in the legacy shape)
fn own_id(record: &RawRecord) -> Option<EntityId> {
    ["id", "pk"]
        .iter()
        .find_map(|key| record.get(*key).and_then(as_id))
}

/// A reference that may be a bare id or an embedded `{id, ...}` object
fn ref_id(record: &RawRecord, key: &str) -> Option<EntityId> {
    match record.get(key)? {
        Value::Object(inner) => inner.get("id").and_then(as_id),
        other => as_id(other),
    }
}

/// A list of references, each a bare id or an embedded object
fn ref_ids(record: &RawRecord, key: &str) -> Vec<EntityId> {
    let Some(items) = record.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(inner) => inner.get("id").and_then(as_id),
            other => as_id(other),
        })
        .collect()
}

/// A text field; numbers are rendered, null and other shapes are absent
fn text(record: &RawRecord, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A nested object group, absent when missing or not an object
fn group<'a>(record: &'a RawRecord, key: &str) -> Option<&'a RawRecord> {
    record.get(key).and_then(Value::as_object)
}

/// Join non-empty tokens with single spaces, preserving case
fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
