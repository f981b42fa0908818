//! Location records

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind};

/// Geographic point, latitude first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A physical site
///
/// Only locations with a usable point survive normalization, so `coords` is
/// never absent on a stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub pobox: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub manager_id: Option<EntityId>,
    pub coords: Coordinates,
    pub info_url: Option<String>,
    pub bandwidth_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub search: String,
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> EntityId {
        self.id
    }
}
