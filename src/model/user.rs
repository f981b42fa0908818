//! User records

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind};

/// A department user
///
/// Everything except `id` may be missing so that records persisted by older
/// clients still decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: Option<String>,
    pub preferred_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub title: Option<String>,
    pub employee_id: Option<String>,

    pub phone_landline: Option<String>,
    pub phone_extension: Option<String>,
    pub phone_mobile: Option<String>,

    #[serde(alias = "cc_code")]
    pub cost_centre_code: Option<String>,
    #[serde(alias = "cc_name")]
    pub cost_centre_name: Option<String>,

    /// Reference into the location collection (may dangle)
    pub location_id: Option<EntityId>,
    pub location_name: Option<String>,

    pub photo_url: Option<String>,

    /// Manager, as a user id
    pub parent_id: Option<EntityId>,
    /// Direct reports, as user ids
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub children: Vec<EntityId>,

    /// Ancestor org units, nearest first. Informational only.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub org_units: Vec<OrgUnitRef>,

    /// Own name tokens followed by every ancestor's name and acronym
    #[serde(default, alias = "org_search", deserialize_with = "super::null_as_default")]
    pub search: String,
}

/// Name and acronym of an ancestor org unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgUnitRef {
    pub name: Option<String>,
    pub acronym: Option<String>,
}

impl OrgUnitRef {
    pub fn new(name: Option<String>, acronym: Option<String>) -> Self {
        Self { name, acronym }
    }

    /// Non-empty name/acronym tokens, name first
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        [self.name.as_deref(), self.acronym.as_deref()]
            .into_iter()
            .flatten()
            .filter(|token| !token.is_empty())
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> EntityId {
        self.id
    }
}
