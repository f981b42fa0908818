//! Org unit records

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind};

/// A node of the organisation structure
///
/// `parent_id` and `children` describe a forest. Nothing here guarantees it
/// is acyclic; walking it is up to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: EntityId,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub unit_type: Option<String>,
    pub manager_id: Option<EntityId>,
    pub parent_id: Option<EntityId>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub children: Vec<EntityId>,
    pub location_id: Option<EntityId>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub search: String,
}

impl Entity for OrgUnit {
    const KIND: EntityKind = EntityKind::OrgUnit;

    fn id(&self) -> EntityId {
        self.id
    }
}
