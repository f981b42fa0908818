//! User payload mapping
//!
//! Two backend shapes are understood:
//!
//! ```text
//! v2:      id, telephone, extension, mobile_phone, photo_ad,
//!          location {id, name}, org_unit {name, acronym},
//!          group_unit {name, acronym}, org_unit_chain [..], parent, children
//! compact: pk, org_data {units [..], cost_centre {code, name}},
//!          org_unit__location__id, org_unit__location__name
//! ```
//!
//! Ancestor chains arrive root first and are stored nearest first.

use serde_json::Value;

use crate::model::{OrgUnitRef, User};

use super::{group, join_tokens, own_id, ref_id, ref_ids, text, Normalizer, RawRecord};

impl Normalizer {
    pub(super) fn user(&self, record: &RawRecord) -> Option<User> {
        let id = own_id(record)?;

        let org_units = ancestor_chain(record);
        let name = text(record, "name");
        let preferred_name = text(record, "preferred_name");
        let search = user_search(name.as_deref(), preferred_name.as_deref(), &org_units);

        let location = group(record, "location");
        let location_id =
            ref_id(record, "location").or_else(|| ref_id(record, "org_unit__location__id"));
        let location_name = location
            .and_then(|loc| text(loc, "name"))
            .or_else(|| text(record, "org_unit__location__name"));

        let cost_centre = group(record, "cost_centre")
            .or_else(|| group(record, "org_data").and_then(|org| group(org, "cost_centre")));

        let photo_url = text(record, "photo_ad")
            .filter(|url| !url.is_empty())
            .or_else(|| self.placeholder_photo.clone());

        Some(User {
            id,
            name,
            preferred_name,
            email: text(record, "email"),
            username: text(record, "username"),
            title: text(record, "title"),
            employee_id: text(record, "employee_id"),
            phone_landline: text(record, "telephone"),
            phone_extension: text(record, "extension"),
            phone_mobile: text(record, "mobile_phone"),
            cost_centre_code: cost_centre.and_then(|cc| text(cc, "code")),
            cost_centre_name: cost_centre.and_then(|cc| text(cc, "name")),
            location_id,
            location_name,
            photo_url,
            parent_id: ref_id(record, "parent"),
            children: ref_ids(record, "children"),
            org_units,
            search,
        })
    }
}

/// Ancestor org units, nearest first
fn ancestor_chain(record: &RawRecord) -> Vec<OrgUnitRef> {
    let root_first = record
        .get("org_unit_chain")
        .and_then(Value::as_array)
        .or_else(|| {
            group(record, "org_data")
                .and_then(|org| org.get("units"))
                .and_then(Value::as_array)
        });

    if let Some(chain) = root_first {
        return chain
            .iter()
            .rev()
            .filter_map(Value::as_object)
            .map(unit_ref)
            .collect();
    }

    // No chain: the unit and its group, already nearest first
    ["org_unit", "group_unit"]
        .iter()
        .filter_map(|key| group(record, key))
        .map(unit_ref)
        .collect()
}

fn unit_ref(unit: &RawRecord) -> OrgUnitRef {
    OrgUnitRef::new(text(unit, "name"), text(unit, "acronym"))
}

fn user_search(name: Option<&str>, preferred: Option<&str>, org_units: &[OrgUnitRef]) -> String {
    let preferred = preferred.filter(|p| Some(*p) != name);
    let own = name.into_iter().chain(preferred);
    join_tokens(own.chain(org_units.iter().flat_map(OrgUnitRef::tokens)))
}
