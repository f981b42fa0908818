//! Org unit payload mapping

use crate::model::OrgUnit;

use super::{join_tokens, own_id, ref_id, ref_ids, text, Normalizer, RawRecord};

impl Normalizer {
    pub(super) fn org_unit(&self, record: &RawRecord) -> Option<OrgUnit> {
        let id = own_id(record)?;
        let name = text(record, "name");
        let acronym = text(record, "acronym");
        let search = join_tokens(name.as_deref().into_iter().chain(acronym.as_deref()));

        Some(OrgUnit {
            id,
            name,
            acronym,
            unit_type: text(record, "unit_type"),
            manager_id: ref_id(record, "manager"),
            parent_id: ref_id(record, "parent"),
            children: ref_ids(record, "children"),
            location_id: ref_id(record, "location"),
            search,
        })
    }
}
