//! Tests for the Normalizer
//!
//! These tests verify:
//! - v2 and legacy user shapes
//! - Missing nested groups and secondary fields
//! - Search string ordering (nearest ancestor first)
//! - Point parsing in both encodings
//! - Dropping of unkeyed, inactive and unplaceable records
//! - Batch-level schema errors

use addressbook::normalize::{parse_point, record_id, Normalizer};
use addressbook::{Config, StoreError};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn normalizer() -> Normalizer {
    let config = Config::builder()
        .base_url("https://oim.example")
        .photo_placeholder(Some("/static/placeholder.svg".to_string()))
        .build();
    Normalizer::new(&config)
}

// =============================================================================
// User Tests
// =============================================================================

#[test]
fn test_v2_user_maps_fields() {
    let raw = json!([{
        "id": 7,
        "name": "Jane Citizen",
        "preferred_name": "Jane",
        "email": "jane@example.com",
        "username": "janec",
        "title": "Analyst",
        "telephone": "9219 9000",
        "extension": "9000",
        "mobile_phone": "0400 000 000",
        "location": {"id": 3, "name": "Kensington"},
        "photo_ad": "https://cdn.example/jane.jpg",
        "org_unit": {"id": 11, "name": "Systems", "acronym": "SYS"},
        "group_unit": {"id": 10, "name": "Technology", "acronym": "OIM"},
        "parent": 2,
        "children": [8, 9]
    }]);

    let users = normalizer().normalize_users(&raw).unwrap();

    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert_eq!(user.id, 7);
    assert_eq!(user.phone_landline.as_deref(), Some("9219 9000"));
    assert_eq!(user.phone_mobile.as_deref(), Some("0400 000 000"));
    assert_eq!(user.location_id, Some(3));
    assert_eq!(user.location_name.as_deref(), Some("Kensington"));
    assert_eq!(user.photo_url.as_deref(), Some("https://cdn.example/jane.jpg"));
    assert_eq!(user.parent_id, Some(2));
    assert_eq!(user.children, vec![8, 9]);
    assert_eq!(user.search, "Jane Citizen Jane Systems SYS Technology OIM");
}

#[test]
fn test_chain_is_reversed_to_nearest_first() {
    let raw = json!([{
        "id": 1,
        "name": "Sam",
        "org_unit_chain": [
            {"name": "Department", "acronym": "DEPT"},
            {"name": "Division", "acronym": "DIV"},
            {"name": "Branch", "acronym": "BR"}
        ]
    }]);

    let user = &normalizer().normalize_users(&raw).unwrap()[0];

    let chain: Vec<&str> = user.org_units.iter().filter_map(|u| u.acronym.as_deref()).collect();
    assert_eq!(chain, vec!["BR", "DIV", "DEPT"]);
    assert_eq!(user.search, "Sam Branch BR Division DIV Department DEPT");
}

#[test]
fn test_legacy_compact_user_shape() {
    let raw = json!({"objects": [{
        "pk": 42,
        "name": "Legacy User",
        "org_data": {
            "units": [
                {"name": "Corporate", "acronym": "CORP"},
                {"name": "Finance", "acronym": "FIN"}
            ],
            "cost_centre": {"code": "CC101", "name": "Finance Ops"}
        },
        "org_unit__location__id": 5,
        "org_unit__location__name": "Head Office"
    }]});

    let users = normalizer().normalize_users(&raw).unwrap();

    let user = &users[0];
    assert_eq!(user.id, 42);
    assert_eq!(user.cost_centre_code.as_deref(), Some("CC101"));
    assert_eq!(user.cost_centre_name.as_deref(), Some("Finance Ops"));
    assert_eq!(user.location_id, Some(5));
    assert_eq!(user.location_name.as_deref(), Some("Head Office"));
    assert_eq!(user.search, "Legacy User Finance FIN Corporate CORP");
}

#[test]
fn test_user_without_nested_groups_is_kept() {
    let raw = json!([{"id": 3, "name": "No Org", "org_data": null, "location": null}]);

    let users = normalizer().normalize_users(&raw).unwrap();

    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert!(user.org_units.is_empty());
    assert_eq!(user.location_id, None);
    assert_eq!(user.location_name, None);
    assert_eq!(user.cost_centre_code, None);
    assert_eq!(user.search, "No Org");
}

#[test]
fn test_missing_photo_uses_placeholder() {
    let raw = json!([{"id": 1, "photo_ad": null}, {"id": 2, "photo_ad": ""}]);

    let users = normalizer().normalize_users(&raw).unwrap();

    for user in &users {
        assert_eq!(
            user.photo_url.as_deref(),
            Some("https://oim.example/static/placeholder.svg")
        );
    }
}

#[test]
fn test_no_placeholder_leaves_photo_unset() {
    let config = Config::builder().photo_placeholder(None).build();
    let raw = json!([{"id": 1}]);

    let users = Normalizer::new(&config).normalize_users(&raw).unwrap();

    assert_eq!(users[0].photo_url, None);
}

#[test]
fn test_user_without_id_is_dropped() {
    let raw = json!([
        {"name": "No Id"},
        {"id": null, "name": "Null Id"},
        {"id": "12", "name": "String Id"},
        "not an object",
        {"id": 13, "name": "Kept"}
    ]);

    let users = normalizer().normalize_users(&raw).unwrap();

    let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![12, 13]);
}

#[test]
fn test_unkeyed_items_are_record_shape_errors() {
    assert_eq!(record_id(&json!({"id": 7})).unwrap(), 7);
    assert_eq!(record_id(&json!({"pk": "8"})).unwrap(), 8);

    for item in [json!({"name": "No Id"}), json!({"id": null}), json!("not an object"), json!(4)] {
        let err = record_id(&item).unwrap_err();
        assert!(matches!(err, StoreError::RecordShape(_)), "unexpected {:?}", err);
    }
}

#[test]
fn test_search_preserves_case_and_single_spaces() {
    let raw = json!([{
        "id": 1,
        "name": "  McDonald  ",
        "org_unit": {"name": "eHealth", "acronym": ""}
    }]);

    let user = &normalizer().normalize_users(&raw).unwrap()[0];

    assert_eq!(user.search, "McDonald eHealth");
}

// =============================================================================
// Location Tests
// =============================================================================

#[test]
fn test_wkt_point_swaps_axes() {
    let coords = parse_point(&json!("POINT (115.86 -31.95)")).unwrap();

    assert_eq!(coords.latitude, -31.95);
    assert_eq!(coords.longitude, 115.86);
}

#[test]
fn test_geojson_point_swaps_axes() {
    let coords = parse_point(&json!({"type": "Point", "coordinates": [115.86, -31.95]})).unwrap();

    assert_eq!(coords.latitude, -31.95);
    assert_eq!(coords.longitude, 115.86);
}

#[test]
fn test_point_variants() {
    assert!(parse_point(&json!("SRID=4326;POINT (115.86 -31.95)")).is_some());
    assert!(parse_point(&json!("point(115.86 -31.95)")).is_some());

    assert!(parse_point(&json!("POINT (115.86)")).is_none());
    assert!(parse_point(&json!("POINT (1 2 3)")).is_none());
    assert!(parse_point(&json!("LINESTRING (1 2, 3 4)")).is_none());
    assert!(parse_point(&json!("POINT (abc def)")).is_none());
    assert!(parse_point(&json!("POINT (10 200)")).is_none());
    assert!(parse_point(&json!({"coordinates": [1.0]})).is_none());
    assert!(parse_point(&json!(null)).is_none());
}

#[test]
fn test_location_maps_fields() {
    let raw = json!([{
        "id": 4,
        "name": "Kensington",
        "point": "POINT (115.88 -31.98)",
        "manager": {"id": 9, "name": "Boss"},
        "address": "17 Dick Perry Ave",
        "pobox": "Locked Bag 104",
        "phone": "9219 9000",
        "fax": "9334 0498",
        "email": "info@example.com",
        "url": "https://example.com/kensington",
        "bandwidth_url": "https://example.com/bw/4"
    }]);

    let locations = normalizer().normalize_locations(&raw).unwrap();

    let location = &locations[0];
    assert_eq!(location.manager_id, Some(9));
    assert_eq!(location.info_url.as_deref(), Some("https://example.com/kensington"));
    assert_eq!(location.coords.latitude, -31.98);
    assert_eq!(location.search, "Kensington");
}

#[test]
fn test_inactive_location_without_point_is_absent() {
    let raw = json!([
        {"id": 1, "name": "Gone", "active": false},
        {"id": 2, "name": "Closed", "active": false, "point": "POINT (115.0 -31.0)"},
        {"id": 3, "name": "Nowhere", "point": null},
        {"id": 4, "name": "Here", "point": {"coordinates": [115.0, -31.0]}}
    ]);

    let locations = normalizer().normalize_locations(&raw).unwrap();

    let ids: Vec<u64> = locations.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![4]);
}

// =============================================================================
// Org Unit Tests
// =============================================================================

#[test]
fn test_org_unit_maps_references() {
    let raw = json!([{
        "id": 20,
        "name": "Information Management",
        "acronym": "OIM",
        "unit_type": "Division",
        "manager": 5,
        "parent": {"id": 1},
        "children": [21, {"id": 22}],
        "location": 3
    }]);

    let units = normalizer().normalize_org_units(&raw).unwrap();

    let unit = &units[0];
    assert_eq!(unit.parent_id, Some(1));
    assert_eq!(unit.children, vec![21, 22]);
    assert_eq!(unit.location_id, Some(3));
    assert_eq!(unit.manager_id, Some(5));
    assert_eq!(unit.search, "Information Management OIM");
}

#[test]
fn test_org_tree_is_passed_through() {
    let raw = json!([{"id": 1, "name": "Dept", "children": [{"id": 2, "children": [], "extra": true}]}]);

    let tree = normalizer().normalize_org_tree(&raw);

    assert_eq!(tree.payload(), &raw);
}

// =============================================================================
// Batch Shape Tests
// =============================================================================

#[test]
fn test_non_array_payload_is_schema_error() {
    let n = normalizer();

    for raw in [json!({"detail": "nope"}), json!("text"), json!(null), json!(3)] {
        let err = n.normalize_users(&raw).unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)), "unexpected {:?}", err);
    }
}

#[test]
fn test_paginated_results_payload() {
    let raw = json!({"count": 1, "results": [{"id": 1, "name": "Unit", "acronym": "U"}]});

    let units = normalizer().normalize_org_units(&raw).unwrap();

    assert_eq!(units.len(), 1);
}
