//! Location payload mapping and point parsing
//!
//! A point comes in one of two encodings, both longitude first:
//!
//! ```text
//! { "type": "Point", "coordinates": [115.86, -31.95] }
//! "POINT (115.86 -31.95)"            (optionally "SRID=4326;POINT (...)")
//! ```
//!
//! Stored coordinates are latitude first.

use serde_json::Value;
use tracing::debug;

use crate::model::{Coordinates, Location};

use super::{join_tokens, own_id, ref_id, text, Normalizer, RawRecord};

impl Normalizer {
    pub(super) fn location(&self, record: &RawRecord) -> Option<Location> {
        let id = own_id(record)?;

        if record.get("active").and_then(Value::as_bool) == Some(false) {
            debug!(id, "skipping inactive location");
            return None;
        }

        let Some(coords) = record.get("point").and_then(parse_point) else {
            debug!(id, "skipping location without a usable point");
            return None;
        };

        let name = text(record, "name");
        let search = join_tokens(name.as_deref());

        Some(Location {
            id,
            name,
            email: text(record, "email"),
            address: text(record, "address"),
            pobox: text(record, "pobox"),
            phone: text(record, "phone"),
            fax: text(record, "fax"),
            manager_id: ref_id(record, "manager"),
            coords,
            info_url: text(record, "url"),
            bandwidth_url: text(record, "bandwidth_url"),
            search,
        })
    }
}

/// Parse either point encoding into latitude/longitude
pub fn parse_point(value: &Value) -> Option<Coordinates> {
    let (longitude, latitude) = match value {
        Value::Object(fields) => {
            let pair = fields.get("coordinates")?.as_array()?;
            match pair.as_slice() {
                [lon, lat] => (lon.as_f64()?, lat.as_f64()?),
                _ => return None,
            }
        }
        Value::String(wkt) => parse_wkt_point(wkt)?,
        _ => return None,
    };

    in_range(latitude, longitude).then(|| Coordinates::new(latitude, longitude))
}

/// `[SRID=n;]POINT (lon lat)` → (lon, lat)
fn parse_wkt_point(wkt: &str) -> Option<(f64, f64)> {
    let mut body = wkt.trim();
    if let Some((prefix, rest)) = body.split_once(';') {
        if !prefix.trim().to_ascii_uppercase().starts_with("SRID=") {
            return None;
        }
        body = rest.trim();
    }

    let (tag, rest) = body.split_once('(')?;
    if !tag.trim().eq_ignore_ascii_case("POINT") {
        return None;
    }
    let inner = rest.trim_end().strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let lon = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lon, lat))
}

fn in_range(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}
