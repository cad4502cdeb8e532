use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::Location;

/// Directions links point at Google Maps.
pub static MAPS_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"google\.com/maps").unwrap());

/// Trip maps are hosted by Trimble Outdoors.
pub static TRIMBLE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"trimbleoutdoors\.com").unwrap());

// q=37.352+-79.944, q=37.352,-79.944 and q=37.352%2C-79.944 all occur in the wild
static LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/maps.*[?&]q=.??(-?\d+\.\d+)(?:\+|,|%2[Cc])(-?\d+\.\d+)").unwrap()
});
static PLACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/maps/place/([^/?#]+)").unwrap());
static TRIP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[?&]tripId=|/ViewTrip/)(\d+)").unwrap());

pub const EMBED_BASE: &str = "http://www.trimbleoutdoors.com/Maps/EmbeddedMap.aspx";

/// Pull a location out of a Google Maps link.
///
/// Coordinates in the `q` parameter win over a `/maps/place/` name. Returns
/// `None` when neither is present, which means the trail gets dropped.
pub fn location_from_href(href: &str) -> Option<Location> {
    if let Some(caps) = LAT_LON.captures(href) {
        let lat = caps[1].parse().ok()?;
        let lon = caps[2].parse().ok()?;
        return Some(Location::resolved(lat, lon));
    }

    let caps = PLACE.captures(href)?;
    let spaced = caps[1].replace('+', " ");
    let place = percent_decode_str(&spaced).decode_utf8_lossy();
    let place = place.split_whitespace().collect::<Vec<_>>().join(" ");
    if place.is_empty() {
        return None;
    }
    Some(Location::Unresolved(place))
}

/// Build the embeddable trip map URL from a Trimble Outdoors trip link.
pub fn map_embed_from_href(href: &str) -> Option<String> {
    let caps = TRIP_ID.captures(href)?;
    Some(format!("{}?tripId={}", EMBED_BASE, &caps[1]))
}
