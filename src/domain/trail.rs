use serde::{Deserialize, Serialize, Serializer};

/// One hike as scraped from the listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailRecord {
    pub name: String,
    #[serde(default)]
    pub description: Vec<String>,
    pub location: Location,
    #[serde(default)]
    pub map_embed: Option<String>,
}

impl TrailRecord {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            description: Vec::new(),
            location,
            map_embed: None,
        }
    }

    /// Append description fragments, dropping blank ones.
    pub fn with_description<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.description.extend(
            fragments
                .into_iter()
                .map(Into::<String>::into)
                .filter(|s| !s.trim().is_empty()),
        );
        self
    }

    pub fn with_map_embed(mut self, map_embed: Option<String>) -> Self {
        self.map_embed = map_embed;
        self
    }
}

/// Where a trail is.
///
/// Serialized as `[lat, lon]` once resolved, or as the bare place name while
/// it still needs geocoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLocation")]
pub enum Location {
    Unresolved(String),
    Resolved { lat: f64, lon: f64 },
}

impl Location {
    pub fn resolved(lat: f64, lon: f64) -> Self {
        Location::Resolved { lat, lon }
    }

    pub fn unresolved(place: impl Into<String>) -> Self {
        Location::Unresolved(place.into())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Location::Resolved { .. })
    }

    /// (lat, lon) if already resolved
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match *self {
            Location::Resolved { lat, lon } => Some((lat, lon)),
            Location::Unresolved(_) => None,
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Location::Resolved { lat, lon } => (lat, lon).serialize(serializer),
            Location::Unresolved(place) => serializer.serialize_str(place),
        }
    }
}

// Older caches stored coordinate pairs as strings, e.g. ["37.352", "-79.944"].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Pair(RawCoordinate, RawCoordinate),
    Place(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
}

impl RawCoordinate {
    fn into_f64(self) -> Result<f64, String> {
        match self {
            RawCoordinate::Number(n) => Ok(n),
            RawCoordinate::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| format!("invalid coordinate {s:?}: {e}")),
        }
    }
}

impl TryFrom<RawLocation> for Location {
    type Error = String;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        match raw {
            RawLocation::Pair(lat, lon) => Ok(Location::Resolved {
                lat: lat.into_f64()?,
                lon: lon.into_f64()?,
            }),
            RawLocation::Place(place) => Ok(Location::Unresolved(place)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_serializes_as_pair() {
        let json = serde_json::to_string(&Location::resolved(37.352, -79.944)).unwrap();
        assert_eq!(json, "[37.352,-79.944]");
    }

    #[test]
    fn test_unresolved_serializes_as_string() {
        let json = serde_json::to_string(&Location::unresolved("Mill Mountain Park")).unwrap();
        assert_eq!(json, r#""Mill Mountain Park""#);
    }

    #[test]
    fn test_legacy_string_pair_loads_as_resolved() {
        let location: Location = serde_json::from_str(r#"["37.352", "-79.944"]"#).unwrap();
        assert_eq!(location, Location::resolved(37.352, -79.944));
    }

    #[test]
    fn test_garbage_pair_is_rejected() {
        let result: Result<Location, _> = serde_json::from_str(r#"["north", "-79.944"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let record = TrailRecord::new("Buck Mountain", Location::unresolved("Buck Mountain"))
            .with_description(["Short loop.", "   ", "Steep."]);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name"], "Buck Mountain");
        assert_eq!(value["description"], serde_json::json!(["Short loop.", "Steep."]));
        assert_eq!(value["location"], "Buck Mountain");
        assert!(value["map_embed"].is_null());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let record: TrailRecord =
            serde_json::from_str(r#"{"name": "Carvins Cove", "location": [37.38, -79.97]}"#)
                .unwrap();
        assert!(record.description.is_empty());
        assert_eq!(record.map_embed, None);
        assert_eq!(record.location.coordinates(), Some((37.38, -79.97)));
    }
}
