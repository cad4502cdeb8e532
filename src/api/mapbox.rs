use reqwest::Url;
use reqwest::blocking::Client;
use std::time::Duration;

use super::{FeatureCollection, Geocoder};
use crate::config::GeocodingConfig;
use crate::error::GeocodingError;

/// Forward geocoder backed by the Mapbox places API.
///
/// One blocking client is built up front and reused for every lookup; the
/// configured timeout applies to each request on its own.
pub struct MapboxGeocoder {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl MapboxGeocoder {
    pub fn new(config: &GeocodingConfig, user_agent: &str) -> Result<Self, GeocodingError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| GeocodingError::InvalidEndpoint(config.endpoint.clone()))?;
        if endpoint.cannot_be_a_base() {
            return Err(GeocodingError::InvalidEndpoint(config.endpoint.clone()));
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    /// `{endpoint}/{query}.json?access_token=...&limit=1`
    fn request_url(&self, query: &str, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{query}.json"));
        }
        url.query_pairs_mut()
            .append_pair("access_token", token)
            .append_pair("limit", "1");
        url
    }
}

impl Geocoder for MapboxGeocoder {
    fn forward(&self, query: &str) -> Result<FeatureCollection, GeocodingError> {
        let token = self.token.as_deref().ok_or(GeocodingError::MissingToken)?;
        let url = self.request_url(query, token);

        tracing::debug!(query, "geocoding via mapbox");
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(GeocodingError::Status {
                status: response.status().as_u16(),
                query: query.to_string(),
            });
        }

        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::serve_once;

    fn config(endpoint: &str, token: Option<&str>) -> GeocodingConfig {
        GeocodingConfig {
            token: token.map(str::to_string),
            endpoint: endpoint.to_string(),
            ..GeocodingConfig::default()
        }
    }

    #[test]
    fn test_request_url_encodes_query() {
        let geocoder = MapboxGeocoder::new(
            &config("https://api.mapbox.com/geocoding/v5/mapbox.places", Some("pk.abc")),
            "hikemap-test",
        )
        .unwrap();

        let url = geocoder.request_url("Mill Mountain Park", "pk.abc");
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Mill%20Mountain%20Park.json?access_token=pk.abc&limit=1"
        );
    }

    #[test]
    fn test_trailing_slash_endpoint() {
        let geocoder =
            MapboxGeocoder::new(&config("http://localhost:9/places/", Some("t")), "hikemap-test")
                .unwrap();
        let url = geocoder.request_url("Roanoke", "t");
        assert_eq!(url.path(), "/places/Roanoke.json");
    }

    #[test]
    fn test_missing_token_fails_without_request() {
        // Port 9 (discard) is never contacted: the token check comes first.
        let geocoder =
            MapboxGeocoder::new(&config("http://127.0.0.1:9/places", Some("  ")), "hikemap-test")
                .unwrap();
        let err = geocoder.forward("Roanoke").unwrap_err();
        assert!(matches!(err, GeocodingError::MissingToken));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = MapboxGeocoder::new(&config("not a url", Some("t")), "hikemap-test")
            .err()
            .unwrap();
        assert!(matches!(err, GeocodingError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_error_status_is_reported() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"message": "Not Authorized"}"#);
        let geocoder =
            MapboxGeocoder::new(&config(&format!("{base}/places"), Some("pk.bad")), "hikemap-test")
                .unwrap();

        let err = geocoder.forward("Roanoke").unwrap_err();
        assert!(
            matches!(&err, GeocodingError::Status { status: 401, query } if query == "Roanoke"),
            "unexpected error: {err:?}"
        );
        assert!(server.join().unwrap().starts_with("GET /places/Roanoke.json?"));
    }

    #[test]
    fn test_parses_feature_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "place_name": "Roanoke, Virginia, United States",
                "geometry": {"type": "Point", "coordinates": [-79.9, 37.2]}
            }]
        }"#;
        let (base, server) = serve_once("200 OK", body);
        let geocoder =
            MapboxGeocoder::new(&config(&format!("{base}/places"), Some("pk.ok")), "hikemap-test")
                .unwrap();

        let collection = geocoder.forward("Roanoke").unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].geometry.coordinates, [-79.9, 37.2]);

        let request_line = server.join().unwrap();
        assert!(request_line.contains("access_token=pk.ok&limit=1"));
    }
}
