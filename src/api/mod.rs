pub mod fetch;
pub mod mapbox;

use serde::Deserialize;

use crate::error::GeocodingError;

pub use fetch::fetch_page;
pub use mapbox::MapboxGeocoder;

/// GeoJSON feature collection returned by forward geocoding
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub place_name: Option<String>,
    pub geometry: Geometry,
}

/// Point geometry; GeoJSON order is `[longitude, latitude]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub coordinates: [f64; 2],
}

/// A forward geocoding provider.
pub trait Geocoder {
    /// Look up a free-text place name.
    ///
    /// Implementations must fail on a non-success response rather than hand
    /// back an empty collection.
    fn forward(&self, query: &str) -> Result<FeatureCollection, GeocodingError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn forward(&self, query: &str) -> Result<FeatureCollection, GeocodingError> {
        (**self).forward(query)
    }
}
