use crate::api::Geocoder;
use crate::domain::{Location, TrailRecord};
use crate::error::GeocodingError;

/// Outcome of resolving a batch of trails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Already had coordinates
    pub cached: usize,
    /// Geocoded during this pass
    pub resolved: usize,
    /// Left as free text
    pub failed: usize,
}

/// Turns free-text locations into coordinates.
pub struct Resolver<G> {
    geocoder: G,
}

impl<G: Geocoder> Resolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Canonical (lat, lon) for a location.
    ///
    /// Coordinates are returned as-is without touching the geocoder. Text is
    /// forward-geocoded and the first feature wins; its `[lon, lat]` order is
    /// swapped here.
    pub fn resolve(&self, location: &Location) -> Result<(f64, f64), GeocodingError> {
        let place = match location {
            Location::Resolved { lat, lon } => return Ok((*lat, *lon)),
            Location::Unresolved(place) => place.trim(),
        };
        if place.is_empty() {
            return Err(GeocodingError::EmptyQuery);
        }

        let collection = self.geocoder.forward(place)?;
        let feature = collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::NoFeatures(place.to_string()))?;

        let [lon, lat] = feature.geometry.coordinates;
        tracing::debug!(
            place,
            lat,
            lon,
            matched = feature.place_name.as_deref().unwrap_or(""),
            "geocoded"
        );
        Ok((lat, lon))
    }

    /// Upgrade one trail's location in place.
    ///
    /// Returns `true` if the location changed. On error the trail keeps its
    /// text location.
    pub fn resolve_trail(&self, trail: &mut TrailRecord) -> Result<bool, GeocodingError> {
        if trail.location.is_resolved() {
            return Ok(false);
        }
        let (lat, lon) = self.resolve(&trail.location)?;
        trail.location = Location::resolved(lat, lon);
        Ok(true)
    }

    /// Resolve every trail, carrying on past individual failures.
    pub fn resolve_all(&self, trails: &mut [TrailRecord]) -> ResolveSummary {
        let mut summary = ResolveSummary::default();

        for trail in trails.iter_mut() {
            match self.resolve_trail(trail) {
                Ok(true) => summary.resolved += 1,
                Ok(false) => summary.cached += 1,
                Err(e) => {
                    tracing::warn!(trail = %trail.name, error = %e, "could not resolve location");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use crate::api::{Feature, FeatureCollection, Geocoder, Geometry};
    use crate::error::GeocodingError;

    /// In-memory geocoder keyed by query, counting calls.
    #[derive(Default)]
    pub struct FakeGeocoder {
        places: HashMap<String, [f64; 2]>,
        pub calls: Cell<usize>,
        pub queries: RefCell<Vec<String>>,
    }

    impl FakeGeocoder {
        /// Register a place at GeoJSON `[lon, lat]`.
        pub fn with_place(mut self, name: &str, lon: f64, lat: f64) -> Self {
            self.places.insert(name.to_string(), [lon, lat]);
            self
        }
    }

    impl Geocoder for FakeGeocoder {
        fn forward(&self, query: &str) -> Result<FeatureCollection, GeocodingError> {
            self.calls.set(self.calls.get() + 1);
            self.queries.borrow_mut().push(query.to_string());

            if query == "teapot" {
                return Err(GeocodingError::Status {
                    status: 418,
                    query: query.to_string(),
                });
            }

            let features = self
                .places
                .get(query)
                .map(|&coordinates| Feature {
                    place_name: Some(query.to_string()),
                    geometry: Geometry { coordinates },
                })
                .into_iter()
                .collect();
            Ok(FeatureCollection { features })
        }
    }
}
