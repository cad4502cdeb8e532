use serde::Serialize;

use crate::api::Geocoder;
use crate::cache::TrailCache;
use crate::domain::TrailRecord;
use crate::error::CacheError;
use crate::resolve::Resolver;

/// Body of the hikes endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HikesResponse {
    pub hikes: Vec<TrailRecord>,
}

/// Reads the cache and resolves locations on every request.
pub struct QueryService<G> {
    cache: TrailCache,
    resolver: Resolver<G>,
    write_back: bool,
}

impl<G: Geocoder> QueryService<G> {
    pub fn new(cache: TrailCache, resolver: Resolver<G>) -> Self {
        Self {
            cache,
            resolver,
            write_back: false,
        }
    }

    /// Store newly geocoded coordinates in the cache so later requests
    /// skip the geocoder for those trails.
    pub fn with_write_back(mut self, write_back: bool) -> Self {
        self.write_back = write_back;
        self
    }

    pub fn resolver(&self) -> &Resolver<G> {
        &self.resolver
    }

    /// Every cached trail, with as many locations resolved as possible.
    ///
    /// Trails that fail to geocode are still returned with their text
    /// location.
    pub fn get_all_trails(&self) -> Result<Vec<TrailRecord>, CacheError> {
        let mut trails = self.cache.load()?;
        let summary = self.resolver.resolve_all(&mut trails);

        tracing::info!(
            total = trails.len(),
            cached = summary.cached,
            resolved = summary.resolved,
            failed = summary.failed,
            "served trails"
        );

        if self.write_back
            && summary.resolved > 0
            && let Err(e) = self.cache.store(&trails)
        {
            tracing::warn!(error = %e, "could not write resolved locations back to cache");
        }

        Ok(trails)
    }

    /// `{"hikes": [...]}`, empty when nothing has been scraped yet.
    pub fn hikes(&self) -> Result<HikesResponse, CacheError> {
        match self.get_all_trails() {
            Ok(hikes) => Ok(HikesResponse { hikes }),
            Err(e) if e.is_miss() => {
                tracing::warn!(error = %e, "no trail cache yet, run `hikemap scrape`");
                Ok(HikesResponse { hikes: Vec::new() })
            }
            Err(e) => Err(e),
        }
    }
}
