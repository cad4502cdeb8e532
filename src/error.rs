use std::path::PathBuf;

/// The listing page no longer has the shape the extractor expects.
///
/// Not retried: the extraction rules need updating.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("content container `{0}` not found in listing page")]
    MissingContainer(&'static str),

    #[error("no trail items `{0}` found in listing page")]
    NoItems(&'static str),
}

/// Resolving a single free-text location failed.
#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("no geocoding access token configured")]
    MissingToken,

    #[error("cannot geocode an empty place name")]
    EmptyQuery,

    #[error("invalid geocoding endpoint {0:?}")]
    InvalidEndpoint(String),

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding service returned status {status} for {query:?}")]
    Status { status: u16, query: String },

    #[error("no geocoding results for {0:?}")]
    NoFeatures(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("trail cache {} does not exist", .0.display())]
    Miss(PathBuf),

    #[error("trail cache {} I/O error: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trail cache {} is malformed: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss(_))
    }
}
