//! hikemap - Scrape a hiking-trail listing, geocode locations, and serve it as JSON

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod query;
pub mod resolve;
pub mod server;

pub use cache::TrailCache;
pub use config::Config;
pub use domain::{Location, TrailRecord};
pub use error::{CacheError, ExtractionError, GeocodingError};
pub use extract::extract_trails;
pub use query::{HikesResponse, QueryService};
pub use resolve::{ResolveSummary, Resolver};
pub use server::Server;
