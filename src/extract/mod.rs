pub mod links;
pub mod parser;

pub use links::{location_from_href, map_embed_from_href};
pub use parser::extract_trails;
