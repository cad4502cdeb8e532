pub mod trail;

pub use trail::{Location, TrailRecord};
