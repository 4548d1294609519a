pub mod clean;
pub mod compose;
pub mod fetch;

pub use clean::{Accomplishments, CleanProfile, clean};
pub use compose::compose;
pub use fetch::{FixtureSource, ProfileSource, ProxycurlClient};

/// Profile record exactly as the enrichment API returns it.
pub type RawProfile = serde_json::Map<String, serde_json::Value>;
