//! Fetching street networks and water bodies from OpenStreetMap services.
//!
//! - [`NominatimClient`] turns a place name into coordinates
//! - [`OverpassClient`] fetches highways and rivers around a point
//! - [`ingest`] turns Overpass JSON into a [`map_common::StreetGraph`]
//!
//! Both clients sit behind traits so the pipeline can run against fakes.

pub mod config;
pub mod geocode;
pub mod ingest;
pub mod overpass;

pub use config::ClientConfig;
pub use geocode::{Geocoder, NominatimClient};
pub use ingest::{parse_streets, parse_water};
pub use overpass::{GeometrySource, OverpassClient};

use map_common::MapError;

/// Build the shared HTTP client from configuration.
pub(crate) fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, MapError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| MapError::Fetch(format!("Failed to create HTTP client: {}", e)))
}
