//! Place name geocoding via Nominatim.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use map_common::{GeoPoint, MapError, MapResult};

use crate::config::ClientConfig;

/// Resolves a free-form place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> MapResult<GeoPoint>;
}

/// One hit from the Nominatim search API. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Nominatim search client.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &ClientConfig) -> MapResult<Self> {
        Ok(Self {
            client: crate::build_http_client(config)?,
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> MapResult<GeoPoint> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, "Querying Nominatim");

        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| MapError::Fetch(format!("Nominatim request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Fetch(format!("Nominatim returned HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapError::Fetch(format!("Failed to read Nominatim response: {}", e)))?;

        let point = parse_search_response(place, &body)?;
        info!(lat = point.lat, lon = point.lon, "Geocoded place");
        Ok(point)
    }
}

/// Extract the first hit from a Nominatim `jsonv2` search response.
pub fn parse_search_response(place: &str, body: &str) -> MapResult<GeoPoint> {
    let results: Vec<SearchResult> = serde_json::from_str(body)?;
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| MapError::Geocoding(place.to_string()))?;

    let parse = |value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| MapError::Fetch(format!("Invalid coordinate '{}' for '{}'", value, place)))
    };
    let point = GeoPoint::new(parse(&first.lat)?, parse(&first.lon)?);

    if let Some(name) = first.display_name {
        debug!(display_name = %name, "Nominatim match");
    }
    Ok(point)
}
