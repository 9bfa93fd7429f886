//! Street and water queries against the Overpass API.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use map_common::{GeoPoint, MapError, MapResult, StreetGraph, WaterPolygon};

use crate::config::ClientConfig;
use crate::ingest::{parse_streets, parse_water, EXCLUDED_HIGHWAYS};

/// Source of street and water geometry around a point.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    /// All streets within `radius_m` of `center`. Fails with
    /// [`MapError::EmptyNetwork`] if there are none.
    async fn fetch_streets(&self, center: GeoPoint, radius_m: u32) -> MapResult<StreetGraph>;

    /// River polygons within `radius_m` of `center`. May be empty.
    async fn fetch_water(&self, center: GeoPoint, radius_m: u32) -> MapResult<Vec<WaterPolygon>>;
}

/// Overpass QL for every network highway way around a point.
///
/// Whole ways are returned even when they leave the radius.
pub fn streets_query(center: GeoPoint, radius_m: u32, timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{timeout}];\
         (way[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"^({excluded})$\"](around:{radius},{lat},{lon}););\
         out geom;",
        timeout = timeout_secs,
        excluded = EXCLUDED_HIGHWAYS.join("|"),
        radius = radius_m,
        lat = center.lat,
        lon = center.lon,
    )
}

/// Overpass QL for river water bodies around a point.
pub fn water_query(center: GeoPoint, radius_m: u32, timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{timeout}];\
         (way[\"water\"=\"river\"](around:{radius},{lat},{lon});\
         relation[\"water\"=\"river\"](around:{radius},{lat},{lon}););\
         out geom;",
        timeout = timeout_secs,
        radius = radius_m,
        lat = center.lat,
        lon = center.lon,
    )
}

/// Overpass interpreter client.
pub struct OverpassClient {
    client: reqwest::Client,
    url: String,
    timeout_secs: u32,
}

impl OverpassClient {
    pub fn new(config: &ClientConfig) -> MapResult<Self> {
        Ok(Self {
            client: crate::build_http_client(config)?,
            url: config.overpass_url.clone(),
            timeout_secs: config.overpass_timeout_secs,
        })
    }

    async fn run_query(&self, query: &str) -> MapResult<String> {
        debug!(url = %self.url, query = %query, "Running Overpass query");
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| MapError::Fetch(format!("Overpass request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Fetch(format!("Overpass returned HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| MapError::Fetch(format!("Failed to read Overpass response: {}", e)))
    }
}

#[async_trait]
impl GeometrySource for OverpassClient {
    #[instrument(skip(self), fields(lat = center.lat, lon = center.lon))]
    async fn fetch_streets(&self, center: GeoPoint, radius_m: u32) -> MapResult<StreetGraph> {
        info!("Loading street network from OpenStreetMap");
        let body = self
            .run_query(&streets_query(center, radius_m, self.timeout_secs))
            .await?;
        let graph = parse_streets(&body)?;
        if graph.is_empty() {
            return Err(MapError::EmptyNetwork(format!(
                "{:.5},{:.5} within {} m",
                center.lat, center.lon, radius_m
            )));
        }
        info!(edges = graph.len(), nodes = graph.node_count(), "Street network loaded");
        Ok(graph)
    }

    #[instrument(skip(self), fields(lat = center.lat, lon = center.lon))]
    async fn fetch_water(&self, center: GeoPoint, radius_m: u32) -> MapResult<Vec<WaterPolygon>> {
        info!("Loading water bodies from OpenStreetMap");
        let body = self
            .run_query(&water_query(center, radius_m, self.timeout_secs))
            .await?;
        let water = parse_water(&body)?;
        info!(polygons = water.len(), "Water layer loaded");
        Ok(water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streets_query_shape() {
        let q = streets_query(GeoPoint::new(45.1875, 5.7357), 3000, 180);
        assert!(q.starts_with("[out:json][timeout:180];"));
        assert!(q.contains("(around:3000,45.1875,5.7357)"));
        assert!(q.contains("construction|no|planned"));
        assert!(q.ends_with("out geom;"));
    }

    #[test]
    fn test_water_query_covers_ways_and_relations() {
        let q = water_query(GeoPoint::new(1.0, 2.0), 500, 60);
        assert!(q.contains("way[\"water\"=\"river\"](around:500,1,2)"));
        assert!(q.contains("relation[\"water\"=\"river\"](around:500,1,2)"));
    }
}
