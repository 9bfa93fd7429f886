//! Endpoints and HTTP settings for the OpenStreetMap services.

use std::time::Duration;

/// Public Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Public Overpass interpreter.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// User agent sent to both services; Nominatim's usage policy requires one.
pub const DEFAULT_USER_AGENT: &str = "map_plotter";

/// Configuration shared by the geocoder and the geometry client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    /// Whole-request timeout; Overpass queries over a few km can be slow.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Server-side timeout passed in the Overpass query header, in seconds.
    pub overpass_timeout_secs: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            overpass_timeout_secs: 180,
        }
    }
}
