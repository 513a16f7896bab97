//! Nominatim search client.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::error::GeocodeError;
use super::fill::Geocoder;
use crate::geo::Coordinates;

/// Default base URL for the public OpenStreetMap Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim requires an identifying User-Agent.
const DEFAULT_USER_AGENT: &str = "railways-simulator";

/// One search hit. Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Sent as the User-Agent header
    pub user_agent: String,
    /// Appended to every query to keep hits in the right country
    pub region: String,
    /// Pause between consecutive lookups
    pub delay: Duration,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            region: "India".to_string(),
            delay: Duration::from_secs(1),
            timeout_secs: 30,
        }
    }
}

/// Client for the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    region: String,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            region: config.region.clone(),
        })
    }

    /// Free-text query for a station.
    pub fn query_for(&self, station_name: &str) -> String {
        format!("{station_name} railway station {}", self.region)
    }

    /// Look up the coordinates of a station by name.
    pub async fn search(&self, station_name: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let query = self.query_for(station_name);
        debug!(%query, "geocoding");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

impl Geocoder for NominatimClient {
    fn locate(
        &self,
        station_name: &str,
    ) -> impl Future<Output = Result<Option<Coordinates>, GeocodeError>> + Send {
        self.search(station_name)
    }
}

/// First hit of a search response, if any.
pub fn parse_search_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })?;

    let Some(hit) = hits.first() else {
        return Ok(None);
    };

    let parse = |field: &str, value: &str| {
        value.trim().parse::<f64>().map_err(|_| GeocodeError::Json {
            message: format!("invalid {field}: {value:?}"),
        })
    };
    Ok(Some(Coordinates::new(parse("lat", &hit.lat)?, parse("lon", &hit.lon)?)))
}
