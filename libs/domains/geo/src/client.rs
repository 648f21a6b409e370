//! Single-attempt geocoding clients.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use domain_items::Geolocation;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::direction::direction_from_new_york;
use crate::error::GeoError;

/// One lookup against a geocoding service. Retrying is the caller's job.
#[async_trait]
pub trait GeocodeClient: Send + Sync {
    async fn lookup(&self, postcode: &str) -> Result<Geolocation, GeoError>;
}

// zippopotam.us response body. Coordinates arrive as strings.

#[derive(Debug, Deserialize)]
struct ZippopotamResponse {
    #[serde(rename = "post code")]
    post_code: String,
    country: String,
    places: Vec<ZippopotamPlace>,
}

#[derive(Debug, Deserialize)]
struct ZippopotamPlace {
    #[serde(rename = "place name")]
    place_name: String,
    state: String,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, GeoError> {
    raw.trim()
        .parse()
        .map_err(|e| GeoError::Decode(format!("{field} {raw:?}: {e}")))
}

impl ZippopotamResponse {
    /// Fold the first place into a [`Geolocation`].
    fn into_geolocation(self, postcode: &str) -> Result<Geolocation, GeoError> {
        let Some(place) = self.places.into_iter().next() else {
            return Err(GeoError::NotFound(postcode.to_string()));
        };

        let latitude = parse_coordinate("latitude", &place.latitude)?;
        let longitude = parse_coordinate("longitude", &place.longitude)?;

        Ok(Geolocation {
            postcode: self.post_code,
            country: self.country,
            place_name: place.place_name,
            state: place.state,
            state_abbreviation: place.state_abbreviation,
            latitude,
            longitude,
            direction_from_new_york: direction_from_new_york(latitude, longitude),
        })
    }
}

/// HTTP client for `GET {base_url}/{postcode}`.
#[derive(Debug, Clone)]
pub struct ZippopotamClient {
    client: Client,
    base_url: String,
}

impl ZippopotamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GeocodeClient for ZippopotamClient {
    #[instrument(skip(self))]
    async fn lookup(&self, postcode: &str) -> Result<Geolocation, GeoError> {
        let url = format!("{}/{}", self.base_url, postcode);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(postcode, "Postcode unknown to geocoding service");
            return Err(GeoError::NotFound(postcode.to_string()));
        }
        if !status.is_success() {
            return Err(GeoError::Upstream(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: ZippopotamResponse =
            serde_json::from_slice(&body).map_err(|e| GeoError::Decode(e.to_string()))?;

        parsed.into_geolocation(postcode)
    }
}

type Script = dyn Fn(u32, &str) -> Result<Geolocation, GeoError> + Send + Sync;

/// Test double answering from a closure of `(attempt, postcode)`, where
/// `attempt` counts calls from 1.
pub struct ScriptedGeocodeClient {
    script: Box<Script>,
    calls: AtomicU32,
}

impl ScriptedGeocodeClient {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(u32, &str) -> Result<Geolocation, GeoError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: AtomicU32::new(0),
        }
    }

    /// Always answers with `geolocation`.
    pub fn always(geolocation: Geolocation) -> Self {
        Self::new(move |_, _| Ok(geolocation.clone()))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeClient for ScriptedGeocodeClient {
    async fn lookup(&self, postcode: &str) -> Result<Geolocation, GeoError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.script)(attempt, postcode)
    }
}
