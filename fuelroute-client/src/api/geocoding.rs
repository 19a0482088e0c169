///! Free-text geocoding against a Nominatim-compatible search endpoint

use async_trait::async_trait;
use fuelroute_common::GeocodeCandidate;
use reqwest::Client;

use super::Geocoder;
use crate::config::GeocoderConfig;
use crate::error::WorkflowError;
use crate::map::LatLng;

const LOOKUP_FAILURE_MESSAGE: &str = "Could not find location";

#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    url: String,
    country_codes: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            country_codes: config.country_codes.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&format=json&limit=1&countrycodes={}",
            self.url,
            urlencoding::encode(query),
            urlencoding::encode(&self.country_codes)
        )
    }
}

/// Parse the first candidate's string-encoded coordinates.
fn first_candidate(candidates: &[GeocodeCandidate]) -> Result<LatLng, WorkflowError> {
    let candidate = candidates.first().ok_or(WorkflowError::GeocodeNotFound)?;

    match (
        candidate.lat.trim().parse::<f64>(),
        candidate.lon.trim().parse::<f64>(),
    ) {
        (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok(LatLng::new(lat, lon)),
        _ => {
            tracing::warn!(
                "Geocoder returned unparsable coordinates ({:?}, {:?})",
                candidate.lat,
                candidate.lon
            );
            Err(WorkflowError::GeocodeNotFound)
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<LatLng, WorkflowError> {
        let url = self.search_url(query);
        tracing::debug!("Geocoding '{}'", query);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Geocoding request for '{}' failed: {}", query, e);
                WorkflowError::from_transport(e, LOOKUP_FAILURE_MESSAGE)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Api {
                status: Some(status.as_u16()),
                message: LOOKUP_FAILURE_MESSAGE.to_string(),
            });
        }

        let candidates: Vec<GeocodeCandidate> = response
            .json()
            .await
            .map_err(|e| WorkflowError::from_transport(e, LOOKUP_FAILURE_MESSAGE))?;

        let point = first_candidate(&candidates)?;
        tracing::debug!("Geocoded '{}' to ({}, {})", query, point.lat, point.lng);
        Ok(point)
    }
}
