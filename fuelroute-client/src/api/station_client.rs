///! Nearby station lookup (`GET /api/v1/stations/near`)

use async_trait::async_trait;
use fuelroute_common::{NearbyStation, StationsResponse};
use reqwest::Client;

use super::StationApi;
use super::http::read_json;
use crate::error::WorkflowError;

pub const STATION_FAILURE_MESSAGE: &str = "Failed to fetch stations";

#[derive(Clone)]
pub struct StationApiClient {
    client: Client,
    url: String,
}

impl StationApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn query_url(&self, lat: f64, lon: f64, radius: f64) -> String {
        format!("{}?lat={}&lon={}&radius={}", self.url, lat, lon, radius)
    }
}

#[async_trait]
impl StationApi for StationApiClient {
    async fn find_near(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
    ) -> Result<Vec<NearbyStation>, WorkflowError> {
        let url = self.query_url(lat, lon, radius);
        tracing::debug!("Fetching stations near ({}, {}) within {} mi", lat, lon, radius);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Station request to {} failed: {}", url, e);
            WorkflowError::from_transport(e, STATION_FAILURE_MESSAGE)
        })?;

        let body: StationsResponse = read_json(response, STATION_FAILURE_MESSAGE).await?;
        Ok(body.stations)
    }
}
