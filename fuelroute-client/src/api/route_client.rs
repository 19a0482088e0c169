///! Route optimization client (`POST /api/v1/route/optimize`)

use async_trait::async_trait;
use fuelroute_common::{RouteRequest, RouteResponse};
use reqwest::Client;

use super::RouteApi;
use super::http::read_json;
use crate::error::WorkflowError;

pub const ROUTE_FAILURE_MESSAGE: &str = "Failed to optimize route";

#[derive(Clone)]
pub struct RouteApiClient {
    client: Client,
    url: String,
}

impl RouteApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RouteApi for RouteApiClient {
    async fn optimize(&self, start: &str, end: &str) -> Result<RouteResponse, WorkflowError> {
        let body = RouteRequest {
            start_location: start.to_string(),
            end_location: end.to_string(),
        };

        tracing::debug!("Requesting route {} -> {}", start, end);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Route request to {} failed: {}", self.url, e);
                WorkflowError::from_transport(e, ROUTE_FAILURE_MESSAGE)
            })?;

        let route: RouteResponse = read_json(response, ROUTE_FAILURE_MESSAGE).await?;

        tracing::debug!(
            "Route received: {} stops, {} geometry points",
            route.stops.len(),
            route
                .route
                .as_ref()
                .and_then(|r| r.geometry.as_ref())
                .map_or(0, |g| g.coordinates.len())
        );

        Ok(route)
    }
}
