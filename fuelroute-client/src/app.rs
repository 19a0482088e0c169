use std::sync::Arc;

use crate::api::{NominatimGeocoder, RouteApiClient, StationApiClient, build_http_client};
use crate::config::ClientConfig;
use crate::controller::{MapSession, NearbySearchController, RouteWorkflowController};
use crate::port::ViewPort;

/// Both workflows wired to the real HTTP clients over one shared map session.
pub struct FuelRouteApp {
    pub session: Arc<MapSession>,
    pub route: RouteWorkflowController,
    pub nearby: NearbySearchController,
}

impl FuelRouteApp {
    pub fn from_config(config: &ClientConfig, view: Arc<dyn ViewPort>) -> anyhow::Result<Self> {
        let client = build_http_client(config.api.timeout_secs, &config.geocoder.user_agent)?;

        let session = MapSession::new(config.map.clone(), view);
        let route = RouteWorkflowController::new(
            session.clone(),
            Arc::new(RouteApiClient::new(client.clone(), config.route_optimize_url())),
        );
        let nearby = NearbySearchController::new(
            session.clone(),
            Arc::new(NominatimGeocoder::new(client.clone(), &config.geocoder)),
            Arc::new(StationApiClient::new(client, config.stations_near_url())),
        );

        tracing::info!(
            "Client ready: backend {}, geocoder {}",
            config.api.base_url,
            config.geocoder.url
        );

        Ok(Self {
            session,
            route,
            nearby,
        })
    }
}
