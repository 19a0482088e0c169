///! Network clients for the route backend, the station backend and the geocoder
///!
///! Each client wraps exactly one external call. The traits are the seam the
///! controllers depend on, so workflows can be driven by in-memory fakes.

use async_trait::async_trait;
use fuelroute_common::{NearbyStation, RouteResponse};

use crate::error::WorkflowError;
use crate::map::LatLng;

mod geocoding;
mod http;
mod route_client;
mod station_client;

pub use geocoding::NominatimGeocoder;
pub use http::build_http_client;
pub use route_client::{ROUTE_FAILURE_MESSAGE, RouteApiClient};
pub use station_client::{STATION_FAILURE_MESSAGE, StationApiClient};

#[async_trait]
pub trait RouteApi: Send + Sync {
    /// One round trip to the route optimizer.
    async fn optimize(&self, start: &str, end: &str) -> Result<RouteResponse, WorkflowError>;
}

#[async_trait]
pub trait StationApi: Send + Sync {
    async fn find_near(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
    ) -> Result<Vec<NearbyStation>, WorkflowError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// First candidate for a free-text location, or [`WorkflowError::GeocodeNotFound`].
    async fn geocode(&self, query: &str) -> Result<LatLng, WorkflowError>;
}
