///! In-memory API fakes for controller tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

use fuelroute_common::{
    FuelStop, NearbyStation, Price, Reported, RouteGeometry, RouteInfo, RouteResponse,
};

use crate::api::{Geocoder, RouteApi, StationApi};
use crate::error::WorkflowError;
use crate::map::LatLng;

type RouteResult = Result<RouteResponse, WorkflowError>;

/// Route response with `points` geometry pairs starting in Dallas and `stops` stations.
pub fn route_fixture(points: usize, stops: usize) -> RouteResponse {
    let coordinates = (0..points)
        .map(|i| [-96.8 + i as f64 * 2.0, 32.78 + i as f64])
        .collect();
    let stops = (0..stops)
        .map(|i| FuelStop {
            station: format!("STATION {}", i),
            lat: 33.0 + i as f64,
            lon: -95.0 + i as f64,
            price: Price::Amount(3.0 + i as f64 / 10.0),
            city: "Texarkana".to_string(),
            state: "TX".to_string(),
            refill_gallons: None,
            cost: None,
        })
        .collect();

    RouteResponse {
        route: Some(RouteInfo {
            geometry: Some(RouteGeometry { coordinates }),
            start: Some("Dallas, TX".to_string()),
            end: Some("New York, NY".to_string()),
            distance_miles: Some(1548.2),
            duration_hours: Some(22.5),
        }),
        stops,
        total_cost: Some(512.4),
        fuel_consumed_gallons: Reported::Value(154.8),
    }
}

pub fn station_fixture(name: &str, lat: f64, lon: f64, price: f64) -> NearbyStation {
    NearbyStation {
        id: None,
        station: name.to_string(),
        lat,
        lon,
        price,
        city: "Austin".to_string(),
        state: "TX".to_string(),
        address: format!("100 {} St", name),
    }
}

/// Route API that either answers from a script or holds every call until released.
pub struct FakeRouteApi {
    gated: bool,
    script: Mutex<VecDeque<RouteResult>>,
    pending: Mutex<Vec<Option<oneshot::Sender<RouteResult>>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeRouteApi {
    pub fn new() -> Self {
        Self {
            gated: false,
            script: Mutex::new(VecDeque::new()),
            pending: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::new()
        }
    }

    pub fn push(&self, result: RouteResult) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_pending(&self, count: usize) {
        while self.pending.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Complete the `index`-th held call.
    pub fn release(&self, index: usize, result: RouteResult) {
        let sender = self.pending.lock().unwrap()[index]
            .take()
            .expect("call already released");
        let _ = sender.send(result);
    }
}

#[async_trait]
impl RouteApi for FakeRouteApi {
    async fn optimize(&self, start: &str, end: &str) -> RouteResult {
        self.calls
            .lock()
            .unwrap()
            .push((start.to_string(), end.to_string()));

        if !self.gated {
            return self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted route response");
        }

        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(WorkflowError::Network("fake dropped".to_string())))
    }
}

/// Records the order of geocode and station calls across both fakes.
#[derive(Default)]
pub struct CallLog {
    entries: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn record(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

pub struct FakeGeocoder {
    log: std::sync::Arc<CallLog>,
    script: Mutex<VecDeque<Result<LatLng, WorkflowError>>>,
    gate: Mutex<Vec<Option<oneshot::Sender<Result<LatLng, WorkflowError>>>>>,
    gated: bool,
}

impl FakeGeocoder {
    pub fn new(log: std::sync::Arc<CallLog>) -> Self {
        Self {
            log,
            script: Mutex::new(VecDeque::new()),
            gate: Mutex::new(Vec::new()),
            gated: false,
        }
    }

    pub fn gated(log: std::sync::Arc<CallLog>) -> Self {
        Self {
            gated: true,
            ..Self::new(log)
        }
    }

    pub fn push(&self, result: Result<LatLng, WorkflowError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub async fn wait_for_pending(&self, count: usize) {
        while self.gate.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self, index: usize, result: Result<LatLng, WorkflowError>) {
        let sender = self.gate.lock().unwrap()[index]
            .take()
            .expect("call already released");
        let _ = sender.send(result);
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<LatLng, WorkflowError> {
        self.log.record(format!("geocode:{}", query));

        if !self.gated {
            return self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted geocode result");
        }

        let (tx, rx) = oneshot::channel();
        self.gate.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(WorkflowError::Network("fake dropped".to_string())))
    }
}

pub struct FakeStationApi {
    log: std::sync::Arc<CallLog>,
    script: Mutex<VecDeque<Result<Vec<NearbyStation>, WorkflowError>>>,
    radii: Mutex<Vec<f64>>,
}

impl FakeStationApi {
    pub fn new(log: std::sync::Arc<CallLog>) -> Self {
        Self {
            log,
            script: Mutex::new(VecDeque::new()),
            radii: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, result: Result<Vec<NearbyStation>, WorkflowError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn radii(&self) -> Vec<f64> {
        self.radii.lock().unwrap().clone()
    }
}

#[async_trait]
impl StationApi for FakeStationApi {
    async fn find_near(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
    ) -> Result<Vec<NearbyStation>, WorkflowError> {
        self.log.record(format!("stations:{},{}", lat, lon));
        self.radii.lock().unwrap().push(radius);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted station result")
    }
}
