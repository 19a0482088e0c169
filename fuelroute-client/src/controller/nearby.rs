///! Nearby station search workflow
///!
///! Two dependent network steps, modelled as a small pipeline:
///! `Idle → Geocoding → SearchingStations → {Done, Failed}`. The station
///! lookup is only issued from `SearchingStations`, which is only reachable
///! through a successful geocode.

use std::sync::Arc;
use tokio::sync::RwLock;

use fuelroute_common::NearbyStation;

use super::session::MapSession;
use super::state::{Completion, ControlGuard, RequestState, RequestTicket, RequestTracker};
use crate::api::{Geocoder, StationApi};
use crate::error::{ErrorKind, WorkflowError};
use crate::map::{IconKind, LatLng, LayerKind, Popup};
use crate::port::{Control, NearbyListItem, NearbyResultsView, ViewUpdate};
use crate::render::{self, ListView, NEARBY_LIST_PLACEHOLDER};

pub const DEFAULT_RADIUS_MILES: f64 = 10.0;
pub const MISSING_LOCATION_MESSAGE: &str = "Please enter a location";

/// Stage of the geocode → station search pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearbyStage {
    Idle,
    Geocoding,
    SearchingStations { center: LatLng },
    Done { count: usize },
    Failed(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineEvent {
    Started,
    Geocoded(LatLng),
    StationsLoaded(usize),
    Failed(ErrorKind),
}

impl NearbyStage {
    /// Next stage for an event, `None` when the event is not valid here.
    ///
    /// A new search may start from any stage; the controllers do not reject
    /// submissions made while a previous one is still running.
    pub fn next(self, event: PipelineEvent) -> Option<NearbyStage> {
        match (self, event) {
            (_, PipelineEvent::Started) => Some(NearbyStage::Geocoding),
            (NearbyStage::Geocoding, PipelineEvent::Geocoded(center)) => {
                Some(NearbyStage::SearchingStations { center })
            }
            (NearbyStage::SearchingStations { .. }, PipelineEvent::StationsLoaded(count)) => {
                Some(NearbyStage::Done { count })
            }
            (
                NearbyStage::Geocoding | NearbyStage::SearchingStations { .. },
                PipelineEvent::Failed(kind),
            ) => Some(NearbyStage::Failed(kind)),
            _ => None,
        }
    }

    /// Centre to search around, only known once geocoding succeeded.
    pub fn search_center(&self) -> Option<LatLng> {
        match self {
            NearbyStage::SearchingStations { center } => Some(*center),
            _ => None,
        }
    }
}

/// Radius in miles; absent, zero or non-finite values fall back to the default.
pub fn normalize_radius(radius: Option<f64>) -> f64 {
    match radius {
        Some(r) if r.is_finite() && r != 0.0 => r,
        _ => DEFAULT_RADIUS_MILES,
    }
}

/// Parse free-form radius input the way a browser number field reads it:
/// the longest numeric prefix counts, anything unparsable means the default.
pub fn parse_radius(input: &str) -> f64 {
    let input = input.trim();
    let parsed = input
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| input[..end].parse::<f64>().ok());
    normalize_radius(parsed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySummary {
    pub center: LatLng,
    pub radius: f64,
    pub results: NearbyResultsView,
}

pub struct NearbySearchController {
    session: Arc<MapSession>,
    geocoder: Arc<dyn Geocoder>,
    stations: Arc<dyn StationApi>,
    tracker: Arc<RequestTracker>,
    stage: RwLock<NearbyStage>,
}

impl NearbySearchController {
    pub fn new(
        session: Arc<MapSession>,
        geocoder: Arc<dyn Geocoder>,
        stations: Arc<dyn StationApi>,
    ) -> Self {
        Self {
            session,
            geocoder,
            stations,
            tracker: Arc::new(RequestTracker::new()),
            stage: RwLock::new(NearbyStage::Idle),
        }
    }

    pub fn state(&self) -> RequestState {
        self.tracker.state()
    }

    pub async fn stage(&self) -> NearbyStage {
        *self.stage.read().await
    }

    /// Advance the pipeline for the current request. Stale tickets never move it.
    async fn advance(&self, ticket: RequestTicket, event: PipelineEvent) -> Option<NearbyStage> {
        if !self.tracker.is_current(ticket) {
            return None;
        }
        let mut stage = self.stage.write().await;
        match stage.next(event) {
            Some(next) => {
                tracing::trace!("Nearby request #{}: {:?} -> {:?}", ticket.id(), *stage, next);
                *stage = next;
                Some(next)
            }
            None => {
                tracing::warn!(
                    "Nearby request #{}: ignoring {:?} in stage {:?}",
                    ticket.id(),
                    event,
                    *stage
                );
                None
            }
        }
    }

    pub async fn search_nearby(
        &self,
        location_text: &str,
        radius: Option<f64>,
    ) -> Result<Completion<NearbySummary>, WorkflowError> {
        let view = self.session.view();
        let location = location_text.trim();

        if location.is_empty() {
            view.render(ViewUpdate::Alert(MISSING_LOCATION_MESSAGE.to_string()));
            return Err(WorkflowError::Validation(MISSING_LOCATION_MESSAGE.to_string()));
        }
        let radius = normalize_radius(radius);

        let guard = ControlGuard::begin(view.clone(), Control::NearbySearch, self.tracker.clone());
        let ticket = guard.ticket();
        tracing::info!(
            "Nearby request #{}: '{}' within {} mi",
            ticket.id(),
            location,
            radius
        );

        self.advance(ticket, PipelineEvent::Started).await;
        view.render(ViewUpdate::NearbyResultsHidden);
        self.session.layers_mut().await.clear(LayerKind::NearbyStations);

        let center = match self.geocoder.geocode(location).await {
            Ok(center) => center,
            Err(err) => return self.fail(ticket, err).await,
        };

        let Some(next) = self.advance(ticket, PipelineEvent::Geocoded(center)).await else {
            tracing::debug!("Nearby request #{} superseded after geocoding", ticket.id());
            return Ok(Completion::Superseded);
        };
        let Some(center) = next.search_center() else {
            return Ok(Completion::Superseded);
        };

        let stations = match self.stations.find_near(center.lat, center.lng, radius).await {
            Ok(stations) => stations,
            Err(err) => return self.fail(ticket, err).await,
        };

        let completion = self.display(ticket, center, radius, stations).await;
        if let Completion::Rendered(summary) = &completion {
            self.advance(ticket, PipelineEvent::StationsLoaded(summary.results.count))
                .await;
            self.tracker.settle(ticket, RequestState::Success);
        }
        Ok(completion)
    }

    async fn fail(
        &self,
        ticket: RequestTicket,
        err: WorkflowError,
    ) -> Result<Completion<NearbySummary>, WorkflowError> {
        if !self.tracker.is_current(ticket) {
            tracing::debug!("Discarding failure of superseded nearby request #{}", ticket.id());
            return Ok(Completion::Superseded);
        }
        tracing::error!("Nearby search error: {}", err);
        self.session
            .view()
            .render(ViewUpdate::Alert(format!("Error: {}", err)));
        self.advance(ticket, PipelineEvent::Failed(err.kind())).await;
        self.tracker.settle(ticket, RequestState::Error(err.kind()));
        Err(err)
    }

    async fn display(
        &self,
        ticket: RequestTicket,
        center: LatLng,
        radius: f64,
        stations: Vec<NearbyStation>,
    ) -> Completion<NearbySummary> {
        let view = self.session.view();
        let padding = self.session.settings().fit_padding;

        let mut layers = self.session.layers_mut().await;
        if !self.tracker.is_current(ticket) {
            tracing::debug!("Discarding superseded nearby response #{}", ticket.id());
            return Completion::Superseded;
        }
        layers.clear(LayerKind::NearbyStations);

        if stations.is_empty() {
            let results = NearbyResultsView {
                count: 0,
                list: ListView::from_items(Vec::new(), NEARBY_LIST_PLACEHOLDER),
            };
            view.render(ViewUpdate::NearbyResults(results.clone()));
            tracing::info!("Nearby request #{}: no stations found", ticket.id());
            return Completion::Rendered(NearbySummary {
                center,
                radius,
                results,
            });
        }

        let ranked = render::nearby_view(center, stations);

        layers.add_marker(
            LayerKind::NearbyStations,
            center,
            IconKind::Start,
            Popup::new("Search Location"),
        );
        let items: Vec<NearbyListItem> = ranked
            .stations
            .iter()
            .map(|station| {
                let marker = layers.add_marker(
                    LayerKind::NearbyStations,
                    station.position,
                    IconKind::NearbyStation,
                    station.popup.clone(),
                );
                NearbyListItem {
                    station: station.clone(),
                    marker,
                }
            })
            .collect();

        let results = NearbyResultsView {
            count: items.len(),
            list: ListView::from_items(items, NEARBY_LIST_PLACEHOLDER),
        };
        view.render(ViewUpdate::NearbyResults(results.clone()));
        layers.fit_bounds(&ranked.bounds_points(), padding);

        tracing::info!(
            "Nearby request #{}: {} stations ranked by price",
            ticket.id(),
            results.count
        );

        Completion::Rendered(NearbySummary {
            center,
            radius,
            results,
        })
    }

    /// Handle a click on a list entry: re-centre on the station and open its popup.
    pub async fn focus_station(&self, item: &NearbyListItem) -> bool {
        self.session.focus(item).await
    }
}
