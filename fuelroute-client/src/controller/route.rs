///! Route optimization workflow
///!
///! submit → clear route layers → optimize → draw line, endpoints, stops →
///! stop list → fit bounds → statistics. Statistics are best effort: a
///! failure there is logged and the rendered route stays on the map.

use std::sync::Arc;

use fuelroute_common::RouteResponse;

use super::session::MapSession;
use super::state::{Completion, ControlGuard, RequestState, RequestTicket, RequestTracker};
use crate::api::RouteApi;
use crate::error::{RenderError, WorkflowError};
use crate::map::{IconKind, LayerKind, LineStyle};
use crate::port::{Control, ViewUpdate};
use crate::render::{self, RouteStatsView, RouteView};

pub const MISSING_LOCATIONS_MESSAGE: &str = "Both start and end locations are required.";

const ROUTE_LAYERS: [LayerKind; 3] = [
    LayerKind::RouteLine,
    LayerKind::RouteEndpoints,
    LayerKind::FuelStops,
];

/// What a completed route submission put on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub route: RouteView,
    pub stats: Result<RouteStatsView, RenderError>,
}

pub struct RouteWorkflowController {
    session: Arc<MapSession>,
    api: Arc<dyn RouteApi>,
    tracker: Arc<RequestTracker>,
}

impl RouteWorkflowController {
    pub fn new(session: Arc<MapSession>, api: Arc<dyn RouteApi>) -> Self {
        Self {
            session,
            api,
            tracker: Arc::new(RequestTracker::new()),
        }
    }

    pub fn state(&self) -> RequestState {
        self.tracker.state()
    }

    pub async fn submit_route(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Completion<RouteSummary>, WorkflowError> {
        let view = self.session.view();
        let (start, end) = (start.trim(), end.trim());

        if start.is_empty() || end.is_empty() {
            let err = WorkflowError::Validation(MISSING_LOCATIONS_MESSAGE.to_string());
            view.render(ViewUpdate::RouteError(err.to_string()));
            return Err(err);
        }

        let guard = ControlGuard::begin(view.clone(), Control::RouteSubmit, self.tracker.clone());
        let ticket = guard.ticket();
        tracing::info!("Route request #{}: {} -> {}", ticket.id(), start, end);

        {
            let mut layers = self.session.layers_mut().await;
            for layer in ROUTE_LAYERS {
                layers.clear(layer);
            }
        }
        view.render(ViewUpdate::RoutePanelsReset);

        let result = self.api.optimize(start, end).await;

        match result {
            Ok(response) => {
                let completion = self.apply(ticket, &response).await;
                if !completion.is_superseded() {
                    self.tracker.settle(ticket, RequestState::Success);
                }
                Ok(completion)
            }
            Err(err) => {
                if !self.tracker.is_current(ticket) {
                    tracing::debug!("Discarding failure of superseded route request #{}", ticket.id());
                    return Ok(Completion::Superseded);
                }
                tracing::error!("Route request #{} failed: {}", ticket.id(), err);
                view.render(ViewUpdate::RouteError(err.to_string()));
                self.tracker.settle(ticket, RequestState::Error(err.kind()));
                Err(err)
            }
        }
    }

    /// Draw a successful response. The layer lock is held from the staleness
    /// check to the last primitive.
    async fn apply(&self, ticket: RequestTicket, response: &RouteResponse) -> Completion<RouteSummary> {
        let route = render::route_view(response);
        let padding = self.session.settings().fit_padding;
        let view = self.session.view();

        let mut layers = self.session.layers_mut().await;
        if !self.tracker.is_current(ticket) {
            tracing::debug!("Discarding superseded route response #{}", ticket.id());
            return Completion::Superseded;
        }

        if !route.path.is_empty() {
            layers.add_line(LayerKind::RouteLine, route.path.clone(), LineStyle::Route);
            layers.fit_bounds(&route.path, padding);
        }
        if let Some(start) = &route.start {
            layers.add_marker(
                LayerKind::RouteEndpoints,
                start.position,
                IconKind::Start,
                start.popup.clone(),
            );
        }
        if let Some(end) = &route.end {
            layers.add_marker(
                LayerKind::RouteEndpoints,
                end.position,
                IconKind::End,
                end.popup.clone(),
            );
        }
        for stop in &route.stops {
            layers.add_marker(
                LayerKind::FuelStops,
                stop.position,
                IconKind::FuelStop,
                stop.popup.clone(),
            );
        }
        view.render(ViewUpdate::RouteStops(route.stop_list()));

        let stats = render::route_stats(response);
        match &stats {
            Ok(s) => view.render(ViewUpdate::RouteStats(s.clone())),
            Err(e) => tracing::error!("Error updating stats: {}", e),
        }
        view.render(ViewUpdate::RouteResultsShown);

        tracing::info!(
            "Route request #{} rendered: {} points, {} stops",
            ticket.id(),
            route.path.len(),
            route.stops.len()
        );

        Completion::Rendered(RouteSummary { route, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::controller::fakes::{FakeRouteApi, route_fixture};
    use crate::error::ErrorKind;
    use crate::map::{LatLng, Viewport};
    use crate::port::{ControlState, RecordingView};
    use crate::render::{ListView, STOP_LIST_PLACEHOLDER};
    use fuelroute_common::Reported;

    fn setup(api: Arc<FakeRouteApi>) -> (RouteWorkflowController, Arc<MapSession>, Arc<RecordingView>) {
        let view = Arc::new(RecordingView::new());
        let session = MapSession::new(MapConfig::default(), view.clone());
        (RouteWorkflowController::new(session.clone(), api), session, view)
    }

    #[tokio::test]
    async fn test_dallas_to_new_york() {
        let api = Arc::new(FakeRouteApi::new());
        api.push(Ok(route_fixture(3, 2)));
        let (controller, session, view) = setup(api.clone());

        let summary = controller
            .submit_route("Dallas, TX", "New York, NY")
            .await
            .unwrap()
            .rendered()
            .unwrap();

        let layers = session.layers().await;
        let lines: Vec<_> = layers.lines(LayerKind::RouteLine).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].points.len(), 3);
        assert_eq!(lines[0].points[0], LatLng::new(32.78, -96.8));
        assert_eq!(layers.markers(LayerKind::RouteEndpoints).count(), 2);
        assert_eq!(layers.markers(LayerKind::FuelStops).count(), 2);

        let viewport = layers.viewport();
        assert!(matches!(viewport, Viewport::Fitted { padding: 50, .. }));
        assert!(summary.route.path.iter().all(|p| viewport.contains(*p)));

        let stops = view
            .last_matching(|u| matches!(u, ViewUpdate::RouteStops(_)))
            .unwrap();
        let ViewUpdate::RouteStops(ListView::Items(items)) = &stops else {
            panic!("expected stop items, got {:?}", stops);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].station, "STATION 0");
        assert_eq!(items[1].station, "STATION 1");

        let stop_markers: Vec<_> = layers.markers(LayerKind::FuelStops).collect();
        assert_eq!(stop_markers[0].popup.title, "STATION 0");
        assert_eq!(stop_markers[1].popup.title, "STATION 1");

        assert_eq!(api.calls(), vec![("Dallas, TX".to_string(), "New York, NY".to_string())]);
        assert_eq!(controller.state(), RequestState::Success);
        assert_eq!(
            view.control_state(Control::RouteSubmit),
            Some(ControlState::ready(Control::RouteSubmit))
        );
        assert!(view.updates().contains(&ViewUpdate::RouteResultsShown));
    }

    #[tokio::test]
    async fn test_route_without_stops_shows_placeholder() {
        let api = Arc::new(FakeRouteApi::new());
        api.push(Ok(route_fixture(4, 0)));
        let (controller, session, view) = setup(api);

        controller.submit_route("A", "B").await.unwrap();

        assert_eq!(session.layers().await.markers(LayerKind::FuelStops).count(), 0);
        assert_eq!(
            view.last_matching(|u| matches!(u, ViewUpdate::RouteStops(_))),
            Some(ViewUpdate::RouteStops(ListView::Placeholder(
                STOP_LIST_PLACEHOLDER.to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_stats_failure_keeps_route_and_releases_control() {
        let api = Arc::new(FakeRouteApi::new());
        let mut response = route_fixture(3, 1);
        response.fuel_consumed_gallons = Reported::Null;
        api.push(Ok(response));
        let (controller, session, view) = setup(api);

        let summary = controller.submit_route("A", "B").await.unwrap().rendered().unwrap();

        assert!(summary.stats.is_err());
        let layers = session.layers().await;
        assert_eq!(layers.lines(LayerKind::RouteLine).count(), 1);
        assert_eq!(layers.markers(LayerKind::FuelStops).count(), 1);
        assert!(view.last_matching(|u| matches!(u, ViewUpdate::RouteStats(_))).is_none());
        assert!(view.updates().contains(&ViewUpdate::RouteResultsShown));
        assert_eq!(controller.state(), RequestState::Success);
        assert!(view.control_state(Control::RouteSubmit).unwrap().enabled);
    }

    #[tokio::test]
    async fn test_fuel_used_hidden_when_absent() {
        let api = Arc::new(FakeRouteApi::new());
        let mut response = route_fixture(2, 0);
        response.fuel_consumed_gallons = Reported::Absent;
        api.push(Ok(response));
        let (controller, _session, _view) = setup(api);

        let summary = controller.submit_route("A", "B").await.unwrap().rendered().unwrap();
        assert!(!summary.stats.unwrap().fuel_used_visible());
    }

    #[tokio::test]
    async fn test_api_error_shows_server_message_and_leaves_layers_cleared() {
        let api = Arc::new(FakeRouteApi::new());
        api.push(Ok(route_fixture(3, 2)));
        api.push(Err(WorkflowError::Api {
            status: Some(400),
            message: "Could not geocode end location".to_string(),
        }));
        let (controller, session, view) = setup(api);

        controller.submit_route("A", "B").await.unwrap();
        let err = controller.submit_route("A", "Nowhere").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(
            view.last_matching(|u| matches!(u, ViewUpdate::RouteError(_))),
            Some(ViewUpdate::RouteError("Could not geocode end location".to_string()))
        );
        let layers = session.layers().await;
        for layer in ROUTE_LAYERS {
            assert!(layers.primitives(layer).is_empty(), "{} not cleared", layer);
        }
        assert_eq!(controller.state(), RequestState::Error(ErrorKind::Api));
        assert_eq!(
            view.control_state(Control::RouteSubmit),
            Some(ControlState::ready(Control::RouteSubmit))
        );
    }

    #[tokio::test]
    async fn test_network_error_releases_control() {
        let api = Arc::new(FakeRouteApi::new());
        api.push(Err(WorkflowError::Network("connection refused".to_string())));
        let (controller, _session, view) = setup(api);

        let err = controller.submit_route("A", "B").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(view.control_state(Control::RouteSubmit).unwrap().enabled);
        assert!(!view.control_state(Control::RouteSubmit).unwrap().loading);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let api = Arc::new(FakeRouteApi::new());
        let (controller, session, view) = setup(api.clone());
        session.layers_mut().await.add_line(
            LayerKind::RouteLine,
            vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)],
            LineStyle::Route,
        );

        let err = controller.submit_route("Dallas, TX", "   ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(api.calls().is_empty());
        assert_eq!(session.layers().await.lines(LayerKind::RouteLine).count(), 1);
        assert!(view.control_state(Control::RouteSubmit).is_none());
        assert_eq!(controller.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_route_does_not_touch_nearby_layer() {
        let api = Arc::new(FakeRouteApi::new());
        api.push(Ok(route_fixture(3, 1)));
        let (controller, session, _view) = setup(api);
        session.layers_mut().await.add_marker(
            LayerKind::NearbyStations,
            LatLng::new(30.0, -97.0),
            IconKind::NearbyStation,
            Default::default(),
        );

        controller.submit_route("A", "B").await.unwrap();
        assert_eq!(session.layers().await.markers(LayerKind::NearbyStations).count(), 1);
    }

    #[tokio::test]
    async fn test_older_response_completing_last_is_discarded() {
        let api = Arc::new(FakeRouteApi::gated());
        let view = Arc::new(RecordingView::new());
        let session = MapSession::new(MapConfig::default(), view.clone());
        let controller = Arc::new(RouteWorkflowController::new(session.clone(), api.clone()));

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_route("Old", "Route").await }
        });
        api.wait_for_pending(1).await;
        let second = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_route("New", "Route").await }
        });
        api.wait_for_pending(2).await;

        api.release(1, Ok(route_fixture(5, 1)));
        let newer = second.await.unwrap().unwrap();
        assert!(!newer.is_superseded());
        assert!(view.control_state(Control::RouteSubmit).unwrap().enabled);

        api.release(0, Ok(route_fixture(2, 3)));
        let older = first.await.unwrap().unwrap();
        assert!(older.is_superseded());

        let layers = session.layers().await;
        assert_eq!(layers.lines(LayerKind::RouteLine).next().unwrap().points.len(), 5);
        assert_eq!(layers.markers(LayerKind::FuelStops).count(), 1);
        assert_eq!(controller.state(), RequestState::Success);
    }

    #[tokio::test]
    async fn test_cancelled_newest_request_releases_control() {
        let api = Arc::new(FakeRouteApi::gated());
        let view = Arc::new(RecordingView::new());
        let session = MapSession::new(MapConfig::default(), view.clone());
        let controller = Arc::new(RouteWorkflowController::new(session.clone(), api.clone()));
        let busy_updates = |view: &RecordingView| {
            view.updates()
                .iter()
                .filter(|u| matches!(u, ViewUpdate::Control(s) if s.loading))
                .count()
        };

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_route("Old", "Route").await }
        });
        api.wait_for_pending(1).await;

        // Park the second submission on the layer lock, then cancel it there.
        let layers = session.layers_mut().await;
        let second = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_route("New", "Route").await }
        });
        while busy_updates(&view) < 2 {
            tokio::task::yield_now().await;
        }
        second.abort();
        assert!(second.await.unwrap_err().is_cancelled());
        drop(layers);

        api.release(0, Ok(route_fixture(3, 1)));
        assert!(first.await.unwrap().unwrap().is_superseded());

        assert_eq!(api.calls().len(), 1);
        assert_eq!(
            view.control_state(Control::RouteSubmit),
            Some(ControlState::ready(Control::RouteSubmit))
        );
        assert_eq!(controller.state(), RequestState::Idle);
        assert_eq!(session.layers().await.lines(LayerKind::RouteLine).count(), 0);
    }
}
