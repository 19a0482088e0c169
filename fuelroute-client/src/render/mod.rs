///! Result rendering: payload → view model

pub mod format;
mod view_model;

pub use view_model::{
    EndpointView, FuelStopView, ListView, NEARBY_LIST_PLACEHOLDER, NearbyStationView, NearbyView,
    RouteStatsView, RouteView, STOP_LIST_PLACEHOLDER, StopListItem, nearby_view, rank_by_price,
    route_stats, route_view,
};
