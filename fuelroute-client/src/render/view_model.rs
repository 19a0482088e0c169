///! Pure transforms from API payloads to display-ready view models
///!
///! Nothing in here touches the network, the map or the view port, so every
///! function is deterministic in its input.

use fuelroute_common::{FuelStop, NearbyStation, Reported, RouteResponse};

use super::format::{format_gallons, format_miles, format_price_per_gallon, format_usd};
use crate::error::RenderError;
use crate::map::{LatLng, Popup};

pub const STOP_LIST_PLACEHOLDER: &str = "No fuel stops needed.";
pub const NEARBY_LIST_PLACEHOLDER: &str = "No stations found in this area.";

/// A list that is either fully populated or shows exactly one placeholder entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<T> {
    Items(Vec<T>),
    Placeholder(String),
}

impl<T> ListView<T> {
    pub fn from_items(items: Vec<T>, placeholder: &str) -> Self {
        if items.is_empty() {
            ListView::Placeholder(placeholder.to_string())
        } else {
            ListView::Items(items)
        }
    }

    /// Number of rendered entries, counting the placeholder.
    pub fn entry_count(&self) -> usize {
        match self {
            ListView::Items(items) => items.len(),
            ListView::Placeholder(_) => 1,
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListView::Items(items) => items,
            ListView::Placeholder(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointView {
    pub position: LatLng,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopListItem {
    /// `Stop #<n>: <city>, <state>`
    pub title: String,
    pub station: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelStopView {
    pub position: LatLng,
    pub popup: Popup,
    pub item: StopListItem,
}

/// Map-ready route: latitude-first path, endpoints, and stops in service order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteView {
    pub path: Vec<LatLng>,
    pub start: Option<EndpointView>,
    pub end: Option<EndpointView>,
    pub stops: Vec<FuelStopView>,
}

impl RouteView {
    pub fn stop_list(&self) -> ListView<StopListItem> {
        let items = self.stops.iter().map(|s| s.item.clone()).collect();
        ListView::from_items(items, STOP_LIST_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStatsView {
    pub total_cost: String,
    pub distance: String,
    /// `None` hides the fuel-used statistic.
    pub fuel_used: Option<String>,
}

impl RouteStatsView {
    pub fn fuel_used_visible(&self) -> bool {
        self.fuel_used.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStationView {
    pub rank: usize,
    pub position: LatLng,
    pub name: String,
    /// `<city>, <state>`
    pub locality: String,
    pub price: String,
    pub popup: Popup,
}

/// Ranked nearby-search result around a geocoded centre.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyView {
    pub center: LatLng,
    pub stations: Vec<NearbyStationView>,
}

impl NearbyView {
    /// Centre followed by every station, the set the viewport must cover.
    pub fn bounds_points(&self) -> Vec<LatLng> {
        std::iter::once(self.center)
            .chain(self.stations.iter().map(|s| s.position))
            .collect()
    }
}

pub fn route_view(resp: &RouteResponse) -> RouteView {
    let route = resp.route.as_ref();

    let path: Vec<LatLng> = route
        .and_then(|r| r.geometry.as_ref())
        .map(|g| g.coordinates.iter().map(|c| LatLng::from_lon_lat(*c)).collect())
        .unwrap_or_default();

    let label = |value: Option<&String>, fallback: &str| {
        value
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    let start = path.first().map(|p| EndpointView {
        position: *p,
        popup: Popup::new("Start").line(label(route.and_then(|r| r.start.as_ref()), "Start")),
    });
    let end = path.last().map(|p| EndpointView {
        position: *p,
        popup: Popup::new("End").line(label(route.and_then(|r| r.end.as_ref()), "End")),
    });

    let stops = resp
        .stops
        .iter()
        .enumerate()
        .map(|(index, stop)| fuel_stop_view(index, stop))
        .collect();

    RouteView {
        path,
        start,
        end,
        stops,
    }
}

fn fuel_stop_view(index: usize, stop: &FuelStop) -> FuelStopView {
    let price = stop.price.to_string();
    FuelStopView {
        position: LatLng::new(stop.lat, stop.lon),
        popup: Popup::new(stop.station.clone())
            .line(format!("Price: {}", price))
            .line(format!("City: {}, {}", stop.city, stop.state)),
        item: StopListItem {
            title: format!("Stop #{}: {}, {}", index + 1, stop.city, stop.state),
            station: stop.station.clone(),
            price,
        },
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, RenderError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RenderError::NotFinite { field, value })
    }
}

/// Summary statistics. Missing cost or distance read as zero; a fuel figure that
/// is present but null cannot be shown and fails the whole summary.
pub fn route_stats(resp: &RouteResponse) -> Result<RouteStatsView, RenderError> {
    let total_cost = finite("total_cost", resp.total_cost.unwrap_or(0.0))?;
    let distance = finite(
        "distance_miles",
        resp.route
            .as_ref()
            .and_then(|r| r.distance_miles)
            .unwrap_or(0.0),
    )?;

    let fuel_used = match resp.fuel_consumed_gallons {
        Reported::Absent => None,
        Reported::Null => return Err(RenderError::NullField("fuel_consumed_gallons")),
        Reported::Value(v) => Some(format_gallons(finite("fuel_consumed_gallons", v)?)),
    };

    Ok(RouteStatsView {
        total_cost: format_usd(total_cost),
        distance: format_miles(distance),
        fuel_used,
    })
}

/// Stable ascending sort by price; equal prices keep service order.
pub fn rank_by_price(stations: &mut [NearbyStation]) {
    stations.sort_by(|a, b| a.price.total_cmp(&b.price));
}

pub fn nearby_view(center: LatLng, mut stations: Vec<NearbyStation>) -> NearbyView {
    rank_by_price(&mut stations);

    let stations = stations
        .into_iter()
        .enumerate()
        .map(|(index, s)| {
            let price = format_price_per_gallon(s.price);
            let locality = format!("{}, {}", s.city, s.state);
            let mut popup = Popup::new(s.station.clone())
                .line(format!("Price: {}", price))
                .line(locality.clone());
            if !s.address.is_empty() {
                popup = popup.line(s.address.clone());
            }
            NearbyStationView {
                rank: index + 1,
                position: LatLng::new(s.lat, s.lon),
                name: s.station,
                locality,
                price,
                popup,
            }
        })
        .collect();

    NearbyView { center, stations }
}
