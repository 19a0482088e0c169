use serde::{Deserialize, Deserializer, Serialize};

/// Coordinate pair as sent by the route service: `[longitude, latitude]`.
pub type LonLat = [f64; 2];

/// A JSON field that can be missing, explicitly `null`, or carry a value.
///
/// `Option<T>` folds the first two together; the route summary needs to tell
/// them apart because a `null` fuel figure is a broken payload while a missing
/// one simply means "not reported".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reported<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Reported<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Reported::Absent)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Reported<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the key is present; `#[serde(default)]` covers Absent.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Reported::Value(v),
            None => Reported::Null,
        })
    }
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

/// Body of `POST /api/v1/route/optimize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_location: String,
    pub end_location: String,
}

/// Successful route optimization payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub route: Option<RouteInfo>,
    #[serde(default)]
    pub stops: Vec<FuelStop>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Reported::is_absent")]
    pub fuel_consumed_gallons: Reported<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteInfo {
    #[serde(default)]
    pub geometry: Option<RouteGeometry>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
}

/// GeoJSON-style line geometry, longitude first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteGeometry {
    #[serde(default)]
    pub coordinates: Vec<LonLat>,
}

/// Station price as reported by the backend.
///
/// The route endpoint serializes prices as strings, the nearby endpoint as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Amount(v) => write!(f, "{}", v),
            Price::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Fuel stop selected by the route service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStop {
    pub station: String,
    pub lat: f64,
    pub lon: f64,
    pub price: Price,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refill_gallons: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Body of `GET /api/v1/stations/near`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub stations: Vec<NearbyStation>,
}

/// Station returned by a radius search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub station: String,
    pub lat: f64,
    pub lon: f64,
    pub price: f64,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub address: String,
}

/// Error body of a non-success backend response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    /// First non-empty message, `error` taking precedence over `detail`.
    pub fn message(&self) -> Option<&str> {
        [self.error.as_deref(), self.detail.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }
}

/// One candidate of a free-text geocoding lookup. Coordinates are string-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub lat: String,
    pub lon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
