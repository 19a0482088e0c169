///! Geographic primitives used by the overlay model

use fuelroute_common::LonLat;

/// Latitude-first coordinate, the order the map consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert a longitude-first service pair.
    pub fn from_lon_lat(pair: LonLat) -> Self {
        Self::new(pair[1], pair[0])
    }
}

/// Axis-aligned rectangle in lat/lng space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Smallest rectangle containing every point, `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// A rectangle that collapses to a single point cannot be fitted.
    pub fn is_degenerate(&self) -> bool {
        self.south_west == self.north_east
    }
}

/// What the map currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    Centered { center: LatLng, zoom: u8 },
    Fitted { bounds: LatLngBounds, padding: u32 },
}

impl Viewport {
    pub fn contains(&self, p: LatLng) -> bool {
        match self {
            Viewport::Centered { center, .. } => *center == p,
            Viewport::Fitted { bounds, .. } => bounds.contains(p),
        }
    }
}
