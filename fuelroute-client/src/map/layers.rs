///! Overlay layer model
///!
///! The map engine itself is external; this module keeps the authoritative
///! record of what each overlay layer contains and what the viewport shows.
///! Layers are independent: clearing one never touches another.

use std::collections::HashMap;

use super::bounds::{LatLng, LatLngBounds, Viewport};

/// The four overlay collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    RouteLine,
    RouteEndpoints,
    FuelStops,
    NearbyStations,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::RouteLine,
        LayerKind::RouteEndpoints,
        LayerKind::FuelStops,
        LayerKind::NearbyStations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::RouteLine => "route_line",
            LayerKind::RouteEndpoints => "route_endpoints",
            LayerKind::FuelStops => "fuel_stops",
            LayerKind::NearbyStations => "nearby_stations",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Start,
    End,
    FuelStop,
    NearbyStation,
}

impl IconKind {
    /// Marker fill colour used by the presentation layer
    pub fn to_color_hex(&self) -> &'static str {
        match self {
            IconKind::Start => "#2aad27",
            IconKind::End => "#cb2b3e",
            IconKind::FuelStop => "#388bfd",
            IconKind::NearbyStation => "#58a6ff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Route,
}

impl LineStyle {
    pub fn color(&self) -> &'static str {
        match self {
            LineStyle::Route => "#388bfd",
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            LineStyle::Route => 5,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            LineStyle::Route => 0.8,
        }
    }
}

/// Popup bound to a marker: a bold title followed by plain lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// Identifies a marker for as long as its layer is not cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub icon: IconKind,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<LatLng>,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Marker(Marker),
    Line(Polyline),
}

pub struct MapLayerManager {
    layers: HashMap<LayerKind, Vec<Primitive>>,
    viewport: Viewport,
    open_popup: Option<MarkerId>,
    next_marker_id: u64,
}

impl MapLayerManager {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            layers: LayerKind::ALL.iter().map(|k| (*k, Vec::new())).collect(),
            viewport: Viewport::Centered { center, zoom },
            open_popup: None,
            next_marker_id: 0,
        }
    }

    /// Remove every primitive of one layer.
    pub fn clear(&mut self, layer: LayerKind) {
        let removed = self.layers.entry(layer).or_default();
        if let Some(open) = self.open_popup {
            let owns_open = removed
                .iter()
                .any(|p| matches!(p, Primitive::Marker(m) if m.id == open));
            if owns_open {
                self.open_popup = None;
            }
        }
        let count = removed.len();
        removed.clear();
        tracing::trace!("Cleared {} primitives from layer {}", count, layer);
    }

    pub fn add_marker(
        &mut self,
        layer: LayerKind,
        position: LatLng,
        icon: IconKind,
        popup: Popup,
    ) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.layers
            .entry(layer)
            .or_default()
            .push(Primitive::Marker(Marker {
                id,
                position,
                icon,
                popup,
            }));
        id
    }

    pub fn add_line(&mut self, layer: LayerKind, points: Vec<LatLng>, style: LineStyle) {
        self.layers
            .entry(layer)
            .or_default()
            .push(Primitive::Line(Polyline { points, style }));
    }

    /// Fit the viewport to a coordinate set. Empty or single-point sets are ignored.
    ///
    /// Returns whether the viewport changed.
    pub fn fit_bounds(&mut self, points: &[LatLng], padding: u32) -> bool {
        match LatLngBounds::from_points(points) {
            Some(bounds) if !bounds.is_degenerate() => {
                self.viewport = Viewport::Fitted { bounds, padding };
                true
            }
            _ => {
                tracing::debug!("Skipping bounds fit over {} point(s)", points.len());
                false
            }
        }
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport::Centered { center, zoom };
    }

    /// Open the popup of a marker that is still on the map.
    pub fn open_popup(&mut self, id: MarkerId) -> bool {
        if self.marker(id).is_some() {
            self.open_popup = Some(id);
            true
        } else {
            false
        }
    }

    pub fn open_popup_marker(&self) -> Option<&Marker> {
        self.open_popup.and_then(|id| self.marker(id))
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn primitives(&self, layer: LayerKind) -> &[Primitive] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn markers(&self, layer: LayerKind) -> impl Iterator<Item = &Marker> {
        self.primitives(layer).iter().filter_map(|p| match p {
            Primitive::Marker(m) => Some(m),
            Primitive::Line(_) => None,
        })
    }

    pub fn lines(&self, layer: LayerKind) -> impl Iterator<Item = &Polyline> {
        self.primitives(layer).iter().filter_map(|p| match p {
            Primitive::Line(l) => Some(l),
            Primitive::Marker(_) => None,
        })
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.layers
            .values()
            .flat_map(|prims| prims.iter())
            .find_map(|p| match p {
                Primitive::Marker(m) if m.id == id => Some(m),
                _ => None,
            })
    }
}
