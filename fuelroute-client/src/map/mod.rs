///! Map overlay model: coordinates, bounds and the layer manager

mod bounds;
mod layers;

pub use bounds::{LatLng, LatLngBounds, Viewport};
pub use layers::{
    IconKind, LayerKind, LineStyle, MapLayerManager, Marker, MarkerId, Polyline, Popup, Primitive,
};
