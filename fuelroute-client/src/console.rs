///! Terminal presentation of view updates and of the map overlay model

use crate::controller::MapSession;
use crate::map::{LayerKind, MapLayerManager, Primitive, Viewport};
use crate::port::{ViewPort, ViewUpdate};
use crate::render::ListView;

/// Prints every update to stdout as plain text.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }
}

/// Text lines for one update. Control and panel-visibility changes print nothing.
pub fn format_update(update: &ViewUpdate) -> Vec<String> {
    match update {
        ViewUpdate::Control(state) => {
            tracing::debug!("{:?} -> {} (enabled: {})", state.control, state.label, state.enabled);
            Vec::new()
        }
        ViewUpdate::RoutePanelsReset
        | ViewUpdate::RouteResultsShown
        | ViewUpdate::NearbyResultsHidden => Vec::new(),
        ViewUpdate::RouteStops(list) => match list {
            ListView::Placeholder(text) => vec![text.clone()],
            ListView::Items(items) => items
                .iter()
                .map(|item| format!("{}  {} @ {}", item.title, item.station, item.price))
                .collect(),
        },
        ViewUpdate::RouteStats(stats) => {
            let mut lines = vec![
                format!("Total cost: {}", stats.total_cost),
                format!("Distance:   {}", stats.distance),
            ];
            if let Some(fuel) = &stats.fuel_used {
                lines.push(format!("Fuel used:  {}", fuel));
            }
            lines
        }
        ViewUpdate::RouteError(message) => vec![format!("Route error: {}", message)],
        ViewUpdate::NearbyResults(results) => {
            let mut lines = vec![format!("{} stations found", results.count)];
            match &results.list {
                ListView::Placeholder(text) => lines.push(text.clone()),
                ListView::Items(items) => lines.extend(items.iter().map(|item| {
                    format!(
                        "{:>3}. {} ({})  {}",
                        item.station.rank, item.station.name, item.station.locality, item.station.price
                    )
                })),
            }
            lines
        }
        ViewUpdate::Alert(message) => vec![format!("! {}", message)],
    }
}

impl ViewPort for ConsoleView {
    fn render(&self, update: ViewUpdate) {
        for line in format_update(&update) {
            println!("{}", line);
        }
    }
}

/// One header per non-empty layer followed by its primitives, then the
/// viewport and any open popup.
pub fn describe_map(layers: &MapLayerManager) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in LayerKind::ALL {
        let primitives = layers.primitives(kind);
        if primitives.is_empty() {
            continue;
        }
        lines.push(format!(
            "[{}] {} marker(s), {} line(s)",
            kind,
            layers.markers(kind).count(),
            layers.lines(kind).count()
        ));
        for primitive in primitives {
            lines.push(match primitive {
                Primitive::Line(line) => format!(
                    "  line {} weight {} opacity {} ({} points)",
                    line.style.color(),
                    line.style.weight(),
                    line.style.opacity(),
                    line.points.len()
                ),
                Primitive::Marker(marker) => format!(
                    "  marker {} {} at {:.4},{:.4}",
                    marker.icon.to_color_hex(),
                    marker.popup.title,
                    marker.position.lat,
                    marker.position.lng
                ),
            });
        }
    }
    lines.push(match layers.viewport() {
        Viewport::Centered { center, zoom } => {
            format!("view: centre {:.4},{:.4} zoom {}", center.lat, center.lng, zoom)
        }
        Viewport::Fitted { bounds, padding } => {
            let center = bounds.center();
            format!(
                "view: fit {:.4},{:.4} .. {:.4},{:.4} centre {:.4},{:.4} padding {}",
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng,
                center.lat,
                center.lng,
                padding
            )
        }
    });
    if let Some(marker) = layers.open_popup_marker() {
        lines.push(format!("popup: {}", marker.popup.title));
        lines.extend(marker.popup.lines.iter().map(|l| format!("  {}", l)));
    }
    lines
}

/// [`describe_map`] over the session's current layers.
pub async fn describe_session(session: &MapSession) -> Vec<String> {
    let layers = session.layers().await;
    describe_map(&layers)
}
