///! Rendering port between the controllers and whatever presents the results
///!
///! Controllers never address concrete view elements; they push [`ViewUpdate`]s
///! through [`ViewPort::render`] and the presentation layer decides how each
///! one looks.

use std::sync::Mutex;

use crate::map::LatLng;
use crate::render::{ListView, NearbyStationView, RouteStatsView, StopListItem};

/// Trigger control of a workflow (submit / search button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    RouteSubmit,
    NearbySearch,
}

impl Control {
    pub fn idle_label(&self) -> &'static str {
        match self {
            Control::RouteSubmit => "Optimize Route",
            Control::NearbySearch => "Search",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            Control::RouteSubmit => "Optimizing...",
            Control::NearbySearch => "Searching...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub control: Control,
    pub enabled: bool,
    pub loading: bool,
    pub label: &'static str,
}

impl ControlState {
    pub fn busy(control: Control) -> Self {
        Self {
            control,
            enabled: false,
            loading: true,
            label: control.busy_label(),
        }
    }

    pub fn ready(control: Control) -> Self {
        Self {
            control,
            enabled: true,
            loading: false,
            label: control.idle_label(),
        }
    }
}

/// Entry of the nearby list; focusing it re-centres the map on the station.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyListItem {
    pub station: NearbyStationView,
    pub marker: crate::map::MarkerId,
}

impl NearbyListItem {
    pub fn position(&self) -> LatLng {
        self.station.position
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResultsView {
    pub count: usize,
    pub list: ListView<NearbyListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Control(ControlState),

    /// Hide the previous route error and results panels.
    RoutePanelsReset,
    RouteStops(ListView<StopListItem>),
    RouteStats(RouteStatsView),
    RouteResultsShown,
    /// Inline route error panel.
    RouteError(String),

    NearbyResultsHidden,
    NearbyResults(NearbyResultsView),

    /// Blocking alert, used by the nearby workflow.
    Alert(String),
}

pub trait ViewPort: Send + Sync {
    fn render(&self, update: ViewUpdate);
}

/// Headless port that keeps every update, in order.
#[derive(Default)]
pub struct RecordingView {
    updates: Mutex<Vec<ViewUpdate>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates
            .lock()
            .map(|u| u.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Last state pushed for a control, if any.
    pub fn control_state(&self, control: Control) -> Option<ControlState> {
        self.updates().into_iter().rev().find_map(|u| match u {
            ViewUpdate::Control(state) if state.control == control => Some(state),
            _ => None,
        })
    }

    pub fn last_matching<F>(&self, pred: F) -> Option<ViewUpdate>
    where
        F: Fn(&ViewUpdate) -> bool,
    {
        self.updates().into_iter().rev().find(|u| pred(u))
    }

    pub fn clear(&self) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.clear();
        }
    }
}

impl ViewPort for RecordingView {
    fn render(&self, update: ViewUpdate) {
        match self.updates.lock() {
            Ok(mut updates) => updates.push(update),
            Err(poisoned) => poisoned.into_inner().push(update),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_view_tracks_last_control_state() {
        let view = RecordingView::new();
        view.render(ViewUpdate::Control(ControlState::busy(Control::RouteSubmit)));
        view.render(ViewUpdate::Control(ControlState::busy(Control::NearbySearch)));
        view.render(ViewUpdate::Control(ControlState::ready(Control::RouteSubmit)));

        let route = view.control_state(Control::RouteSubmit).unwrap();
        assert!(route.enabled && !route.loading);
        assert_eq!(route.label, "Optimize Route");

        let nearby = view.control_state(Control::NearbySearch).unwrap();
        assert!(!nearby.enabled && nearby.loading);

        view.clear();
        assert!(view.updates().is_empty());
    }
}
