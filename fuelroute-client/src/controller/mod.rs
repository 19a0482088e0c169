///! Workflow controllers and the session context they share

mod nearby;
mod route;
mod session;
mod state;

#[cfg(test)]
pub(crate) mod fakes;

pub use nearby::{
    DEFAULT_RADIUS_MILES, MISSING_LOCATION_MESSAGE, NearbySearchController, NearbyStage,
    NearbySummary, PipelineEvent, normalize_radius, parse_radius,
};
pub use route::{MISSING_LOCATIONS_MESSAGE, RouteSummary, RouteWorkflowController};
pub use session::MapSession;
pub use state::{Completion, RequestSequence, RequestState, RequestTicket, RequestTracker};
