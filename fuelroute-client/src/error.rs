///! Error taxonomy for the route and nearby-search workflows

use thiserror::Error;

/// Failure of a workflow or of one of its network steps.
///
/// Every variant except [`WorkflowError::Render`] aborts the workflow and is
/// shown to the user. `Render` is only ever logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// Required input missing; raised before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request never completed (connect, timeout, transport).
    #[error("{0}")]
    Network(String),

    /// The request completed with a non-success status or an unreadable body.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Geocoder answered but had no candidate for the query.
    #[error("Location not found")]
    GeocodeNotFound,

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Network(_) => ErrorKind::Network,
            WorkflowError::Api { .. } => ErrorKind::Api,
            WorkflowError::GeocodeNotFound => ErrorKind::GeocodeNotFound,
            WorkflowError::Render(_) => ErrorKind::Render,
        }
    }

    /// Map a reqwest failure to the taxonomy. Body decoding errors count as API errors.
    pub(crate) fn from_transport(err: reqwest::Error, fallback: &str) -> Self {
        if err.is_decode() {
            WorkflowError::Api {
                status: err.status().map(|s| s.as_u16()),
                message: fallback.to_string(),
            }
        } else {
            WorkflowError::Network(err.to_string())
        }
    }
}

/// Discriminant of [`WorkflowError`], kept in pipeline and request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    Api,
    GeocodeNotFound,
    Render,
}

/// A secondary rendering step could not produce its output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("field `{0}` is present but null")]
    NullField(&'static str),

    #[error("field `{field}` is not a finite number: {value}")]
    NotFinite { field: &'static str, value: f64 },
}
