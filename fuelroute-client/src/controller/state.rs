///! Request lifecycle bookkeeping shared by both workflow controllers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ErrorKind;
use crate::port::{Control, ControlState, ViewPort, ViewUpdate};

/// Per-controller request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(ErrorKind),
}

/// Identifier of one issued request. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Monotonic request counter; only the latest ticket is authoritative.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// How an accepted submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Rendered(T),
    /// A newer request was issued before this one finished; nothing was rendered.
    Superseded,
}

impl<T> Completion<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Completion::Rendered(v) => Some(v),
            Completion::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Completion::Superseded)
    }
}

/// Ticket counter and request state of one workflow.
///
/// Outcomes are only recorded for the latest issued ticket.
#[derive(Debug, Default)]
pub struct RequestTracker {
    sequence: RequestSequence,
    state: Mutex<RequestState>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> MutexGuard<'_, RequestState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> RequestState {
        *self.lock_state()
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.sequence.is_current(ticket)
    }

    /// Issue a new ticket and enter `Loading` in one step.
    fn issue(&self) -> RequestTicket {
        let mut state = self.lock_state();
        let ticket = self.sequence.issue();
        *state = RequestState::Loading;
        ticket
    }

    /// Record the outcome of `ticket`. Ignored once a newer request was issued.
    pub fn settle(&self, ticket: RequestTicket, outcome: RequestState) {
        let mut state = self.lock_state();
        if self.sequence.is_current(ticket) {
            *state = outcome;
        }
    }

    /// A current request that ends without an outcome goes back to `Idle`.
    fn abandon(&self, ticket: RequestTicket) {
        let mut state = self.lock_state();
        if self.sequence.is_current(ticket) && *state == RequestState::Loading {
            *state = RequestState::Idle;
        }
    }
}

/// Disables a trigger control for the lifetime of a request.
///
/// Dropping the guard re-enables the control and hides the loader, on every
/// exit path including cancellation. A superseded request leaves the control
/// alone: the newer request owns it and releases it when it finishes.
pub(crate) struct ControlGuard {
    view: Arc<dyn ViewPort>,
    control: Control,
    tracker: Arc<RequestTracker>,
    ticket: RequestTicket,
}

impl ControlGuard {
    /// Issue a ticket, enter `Loading` and disable the control. Never suspends,
    /// so no cancellation point exists between issuing and guarding.
    pub(crate) fn begin(
        view: Arc<dyn ViewPort>,
        control: Control,
        tracker: Arc<RequestTracker>,
    ) -> Self {
        let ticket = tracker.issue();
        view.render(ViewUpdate::Control(ControlState::busy(control)));
        Self {
            view,
            control,
            tracker,
            ticket,
        }
    }

    pub(crate) fn ticket(&self) -> RequestTicket {
        self.ticket
    }
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        if self.tracker.is_current(self.ticket) {
            self.tracker.abandon(self.ticket);
            self.view
                .render(ViewUpdate::Control(ControlState::ready(self.control)));
        }
    }
}
