use hifitime::Epoch;

use crate::fix::Fix;
use crate::receiver::{Receiver, ReceiverId};
use crate::request::Request;

/// Session lifecycle. Terminal states are never revived: a new request for
/// the same receiver always constructs a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, first tick not yet run.
    Pending,
    /// Receiving ticks.
    Active,
    /// Removed by explicit cancellation or target invalidation. Terminal.
    Cancelled,
    /// Removed on request expiration, after its final tick. Terminal.
    Expired,
}

/// Handle returned by a successful update request, naming the receiver
/// identity the session registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    id: ReceiverId,
}

impl SessionHandle {
    pub(crate) fn new(id: ReceiverId) -> Self {
        Self { id }
    }

    /// Receiver identity this session is keyed by, usable with
    /// removal and state queries.
    pub fn id(&self) -> ReceiverId {
        self.id
    }
}

/// One live binding of a [Request] to a [Receiver], owned exclusively by the
/// scheduler.
pub(crate) struct Session {
    pub(crate) request: Request,
    pub(crate) receiver: Receiver,
    pub(crate) state: SessionState,
    /// Next eligible fire instant. None fires on the very next tick,
    /// whatever its instant: the first delivery is immediate.
    pub(crate) next_fire: Option<Epoch>,
    /// Last fix actually delivered. Reference point for the minimum
    /// displacement filter; suppressed fixes do not move it.
    pub(crate) last_delivered: Option<Fix>,
    /// Fixes accumulated since the last delivery, oldest first.
    pub(crate) pending: Vec<Fix>,
}

impl Session {
    pub(crate) fn new(request: Request, receiver: Receiver) -> Self {
        Self {
            request,
            receiver,
            state: SessionState::Pending,
            next_fire: None,
            last_delivered: None,
            pending: Vec::new(),
        }
    }

    /// True when this session is eligible for the tick at `now`.
    pub(crate) fn due(&self, now: Epoch) -> bool {
        match self.next_fire {
            None => true,
            Some(t) => t <= now,
        }
    }

    /// Reschedules past the tick at `now`. Runs whether or not the tick
    /// delivered: suppression and source failures advance the cadence too.
    pub(crate) fn advance(&mut self, now: Epoch) {
        self.next_fire = Some(now + self.request.interval);
    }

    /// True once the request's expiration has been reached. Checked after
    /// tick evaluation: the session still gets its final tick at the
    /// expiration instant.
    pub(crate) fn expired(&self, now: Epoch) -> bool {
        match self.request.expires_at {
            None => false,
            Some(t) => t <= now,
        }
    }
}
