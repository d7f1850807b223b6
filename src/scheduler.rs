//! Update scheduler and dispatch engine.
use std::collections::HashMap;
use std::mem;

use itertools::Itertools;
use log::{debug, info, warn};

use hifitime::Epoch;

use crate::batch::FixBatch;
use crate::error::Error;
use crate::fix::Fix;
use crate::receiver::{NullTransport, Receiver, ReceiverId, Transport};
use crate::request::Request;
use crate::session::{Session, SessionHandle, SessionState};
use crate::source::{MockSource, Positioner, Source};

/// [Scheduler] owns the live sessions, drives the logical sampling clock,
/// builds [FixBatch]es and fans them out to receivers. It also serves the
/// best-known last location and mock-mode toggling.
///
/// The caller advances the clock with [Scheduler::tick]. Every mutation goes
/// through `&mut self`, so concurrent use is serialized by construction;
/// share behind `Arc<Mutex<_>>` to drive ticks from a dedicated thread.
/// Because of that single ownership, a removal can only run between ticks:
/// a tick already committed to a batch always completes its delivery.
pub struct Scheduler {
    /// Live sessions, keyed by receiver identity.
    sessions: HashMap<ReceiverId, Session>,
    /// Active fix source. Exactly one at any time.
    source: Source,
    /// Live positioner parked while mock mode is enabled.
    parked_live: Option<Box<dyn Positioner>>,
    /// Delivery collaborator for external targets.
    transport: Box<dyn Transport>,
    /// Most recent fix obtained from the active source, across all sessions.
    /// Cleared on every mock-mode swap.
    last_fix: Option<Fix>,
}

impl Scheduler {
    /// Builds a new [Scheduler] over the given positioning collaborator,
    /// with no delivery collaborator attached (external targets are dropped
    /// by [NullTransport]).
    pub fn new(positioner: Box<dyn Positioner>) -> Self {
        Self {
            sessions: HashMap::new(),
            source: Source::Live(positioner),
            parked_live: None,
            transport: Box::new(NullTransport {}),
            last_fix: None,
        }
    }

    /// Copies and returns [Scheduler] with a delivery collaborator for
    /// [Receiver::External] targets.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Creates an update stream: one [FixBatch] per interval to `receiver`,
    /// the first on the very next tick. At most one live session exists per
    /// receiver identity: requesting again replaces the previous session
    /// with a fresh one (terminal sessions are never revived).
    ///
    /// Fails with [Error::InvalidRequest] when the interval is negative;
    /// an invalid request is rejected here and never surfaces later.
    pub fn request_updates(
        &mut self,
        request: Request,
        receiver: Receiver,
    ) -> Result<SessionHandle, Error> {
        request.validate()?;

        let id = receiver.id();
        let interval = request.interval;

        if self
            .sessions
            .insert(id, Session::new(request, receiver))
            .is_some()
        {
            debug!("{} replacing previous session", id);
        }

        info!("{} session registered (interval={})", id, interval);
        Ok(SessionHandle::new(id))
    }

    /// Cancels the update stream for `id`. Idempotent: unknown identities
    /// are a no-op. Only future ticks are affected; a delivery already
    /// committed by an in-progress tick still completes.
    pub fn remove_updates(&mut self, id: ReceiverId) {
        if let Some(mut session) = self.sessions.remove(&id) {
            session.state = SessionState::Cancelled;
            info!("{} session cancelled", id);
        }
    }

    /// Most recent [Fix] obtained from the active source across any session,
    /// or None if none has been produced yet. Non-blocking cache read: never
    /// triggers sampling, never advances the clock.
    pub fn last_location(&self) -> Option<&Fix> {
        self.last_fix.as_ref()
    }

    /// Lifecycle state of the session registered under `id`, None once
    /// removed.
    pub fn session_state(&self, id: ReceiverId) -> Option<SessionState> {
        self.sessions.get(&id).map(|session| session.state)
    }

    /// Number of live sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// True while mock mode is enabled.
    pub fn is_mock_mode(&self) -> bool {
        matches!(self.source, Source::Mock(_))
    }

    /// Provider availability query, forwarded to the positioning
    /// collaborator. Always true in mock mode.
    pub fn is_provider_enabled(&self, provider: &str) -> bool {
        self.source.is_available(provider)
    }

    /// Swaps the active source. Enabling installs a fresh empty
    /// [MockSource] (replay cursor reset, even when re-entering mock mode)
    /// and parks the live positioner; disabling restores it. The last-known
    /// cache is cleared on every swap, so [Scheduler::last_location] only
    /// ever reflects the active source. Disabling while already live is a
    /// no-op. Toggling is atomic with respect to ticks: single ownership
    /// means no tick can observe a partial swap.
    pub fn set_mock_mode(&mut self, enabled: bool) {
        if enabled {
            let previous = mem::replace(&mut self.source, Source::Mock(MockSource::default()));
            if let Source::Live(positioner) = previous {
                self.parked_live = Some(positioner);
            }
            self.last_fix = None;
            info!("mock mode enabled");
        } else if let Some(positioner) = self.parked_live.take() {
            self.source = Source::Live(positioner);
            self.last_fix = None;
            info!("mock mode disabled");
        }
    }

    /// Installs a single fixed [Fix], returned by every subsequent tick
    /// until changed. Fails with [Error::IllegalMockState] unless mock mode
    /// is enabled.
    pub fn set_mock_location(&mut self, fix: Fix) -> Result<(), Error> {
        match &mut self.source {
            Source::Mock(mock) => {
                debug!("mock location set: {}", fix);
                mock.set_fixed(fix);
                Ok(())
            },
            Source::Live(_) => Err(Error::IllegalMockState),
        }
    }

    /// Installs an ordered replay trace: each tick advances it by one fix
    /// and it holds at the last fix once exhausted. Fails with
    /// [Error::IllegalMockState] unless mock mode is enabled.
    pub fn set_mock_trace(&mut self, fixes: Vec<Fix>) -> Result<(), Error> {
        match &mut self.source {
            Source::Mock(mock) => {
                debug!("mock trace installed ({} fixes)", fixes.len());
                mock.set_trace(fixes);
                Ok(())
            },
            Source::Live(_) => Err(Error::IllegalMockState),
        }
    }

    /// One evaluation of the logical clock at instant `now`.
    ///
    /// For every session whose fire time has come: pull one [Fix] from the
    /// active source, accumulate it, and either dispatch a batch of the
    /// fixes accumulated since the last delivery (oldest first) or suppress
    /// delivery when the displacement from the last delivered fix is under
    /// the request's threshold. Source failures are recoverable per-session
    /// failures: the cadence still advances and every other session runs
    /// untouched. Expired sessions are swept after their final tick.
    pub fn tick(&mut self, now: Epoch) {
        let due: Vec<ReceiverId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.due(now))
            .map(|(id, _)| *id)
            .sorted()
            .collect();

        let mut invalid_targets: Vec<ReceiverId> = Vec::new();

        for id in due {
            let fix = match self.source.sample(now) {
                Ok(fix) => fix,
                Err(e) => {
                    warn!("{} ({}) sampling failed: {}", now, id, e);
                    if let Some(session) = self.sessions.get_mut(&id) {
                        session.advance(now);
                    }
                    continue;
                },
            };

            self.last_fix = Some(fix.clone());

            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };

            session.state = SessionState::Active;

            let min_m = session.request.min_displacement_m;
            let suppressed = min_m > 0.0
                && session
                    .last_delivered
                    .as_ref()
                    .map_or(false, |prev| prev.distance_m(&fix) < min_m);

            session.pending.push(fix);
            session.advance(now);

            if suppressed {
                debug!("{} ({}) displacement under {} m, suppressed", now, id, min_m);
                continue;
            }

            let batch = FixBatch::new(mem::take(&mut session.pending));
            session.last_delivered = batch.latest().cloned();

            debug!("{} ({}) dispatching {} fix(es)", now, id, batch.len());

            match &session.receiver {
                Receiver::Callback { callback, .. } => {
                    (callback)(&batch);
                },
                Receiver::External { target } => {
                    if let Err(e) = self.transport.deliver(*target, &batch) {
                        warn!("{} ({}) delivery failed: {}", now, id, e);
                        invalid_targets.push(id);
                    }
                },
            }
        }

        for id in invalid_targets {
            if let Some(mut session) = self.sessions.remove(&id) {
                session.state = SessionState::Cancelled;
                info!("{} session removed: target invalid", id);
            }
        }

        self.sessions.retain(|id, session| {
            if session.expired(now) {
                session.state = SessionState::Expired;
                info!("{} session expired", id);
                false
            } else {
                true
            }
        });
    }
}
