use std::sync::Arc;

use crate::batch::FixBatch;
use crate::error::Error;

/// Opaque handle naming an out-of-process delivery target. The delivery
/// collaborator owns its meaning (process intent, queue, socket..).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(pub u64);

impl std::fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Receiver identity. At most one live session exists per [ReceiverId]:
/// resubmitting for the same identity replaces the previous session.
/// In-process listeners and external targets live in separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReceiverId {
    /// In-process callback, keyed by caller-chosen listener id.
    Listener(u64),
    /// Out-of-process target, keyed by its [TargetHandle].
    Target(u64),
}

impl std::fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listener(id) => write!(f, "listener#{}", id),
            Self::Target(id) => write!(f, "target#{}", id),
        }
    }
}

/// Callback invoked with each delivered [FixBatch], on the scheduler's tick
/// context. Must not block for unbounded time: a long-running callback
/// delays subsequent ticks for every other session.
pub type BatchCallback = Arc<dyn Fn(&FixBatch) + Send + Sync>;

/// [Receiver] is a dispatch target for [FixBatch]es.
#[derive(Clone)]
pub enum Receiver {
    /// Synchronous in-process callback.
    Callback {
        id: ReceiverId,
        callback: BatchCallback,
    },
    /// Opaque out-of-process target, routed through the [Transport]
    /// collaborator.
    External { target: TargetHandle },
}

impl Receiver {
    /// Builds an in-process callback [Receiver]. `listener_id` is the
    /// caller-chosen identity used for replacement and removal.
    pub fn callback<F: Fn(&FixBatch) + Send + Sync + 'static>(listener_id: u64, f: F) -> Self {
        Self::Callback {
            id: ReceiverId::Listener(listener_id),
            callback: Arc::new(f),
        }
    }

    /// Builds an external-target [Receiver] for the given handle.
    pub fn external(target: TargetHandle) -> Self {
        Self::External { target }
    }

    /// Identity this receiver registers under.
    pub fn id(&self) -> ReceiverId {
        match self {
            Self::Callback { id, .. } => *id,
            Self::External { target } => ReceiverId::Target(target.0),
        }
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback { id, .. } => write!(f, "Receiver::Callback({})", id),
            Self::External { target } => write!(f, "Receiver::External({})", target),
        }
    }
}

/// External delivery collaborator for [Receiver::External] targets.
/// Owns the wire/storage representation; the scheduler only hands over the
/// ordered fix sequence. Reporting [Error::TargetInvalid] removes the
/// target's session, exactly as an explicit removal would.
pub trait Transport {
    fn deliver(&mut self, target: TargetHandle, batch: &FixBatch) -> Result<(), Error>;
}

/// [Transport] that drops every batch. Default collaborator when none is
/// attached.
pub struct NullTransport {}

impl Transport for NullTransport {
    fn deliver(&mut self, _: TargetHandle, _: &FixBatch) -> Result<(), Error> {
        Ok(())
    }
}
