#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod batch;
mod envelope;
mod error;
mod fix;
mod receiver;
mod request;
mod scheduler;
mod session;
mod source;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::batch::FixBatch;
    pub use crate::envelope::{Envelope, FIX_BATCH_KEY};
    pub use crate::fix::Fix;
    pub use crate::receiver::{NullTransport, Receiver, ReceiverId, TargetHandle, Transport};
    pub use crate::request::{Priority, Request};
    pub use crate::scheduler::Scheduler;
    pub use crate::session::{SessionHandle, SessionState};
    pub use crate::source::{MockSource, Positioner};
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
