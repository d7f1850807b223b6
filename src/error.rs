use thiserror::Error;

use hifitime::Duration;

use crate::receiver::TargetHandle;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected [Request] at submission: update intervals cannot be negative.
    /// Surfaced synchronously by [Scheduler::request_updates], never later.
    #[error("invalid request: negative interval {0}")]
    InvalidRequest(Duration),

    /// Mock data setters are only legal while mock mode is enabled.
    #[error("mock mode is not enabled")]
    IllegalMockState,

    /// The mock source was sampled before any fixed location or trace was
    /// installed. Recoverable: the offending tick delivers nothing and the
    /// scheduler keeps running.
    #[error("no mock location or trace installed")]
    NoMockData,

    /// The live positioning collaborator failed to produce a fix.
    /// Recoverable per-tick failure: the session's next-fire time still
    /// advances and other sessions are unaffected.
    #[error("location source unavailable")]
    SourceUnavailable,

    /// The delivery collaborator reported this target as permanently invalid.
    /// The corresponding session is removed, the scheduler keeps running.
    #[error("delivery target {0} is invalid")]
    TargetInvalid(TargetHandle),

    /// Failed to parse a [Priority] hint.
    #[error("unknown priority \"{0}\"")]
    UnknownPriority(String),

    /// Batch payload (de)serialization issue within the envelope transport.
    #[error("batch codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
