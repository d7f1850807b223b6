use hifitime::{Duration, Epoch};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// [Priority] hints at the accuracy/power tradeoff the caller is after.
/// Carried on the request for the positioning collaborator's benefit;
/// provider selection heuristics are outside this crate.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// Most accurate fixes available, regardless of power cost.
    HighAccuracy,
    /// Block-level accuracy at reduced power. Default.
    #[default]
    BalancedPower,
    /// City-level accuracy, minimal power.
    LowPower,
    /// No active sampling: ride along on fixes produced for other callers.
    NoPower,
}

impl std::str::FromStr for Priority {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.trim() {
            "high-accuracy" => Ok(Self::HighAccuracy),
            "balanced-power" => Ok(Self::BalancedPower),
            "low-power" => Ok(Self::LowPower),
            "no-power" => Ok(Self::NoPower),
            _ => Err(Error::UnknownPriority(s)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighAccuracy => write!(f, "high-accuracy"),
            Self::BalancedPower => write!(f, "balanced-power"),
            Self::LowPower => write!(f, "low-power"),
            Self::NoPower => write!(f, "no-power"),
        }
    }
}

/// [Request] configures one update stream: sampling cadence, displacement
/// filter, accuracy hint and optional expiration. Immutable once submitted;
/// resubmitting for the same receiver replaces the previous stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Interval between deliveries. The first delivery is immediate,
    /// subsequent ones at this cadence.
    pub interval: Duration,
    /// Minimum displacement (m) from the last delivered fix for a new fix
    /// to be delivered. 0 disables the filter.
    pub min_displacement_m: f64,
    /// Accuracy/power hint.
    pub priority: Priority,
    /// Instant past which the session is torn down (after its final tick).
    pub expires_at: Option<Epoch>,
}

impl Request {
    /// Builds a new [Request] with the given update interval,
    /// no displacement filter, default [Priority] and no expiration.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            min_displacement_m: 0.0,
            priority: Priority::default(),
            expires_at: None,
        }
    }

    /// Copies and returns [Request] with a minimum displacement filter,
    /// in meters.
    pub fn with_min_displacement_m(mut self, min_m: f64) -> Self {
        self.min_displacement_m = min_m;
        self
    }

    /// Copies and returns [Request] with an accuracy/power [Priority] hint.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Copies and returns [Request] expiring at instant `t`.
    pub fn with_expiration(mut self, t: Epoch) -> Self {
        self.expires_at = Some(t);
        self
    }

    /// Fail-fast submission check: negative intervals are rejected here
    /// and never surface later.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.interval < Duration::ZERO {
            return Err(Error::InvalidRequest(self.interval));
        }
        Ok(())
    }
}
