use hifitime::Epoch;
use log::debug;

use crate::error::Error;
use crate::fix::Fix;

/// Positioning collaborator backing the live source. The platform sensor is
/// a black box to the scheduler: it either produces a [Fix] or fails with
/// [Error::SourceUnavailable], which is treated as a recoverable per-tick
/// failure.
pub trait Positioner {
    /// One position fix for the tick at instant `now`.
    fn sample(&mut self, now: Epoch) -> Result<Fix, Error>;

    /// Whether the named provider is currently usable.
    fn is_available(&self, provider: &str) -> bool;
}

#[derive(Debug, Clone)]
enum MockData {
    /// Single fixed [Fix], returned by every sample until changed.
    Fixed(Fix),
    /// Replay sequence. The cursor advances one per sample and holds at the
    /// last element once exhausted: no wrap, no error.
    Trace { fixes: Vec<Fix>, cursor: usize },
}

/// Deterministic [Fix] source: replays an injected trace or a single fixed
/// fix. The replay cursor is the only hidden mutable state outside the
/// session set; it resets on mock-mode re-entry or trace reinstallation.
#[derive(Debug, Default)]
pub struct MockSource {
    data: Option<MockData>,
}

impl MockSource {
    /// Installs a single fixed [Fix], replacing any previous mock data.
    pub fn set_fixed(&mut self, fix: Fix) {
        self.data = Some(MockData::Fixed(fix));
    }

    /// Installs a replay trace, cursor at the start. An empty trace is
    /// equivalent to nothing installed: the saturating replay has no last
    /// element to hold.
    pub fn set_trace(&mut self, fixes: Vec<Fix>) {
        if fixes.is_empty() {
            debug!("empty mock trace: clearing mock data");
            self.data = None;
        } else {
            self.data = Some(MockData::Trace { fixes, cursor: 0 });
        }
    }

    /// Next mock [Fix], per the fixed/trace rules. Fails with
    /// [Error::NoMockData] until data is installed.
    pub fn sample(&mut self) -> Result<Fix, Error> {
        match &mut self.data {
            None => Err(Error::NoMockData),
            Some(MockData::Fixed(fix)) => Ok(fix.clone()),
            Some(MockData::Trace { fixes, cursor }) => {
                let fix = fixes.get(*cursor).cloned().ok_or(Error::NoMockData)?;
                if *cursor + 1 < fixes.len() {
                    *cursor += 1;
                }
                Ok(fix)
            },
        }
    }
}

/// Active [Fix] source: exactly one variant is live per scheduler at any
/// time, swapped only by mock-mode toggling.
pub(crate) enum Source {
    Live(Box<dyn Positioner>),
    Mock(MockSource),
}

impl Source {
    pub(crate) fn sample(&mut self, now: Epoch) -> Result<Fix, Error> {
        match self {
            Self::Live(positioner) => positioner.sample(now),
            Self::Mock(mock) => mock.sample(),
        }
    }

    /// Provider availability. Every provider reads as available in mock
    /// mode, so mocked test runs never trip availability guards.
    pub(crate) fn is_available(&self, provider: &str) -> bool {
        match self {
            Self::Live(positioner) => positioner.is_available(provider),
            Self::Mock(_) => true,
        }
    }
}
