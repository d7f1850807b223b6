mod mock;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use log::LevelFilter;

use hifitime::Epoch;

use crate::batch::FixBatch;
use crate::error::Error;
use crate::fix::Fix;
use crate::receiver::{Receiver, TargetHandle, Transport};
use crate::source::Positioner;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference test instant.
pub fn t_ref() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)
}

/// Deterministic positioning collaborator: walks north by a fixed step on
/// every sample, stamping fixes with the tick instant. Failure is driven
/// through a shared flag so tests can flip it after the scheduler takes
/// ownership.
pub struct FakePositioner {
    lat_deg: f64,
    lon_deg: f64,
    step_deg: f64,
    failing: Arc<AtomicBool>,
}

impl FakePositioner {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            step_deg: 0.0,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Northward step per sample, in decimal degrees.
    pub fn with_step_deg(mut self, step_deg: f64) -> Self {
        self.step_deg = step_deg;
        self
    }

    /// Shared flag: set to make every subsequent sample fail with
    /// [Error::SourceUnavailable].
    pub fn fail_flag(&self) -> Arc<AtomicBool> {
        self.failing.clone()
    }
}

impl Positioner for FakePositioner {
    fn sample(&mut self, now: Epoch) -> Result<Fix, Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::SourceUnavailable);
        }
        let fix = Fix::new(self.lat_deg, self.lon_deg, now).with_provider("fake-gps");
        self.lat_deg += self.step_deg;
        Ok(fix)
    }

    fn is_available(&self, provider: &str) -> bool {
        provider == "fake-gps"
    }
}

/// In-process receiver recording every delivered batch.
pub fn recording_receiver(listener_id: u64) -> (Receiver, Arc<Mutex<Vec<FixBatch>>>) {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    let receiver = Receiver::callback(listener_id, move |batch: &FixBatch| {
        sink.lock().unwrap().push(batch.clone());
    });
    (receiver, delivered)
}

/// Delivery collaborator recording every batch, reporting the targets it
/// was told to reject as permanently invalid.
pub struct RecordingTransport {
    pub delivered: Arc<Mutex<Vec<(TargetHandle, FixBatch)>>>,
    pub invalid: Vec<TargetHandle>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            invalid: Vec::new(),
        }
    }

    pub fn rejecting(target: TargetHandle) -> Self {
        let mut transport = Self::new();
        transport.invalid.push(target);
        transport
    }
}

impl Transport for RecordingTransport {
    fn deliver(&mut self, target: TargetHandle, batch: &FixBatch) -> Result<(), Error> {
        if self.invalid.contains(&target) {
            return Err(Error::TargetInvalid(target));
        }
        self.delivered.lock().unwrap().push((target, batch.clone()));
        Ok(())
    }
}
