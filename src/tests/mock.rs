use hifitime::{Epoch, Unit};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::fix::Fix;
use crate::request::Request;
use crate::scheduler::Scheduler;
use crate::tests::{init_logger, recording_receiver, t_ref, FakePositioner};

fn mock_scheduler() -> Scheduler {
    let mut scheduler = Scheduler::new(Box::new(FakePositioner::new(45.0, 7.0)));
    scheduler.set_mock_mode(true);
    scheduler
}

#[test]
fn mock_setters_require_mock_mode() {
    let mut scheduler = Scheduler::new(Box::new(FakePositioner::new(45.0, 7.0)));
    assert!(!scheduler.is_mock_mode());

    let fix = Fix::new(1.0, 1.0, t_ref());
    assert!(scheduler.set_mock_location(fix.clone()).is_err());
    assert!(scheduler.set_mock_trace(vec![fix.clone()]).is_err());

    scheduler.set_mock_mode(true);
    assert!(scheduler.is_mock_mode());
    assert!(scheduler.set_mock_location(fix).is_ok());
}

#[test]
fn trace_replay_saturates() {
    init_logger();

    let t0 = t_ref();
    let fix_a = Fix::new(1.0, 1.0, t0);
    let fix_b = Fix::new(2.0, 2.0, t0 + Unit::Second * 1.0);

    let mut scheduler = mock_scheduler();
    scheduler.set_mock_trace(vec![fix_a.clone(), fix_b.clone()]).unwrap();

    let (receiver, delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

    for k in 0..3 {
        scheduler.tick(t0 + Unit::Second * (k as f64));
    }

    let batches = delivered.lock().unwrap();
    let timestamps: Vec<Epoch> = batches
        .iter()
        .map(|batch| batch.latest().unwrap().timestamp)
        .collect();

    // A, B, then B again: the trace holds at its last fix
    assert_eq!(
        timestamps,
        vec![fix_a.timestamp, fix_b.timestamp, fix_b.timestamp],
    );
}

#[test]
fn fixed_mock_location_repeats() {
    init_logger();

    let t0 = t_ref();
    let fix = Fix::new(48.85, 2.35, t0 + Unit::Second * 500.0);

    let mut scheduler = mock_scheduler();
    scheduler.set_mock_location(fix.clone()).unwrap();

    let (receiver, delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

    for k in 0..3 {
        scheduler.tick(t0 + Unit::Second * (k as f64));
    }

    let batches = delivered.lock().unwrap();
    assert_eq!(batches.len(), 3);
    for batch in batches.iter() {
        assert_eq!(batch.latest().unwrap().timestamp, fix.timestamp);
    }

    assert_eq!(scheduler.last_location().unwrap().timestamp, fix.timestamp);
}

#[test]
fn sampling_without_mock_data_is_recoverable() {
    init_logger();

    let mut scheduler = mock_scheduler();
    let (receiver, delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

    let t0 = t_ref();
    scheduler.tick(t0);
    assert!(delivered.lock().unwrap().is_empty(), "no mock data installed yet");
    assert_eq!(scheduler.active_sessions(), 1, "session survives the failed tick");

    scheduler.set_mock_location(Fix::new(1.0, 1.0, t0)).unwrap();
    scheduler.tick(t0 + Unit::Second * 1.0);
    assert_eq!(delivered.lock().unwrap().len(), 1);
}

#[test]
fn toggling_clears_last_known_cache() {
    init_logger();

    let mut scheduler = Scheduler::new(Box::new(FakePositioner::new(45.0, 7.0)));
    let (receiver, _delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

    let t0 = t_ref();
    scheduler.tick(t0);
    assert!(scheduler.last_location().is_some(), "live fix cached");

    scheduler.set_mock_mode(true);
    assert!(
        scheduler.last_location().is_none(),
        "live-derived cache cleared on entering mock mode"
    );

    scheduler.set_mock_location(Fix::new(1.0, 1.0, t0 + Unit::Second * 1.0)).unwrap();
    scheduler.tick(t0 + Unit::Second * 1.0);
    assert!(scheduler.last_location().is_some(), "mock fix cached");

    scheduler.set_mock_mode(false);
    assert!(
        scheduler.last_location().is_none(),
        "mock-derived cache cleared on leaving mock mode"
    );
    assert!(!scheduler.is_mock_mode());
}

#[test]
fn mock_reentry_resets_replay_state() {
    init_logger();

    let t0 = t_ref();
    let mut scheduler = mock_scheduler();
    scheduler
        .set_mock_trace(vec![
            Fix::new(1.0, 1.0, t0),
            Fix::new(2.0, 2.0, t0 + Unit::Second * 1.0),
        ])
        .unwrap();

    let (receiver, delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();
    scheduler.tick(t0);
    assert_eq!(delivered.lock().unwrap().len(), 1);

    // re-entering mock mode drops the installed trace entirely
    scheduler.set_mock_mode(true);
    scheduler.tick(t0 + Unit::Second * 1.0);
    assert_eq!(
        delivered.lock().unwrap().len(),
        1,
        "fresh mock source has no data until reinstalled"
    );

    scheduler
        .set_mock_trace(vec![Fix::new(3.0, 3.0, t0 + Unit::Second * 2.0)])
        .unwrap();
    scheduler.tick(t0 + Unit::Second * 2.0);
    assert_eq!(delivered.lock().unwrap().len(), 2);
}

#[test]
fn disabling_mock_restores_live_source() {
    init_logger();

    let t0 = t_ref();
    let mut scheduler = Scheduler::new(Box::new(FakePositioner::new(45.0, 7.0)));
    let (receiver, delivered) = recording_receiver(1);
    scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

    scheduler.set_mock_mode(true);
    scheduler.set_mock_location(Fix::new(1.0, 1.0, t0)).unwrap();
    scheduler.tick(t0);

    scheduler.set_mock_mode(false);
    scheduler.tick(t0 + Unit::Second * 1.0);

    let batches = delivered.lock().unwrap();
    assert_eq!(batches.len(), 2);

    let live = batches[1].latest().unwrap();
    assert_eq!(live.provider.as_deref(), Some("fake-gps"), "live source restored");
    assert_eq!(live.timestamp, t0 + Unit::Second * 1.0);
}

#[test]
fn random_trace_length_always_saturates() {
    init_logger();

    let t0 = t_ref();
    let mut rng = SmallRng::seed_from_u64(0x10c);

    for _ in 0..10 {
        let len = rng.random_range(1..=8_usize);
        let trace: Vec<Fix> = (0..len)
            .map(|k| Fix::new(k as f64, k as f64, t0 + Unit::Second * (k as f64)))
            .collect();
        let last = trace[len - 1].timestamp;

        let mut scheduler = mock_scheduler();
        scheduler.set_mock_trace(trace).unwrap();

        let (receiver, delivered) = recording_receiver(1);
        scheduler.request_updates(Request::new(Unit::Second * 1.0), receiver).unwrap();

        let ticks = len + 3;
        for k in 0..ticks {
            scheduler.tick(t0 + Unit::Second * (k as f64));
        }

        let batches = delivered.lock().unwrap();
        assert_eq!(batches.len(), ticks, "one delivery per tick");
        for batch in batches.iter().skip(len - 1) {
            assert_eq!(batch.latest().unwrap().timestamp, last, "held at last fix");
        }
    }
}
