//! Calibration tests against simulated clocks.
//!
//! A `StepClock` advances by a fixed cycle of signed steps after every
//! sample, so resolution, call cost and anomalies are fully scripted.

use std::cell::Cell;

use set_add_bench::measurement::{median_call_time, min_time_sample};
use set_add_bench::{
    Calibration, CalibrationConfig, CalibrationError, Clock, MonotonicClock, NoReclaim,
    Reclaimer, Timestamp,
};

struct StepClock {
    now: Cell<u64>,
    next: Cell<usize>,
    steps: Vec<i64>,
}

impl StepClock {
    fn new(steps: &[i64]) -> Self {
        Self {
            now: Cell::new(1_000_000_000),
            next: Cell::new(0),
            steps: steps.to_vec(),
        }
    }
}

impl Clock for StepClock {
    fn sample(&self) -> Timestamp {
        let now = self.now.get();
        let step = self.steps[self.next.get() % self.steps.len()];
        self.next.set(self.next.get() + 1);
        self.now.set(now.wrapping_add_signed(step));
        Timestamp::from_raw(now)
    }

    fn diff(&self, earlier: Timestamp, later: Timestamp) -> i64 {
        later.raw().wrapping_sub(earlier.raw()) as i64
    }

    fn name(&self) -> &'static str {
        "step"
    }
}

#[derive(Default)]
struct CountingReclaimer {
    collects: Cell<usize>,
    suspends: Cell<usize>,
    resumes: Cell<usize>,
}

impl Reclaimer for CountingReclaimer {
    fn collect(&self) {
        self.collects.set(self.collects.get() + 1);
    }

    fn suspend(&self) {
        self.suspends.set(self.suspends.get() + 1);
    }

    fn resume(&self) {
        self.resumes.set(self.resumes.get() + 1);
    }
}

/// Alternating 4ns/6ns intervals: resolution 4, median call 5, precision 5.
#[test]
fn alternating_intervals() {
    let clock = StepClock::new(&[4, 6]);
    let config = CalibrationConfig::default().iterations(1_000);

    let cal = Calibration::measure(&clock, &NoReclaim, &config).unwrap();

    assert_eq!(cal.min_time_sample_ns, 4.0);
    assert_eq!(cal.median_call_ns, 5.0);
    assert_eq!(cal.precision_ns, 5.0);
}

/// Any zero interval means calls are below one tick: average over the span.
#[test]
fn zero_intervals_fall_back_to_average() {
    let clock = StepClock::new(&[0, 10]);
    let avg = median_call_time(&clock, &NoReclaim, 100).unwrap();
    assert_eq!(avg, 5.0);
}

#[test]
fn negative_intervals_are_ignored() {
    let clock = StepClock::new(&[5, -2, 7]);
    assert_eq!(min_time_sample(&clock, 30).unwrap(), 5);

    let clock = StepClock::new(&[5, -2, 7]);
    assert_eq!(median_call_time(&clock, &NoReclaim, 6).unwrap(), 6.0);
}

#[test]
fn frozen_clock_has_no_resolution() {
    let clock = StepClock::new(&[0]);
    assert_eq!(
        min_time_sample(&clock, 50),
        Err(CalibrationError::NoObservableDelta { iterations: 50 })
    );

    let err = Calibration::measure(&clock, &NoReclaim, &CalibrationConfig::default().iterations(50))
        .unwrap_err();
    assert!(err.to_string().contains("never advanced"));
}

#[test]
fn zero_iterations_rejected() {
    let clock = StepClock::new(&[1]);
    assert_eq!(min_time_sample(&clock, 0), Err(CalibrationError::ZeroIterations));
    assert_eq!(
        median_call_time(&clock, &NoReclaim, 0),
        Err(CalibrationError::ZeroIterations)
    );
}

#[test]
fn call_time_sampling_is_quiet() {
    let clock = StepClock::new(&[3]);
    let reclaimer = CountingReclaimer::default();

    let median = median_call_time(&clock, &reclaimer, 10).unwrap();

    assert_eq!(median, 3.0);
    assert_eq!(reclaimer.collects.get(), 1);
    assert_eq!(reclaimer.suspends.get(), 1);
    assert_eq!(reclaimer.resumes.get(), 1);
}

/// The real clock must resolve something and cost well under a millisecond.
#[test]
fn monotonic_clock_calibrates() {
    let clock = MonotonicClock::new();
    let config = CalibrationConfig::default().iterations(100_000);

    let cal = Calibration::measure(&clock, &NoReclaim, &config).unwrap();

    assert!(cal.min_time_sample_ns > 0.0);
    assert!(cal.median_call_ns < 1_000_000.0, "median call {}ns", cal.median_call_ns);
    assert_eq!(cal.precision_ns, cal.min_time_sample_ns.max(cal.median_call_ns));
}
