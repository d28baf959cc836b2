//! Measurement infrastructure for set insertion benchmarks.
//!
//! This module provides:
//! - Clock sampling with platform-specific counters
//! - Clock self-calibration (resolution and sampling cost)
//! - Scoped suspension of background memory reclamation
//! - Timed add/clear loops over any [`InsertSet`]
//!
//! # Clock Selection
//!
//! [`MonotonicClock`] is the default and works everywhere. [`CycleClock`]
//! reads the CPU counter directly:
//! - **x86_64**: `rdtsc` instruction (~1ns resolution)
//! - **aarch64**: `cntvct_el0` virtual timer (resolution varies by SoC)
//!
//! ARM64 counter resolution depends on the SoC's counter frequency:
//! - ARMv8.6+ (Graviton4): ~1ns (1 GHz mandated by the architecture)
//! - Apple Silicon: ~42ns (24 MHz)
//! - Ampere Altra: ~40ns (25 MHz)
//!
//! Whatever the clock, calibrate it and size rounds so that each spans at
//! least twenty precision bounds.

mod calibration;
mod clock;
mod collector;
mod quiet;
mod set;

pub use calibration::{
    median_call_time, min_time_sample, precision, Calibration, CalibrationConfig,
};
pub use clock::{black_box, read_counter, ticks_per_ns, Clock, CycleClock, MonotonicClock, Timestamp};
pub use collector::{to_ns_per_add, ClearCost, Collector, ExperimentOptions};
pub use quiet::{quietly, NoReclaim, QuietScope, Reclaimer};
pub use set::{InsertSet, NativeSet};
