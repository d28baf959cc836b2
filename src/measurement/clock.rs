//! Clock sampling abstraction.
//!
//! A [`Clock`] hands out opaque [`Timestamp`]s and converts the difference
//! of two of them into nanoseconds. Two implementations ship with the crate:
//! - [`MonotonicClock`]: `std::time::Instant` relative to a per-clock anchor.
//! - [`CycleClock`]: the CPU counter (`lfence; rdtsc` on x86_64,
//!   `isb; mrs cntvct_el0` on aarch64) with a calibrated tick rate.
//!
//! Timestamps from different clocks, processes or boots are never
//! comparable. Differences may be zero (the work was faster than one tick)
//! or, on misbehaving counters, negative; consumers must tolerate both.

use std::hint::black_box as std_black_box;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Wrapper around `std::hint::black_box` so measured work is not optimized away.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

/// Opaque reading of a [`Clock`].
///
/// Only meaningful as an operand of [`Clock::diff`] on the clock that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wrap a raw counter value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Source of timestamps.
pub trait Clock {
    /// Take a timestamp.
    fn sample(&self) -> Timestamp;

    /// Nanoseconds from `earlier` to `later`.
    fn diff(&self, earlier: Timestamp, later: Timestamp) -> i64;

    /// Short name for reports.
    fn name(&self) -> &'static str;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn sample(&self) -> Timestamp {
        (**self).sample()
    }

    #[inline]
    fn diff(&self, earlier: Timestamp, later: Timestamp) -> i64 {
        (**self).diff(earlier, later)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Wall-clock-independent monotonic clock with nanosecond units.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn sample(&self) -> Timestamp {
        Timestamp(self.anchor.elapsed().as_nanos() as u64)
    }

    #[inline]
    fn diff(&self, earlier: Timestamp, later: Timestamp) -> i64 {
        later.0.wrapping_sub(earlier.0) as i64
    }

    fn name(&self) -> &'static str {
        "monotonic"
    }
}

/// Read the CPU counter with serialization against surrounding instructions.
///
/// Falls back to a process-wide `Instant` anchor on other architectures.
#[inline]
pub fn read_counter() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        read_counter_x86_64()
    }

    #[cfg(target_arch = "aarch64")]
    {
        read_counter_aarch64()
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        read_counter_fallback()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn read_counter_x86_64() -> u64 {
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);

    let ticks: u64;
    unsafe {
        std::arch::asm!(
            "lfence",
            "rdtsc",
            "shl rdx, 32",
            "or rax, rdx",
            out("rax") ticks,
            out("rdx") _,
            options(nostack, nomem),
        );
    }

    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    ticks
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn read_counter_aarch64() -> u64 {
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);

    let ticks: u64;
    unsafe {
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            out(reg) ticks,
            options(nostack, nomem),
        );
    }

    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    ticks
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
fn read_counter_fallback() -> u64 {
    use std::sync::OnceLock;
    static START: OnceLock<Instant> = OnceLock::new();

    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

/// Estimate counter ticks per nanosecond against `Instant`.
///
/// Takes the median ratio over `rounds` sleeps of one millisecond each.
pub fn ticks_per_ns(rounds: usize) -> f64 {
    let mut ratios = Vec::with_capacity(rounds);

    for _ in 0..rounds {
        let start_ticks = read_counter();
        let start_time = Instant::now();

        std::thread::sleep(std::time::Duration::from_millis(1));

        let end_ticks = read_counter();
        let elapsed_nanos = start_time.elapsed().as_nanos() as u64;
        if elapsed_nanos == 0 {
            continue;
        }

        let ticks = end_ticks.saturating_sub(start_ticks);
        ratios.push(ticks as f64 / elapsed_nanos as f64);
    }

    if ratios.is_empty() {
        tracing::warn!("counter rate calibration produced no samples, assuming 1 tick/ns");
        return 1.0;
    }

    crate::statistics::median(&ratios)
}

/// Clock backed by the CPU counter.
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    ticks_per_ns: f64,
}

impl CycleClock {
    /// Create a clock, calibrating the tick rate over 100 one-millisecond sleeps.
    pub fn new() -> Self {
        Self::with_ticks_per_ns(ticks_per_ns(100))
    }

    /// Create a clock with a known tick rate.
    pub fn with_ticks_per_ns(ticks_per_ns: f64) -> Self {
        assert!(
            ticks_per_ns > 0.0 && ticks_per_ns.is_finite(),
            "ticks per nanosecond must be positive and finite, got {}",
            ticks_per_ns
        );
        Self { ticks_per_ns }
    }

    /// Calibrated counter ticks per nanosecond.
    pub fn ticks_per_ns(&self) -> f64 {
        self.ticks_per_ns
    }
}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for CycleClock {
    #[inline]
    fn sample(&self) -> Timestamp {
        Timestamp(read_counter())
    }

    #[inline]
    fn diff(&self, earlier: Timestamp, later: Timestamp) -> i64 {
        let ticks = later.0.wrapping_sub(earlier.0) as i64;
        (ticks as f64 / self.ticks_per_ns).round() as i64
    }

    fn name(&self) -> &'static str {
        if cfg!(target_arch = "x86_64") {
            "rdtsc"
        } else if cfg!(target_arch = "aarch64") {
            "cntvct_el0"
        } else {
            "instant"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_monotonic() {
        let a = read_counter();
        let b = read_counter();
        assert!(b >= a || a.saturating_sub(b) < 1000);
    }

    #[test]
    fn test_monotonic_clock_measures_sleep() {
        let clock = MonotonicClock::new();
        let t1 = clock.sample();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let t2 = clock.sample();
        let diff = clock.diff(t1, t2);
        assert!(diff >= 20_000_000, "diff = {}", diff);
        assert!(diff < 2_000_000_000, "diff = {}", diff);
    }

    #[test]
    fn test_diff_is_signed() {
        let clock = MonotonicClock::new();
        let early = Timestamp::from_raw(1_000);
        let late = Timestamp::from_raw(1_250);
        assert_eq!(clock.diff(early, late), 250);
        assert_eq!(clock.diff(late, early), -250);
    }

    #[test]
    fn test_cycle_clock_converts_ticks() {
        let clock = CycleClock::with_ticks_per_ns(3.0);
        let a = Timestamp::from_raw(0);
        let b = Timestamp::from_raw(3_000);
        assert_eq!(clock.diff(a, b), 1_000);
    }

    #[test]
    fn test_ticks_per_ns_reasonable() {
        let tpn = ticks_per_ns(10);
        // ARM virtual timers run at ~24 MHz, x86 TSCs at 1-5 GHz.
        assert!(tpn > 0.01 && tpn < 10.0, "ticks_per_ns = {}", tpn);
    }

    #[test]
    #[should_panic(expected = "ticks per nanosecond must be positive")]
    fn test_cycle_clock_rejects_zero_rate() {
        CycleClock::with_ticks_per_ns(0.0);
    }
}
