//! Scoped suspension of background memory reclamation.
//!
//! Latency-sensitive loops (clock calibration, per-round timing) must not
//! be interrupted by a collector pause. A [`Reclaimer`] describes how the
//! host runtime reclaims memory; [`QuietScope`] runs a full collection,
//! suspends reclamation, and resumes it when dropped, on every exit path
//! including unwinding panics.
//!
//! Plain Rust has no tracing collector, so [`NoReclaim`] is the default.
//! Embedders that host a collected runtime (or an arena that compacts on
//! its own schedule) provide their own implementation.

/// Control over a background memory reclaimer.
pub trait Reclaimer {
    /// Run a full reclamation cycle now.
    fn collect(&self);

    /// Stop automatic reclamation.
    fn suspend(&self);

    /// Restart automatic reclamation.
    fn resume(&self);
}

/// Reclaimer for code without a background collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReclaim;

impl Reclaimer for NoReclaim {
    #[inline]
    fn collect(&self) {}

    #[inline]
    fn suspend(&self) {}

    #[inline]
    fn resume(&self) {}
}

impl<R: Reclaimer + ?Sized> Reclaimer for &R {
    fn collect(&self) {
        (**self).collect()
    }

    fn suspend(&self) {
        (**self).suspend()
    }

    fn resume(&self) {
        (**self).resume()
    }
}

/// Guard that keeps reclamation suspended while alive.
#[must_use = "reclamation resumes as soon as the scope is dropped"]
pub struct QuietScope<'a, R: Reclaimer + ?Sized> {
    reclaimer: &'a R,
}

impl<'a, R: Reclaimer + ?Sized> QuietScope<'a, R> {
    /// Collect, then suspend reclamation until the guard is dropped.
    pub fn enter(reclaimer: &'a R) -> Self {
        reclaimer.collect();
        reclaimer.suspend();
        Self { reclaimer }
    }
}

impl<R: Reclaimer + ?Sized> Drop for QuietScope<'_, R> {
    fn drop(&mut self) {
        self.reclaimer.resume();
    }
}

/// Run `f` with reclamation suspended.
pub fn quietly<R, F, T>(reclaimer: &R, f: F) -> T
where
    R: Reclaimer + ?Sized,
    F: FnOnce() -> T,
{
    let _scope = QuietScope::enter(reclaimer);
    f()
}
