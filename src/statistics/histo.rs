//! Fixed-range streaming histogram.
//!
//! The range `[from, to]` is split into `steps` intervals; each of the
//! `steps + 1` slots is centered on an anchor point `from + i * step`.
//! Values round to the nearest anchor, and anything beyond either end of
//! the range is clamped into the first or last slot:
//!
//! ```text
//! slot   0         1         2         3         4         5
//! <------|----v----|----v----|----v----|----v----|----v----|------>
//! value  0    1    2    3    4    5    6    7    8    9    10
//! ```
//!
//! Values are added one at a time, so no samples are retained.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BAR_WIDTH;
use crate::output::terminal;

use super::DistributionSummary;

/// Histogram over a fixed value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo {
    from: f64,
    to: f64,
    min: f64,
    max: f64,
    sum: f64,
    step: f64,
    count: u64,
    slots: Vec<u64>,

    /// Bar width in characters for the fullest slot.
    pub width: usize,

    /// Unit suffix printed after every value.
    pub unit: String,
}

impl Histo {
    /// Empty histogram over `[from, to]` with `steps` intervals.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero or `to` is not above `from`.
    pub fn new(from: f64, to: f64, steps: usize) -> Self {
        assert!(steps > 0, "histogram needs at least one step");
        assert!(to > from, "histogram range [{}, {}] is empty", from, to);
        Self {
            from,
            to,
            min: f64::MAX,
            max: -f64::MAX,
            sum: 0.0,
            step: (to - from) / steps as f64,
            count: 0,
            slots: vec![0; steps + 1],
            width: DEFAULT_BAR_WIDTH,
            unit: String::new(),
        }
    }

    /// Set the unit suffix.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the bar width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Record one value.
    pub fn add(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += value;
        self.count += 1;

        let slot = ((value - self.from) / self.step).round();
        let last = self.slots.len() - 1;
        let idx = if slot <= 0.0 {
            0
        } else if slot >= last as f64 {
            last
        } else {
            slot as usize
        };
        self.slots[idx] += 1;
    }

    /// Lower end of the range.
    pub fn from(&self) -> f64 {
        self.from
    }

    /// Upper end of the range.
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Distance between two anchors.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of recorded values.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Whether no value has been recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Smallest recorded value.
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest recorded value.
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Mean of all recorded values.
    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Anchor of the first slot at which the cumulative count reaches
    /// `round(p * n)`, see [`Histo::anchor_point`].
    ///
    /// `p <= 0` yields `from` and `p >= 1` yields `to`.
    pub fn percentile(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return self.from;
        }
        if p >= 1.0 {
            return self.to;
        }

        let limit = (p * self.count as f64).round() as u64;
        let mut idx = 0;
        let mut cumulative = self.slots[0];
        while cumulative < limit && idx + 1 < self.slots.len() {
            idx += 1;
            cumulative += self.slots[idx];
        }
        self.anchor_point(idx as isize)
    }

    /// 25th percentile.
    pub fn p25(&self) -> f64 {
        self.percentile(0.25)
    }

    /// Median.
    pub fn p50(&self) -> f64 {
        self.percentile(0.50)
    }

    /// 75th percentile.
    pub fn p75(&self) -> f64 {
        self.percentile(0.75)
    }

    /// 90th percentile.
    pub fn p90(&self) -> f64 {
        self.percentile(0.90)
    }

    /// Number of slots (`steps + 1`).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Per-slot counts.
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Count in slot `idx`, clamped to the valid slot range.
    pub fn count_at(&self, idx: isize) -> u64 {
        self.slots[self.clamp_index(idx)]
    }

    /// Anchor value of slot `idx`; `from` and `to` at or beyond either end.
    pub fn anchor_point(&self, idx: isize) -> f64 {
        if idx <= 0 {
            return self.from;
        }
        if idx as usize >= self.slots.len() - 1 {
            return self.to;
        }
        self.from + idx as f64 * self.step
    }

    /// Value interval collected by slot `idx` (clamped), e.g. `≥1.000,<3.000`.
    pub fn range_string(&self, idx: isize) -> String {
        let idx = self.clamp_index(idx);
        let half = self.step / 2.0;
        if idx == 0 {
            return format!("<{:.3}", self.from + half);
        }
        if idx == self.slots.len() - 1 {
            return format!("≥{:.3}", self.to - half);
        }
        let anchor = self.from + idx as f64 * self.step;
        format!("≥{:.3},<{:.3}", anchor - half, anchor + half)
    }

    /// One-line statistics summary.
    pub fn stats_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = terminal::write_histo_stats(&mut out, self);
        out
    }

    fn clamp_index(&self, idx: isize) -> usize {
        if idx < 0 {
            0
        } else {
            (idx as usize).min(self.slots.len() - 1)
        }
    }
}

impl fmt::Display for Histo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        terminal::write_histo(f, self)
    }
}

impl DistributionSummary for Histo {
    fn count(&self) -> u64 {
        self.count
    }

    fn minimum(&self) -> Option<f64> {
        self.min()
    }

    fn maximum(&self) -> Option<f64> {
        self.max()
    }

    fn mean(&self) -> Option<f64> {
        self.avg()
    }

    fn median(&self) -> Option<f64> {
        (self.count > 0).then(|| self.p50())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}
