//! Fixed-capacity sliding window of sample-to-sample deltas.

use std::collections::VecDeque;
use std::f64::consts::PI;

/// Number of deltas retained by a [`DeltaWindow`].
pub const WINDOW_CAPACITY: usize = 6;

/// FIFO of the most recent sample-to-sample deltas.
///
/// Converts a scalar sample stream into a mean rate of change over the
/// retained window. The first sample after construction or [`reset`] only
/// seeds the last-value slot; every later sample appends one delta, evicting
/// the oldest when the window is at capacity.
///
/// [`reset`]: DeltaWindow::reset
#[derive(Debug, Clone, Default)]
pub struct DeltaWindow {
    deltas: VecDeque<f64>,
    last: Option<f64>,
}

impl DeltaWindow {
    pub fn new() -> Self {
        Self {
            deltas: VecDeque::with_capacity(WINDOW_CAPACITY),
            last: None,
        }
    }

    /// Record a raw sample.
    pub fn push(&mut self, next: f64) {
        self.record(next, false);
    }

    /// Record a raw angle sample, wrapping each delta into `(-π, π]`.
    ///
    /// A small rotation crossing the ±π branch cut is recorded as the short
    /// way around, never as a near-2π jump.
    pub fn push_wrapped(&mut self, next: f64) {
        self.record(next, true);
    }

    fn record(&mut self, next: f64, wrap: bool) {
        if self.deltas.len() == WINDOW_CAPACITY {
            self.deltas.pop_front();
        }
        match self.last {
            Some(last) => {
                let mut delta = next - last;
                if wrap {
                    if delta < -PI {
                        delta += 2.0 * PI;
                    } else if delta > PI {
                        delta -= 2.0 * PI;
                    }
                }
                self.deltas.push_back(delta);
                self.last = Some(next);
            }
            None => self.last = Some(next),
        }
    }

    /// Whether the window holds its full complement of deltas.
    pub fn is_full(&self) -> bool {
        self.deltas.len() == WINDOW_CAPACITY
    }

    /// Sum of the retained deltas.
    pub fn sum(&self) -> f64 {
        self.deltas.iter().sum()
    }

    /// Mean rate of change against a window of time deltas.
    ///
    /// Returns `sum(deltas) / sum(time deltas)` only when both windows are
    /// simultaneously full; otherwise `0.0`. A partially filled window is
    /// unrepresentative, so warm-up reports "no motion" rather than a noisy
    /// estimate.
    pub fn mean_rate(&self, times: &DeltaWindow) -> f64 {
        if self.is_full() && times.is_full() {
            self.sum() / times.sum()
        } else {
            0.0
        }
    }

    /// Drop all deltas and the last raw value.
    pub fn reset(&mut self) {
        self.deltas.clear();
        self.last = None;
    }
}
