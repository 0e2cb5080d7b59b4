//! Time-windowed sample buffer.
//!
//! Holds the most recent window of samples in timestamp order and evicts
//! older ones as new samples arrive. All downstream windowing math assumes
//! monotonic time, so the buffer refuses timestamp regression outright
//! instead of re-sorting.

use std::collections::VecDeque;

use anyhow::{bail, Result};

use super::sample::Sample;

/// An append that would move time backwards.
///
/// The buffer state is unchanged when this is returned. Treated by callers
/// the same as a parse rejection: counted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfOrderSample {
    /// Timestamp of the newest sample already in the buffer.
    pub newest_ms: u64,
    /// Timestamp of the rejected sample.
    pub rejected_ms: u64,
}

/// Ordered, time-bounded store of recent [`Sample`]s.
///
/// Mutated only by [`append`](WindowedBuffer::append) and
/// [`trim`](WindowedBuffer::trim). After a trim, a non-empty buffer satisfies
/// `newest.timestamp_ms - oldest.timestamp_ms <= window_ms`. There is no
/// capacity bound beyond the window: a burst of samples sharing one
/// timestamp is legal and all of them are retained.
#[derive(Debug, Clone)]
pub struct WindowedBuffer {
    samples: VecDeque<Sample>,
    window_ms: u64,
}

impl WindowedBuffer {
    /// Create a buffer covering `window_ms` of recent history.
    ///
    /// A non-positive window is a configuration error, rejected before any
    /// data flows.
    pub fn new(window_ms: u64) -> Result<Self> {
        if window_ms == 0 {
            bail!("window duration must be positive");
        }
        Ok(Self {
            samples: VecDeque::new(),
            window_ms,
        })
    }

    /// Append a sample, rejecting timestamp regression.
    ///
    /// Equal timestamps are accepted. O(1) amortized.
    pub fn append(&mut self, sample: Sample) -> Result<(), OutOfOrderSample> {
        if let Some(newest) = self.samples.back() {
            if sample.timestamp_ms < newest.timestamp_ms {
                return Err(OutOfOrderSample {
                    newest_ms: newest.timestamp_ms,
                    rejected_ms: sample.timestamp_ms,
                });
            }
        }
        self.samples.push_back(sample);
        Ok(())
    }

    /// Evict samples older than the window relative to the newest sample.
    ///
    /// Idempotent; each eviction is O(1), so trimming once per drain batch
    /// is amortized O(1) per appended sample.
    pub fn trim(&mut self) {
        let Some(newest_ms) = self.newest().map(|s| s.timestamp_ms) else {
            return;
        };
        while let Some(front) = self.samples.front() {
            if newest_ms - front.timestamp_ms > self.window_ms {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Borrowing iterator over the buffered samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Owned copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    /// `(timestamp_ms, link_ok)` pairs for the span extractor.
    pub fn link_states(&self) -> impl Iterator<Item = (u64, bool)> + '_ {
        self.samples.iter().map(|s| (s.timestamp_ms, s.link_ok))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}
