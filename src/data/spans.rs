//! Link-loss span extraction.
//!
//! Compresses the per-sample `link_ok` flag into the minimal set of
//! contiguous "link lost" intervals. The same function serves the live tick
//! path and the replay path; over the same samples it must produce the same
//! spans either way.

use serde::Serialize;

/// A maximal closed interval `[start_ms, end_ms]` over which every sample
/// had `link_ok = false`.
///
/// Spans never overlap and are emitted in ascending time order. A single
/// unhealthy sample yields a span with `start_ms == end_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkSpan {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl LinkSpan {
    /// Span length in milliseconds. Zero for a single-sample span.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Extract link-loss spans from an ordered `(timestamp_ms, link_ok)` stream.
///
/// Single O(n) scan: a run opens on the first `false` sample and closes on
/// the next `true` sample (ending at the previous timestamp) or at the end
/// of input (ending at the final timestamp).
pub fn link_loss_spans<I>(samples: I) -> Vec<LinkSpan>
where
    I: IntoIterator<Item = (u64, bool)>,
{
    let mut spans = Vec::new();
    let mut run_start: Option<u64> = None;
    let mut prev_ms: Option<u64> = None;

    for (ts, link_ok) in samples {
        if link_ok {
            if let (Some(start), Some(prev)) = (run_start.take(), prev_ms) {
                spans.push(LinkSpan {
                    start_ms: start,
                    end_ms: prev,
                });
            }
        } else if run_start.is_none() {
            run_start = Some(ts);
        }
        prev_ms = Some(ts);
    }

    if let (Some(start), Some(last)) = (run_start, prev_ms) {
        spans.push(LinkSpan {
            start_ms: start,
            end_ms: last,
        });
    }

    spans
}
