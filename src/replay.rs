//! One-shot replay over archived captures.
//!
//! Runs the same parser, buffer, and span extractor the live loop uses, but
//! over a finite record set, producing one final view instead of a
//! continuously updated one.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{link_loss_spans, parse_record, LinkSpan, Sample, WindowedBuffer};

/// The final view produced by a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    /// All retained samples, oldest first.
    pub snapshot: Vec<Sample>,
    /// Link-loss spans over the snapshot.
    pub spans: Vec<LinkSpan>,
    /// Lines accepted into the buffer.
    pub accepted: usize,
    /// Lines dropped (parse rejections and out-of-order samples).
    pub rejected: usize,
}

/// Replay a finite set of raw lines through the buffer/span core.
///
/// `window_ms: None` sizes the window to cover the entire set; pass a value
/// to see what a live session with that window would have retained.
pub fn replay_lines<I, S>(lines: I, window_ms: Option<u64>) -> Result<ReplaySummary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = WindowedBuffer::new(window_ms.unwrap_or(u64::MAX))?;
    let mut accepted = 0;
    let mut rejected = 0;

    for line in lines {
        match parse_record(line.as_ref()) {
            Ok(sample) => match buffer.append(sample) {
                Ok(()) => accepted += 1,
                Err(_) => rejected += 1,
            },
            Err(_) => rejected += 1,
        }
    }

    buffer.trim();
    let spans = link_loss_spans(buffer.link_states());

    Ok(ReplaySummary {
        snapshot: buffer.snapshot(),
        spans,
        accepted,
        rejected,
    })
}

/// Replay a capture file from disk.
pub fn replay_file<P: AsRef<Path>>(path: P, window_ms: Option<u64>) -> Result<ReplaySummary> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading capture {}", path.display()))?;
    replay_lines(content.lines(), window_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ts: u64, link_ok: u8) -> String {
        format!("{},105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,{}", ts, link_ok)
    }

    #[test]
    fn test_replay_full_capture() {
        let lines = vec![
            crate::data::HEADER.to_string(),
            line(0, 1),
            line(100, 0),
            line(200, 0),
            line(300, 1),
        ];
        let summary = replay_lines(lines.iter(), None).unwrap();
        assert_eq!(summary.accepted, 4);
        assert_eq!(summary.rejected, 1); // the header
        assert_eq!(summary.snapshot.len(), 4);
        assert_eq!(summary.spans.len(), 1);
        assert_eq!(summary.spans[0].start_ms, 100);
        assert_eq!(summary.spans[0].end_ms, 200);
    }

    #[test]
    fn test_replay_with_window_trims_once() {
        let lines: Vec<String> = (0..10).map(|i| line(i * 1000, 1)).collect();
        let summary = replay_lines(lines.iter(), Some(3000)).unwrap();
        let first = summary.snapshot.first().unwrap().timestamp_ms;
        let last = summary.snapshot.last().unwrap().timestamp_ms;
        assert_eq!(last, 9000);
        assert!(last - first <= 3000);
    }

    #[test]
    fn test_replay_empty_input() {
        let summary = replay_lines(std::iter::empty::<&str>(), None).unwrap();
        assert!(summary.snapshot.is_empty());
        assert!(summary.spans.is_empty());
        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.rejected, 0);
    }

    #[test]
    fn test_replay_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.csv");
        let mut contents = String::from(crate::data::HEADER);
        contents.push('\n');
        for l in [line(0, 1), line(100, 0), line(200, 1)] {
            contents.push_str(&l);
            contents.push('\n');
        }
        std::fs::write(&path, contents).unwrap();

        let summary = replay_file(&path, None).unwrap();
        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.spans, vec![crate::data::LinkSpan { start_ms: 100, end_ms: 100 }]);
    }

    #[test]
    fn test_replay_missing_file_errors() {
        assert!(replay_file("/nonexistent/capture.csv", None).is_err());
    }
}
