//! Channel-based data source.
//!
//! Receives raw lines over a single-producer/single-consumer handoff queue.
//! Useful when a producer thread (a serial reader, a simulator, a test)
//! lives in the same process as the tick loop.

use std::sync::mpsc;

use super::TelemetrySource;

/// A data source fed by an in-process channel.
///
/// The channel preserves send order, so samples arrive at the buffer in the
/// order the producer saw them.
///
/// # Example
///
/// ```
/// use thermwatch::{ChannelSource, TelemetrySource};
///
/// let (tx, mut source) = ChannelSource::create("simulator");
/// tx.send("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1".to_string()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Create a channel source around an existing receiver.
    pub fn new(receiver: mpsc::Receiver<String>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            disconnected: false,
        }
    }

    /// Create a `(sender, source)` pair.
    pub fn create(source_description: &str) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl TelemetrySource for ChannelSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        if self.disconnected {
            Some("Producer disconnected")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_preserves_order() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send("a".to_string()).unwrap();
        tx.send("b".to_string()).unwrap();
        tx.send("c".to_string()).unwrap();

        assert_eq!(source.poll().as_deref(), Some("a"));
        assert_eq!(source.poll().as_deref(), Some("b"));
        assert_eq!(source.poll().as_deref(), Some("c"));
        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_channel_source_empty_polls_none() {
        let (_tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_dropped_producer_is_a_fault() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send("last".to_string()).unwrap();
        drop(tx);

        // Queued lines still drain before the fault surfaces
        assert_eq!(source.poll().as_deref(), Some("last"));
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Producer disconnected"));
    }
}
