//! Stream-based data source.
//!
//! Receives raw telemetry lines from an async byte stream. This is how TCP
//! connections (and anything else implementing `AsyncRead`, like a
//! serial-over-network bridge) feed the ingestion loop.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::TelemetrySource;

/// A data source that receives lines from an async stream.
///
/// Spawns a background task that reads newline-delimited text from the
/// provided reader into a bounded channel. `poll()` is a non-blocking
/// `try_recv`, so the reader task and the tick loop only meet at the
/// channel; arrival order is preserved.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use thermwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
    cached_error: Option<String>,
}

impl StreamSource {
    /// Spawn a background reader task over the given async reader.
    ///
    /// Lines are forwarded verbatim (minus the trailing newline); parsing
    /// and validation happen downstream in the record parser.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(256);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                // Split at the byte level and convert lossily: noise bytes on
                // the wire are per-line garbage for the parser, not a fault
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        *error_handle.lock().unwrap() = Some("Connection closed".to_string());
                        break;
                    }
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                        if tx.send(line).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        *error_handle.lock().unwrap() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
            cached_error: None,
        }
    }
}

impl TelemetrySource for StreamSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::error::TryRecvError::Empty) => {
                // Only a fault once the queue has fully drained
                self.cached_error = self.last_error.lock().unwrap().clone();
                None
            }
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.cached_error = Some(
                    self.last_error
                        .lock()
                        .unwrap()
                        .clone()
                        .unwrap_or_else(|| "Stream disconnected".to_string()),
                );
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.cached_error.as_deref()
    }

    fn close(&mut self) {
        // Dropping the receiver ends the reader task on its next send
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LINE: &str = "1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1";

    #[tokio::test]
    async fn test_stream_source_delivers_lines_in_order() {
        let data = format!("{}\nsecond line\n", LINE);
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(source.poll().as_deref(), Some(LINE));
        assert_eq!(source.poll().as_deref(), Some("second line"));
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://rig:9090");
        assert_eq!(source.description(), "stream: tcp://rig:9090");
    }

    #[tokio::test]
    async fn test_eof_reported_after_drain() {
        let data = format!("{}\n", LINE);
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Buffered line still comes out before the fault shows
        assert!(source.poll().is_some());
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Connection closed"));
    }

    #[tokio::test]
    async fn test_noise_bytes_dropped_not_fatal() {
        let mut data = b"\xFFnoise\n".to_vec();
        data.extend_from_slice(format!("{}\n", LINE).as_bytes());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // The noise line comes through (lossily decoded) for the parser to
        // reject; the valid row behind it still arrives
        let noise = source.poll().unwrap();
        assert!(noise.contains("noise"));
        assert_eq!(source.poll().as_deref(), Some(LINE));
        // EOF is the only fault left once everything drained
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Connection closed"));
    }

    #[tokio::test]
    async fn test_empty_stream_polls_none() {
        let mut source = StreamSource::spawn(Cursor::new(""), "test");
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(source.poll().is_none());
    }
}
