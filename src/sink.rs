//! Write-through mirror log.
//!
//! The live tool can save everything it streams to a CSV file on disk, the
//! same capture format the replay mode reads back. The sink is a pure
//! side-effect: failures are logged by the caller and never abort ingestion.

use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::HEADER;

/// Trait for mirroring raw lines to a side channel.
pub trait RecordSink: Send + Debug {
    /// Append one raw line. Errors are reported to the caller but must not
    /// stop the stream.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush and release the sink. Called once on shutdown.
    fn close(&mut self);
}

/// A sink that appends raw lines to a CSV file, header first.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create the file (truncating any previous capture) and write the
    /// header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let file = File::create(&path)
            .with_context(|| format!("creating capture file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", HEADER)?;
        Ok(Self { path, writer })
    }

    /// Returns the capture file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)
    }

    fn close(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), "capture flush failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_writes_header_then_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.csv");

        let mut sink = FileSink::create(&path).unwrap();
        sink.write_line("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1").unwrap();
        sink.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1")
        );
    }

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/capture.csv");
        let sink = FileSink::create(&path).unwrap();
        assert_eq!(sink.path(), path);
        assert!(path.exists());
    }
}
