// Log capture for one launch cycle: log sink + last-line tail

use crate::application::constants::NODE_OUTPUT_TARGET;
use crate::port::{LogSink, LogStore, OutputStream};
use tracing::{info, warn};

/// Tees node output into the log sink and remembers the last line
///
/// If the log cannot be opened or a write fails, capture degrades to
/// console-only: output goes to `tracing` under target `fether::node`
/// and the tail keeps updating so exit classification still works.
pub struct LogCapture {
    sink: Option<Box<dyn LogSink>>,
    last_line: Option<String>,
    location: String,
}

impl LogCapture {
    /// Open a fresh log for a new launch cycle
    pub fn open(store: &dyn LogStore) -> Self {
        let location = store.location();
        let sink = match store.open_fresh() {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!(
                    log = %location,
                    error = %e,
                    "Cannot open node log, capturing to console only"
                );
                None
            }
        };

        Self {
            sink,
            last_line: None,
            location,
        }
    }

    /// Record one chunk from either stream
    pub fn record(&mut self, stream: OutputStream, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let text = String::from_utf8_lossy(chunk);
        if let Some(line) = text.lines().rev().find(|l| !l.trim().is_empty()) {
            self.last_line = Some(line.to_string());
        }

        let written = self.sink.as_mut().map(|sink| sink.append(chunk));
        match written {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                warn!(
                    log = %self.location,
                    error = %e,
                    "Node log write failed, capturing to console only"
                );
                self.sink = None;
                echo(stream, &text);
            }
            None => echo(stream, &text),
        }
    }

    /// Flush before the log is read back
    pub fn finish(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                warn!(log = %self.location, error = %e, "Failed to flush node log");
            }
        }
    }

    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    /// True once capture fell back to console-only
    pub fn is_degraded(&self) -> bool {
        self.sink.is_none()
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

fn echo(stream: OutputStream, text: &str) {
    info!(target: NODE_OUTPUT_TARGET, stream = ?stream, "{}", text.trim_end());
}
