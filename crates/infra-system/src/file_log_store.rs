// File-backed node log
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use fether_core::application::constants::LOG_FILE_NAME;
use fether_core::port::{LogSink, LogStore};

/// Node log at a fixed path, replaced at every launch
pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/parity.log`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort cleanup: a stale log from a crashed run never blocks a
    /// launch. Removal errors are logged, never returned.
    fn remove_previous(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(log = %self.path.display(), "Removed previous node log"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!(
                log = %self.path.display(),
                error = %e,
                "Could not remove previous node log, appending instead"
            ),
        }
    }
}

struct FileLogSink {
    file: File,
}

impl LogSink for FileLogSink {
    fn append(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl LogStore for FileLogStore {
    fn open_fresh(&self) -> io::Result<Box<dyn LogSink>> {
        self.remove_previous();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(Box::new(FileLogSink { file }))
    }

    fn read_all(&self) -> io::Result<String> {
        // Node output is not guaranteed to be UTF-8
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_replaces_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLogStore::in_dir(dir.path());
        fs::write(store.path(), "stale output from a crashed run\n").unwrap();

        let mut sink = store.open_fresh().unwrap();
        sink.append(b"fresh\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(store.read_all().unwrap(), "fresh\n");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLogStore::in_dir(dir.path().join("nested").join("logs"));

        let mut sink = store.open_fresh().unwrap();
        sink.append(b"line\n").unwrap();

        assert!(store.path().is_file());
        assert!(store.location().ends_with("parity.log"));
    }

    #[test]
    fn test_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLogStore::in_dir(dir.path());

        let mut sink = store.open_fresh().unwrap();
        for line in ["a\n", "b\n", "c\n"] {
            sink.append(line.as_bytes()).unwrap();
        }

        assert_eq!(store.read_all().unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_non_utf8_output_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLogStore::in_dir(dir.path());

        let mut sink = store.open_fresh().unwrap();
        sink.append(&[0x66, 0xff, 0x0a]).unwrap();

        assert_eq!(store.read_all().unwrap(), "f\u{fffd}\n");
    }

    #[test]
    fn test_read_without_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLogStore::in_dir(dir.path());

        assert!(store.read_all().is_err());
    }
}
