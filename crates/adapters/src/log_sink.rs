//! Sink adapters: writers, files, level filtering, and fan-out.

use condlog_ports::{ByteSink, Level, LevelSink};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Permissions of newly created log files.
pub const LOG_FILE_MODE: u32 = 0o600;

/// Byte sink over any writer. Each entry is written and flushed under one
/// lock so concurrent entries never interleave.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<io::Stdout> {
    /// Sink writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<io::Stderr> {
    /// Sink writing to stderr.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> ByteSink for WriterSink<W> {
    fn write_entry(&self, entry: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(entry)?;
        writer.flush()
    }
}

/// Append-only log file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    inner: WriterSink<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it with mode `0o600` on Unix.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(LOG_FILE_MODE);
        }
        let file = options.open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: WriterSink::new(file),
        })
    }

    /// Path the sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSink for FileSink {
    fn write_entry(&self, entry: &[u8]) -> io::Result<()> {
        self.inner.write_entry(entry)
    }
}

/// Level-aware view of a plain sink; the level is ignored.
#[derive(Clone)]
pub struct PlainLevelSink {
    sink: Arc<dyn ByteSink>,
}

impl PlainLevelSink {
    /// Wrap `sink`.
    pub fn new(sink: Arc<dyn ByteSink>) -> Self {
        Self { sink }
    }
}

impl LevelSink for PlainLevelSink {
    fn write_level(&self, _level: Level, entry: &[u8]) -> io::Result<()> {
        self.sink.write_entry(entry)
    }
}

/// Drops entries below a minimum level.
#[derive(Clone)]
pub struct FilteredLevelSink {
    sink: Arc<dyn LevelSink>,
    min_level: Level,
}

impl FilteredLevelSink {
    /// Forward entries at `min_level` or above to `sink`.
    pub fn new(sink: Arc<dyn LevelSink>, min_level: Level) -> Self {
        Self { sink, min_level }
    }

    /// Lowest level forwarded.
    pub const fn min_level(&self) -> Level {
        self.min_level
    }
}

impl LevelSink for FilteredLevelSink {
    fn write_level(&self, level: Level, entry: &[u8]) -> io::Result<()> {
        if level < self.min_level {
            return Ok(());
        }
        self.sink.write_level(level, entry)
    }
}

/// Fans every entry out to several sinks.
///
/// Every sink is attempted even when an earlier one fails; the first error is
/// returned.
#[derive(Clone, Default)]
pub struct MultiLevelSink {
    sinks: Vec<Arc<dyn LevelSink>>,
}

impl MultiLevelSink {
    /// Fan out to `sinks` in order.
    pub fn new(sinks: Vec<Arc<dyn LevelSink>>) -> Self {
        Self { sinks }
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when there is nothing to write to.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LevelSink for MultiLevelSink {
    fn write_level(&self, level: Level, entry: &[u8]) -> io::Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(error) = sink.write_level(level, entry) {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemorySink {
        entries: Mutex<Vec<(Level, String)>>,
        fail: bool,
    }

    impl MemorySink {
        fn failing() -> Self {
            Self {
                entries: Mutex::default(),
                fail: true,
            }
        }

        fn take(&self) -> Vec<(Level, String)> {
            std::mem::take(&mut *self.entries.lock().expect("memory sink lock"))
        }
    }

    impl LevelSink for MemorySink {
        fn write_level(&self, level: Level, entry: &[u8]) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.entries
                .lock()
                .expect("memory sink lock")
                .push((level, String::from_utf8_lossy(entry).into_owned()));
            Ok(())
        }
    }

    #[test]
    fn writer_sink_writes_whole_entries() -> io::Result<()> {
        let sink = WriterSink::new(Vec::new());
        sink.write_entry(b"one\n")?;
        sink.write_entry(b"two\n")?;
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
        Ok(())
    }

    #[test]
    fn filtered_sink_drops_lower_levels() -> io::Result<()> {
        let memory = Arc::new(MemorySink::default());
        let filtered = FilteredLevelSink::new(memory.clone(), Level::Info);

        filtered.write_level(Level::Debug, b"hidden\n")?;
        filtered.write_level(Level::Info, b"shown\n")?;
        filtered.write_level(Level::Error, b"loud\n")?;

        assert_eq!(
            memory.take(),
            vec![
                (Level::Info, "shown\n".to_string()),
                (Level::Error, "loud\n".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn multi_sink_attempts_all_and_returns_first_error() {
        let first = Arc::new(MemorySink::failing());
        let second = Arc::new(MemorySink::default());
        let multi = MultiLevelSink::new(vec![first, second.clone()]);

        let error = multi.write_level(Level::Warn, b"entry\n").err();
        assert_eq!(error.map(|error| error.to_string()), Some("disk full".to_string()));
        assert_eq!(second.take(), vec![(Level::Warn, "entry\n".to_string())]);
    }

    #[test]
    fn empty_multi_sink_accepts_everything() {
        let multi = MultiLevelSink::default();
        assert!(multi.is_empty());
        assert!(multi.write_level(Level::Error, b"x\n").is_ok());
    }

    #[test]
    fn plain_level_sink_ignores_level() -> io::Result<()> {
        let writer = Arc::new(WriterSink::new(Vec::new()));
        let plain = PlainLevelSink::new(writer.clone());
        plain.write_level(Level::Trace, b"a\n")?;
        plain.write_level(Level::Error, b"b\n")?;
        drop(plain);

        let writer = Arc::try_unwrap(writer).map_err(|_| io::Error::other("still shared"))?;
        assert_eq!(writer.into_inner(), b"a\nb\n");
        Ok(())
    }

    #[test]
    fn file_sink_appends_with_private_mode() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.log");

        let sink = FileSink::open(&path)?;
        sink.write_entry(b"first\n")?;
        drop(sink);

        let sink = FileSink::open(&path)?;
        sink.write_entry(b"second\n")?;
        assert_eq!(sink.path(), path.as_path());

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path)?.permissions().mode();
            assert_eq!(mode & 0o777, LOG_FILE_MODE);
        }
        Ok(())
    }
}
