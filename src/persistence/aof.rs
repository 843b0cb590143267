use crate::store::entry::Entry;
use crate::store::Store;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Size of the in-memory write buffer. Appends land here and reach the OS
/// only when the background flush task runs or the buffer fills.
const WRITE_BUF_CAPACITY: usize = 64 * 1024;

/// Writer for the append-only command log.
///
/// Each accepted mutating command is recorded as one text line, exactly
/// as it appears on the wire. `append` never touches the disk directly;
/// the durability window is bounded by the flush interval.
pub struct AofWriter {
    writer: Option<BufWriter<File>>,
}

impl Default for AofWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AofWriter {
    pub fn new() -> Self {
        AofWriter { writer: None }
    }

    /// Open or create the log file in append mode.
    pub fn open(&mut self, path: &str) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        self.writer = Some(BufWriter::with_capacity(WRITE_BUF_CAPACITY, file));
        Ok(())
    }

    /// Append one command record to the in-memory buffer.
    pub fn append(&mut self, command: &str) -> io::Result<()> {
        let writer = match &mut self.writer {
            Some(w) => w,
            None => return Ok(()),
        };
        writer.write_all(command.as_bytes())?;
        writer.write_all(b"\n")
    }

    /// Push buffered records to the OS.
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Final flush and fsync, then release the file.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
            let _ = writer.get_ref().sync_all();
        }
    }
}

/// Replay a log file into the store, returning the number of commands
/// applied.
///
/// Only `SET` records are reconstructed; `EXPIRE` records are skipped,
/// so a TTL applied before a crash does not survive a restart — the key
/// comes back without it. Malformed and unreadable lines are skipped.
pub fn replay(path: &str, store: &Store) -> io::Result<usize> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let reader = BufReader::new(file);
    let mut count = 0usize;

    for line in reader.lines() {
        let Ok(line) = line else {
            // Truncated or non-UTF-8 tail, stop here
            break;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 3 && parts[0].eq_ignore_ascii_case("SET") {
            let key = parts[1].to_string();
            let value = parts[2..].join(" ");
            store.set(key, Entry::new(value));
            count += 1;
        }
    }

    Ok(count)
}

pub type SharedAofWriter = Arc<Mutex<AofWriter>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn log_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("ember.aof").to_string_lossy().into_owned()
    }

    #[test]
    fn test_append_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);

        let mut writer = AofWriter::new();
        writer.open(&path).unwrap();
        writer.append("SET foo bar").unwrap();
        writer.append("SET baz hello world").unwrap();
        writer.flush().unwrap();

        let store = Store::new();
        let count = replay(&path, &store).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.get("foo"), Some("bar".to_string()));
        assert_eq!(store.get("baz"), Some("hello world".to_string()));
    }

    #[test]
    fn test_replay_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);

        let mut writer = AofWriter::new();
        writer.open(&path).unwrap();
        writer.append("SET foo one").unwrap();
        writer.append("SET foo two").unwrap();
        writer.flush().unwrap();

        let store = Store::new();
        replay(&path, &store).unwrap();
        assert_eq!(store.get("foo"), Some("two".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replay_skips_expire_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);

        let mut writer = AofWriter::new();
        writer.open(&path).unwrap();
        writer.append("SET foo bar").unwrap();
        writer.append("EXPIRE foo 100").unwrap();
        writer.append("SET onlykey").unwrap();
        writer.append("garbage line").unwrap();
        writer.flush().unwrap();

        let store = Store::new();
        let count = replay(&path, &store).unwrap();
        assert_eq!(count, 1);
        // The key survives replay without its TTL.
        assert_eq!(store.get("foo"), Some("bar".to_string()));
        assert!(!store.contains_key("onlykey"));
    }

    #[test]
    fn test_replay_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);

        let store = Store::new();
        assert_eq!(replay(&path, &store).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_without_open_is_noop() {
        let mut writer = AofWriter::new();
        assert!(!writer.is_active());
        writer.append("SET foo bar").unwrap();
        writer.flush().unwrap();
    }

    #[test]
    fn test_close_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);

        let mut writer = AofWriter::new();
        writer.open(&path).unwrap();
        writer.append("SET foo bar").unwrap();
        writer.close();

        let store = Store::new();
        assert_eq!(replay(&path, &store).unwrap(), 1);
    }
}
