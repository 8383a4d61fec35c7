//! Periodic ingestion of an append-only access log file.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::lifecycle::Shutdown;

use super::{AccessLog, Discovery, DiscoveryError};

/// Reads complete lines appended to a file since the previous read.
#[derive(Debug)]
pub struct AccessLogTail {
    path: PathBuf,
    offset: u64,
}

impl AccessLogTail {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            offset: 0,
        }
    }

    /// Records appended since the last call. A trailing partial line is
    /// left for the next call; a missing file reads as empty. Lines that are
    /// not valid UTF-8 or not an access log record are skipped with a
    /// warning and never read again.
    pub fn read_new(&mut self) -> Result<Vec<AccessLog>, DiscoveryError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if file.metadata()?.len() < self.offset {
            tracing::info!(path = ?self.path, "Access log truncated, reading from start");
            self.offset = 0;
        }
        file.seek(SeekFrom::Start(self.offset))?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        let Some(end) = buf.iter().rposition(|&b| b == b'\n').map(|i| i + 1) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        let mut line_offset = self.offset;
        for line in buf[..end].split_inclusive(|&b| b == b'\n') {
            if let Some(record) = self.decode_line(line, line_offset) {
                records.push(record);
            }
            line_offset += line.len() as u64;
        }

        self.offset += end as u64;
        Ok(records)
    }

    fn decode_line(&self, line: &[u8], offset: u64) -> Option<AccessLog> {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!(path = ?self.path, offset, error = %e, "Skipping access log line");
                return None;
            }
        };
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = ?self.path, offset, error = %e, "Skipping access log line");
                None
            }
        }
    }
}

/// Feed `tail` into `discovery` once per `window` until shutdown, then
/// drain what is left.
pub async fn run_ingestion(
    discovery: Arc<Mutex<Discovery>>,
    mut tail: AccessLogTail,
    window: Duration,
    shutdown: Shutdown,
) {
    let mut shutdown_rx = shutdown.subscribe();
    let mut ticker = tokio::time::interval(window);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => ingest_once(&discovery, &mut tail),
            _ = shutdown_rx.recv() => {
                ingest_once(&discovery, &mut tail);
                tracing::info!("Access log ingestion stopped");
                return;
            }
        }
    }
}

fn ingest_once(discovery: &Mutex<Discovery>, tail: &mut AccessLogTail) {
    let records = match tail.read_new() {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read access log");
            return;
        }
    };
    if records.is_empty() {
        return;
    }

    match discovery.lock() {
        Ok(mut discovery) => {
            let summary = discovery.process(&records);
            tracing::info!(
                aggregated = summary.aggregated,
                skipped = summary.skipped,
                converged = summary.converged,
                "Access log window aggregated"
            );
        }
        Err(_) => tracing::error!("Discovery state lock poisoned"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::urltree::UrlTreeConfig;

    const LINE: &str = r#"{"timestamp":1,"duration":2,"status_code":200,"method":"GET","url":"a.io/x"}"#;

    #[test]
    fn test_tail_reads_only_complete_new_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut tail = AccessLogTail::new(file.path());

        writeln!(file, "{LINE}\n{LINE}").unwrap();
        assert_eq!(tail.read_new().unwrap().len(), 2);
        assert!(tail.read_new().unwrap().is_empty());

        write!(file, "{LINE}").unwrap();
        assert!(tail.read_new().unwrap().is_empty());
        writeln!(file).unwrap();
        assert_eq!(tail.read_new().unwrap().len(), 1);
    }

    #[test]
    fn test_bad_lines_are_skipped_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut tail = AccessLogTail::new(file.path());

        file.write_all(b"not json\n\xff\xfe\n").unwrap();
        writeln!(file, "{LINE}").unwrap();
        assert_eq!(tail.read_new().unwrap().len(), 1);

        writeln!(file, "{LINE}").unwrap();
        assert_eq!(tail.read_new().unwrap().len(), 1);
        assert!(tail.read_new().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let mut tail = AccessLogTail::new(Path::new("/nonexistent/access.log"));
        assert!(tail.read_new().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_drains_remaining_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let discovery = Arc::new(Mutex::new(Discovery::new(&[], UrlTreeConfig::default()).unwrap()));
        let shutdown = Shutdown::new();

        let task = tokio::spawn(run_ingestion(
            discovery.clone(),
            AccessLogTail::new(file.path()),
            Duration::from_secs(3600),
            shutdown.clone(),
        ));
        tokio::task::yield_now().await;

        writeln!(file, "{LINE}").unwrap();
        while shutdown.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }
        shutdown.trigger();
        task.await.unwrap();

        let discovery = discovery.lock().unwrap();
        assert_eq!(discovery.aggregation().endpoints.len(), 1);
    }
}
