//! Per-run log files for the greeter.
//!
//! Each run gets its own file, `greeter_YYYYMMDD_HHMMSS_mmm.log`, next to a
//! `greeter_latest.log` symlink pointing at it. Once a run's file reaches
//! `max_size_mb`, further writes are dropped for the rest of the run. When a
//! new run starts, the oldest run logs are deleted so that at most
//! `max_files` remain.
//!
//! ```rust,no_run
//! use greeter_demo::config::RotatingFileConfig;
//! use greeter_demo::rotating_file_logger::RotatingFileWriter;
//!
//! let config = RotatingFileConfig { enabled: true, ..Default::default() };
//! let writer = RotatingFileWriter::new(config)?;
//! let subscriber = tracing_subscriber::fmt().with_writer(writer).finish();
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::config::RotatingFileConfig;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// The file backing the current run
struct RunLogFile {
    file: fs::File,
    size: u64,
    limit: u64,
    limit_reported: bool,
}

impl RunLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size + buf.len() as u64 > self.limit {
            if !self.limit_reported {
                self.limit_reported = true;
                let notice = b"log size limit reached, dropping further output for this run\n";
                self.file.write_all(notice)?;
                self.size += notice.len() as u64;
            }
            // Report success so the subscriber keeps going
            return Ok(buf.len());
        }

        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }
}

/// Thread-safe handle to the current run's log file
#[derive(Clone)]
pub struct RotatingFileWriter {
    inner: Arc<Mutex<RunLogFile>>,
    path: PathBuf,
}

impl RotatingFileWriter {
    /// Create the log directory, prune old run logs and open a fresh file
    pub fn new(config: RotatingFileConfig) -> io::Result<Self> {
        let dir = PathBuf::from(&config.log_directory);
        fs::create_dir_all(&dir)?;

        let base_name = base_name(&config.filename);
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let path = dir.join(format!("{}_{}.log", base_name, timestamp));

        // Leave room for the file about to be created
        prune_run_logs(&dir, base_name, config.max_files.saturating_sub(1))?;

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        update_latest_link(&dir, base_name, &path);

        Ok(Self {
            inner: Arc::new(Mutex::new(RunLogFile {
                file,
                size,
                limit: config.max_size_mb.saturating_mul(1024 * 1024),
                limit_reported: false,
            })),
            path,
        })
    }

    /// Path of the file this run writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, RunLogFile>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }

    #[cfg(test)]
    fn with_limit_bytes(self, limit: u64) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.limit = limit;
        }
        self
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn base_name(filename: &str) -> &str {
    filename.trim_end_matches(".log")
}

/// Run logs for `base_name` in `dir`, oldest first
fn run_logs(dir: &Path, base_name: &str) -> io::Result<Vec<PathBuf>> {
    let prefix = format!("{}_", base_name);
    let latest = format!("{}_latest.log", base_name);
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&prefix) && name.ends_with(".log") && name != latest)
                .unwrap_or(false)
        })
        .collect();
    // Timestamps sort lexicographically
    logs.sort();
    Ok(logs)
}

fn prune_run_logs(dir: &Path, base_name: &str, keep: usize) -> io::Result<()> {
    let logs = run_logs(dir, base_name)?;
    let excess = logs.len().saturating_sub(keep);
    for old in &logs[..excess] {
        fs::remove_file(old)?;
    }
    Ok(())
}

fn update_latest_link(dir: &Path, base_name: &str, target: &Path) {
    let latest_path = dir.join(format!("{}_latest.log", base_name));

    if fs::symlink_metadata(&latest_path).is_ok() {
        if let Err(e) = fs::remove_file(&latest_path) {
            eprintln!("Failed to remove {}: {}", latest_path.display(), e);
            return;
        }
    }

    #[cfg(unix)]
    {
        // Relative target, both files live in the same directory
        if let Some(target_name) = target.file_name() {
            if let Err(e) = std::os::unix::fs::symlink(target_name, &latest_path) {
                eprintln!("Failed to create {}: {}", latest_path.display(), e);
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = fs::copy(target, &latest_path) {
            eprintln!("Failed to create {}: {}", latest_path.display(), e);
        }
    }
}
