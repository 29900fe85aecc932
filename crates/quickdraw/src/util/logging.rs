//! File logging: one size-rotated writer abstraction shared by the tracing
//! file layers and the race-outcome log, all driven by the `[logging]`
//! config section.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

use quickdraw_core::NodeAddress;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_outcomes_file")]
    pub outcomes_file: String,

    /// Size at which a log file rolls over to a numbered sibling.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Rotated siblings kept per log file.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_log_dir() -> String {
    "logs/{node_id}".into()
}

fn default_outcomes_file() -> String {
    "outcomes.jsonl".into()
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_max_files() -> usize {
    5
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            log_dir: default_log_dir(),
            outcomes_file: default_outcomes_file(),
            max_file_size_mb: default_max_file_size_mb(),
            max_files: default_max_files(),
        }
    }
}

impl LogConfig {
    pub fn resolve_log_dir(&self, node_id: &str) -> PathBuf {
        PathBuf::from(self.log_dir.replace("{node_id}", node_id))
    }

    pub fn outcomes_path(&self, node_id: &str) -> PathBuf {
        self.resolve_log_dir(node_id).join(&self.outcomes_file)
    }

    /// Opens (creating directories as needed) one rotated log file under
    /// this node's log directory.
    pub fn open_log(&self, node_id: &str, file_name: &str) -> io::Result<RotaryWriter> {
        let dir = self.resolve_log_dir(node_id);
        fs::create_dir_all(&dir)?;

        let rotate = FileRotate::new(
            dir.join(file_name),
            AppendCount::new(self.max_files),
            ContentLimit::Bytes((self.max_file_size_mb * 1024 * 1024) as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(RotaryWriter {
            inner: Arc::new(Mutex::new(rotate)),
        })
    }
}

/// Clonable handle over one size-rotated log file. Doubles as a tracing
/// `MakeWriter` and as the sink of the outcome writer task.
#[derive(Clone)]
pub struct RotaryWriter {
    inner: Arc<Mutex<FileRotate<AppendCount>>>,
}

impl RotaryWriter {
    fn lock(&self) -> MutexGuard<'_, FileRotate<AppendCount>> {
        // A panic mid-write poisons nothing we cannot keep appending to.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self.lock();
        writeln!(guard, "{}", line)?;
        guard.flush()
    }
}

pub struct RotaryGuard<'a>(MutexGuard<'a, FileRotate<AppendCount>>);

impl io::Write for RotaryGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for RotaryWriter {
    type Writer = RotaryGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotaryGuard(self.lock())
    }
}

/// One line per decided race.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeEntry {
    pub seq: u64,
    pub winner: String,
    pub decided_at_ms: u64,
}

enum LogMessage {
    Entry(String),
    Shutdown,
}

/// Appends race outcomes to a rotated JSONL file through a background
/// writer task, so the race loop never blocks on disk.
#[derive(Clone)]
pub struct RaceOutcomeLogger {
    sender: mpsc::UnboundedSender<LogMessage>,
    seq: Arc<AtomicU64>,
}

impl RaceOutcomeLogger {
    pub fn new(config: &LogConfig, node_id: &str) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let writer = match config.open_log(node_id, &config.outcomes_file) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(
                    path = %config.outcomes_path(node_id).display(),
                    error = %e,
                    "failed to open outcome log"
                );
                return None;
            }
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(receiver, writer));

        tracing::info!(
            path = %config.outcomes_path(node_id).display(),
            "race outcome logger initialized"
        );

        Some(Self {
            sender,
            seq: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn log(&self, winner: &NodeAddress) {
        let entry = OutcomeEntry {
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            winner: winner.to_string(),
            decided_at_ms: epoch_ms(),
        };

        let line = match serde_json::to_string(&entry) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize outcome entry");
                return;
            }
        };

        if self.sender.send(LogMessage::Entry(line)).is_err() {
            tracing::warn!(seq = entry.seq, "outcome log channel closed, entry dropped");
        }
    }

    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(LogMessage::Shutdown);
    }
}

async fn writer_task(mut receiver: mpsc::UnboundedReceiver<LogMessage>, writer: RotaryWriter) {
    while let Some(msg) = receiver.recv().await {
        match msg {
            LogMessage::Entry(line) => {
                if let Err(e) = writer.write_line(&line) {
                    tracing::warn!(error = %e, "failed to write outcome entry");
                }
            }
            LogMessage::Shutdown => break,
        }
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
