//! Recorder collaborators consuming observed events.
//!
//! A `Recorder` receives validation warnings and provisioning step outcomes.
//! Recording must never fail the operation being observed: implementations
//! absorb their own I/O errors.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::events::ObservedEvent;
use super::logger::Logger;

/// Consumer of observed events.
pub trait Recorder: Send + Sync {
    /// Record a single event.
    fn record(&self, event: &ObservedEvent);
}

/// Recorder that renders events as structured log lines.
#[derive(Debug, Default)]
pub struct LogRecorder;

impl LogRecorder {
    /// Create a new log recorder.
    pub fn new() -> Self {
        Self
    }
}

impl Recorder for LogRecorder {
    fn record(&self, event: &ObservedEvent) {
        let mut fields: Vec<(&str, &str)> = Vec::with_capacity(5);
        if let Some(ref collection) = event.collection {
            fields.push(("collection", collection));
        }
        if let Some(ref step) = event.step {
            fields.push(("step", step));
        }
        if let Some(ref field) = event.field {
            fields.push(("field", field));
        }
        if let Some(ref detail) = event.detail {
            fields.push(("detail", detail));
        }
        if let Some(ref error) = event.error {
            fields.push(("error", error));
        }
        Logger::log(event.kind.severity(), event.kind.as_str(), &fields);
    }
}

/// Recorder appending one JSON line per event to a file.
///
/// Writes are flushed and synced per event so the record survives a crash
/// of the invoking bootstrap process.
pub struct FileRecorder {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileRecorder {
    /// Open or create the event file.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Path of the event file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &ObservedEvent) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", event.to_json())?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Recorder for FileRecorder {
    fn record(&self, event: &ObservedEvent) {
        if let Err(err) = self.append(event) {
            Logger::error(
                "RECORDER_WRITE_FAILED",
                &[("path", &self.path.display().to_string()), ("error", &err.to_string())],
            );
        }
    }
}

/// In-memory recorder for tests.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<ObservedEvent>>,
}

impl MemoryRecorder {
    /// Create a new in-memory recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded events of one kind.
    pub fn of_kind(&self, kind: super::events::EventKind) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, event: &ObservedEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::super::events::EventKind;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_recorder_collects_events() {
        let recorder = MemoryRecorder::new();
        assert!(recorder.is_empty());

        recorder.record(&ObservedEvent::new(EventKind::ReconcileBegin).with_collection("movies"));
        recorder.record(&ObservedEvent::new(EventKind::StepApplied).with_collection("movies"));

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.of_kind(EventKind::StepApplied).len(), 1);
    }

    #[test]
    fn test_file_recorder_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let recorder = FileRecorder::open(&path).unwrap();
        recorder.record(
            &ObservedEvent::new(EventKind::ValidationWarning)
                .with_collection("tmdb_movies")
                .with_field("id"),
        );
        recorder.record(&ObservedEvent::new(EventKind::StepUnchanged).with_collection("tmdb_movies"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "VALIDATION_WARNING");
        assert_eq!(first["field"], "id");
    }

    #[test]
    fn test_log_recorder_does_not_panic() {
        let recorder = LogRecorder::new();
        recorder.record(&ObservedEvent::new(EventKind::ReconcileComplete).with_detail("converged"));
    }
}
