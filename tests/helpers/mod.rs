#![allow(dead_code)]

use mmi::ingest::{MassiveMicroIngestor, Payload};
use mmi::store::event_log::EventLog;
use mmi::store::manifest::ManifestStore;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An ingestor whose manifest and event log live in a fresh temp directory.
pub struct TestEnv {
    pub dir: TempDir,
    pub mmi: MassiveMicroIngestor,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mmi = open_ingestor(dir.path());
        Self { dir, mmi }
    }

    pub fn manifest_path(&self) -> PathBuf {
        manifest_path(self.dir.path())
    }

    pub fn log_path(&self) -> PathBuf {
        log_path(self.dir.path())
    }

    /// Re-open the ingestor from disk, as a new process would.
    pub fn reopen(&self) -> MassiveMicroIngestor {
        open_ingestor(self.dir.path())
    }
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join("memory-bundles").join("mmi-manifest.json")
}

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join("memory-bundles").join("mmi-ingestion-log.md")
}

pub fn open_ingestor(dir: &Path) -> MassiveMicroIngestor {
    let manifest = ManifestStore::open(manifest_path(dir)).unwrap();
    MassiveMicroIngestor::new(manifest, EventLog::new(log_path(dir)))
}

/// Build a payload from a `json!` literal.
pub fn payload(value: serde_json::Value) -> Payload {
    Payload::from_json(value).unwrap()
}

/// `{"source": {"source": ... {"x": 1}}}` with `depth` levels of nesting.
pub fn source_chain(depth: usize) -> serde_json::Value {
    let mut node = serde_json::json!({"x": 1});
    for _ in 0..depth {
        node = serde_json::json!({ "source": node });
    }
    node
}
