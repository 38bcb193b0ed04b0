//! Batch ingestion of every text file under a directory.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::engine::{retry_once, MassiveMicroIngestor};
use super::payload::Payload;
use super::types::PersistenceState;

const SKIP_DIRS: [&str; 7] = [
    ".git",
    ".venv",
    ".vscode",
    "__pycache__",
    "node_modules",
    "site",
    "target",
];

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub root: String,
    pub timestamp: String,
    pub files_ingested: usize,
    pub files_skipped: usize,
    pub total_components: usize,
    pub gaps_filled: usize,
    pub processes_proposed: usize,
    pub errors: Vec<String>,
    pub persistence_state: PersistenceState,
    pub event_log_state: PersistenceState,
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// Wrap a file's text in a payload. `.json` files that parse also carry
/// their parsed tree under `parsed_data`.
pub fn file_payload(relative: &Path, content: &str, modified: Option<DateTime<Utc>>) -> Payload {
    let mut map = std::collections::BTreeMap::new();
    map.insert(
        "file_path".to_string(),
        Payload::Str(relative.display().to_string()),
    );
    let extension = relative
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    map.insert("file_type".to_string(), Payload::Str(extension.clone()));
    map.insert("content".to_string(), Payload::Str(content.to_string()));
    map.insert("size_bytes".to_string(), Payload::Int(content.len() as i64));
    map.insert(
        "line_count".to_string(),
        Payload::Int(content.split('\n').count() as i64),
    );
    map.insert(
        "modified_time".to_string(),
        modified.map(Payload::Timestamp).unwrap_or(Payload::Null),
    );

    if extension == ".json" {
        if let Ok(parsed) = Payload::from_json_str(content) {
            map.insert("parsed_data".to_string(), parsed);
        }
    }

    Payload::Map(map)
}

impl MassiveMicroIngestor {
    /// Ingest every UTF-8 file under `root` as `file:<relative path>`.
    ///
    /// Each file's gap and proposal counts are merged into the manifest as it
    /// is ingested. After the walk the manifest is persisted once and one
    /// batch record is appended to the event log. Unreadable files are
    /// recorded in `errors`; binary files are skipped.
    pub fn ingest_directory(&mut self, root: &Path) -> BatchSummary {
        let mut summary = BatchSummary {
            root: root.display().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            files_ingested: 0,
            files_skipped: 0,
            total_components: 0,
            gaps_filled: 0,
            processes_proposed: 0,
            errors: Vec::new(),
            persistence_state: PersistenceState::Pending,
            event_log_state: PersistenceState::Pending,
        };

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    summary.errors.push(e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    summary.errors.push(format!("{}: {e}", relative.display()));
                    continue;
                }
            };
            let Ok(content) = String::from_utf8(bytes) else {
                debug!(file = %relative.display(), "skipping binary file");
                summary.files_skipped += 1;
                continue;
            };

            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from);

            let payload = file_payload(relative, &content, modified);
            match self.ingest_payload(&payload, &format!("file:{}", relative.display())) {
                Ok(result) => {
                    self.manifest.merge_finalized(&result);
                    summary.files_ingested += 1;
                    summary.total_components += result.total_components();
                    summary.gaps_filled += result.gaps_filled;
                    summary.processes_proposed += result.proposed_processes.len();
                    if summary.files_ingested % 10 == 0 {
                        info!(
                            files = summary.files_ingested,
                            components = summary.total_components,
                            "batch progress"
                        );
                    }
                }
                Err(e) => {
                    warn!(file = %relative.display(), error = %e, "failed to ingest file");
                    summary.errors.push(format!("{}: {e}", relative.display()));
                }
            }
        }

        summary.persistence_state = self.persist_manifest();
        let event_log = &self.event_log;
        let event_log_state = retry_once("event log append", || event_log.append_batch(&summary));
        summary.event_log_state = event_log_state;

        info!(
            files = summary.files_ingested,
            skipped = summary.files_skipped,
            gaps_filled = summary.gaps_filled,
            errors = summary.errors.len(),
            "batch ingestion complete"
        );
        summary
    }
}
