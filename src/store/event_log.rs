//! Append-only Markdown event log. Never read back by the core.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{MmiError, Result};
use crate::ingest::batch::BatchSummary;
use crate::ingest::types::IngestionResult;

#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one run record.
    pub fn append(&self, result: &IngestionResult) -> Result<()> {
        self.write_record(&render_record(result))
    }

    /// Append one directory-batch record.
    pub fn append_batch(&self, summary: &BatchSummary) -> Result<()> {
        self.write_record(&render_batch_record(summary))
    }

    // A single `write_all` on a file opened in append mode.
    fn write_record(&self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MmiError::persistence(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MmiError::persistence(&self.path, e))?;
        file.write_all(record.as_bytes())
            .map_err(|e| MmiError::persistence(&self.path, e))
    }
}

/// Render a finalised run as a Markdown section terminated by `---`.
pub fn render_record(result: &IngestionResult) -> String {
    let mut out = format!(
        "\n## MMI Ingestion: {}\n\n**Payload**: {}\n\n### Granularity Decomposition\n",
        result.timestamp, result.payload_name
    );
    for (level, summary) in &result.granularity_levels {
        out.push_str(&format!("- **{level}**: {} components\n", summary.count));
    }

    out.push_str("\n### Matter Forms Identified\n");
    for form in &result.matter_forms_identified {
        out.push_str(&format!("- {form}\n"));
    }

    out.push_str(&format!("\n### Source Depth: {}\n", result.source_depth));
    out.push_str(&format!("\n### Gaps Filled: {}\n", result.gaps_filled));

    if !result.proposed_processes.is_empty() {
        out.push_str(&format!(
            "\n### Proposed Processes ({})\n",
            result.proposed_processes.len()
        ));
        for p in &result.proposed_processes {
            out.push_str(&format!("- **{}** (Priority: {})\n", p.process, p.priority));
            out.push_str(&format!("  - Reason: {}\n", p.reason));
        }
    }

    out.push_str("\n---\n");
    out
}

pub fn render_batch_record(summary: &BatchSummary) -> String {
    let mut out = format!(
        "\n## MMI Batch Ingestion: {}\n\n**Root**: {}\n\n",
        summary.timestamp, summary.root
    );
    out.push_str(&format!("- **Files Ingested**: {}\n", summary.files_ingested));
    out.push_str(&format!("- **Files Skipped**: {}\n", summary.files_skipped));
    out.push_str(&format!("- **Total Components**: {}\n", summary.total_components));
    out.push_str(&format!("- **Gaps Filled**: {}\n", summary.gaps_filled));
    out.push_str(&format!("- **Processes Proposed**: {}\n", summary.processes_proposed));
    out.push_str(&format!("- **Errors**: {}\n", summary.errors.len()));

    if !summary.errors.is_empty() {
        out.push_str("\n### Errors\n");
        for err in &summary.errors {
            out.push_str(&format!("- {err}\n"));
        }
    }

    out.push_str("\n---\n");
    out
}
