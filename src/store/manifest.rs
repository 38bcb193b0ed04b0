//! Cumulative run manifest with load-on-construct, write-through persistence.
//!
//! Counters are updated in memory as ingestions happen; [`ManifestStore::persist`]
//! writes the whole document atomically (temp file, fsync, rename) so a crash
//! never leaves a half-written manifest behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MmiError, Result};
use crate::ingest::types::{IngestionResult, Level};

pub const MANIFEST_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: String,
    pub total_ingestions: u64,
    pub granularity_coverage: BTreeMap<Level, u64>,
    pub source_depth_reached: usize,
    pub gaps_filled: u64,
    pub processes_proposed: u64,
    pub last_updated: Option<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            total_ingestions: 0,
            granularity_coverage: Level::ALL.iter().map(|l| (*l, 0)).collect(),
            source_depth_reached: 0,
            gaps_filled: 0,
            processes_proposed: 0,
            last_updated: None,
        }
    }

    pub fn coverage(&self, level: Level) -> u64 {
        self.granularity_coverage.get(&level).copied().unwrap_or(0)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the manifest file. One instance per manifest path per process;
/// concurrent writers must go through the same instance.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    manifest: Manifest,
}

impl ManifestStore {
    /// Load the manifest at `path`, or start a fresh one if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let manifest = if path.exists() {
            let contents =
                fs::read_to_string(&path).map_err(|e| MmiError::persistence(&path, e))?;
            let manifest: Manifest = serde_json::from_str(&contents)?;
            debug!(path = %path.display(), total = manifest.total_ingestions, "manifest loaded");
            manifest
        } else {
            info!(path = %path.display(), "no manifest found, starting fresh");
            Manifest::new()
        };
        Ok(Self { path, manifest })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Count one ingestion and its per-level components.
    pub fn record_ingestion(&mut self, result: &IngestionResult) {
        self.manifest.total_ingestions += 1;
        for (level, summary) in &result.granularity_levels {
            *self.manifest.granularity_coverage.entry(*level).or_insert(0) += summary.count as u64;
        }
    }

    pub fn note_source_depth(&mut self, depth: usize) {
        self.manifest.source_depth_reached = self.manifest.source_depth_reached.max(depth);
    }

    /// Merge the counters that are only known at finalisation.
    pub fn merge_finalized(&mut self, result: &IngestionResult) {
        self.manifest.gaps_filled += result.gaps_filled as u64;
        self.manifest.processes_proposed += result.proposed_processes.len() as u64;
    }

    /// Stamp `last_updated` and write the manifest atomically.
    pub fn persist(&mut self) -> Result<()> {
        self.manifest.last_updated = Some(chrono::Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(&self.manifest)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), "manifest persisted");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MmiError::persistence(parent, e))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let write_tmp = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    };
    write_tmp().map_err(|e| MmiError::persistence(&tmp_path, e))?;

    fs::rename(&tmp_path, path).map_err(|e| MmiError::persistence(path, e))
}
