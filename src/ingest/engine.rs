//! Ingestion driver. Sole owner of manifest and event-log state.
//!
//! A run is `ingest_payload` (optionally via [`MassiveMicroIngestor::ingest_sources_recursive`])
//! followed by `finalize_ingestion`. Only finalisation touches the filesystem,
//! so an abandoned run leaves no persistent trace.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::decompose::{decompose_at, nesting_complexity};
use super::gaps::{detect_gaps, fill_gaps_at};
use super::matter::identify_matter_forms;
use super::payload::Payload;
use super::proposals::{propose_processes, RunStatistics};
use super::types::{IngestionResult, Level, LevelSummary, PersistenceState};
use crate::config::MmiConfig;
use crate::error::Result;
use crate::store::event_log::EventLog;
use crate::store::manifest::{Manifest, ManifestStore};

pub struct MassiveMicroIngestor {
    pub(crate) manifest: ManifestStore,
    pub(crate) event_log: EventLog,
}

impl MassiveMicroIngestor {
    pub fn new(manifest: ManifestStore, event_log: EventLog) -> Self {
        Self {
            manifest,
            event_log,
        }
    }

    /// Open the manifest and event log at the configured paths.
    pub fn from_config(config: &MmiConfig) -> Result<Self> {
        let manifest = ManifestStore::open(config.resolved_manifest_path())?;
        let event_log = EventLog::new(config.resolved_event_log_path());
        Ok(Self::new(manifest, event_log))
    }

    pub fn manifest(&self) -> &Manifest {
        self.manifest.manifest()
    }

    /// Gap-fill, decompose at every level, and tag matter forms.
    ///
    /// Updates the in-memory manifest counters but persists nothing; call
    /// [`finalize_ingestion`](Self::finalize_ingestion) once any recursive
    /// source walk has completed.
    pub fn ingest_payload(&mut self, payload: &Payload, payload_name: &str) -> Result<IngestionResult> {
        payload.validate()?;
        info!(payload = payload_name, "starting ingestion");

        let now = Utc::now();

        // 1-2. Detect, then fill if anything was found.
        let gaps = detect_gaps(payload);
        let (working, fills) = if gaps.is_empty() {
            (payload.clone(), Vec::new())
        } else {
            info!(payload = payload_name, gaps = gaps.len(), "identified gaps in payload");
            fill_gaps_at(payload, payload_name, now)
        };

        // 3. One decomposition pass per level.
        let mut granularity_levels = BTreeMap::new();
        for level in Level::ALL {
            let components = decompose_at(&working, level, "", now);
            debug!(payload = payload_name, %level, count = components.len(), "decomposed");
            granularity_levels.insert(
                level,
                LevelSummary {
                    count: components.len(),
                    components,
                },
            );
        }

        // 4. Matter forms.
        let matter_forms_identified = identify_matter_forms(&working);
        debug!(payload = payload_name, forms = matter_forms_identified.len(), "matter forms identified");

        let mut result = IngestionResult {
            payload_name: payload_name.to_string(),
            timestamp: now.to_rfc3339(),
            nesting_complexity: nesting_complexity(&working),
            original_payload: working,
            granularity_levels,
            matter_forms_identified,
            source_depth: 0,
            depth_limit_reached: false,
            gaps_filled: fills.len(),
            gaps_identified: gaps,
            filled_gaps: fills,
            proposed_processes: Vec::new(),
            persistence_state: PersistenceState::Pending,
            event_log_state: PersistenceState::Pending,
        };
        result.proposed_processes = propose_processes(&RunStatistics::from_result(&result));

        // 5. In-memory counters only.
        self.manifest.record_ingestion(&result);

        info!(
            payload = payload_name,
            components = result.total_components(),
            gaps_filled = result.gaps_filled,
            "ingestion complete"
        );
        Ok(result)
    }

    /// Synthesize proposals, merge counters, persist the manifest, and append
    /// to the event log.
    ///
    /// Persistence never fails the call: each write is retried once and the
    /// outcome is recorded in `persistence_state` / `event_log_state`.
    pub fn finalize_ingestion(&mut self, mut result: IngestionResult) -> IngestionResult {
        info!(payload = %result.payload_name, "finalizing ingestion");

        result.proposed_processes = propose_processes(&RunStatistics::from_result(&result));
        self.manifest.merge_finalized(&result);

        result.persistence_state = self.persist_manifest();

        let event_log = &self.event_log;
        let event_log_state = retry_once("event log append", || event_log.append(&result));
        result.event_log_state = event_log_state;

        info!(
            payload = %result.payload_name,
            proposals = result.proposed_processes.len(),
            manifest = ?result.persistence_state,
            "ingestion finalized"
        );
        result
    }

    /// Write the current manifest to disk, retrying once.
    pub fn persist_manifest(&mut self) -> PersistenceState {
        let manifest = &mut self.manifest;
        retry_once("manifest write", || manifest.persist())
    }
}

pub(crate) fn retry_once(what: &str, mut op: impl FnMut() -> Result<()>) -> PersistenceState {
    match op() {
        Ok(()) => PersistenceState::Persisted,
        Err(first) => {
            warn!(error = %first, "{what} failed, retrying");
            match op() {
                Ok(()) => PersistenceState::Persisted,
                Err(e) => {
                    error!(error = %e, "{what} failed");
                    PersistenceState::Failed
                }
            }
        }
    }
}
