//! Recursive source walker.
//!
//! A payload may reference further payloads under a fixed set of source keys.
//! The walker ingests a node, extracts those references, and recurses into at
//! most [`MAX_CHILD_SOURCES`] of them per node, stopping at `max_depth`. Both
//! bounds together cap the walk at `sum(10^i for i in 0..max_depth)` ingestions.

use chrono::Utc;
use tracing::{info, warn};

use super::engine::MassiveMicroIngestor;
use super::payload::Payload;
use super::proposals::{propose_processes, RunStatistics};
use super::types::{SourceNode, SourceResult};
use crate::error::Result;

/// Keys whose values are treated as references to child sources.
pub const SOURCE_KEYS: [&str; 7] = [
    "source",
    "sources",
    "origin",
    "reference",
    "references",
    "dependencies",
    "from",
];

/// Per-node cap on child sources.
pub const MAX_CHILD_SOURCES: usize = 10;

/// Default recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Payload name a walked node is ingested under. Gap fills on that node are
/// hashed with this name as their root context.
pub fn node_payload_name(source_name: &str, depth: usize) -> String {
    format!("{source_name}_depth{depth}")
}

/// Collect child source candidates in extraction order.
///
/// For a mapping, the values under [`SOURCE_KEYS`] come first (in key-list
/// order; sequences contribute each element), followed by candidates found
/// by searching every nested mapping and sequence, source values included.
pub fn extract_sources(node: &Payload) -> Vec<Payload> {
    let mut sources = Vec::new();
    collect_sources(node, &mut sources);
    sources
}

fn collect_sources(node: &Payload, out: &mut Vec<Payload>) {
    match node {
        Payload::Map(map) => {
            for key in SOURCE_KEYS {
                match map.get(key) {
                    Some(Payload::Seq(items)) => out.extend(items.iter().cloned()),
                    Some(value) => out.push(value.clone()),
                    None => {}
                }
            }
            for value in map.values().filter(|v| v.is_container()) {
                collect_sources(value, out);
            }
        }
        Payload::Seq(items) => {
            for item in items.iter().filter(|i| i.is_container()) {
                collect_sources(item, out);
            }
        }
        _ => {}
    }
}

impl MassiveMicroIngestor {
    /// Ingest `node` and, recursively, the sources it references.
    ///
    /// Never fails on bounds: hitting `max_depth` yields
    /// [`SourceResult::DepthLimitReached`], and dropping candidates past the
    /// fan-out cap is recorded in `truncated_children`. Only malformed input
    /// is an error.
    pub fn ingest_sources_recursive(
        &mut self,
        node: &Payload,
        source_name: &str,
        depth: usize,
        max_depth: usize,
    ) -> Result<SourceResult> {
        if depth >= max_depth {
            info!(source = source_name, depth, max_depth, "maximum source depth reached");
            return Ok(SourceResult::DepthLimitReached {
                depth_limit_reached: true,
                depth,
            });
        }

        info!(source = source_name, depth, "ingesting source");

        let mut ingestion = self.ingest_payload(node, &node_payload_name(source_name, depth))?;

        let mut candidates = extract_sources(&ingestion.original_payload);
        let truncated_children = if candidates.len() > MAX_CHILD_SOURCES {
            let dropped = candidates.len() - MAX_CHILD_SOURCES;
            warn!(
                source = source_name,
                found = candidates.len(),
                kept = MAX_CHILD_SOURCES,
                "limiting child sources"
            );
            candidates.truncate(MAX_CHILD_SOURCES);
            Some(dropped)
        } else {
            None
        };

        let mut child_sources = Vec::with_capacity(candidates.len());
        for (i, child) in candidates.iter().enumerate() {
            let child_name = format!("{source_name}_child{i}");
            child_sources.push(self.ingest_sources_recursive(child, &child_name, depth + 1, max_depth)?);
        }

        self.manifest.note_source_depth(depth);

        // Recursion statistics are only known once the subtree is walked.
        ingestion.source_depth = child_sources
            .iter()
            .map(SourceResult::max_depth_touched)
            .fold(depth, usize::max);
        ingestion.depth_limit_reached = child_sources.iter().any(SourceResult::hit_depth_limit);
        ingestion.proposed_processes = propose_processes(&RunStatistics::from_result(&ingestion));

        Ok(SourceResult::Ingested(Box::new(SourceNode {
            source_name: source_name.to_string(),
            depth,
            timestamp: Utc::now().to_rfc3339(),
            ingestion,
            child_sources,
            truncated_children,
        })))
    }
}
