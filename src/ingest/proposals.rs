//! Proposal synthesizer: turns run statistics into a list of follow-up processes.
//!
//! Every rule is evaluated independently and the output keeps rule order, not
//! priority order. Proposals depend only on [`RunStatistics`], never on the
//! clock.

use std::collections::BTreeMap;

use serde_json::json;

use super::types::{IngestionResult, Level, Priority, Proposal};

/// Component volume above which parallel processing is proposed.
pub const VOLUME_THRESHOLD: usize = 1000;
/// Nesting depth above which hierarchical reduction is proposed.
pub const COMPLEXITY_THRESHOLD: usize = 5;

/// The statistics a proposal list is a function of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub total_components: usize,
    pub nesting_complexity: usize,
    pub populated_levels: usize,
    pub source_depth: usize,
    pub depth_limit_reached: bool,
    pub gaps_identified: usize,
    pub gaps_filled: usize,
}

impl RunStatistics {
    pub fn from_result(result: &IngestionResult) -> Self {
        Self {
            total_components: result.total_components(),
            nesting_complexity: result.nesting_complexity,
            populated_levels: Level::ALL
                .iter()
                .filter(|l| result.level_count(**l) > 0)
                .count(),
            source_depth: result.source_depth,
            depth_limit_reached: result.depth_limit_reached,
            gaps_identified: result.gaps_identified.len(),
            gaps_filled: result.gaps_filled,
        }
    }
}

fn proposal(
    process: &str,
    reason: String,
    priority: Priority,
    details: impl IntoIterator<Item = (&'static str, serde_json::Value)>,
) -> Proposal {
    Proposal {
        process: process.to_string(),
        reason,
        priority,
        details: details
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn propose_processes(stats: &RunStatistics) -> Vec<Proposal> {
    let mut proposals = Vec::new();

    if stats.total_components > VOLUME_THRESHOLD {
        proposals.push(proposal(
            "parallel_processing",
            format!(
                "Large data volume ({} components) requires parallel processing",
                stats.total_components
            ),
            Priority::High,
            [("estimated_speedup", json!("10-50x"))],
        ));
    }

    if stats.nesting_complexity > COMPLEXITY_THRESHOLD {
        proposals.push(proposal(
            "hierarchical_reduction",
            format!(
                "High complexity ({}) needs hierarchical reduction",
                stats.nesting_complexity
            ),
            Priority::Medium,
            [("estimated_improvement", json!("70% complexity reduction"))],
        ));
    }

    if stats.populated_levels == Level::ALL.len() {
        proposals.push(proposal(
            "quantum_level_optimization",
            "Full granularity depth reached, enable quantum-level optimization".to_string(),
            Priority::High,
            [("capability", json!("planck_scale_manipulation"))],
        ));
    }

    if stats.depth_limit_reached {
        proposals.push(proposal(
            "recursive_synthesis",
            format!(
                "Maximum source depth ({}) reached, synthesize multi-level insights",
                stats.source_depth
            ),
            Priority::Critical,
            [("output_multiplier", json!("exponential"))],
        ));
    }

    if stats.gaps_filled > 0 {
        proposals.push(proposal(
            "continuous_gap_filling",
            format!(
                "Identified {} gaps requiring continuous monitoring",
                stats.gaps_identified
            ),
            Priority::Critical,
            [
                ("gaps_identified", json!(stats.gaps_identified)),
                ("gaps_filled", json!(stats.gaps_filled)),
            ],
        ));
    }

    proposals.push(proposal(
        "output_maximization_engine",
        "Optimize all operations for maximum output quality and completeness".to_string(),
        Priority::Critical,
        [(
            "targets",
            json!(["quality", "completeness", "coherence", "actionability"]),
        )],
    ));

    proposals
}
