//! Core record types: granularity levels, components, gaps, fills, proposals,
//! and the results returned by ingestion and the recursive source walker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::payload::Payload;

/// The nine granularity labels, ordered coarsest to finest.
///
/// They are names only; every level runs the same walk and differs only in the
/// `level` tag and the level-specific flags on its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Macro,
    Micro,
    Molecular,
    Atomic,
    Subatomic,
    Quantum,
    Nanofractalized,
    SubParticular,
    Planckments,
}

impl Level {
    pub const ALL: [Level; 9] = [
        Self::Macro,
        Self::Micro,
        Self::Molecular,
        Self::Atomic,
        Self::Subatomic,
        Self::Quantum,
        Self::Nanofractalized,
        Self::SubParticular,
        Self::Planckments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Macro => "macro",
            Self::Micro => "micro",
            Self::Molecular => "molecular",
            Self::Atomic => "atomic",
            Self::Subatomic => "subatomic",
            Self::Quantum => "quantum",
            Self::Nanofractalized => "nanofractalized",
            Self::SubParticular => "sub-particular",
            Self::Planckments => "planckments",
        }
    }

    /// Extra flags carried by every component emitted at this level.
    pub fn flags(&self) -> LevelFlags {
        match self {
            Self::Planckments => LevelFlags {
                planck_scale: Some(true),
                fundamental_limit: Some(true),
                ..LevelFlags::default()
            },
            Self::Quantum => LevelFlags {
                quantum_state: Some("superposition".to_string()),
                ..LevelFlags::default()
            },
            Self::Nanofractalized => LevelFlags {
                fractal_dimension: Some(2.5),
                ..LevelFlags::default()
            },
            _ => LevelFlags::default(),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown granularity level: {s}"))
    }
}

/// Level-specific component flags. Absent flags are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planck_scale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamental_limit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractal_dimension: Option<f64>,
}

/// Position of a slot inside its parent: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceLocator {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A structural record for one slot at one granularity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// 12 hex chars of SHA-256 over `(context, locator, level)`.
    pub id: String,
    pub level: Level,
    /// Structural kind of the slot's value (`mapping`, `sequence`, `string`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub source_locator: SourceLocator,
    /// Dotted path of the parent, e.g. `.data.items[2]`. Empty at the root.
    pub context: String,
    /// 8 hex chars of SHA-256 over the slot's compact JSON rendering.
    pub value_fingerprint: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub flags: LevelFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapKind {
    EmptyMap,
    EmptySeq,
    NullSlot,
    EmptyString,
    PlaceholderText,
}

impl GapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyMap => "empty-map",
            Self::EmptySeq => "empty-seq",
            Self::NullSlot => "null-slot",
            Self::EmptyString => "empty-string",
            Self::PlaceholderText => "placeholder-text",
        }
    }

    /// Whether the filler rewrites gaps of this kind.
    pub fn is_fillable(&self) -> bool {
        matches!(self, Self::NullSlot | Self::EmptyString)
    }
}

/// A structurally defective slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Dotted path of the parent container.
    pub path: String,
    pub kind: GapKind,
    /// `None` when the gap is the root itself.
    pub key_or_index: Option<SourceLocator>,
}

/// An imputed replacement for a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub path: String,
    pub key: String,
    pub original_value: Payload,
    pub imputed_value: Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A follow-up process proposed from run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub process: String,
    pub reason: String,
    pub priority: Priority,
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// Components produced for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub count: usize,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceState {
    /// Not finalised yet.
    #[default]
    Pending,
    Persisted,
    Failed,
}

/// Everything one `ingest_payload` call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub payload_name: String,
    pub timestamp: String,
    /// The working payload after gap filling.
    pub original_payload: Payload,
    /// Exactly the nine levels, in [`Level::ALL`] order.
    pub granularity_levels: BTreeMap<Level, LevelSummary>,
    /// Sorted.
    pub matter_forms_identified: Vec<String>,
    pub source_depth: usize,
    pub depth_limit_reached: bool,
    /// Maximum nesting depth of the working payload.
    pub nesting_complexity: usize,
    pub gaps_filled: usize,
    pub gaps_identified: Vec<Gap>,
    pub filled_gaps: Vec<Fill>,
    pub proposed_processes: Vec<Proposal>,
    #[serde(default)]
    pub persistence_state: PersistenceState,
    #[serde(default)]
    pub event_log_state: PersistenceState,
}

impl IngestionResult {
    pub fn total_components(&self) -> usize {
        self.granularity_levels.values().map(|l| l.count).sum()
    }

    pub fn level_count(&self, level: Level) -> usize {
        self.granularity_levels
            .get(&level)
            .map(|l| l.count)
            .unwrap_or(0)
    }
}

/// One node of the recursive source walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub source_name: String,
    pub depth: usize,
    pub timestamp: String,
    pub ingestion: IngestionResult,
    pub child_sources: Vec<SourceResult>,
    /// Number of child candidates dropped by the fan-out cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_children: Option<usize>,
}

/// Result of walking one source: either a fully ingested node or the stub
/// returned once the depth limit is hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceResult {
    DepthLimitReached { depth_limit_reached: bool, depth: usize },
    Ingested(Box<SourceNode>),
}

impl SourceResult {
    pub fn as_node(&self) -> Option<&SourceNode> {
        match self {
            Self::Ingested(node) => Some(node),
            Self::DepthLimitReached { .. } => None,
        }
    }

    pub fn into_node(self) -> Option<SourceNode> {
        match self {
            Self::Ingested(node) => Some(*node),
            Self::DepthLimitReached { .. } => None,
        }
    }

    /// Depth-first, pre-order list of every ingested node in the walk.
    pub fn flatten(&self) -> Vec<&SourceNode> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a SourceNode>) {
        if let Self::Ingested(node) = self {
            out.push(node);
            for child in &node.child_sources {
                child.collect_nodes(out);
            }
        }
    }

    /// Deepest depth touched anywhere in the walk, stubs included.
    pub fn max_depth_touched(&self) -> usize {
        match self {
            Self::DepthLimitReached { depth, .. } => *depth,
            Self::Ingested(node) => node
                .child_sources
                .iter()
                .map(SourceResult::max_depth_touched)
                .fold(node.depth, usize::max),
        }
    }

    pub fn hit_depth_limit(&self) -> bool {
        match self {
            Self::DepthLimitReached { .. } => true,
            Self::Ingested(node) => node.child_sources.iter().any(SourceResult::hit_depth_limit),
        }
    }
}
