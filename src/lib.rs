//! Massive Micro Ingestion (MMI): structural decomposition of arbitrary payload trees.
//!
//! A payload (any tree of mappings, sequences, and scalars) is gap-filled,
//! decomposed once per granularity level, tagged with matter forms, and
//! summarised into a list of proposed follow-up processes. Referenced
//! sub-payloads can be walked recursively under hard depth and fan-out bounds.
//! Finalised runs are merged into a cumulative manifest and appended to a
//! Markdown event log.
//!
//! | Level | Extra component flags |
//! |-------|-----------------------|
//! | `macro` … `subatomic`, `sub-particular` | none |
//! | `quantum` | `quantum_state: "superposition"` |
//! | `nanofractalized` | `fractal_dimension: 2.5` |
//! | `planckments` | `planck_scale: true`, `fundamental_limit: true` |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`error`]: The [`error::MmiError`] taxonomy
//! - [`ingest`]: Payload model, decomposer, gap engine, source walker, proposals
//! - [`store`]: Manifest persistence and the event log
//!
//! ```no_run
//! use mmi::ingest::{MassiveMicroIngestor, Payload};
//! use mmi::store::{event_log::EventLog, manifest::ManifestStore};
//!
//! # fn main() -> mmi::error::Result<()> {
//! let manifest = ManifestStore::open("memory-bundles/mmi-manifest.json")?;
//! let mut mmi = MassiveMicroIngestor::new(manifest, EventLog::new("memory-bundles/mmi-ingestion-log.md"));
//! let payload = Payload::from_json_str(r#"{"source": {"data": 1}}"#)?;
//! let walk = mmi.ingest_sources_recursive(&payload, "example", 0, 5)?;
//! if let Some(root) = walk.into_node() {
//!     let finalized = mmi.finalize_ingestion(root.ingestion);
//!     println!("{} proposals", finalized.proposed_processes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod store;
