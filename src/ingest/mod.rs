//! Massive Micro Ingestion core.
//!
//! Payloads flow through [`gaps`] (detect, then fill), [`decompose`] (once per
//! [`types::Level`]), and [`matter`], all driven by
//! [`engine::MassiveMicroIngestor`]. [`sources`] adds the bounded recursive
//! walk over referenced sub-payloads and [`proposals`] turns run statistics
//! into follow-up tasks.

pub mod batch;
pub mod decompose;
pub mod engine;
pub mod gaps;
pub mod ident;
pub mod matter;
pub mod payload;
pub mod proposals;
pub mod sources;
pub mod types;

pub use engine::MassiveMicroIngestor;
pub use payload::Payload;
