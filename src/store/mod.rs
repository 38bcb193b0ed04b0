//! Persistent state: the cumulative manifest and the append-only event log.

pub mod event_log;
pub mod manifest;
