pub mod gaps;
pub mod ingest;
pub mod retro;
pub mod stats;

use anyhow::{Context, Result};
use std::path::Path;

use mmi::ingest::Payload;

/// Payload name for `file`: `--name` if given, else the file stem.
fn payload_name(file: &Path, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed_payload".into()),
    }
}

/// Read and parse a JSON payload file.
fn read_payload(file: &Path) -> Result<Payload> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read payload file: {}", file.display()))?;
    Payload::from_json_str(&text)
        .with_context(|| format!("failed to parse payload file: {}", file.display()))
}
