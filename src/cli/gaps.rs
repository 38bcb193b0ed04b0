//! CLI `gaps` command: report gaps and the fills ingestion would make.

use anyhow::Result;
use std::path::Path;

use mmi::ingest::gaps::{detect_gaps, fill_gaps};
use mmi::ingest::sources::node_payload_name;

/// `name` and `recursive` mirror the `ingest` flags so the previewed
/// hash-derived fills match what ingestion would impute.
pub fn gaps(file: &Path, name: Option<&str>, recursive: bool) -> Result<()> {
    let payload = super::read_payload(file)?;
    let gaps = detect_gaps(&payload);

    if gaps.is_empty() {
        println!("No gaps found in {}", file.display());
        return Ok(());
    }

    println!("Gaps ({}):", gaps.len());
    for gap in &gaps {
        let slot = gap
            .key_or_index
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "(root)".into());
        println!("  {:<18} {}  {}", gap.kind.as_str(), gap.path, slot);
    }

    let name = super::payload_name(file, name);
    let context = if recursive {
        node_payload_name(&name, 0)
    } else {
        name
    };
    let (_, fills) = fill_gaps(&payload, &context);
    if !fills.is_empty() {
        println!();
        println!("Fills ({}):", fills.len());
        for fill in &fills {
            println!(
                "  {}.{}: {} -> {}",
                fill.path, fill.key, fill.original_value, fill.imputed_value
            );
        }
    }

    Ok(())
}
