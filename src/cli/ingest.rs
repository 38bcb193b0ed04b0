//! CLI `ingest` command: ingest one payload file and finalize the run.

use anyhow::Result;
use std::path::Path;

use mmi::config::MmiConfig;
use mmi::ingest::types::{IngestionResult, PersistenceState};
use mmi::ingest::MassiveMicroIngestor;

pub struct IngestOptions {
    pub name: Option<String>,
    pub recursive: bool,
    pub max_depth: usize,
    pub json: bool,
}

pub fn ingest(config: &MmiConfig, file: &Path, opts: &IngestOptions) -> Result<()> {
    let payload = super::read_payload(file)?;
    let name = super::payload_name(file, opts.name.as_deref());

    let mut mmi = MassiveMicroIngestor::from_config(config)?;

    let (result, visited) = if opts.recursive {
        let walk = mmi.ingest_sources_recursive(&payload, &name, 0, opts.max_depth)?;
        let visited = walk.flatten().len();
        match walk.into_node() {
            Some(root) => (root.ingestion, visited),
            // max_depth of 0: nothing was walked, ingest the root on its own
            None => (mmi.ingest_payload(&payload, &name)?, 1),
        }
    } else {
        (mmi.ingest_payload(&payload, &name)?, 1)
    };

    let finalized = mmi.finalize_ingestion(result);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&finalized)?);
    } else {
        print_summary(&finalized, visited);
    }

    if finalized.persistence_state == PersistenceState::Failed {
        anyhow::bail!(
            "manifest could not be written to {}",
            config.resolved_manifest_path().display()
        );
    }
    Ok(())
}

fn print_summary(result: &IngestionResult, visited: usize) {
    println!("Ingestion: {}", result.payload_name);
    println!("{}", "=".repeat(40));
    println!("  Sources ingested:    {visited}");
    println!("  Total components:    {}", result.total_components());
    println!("  Matter forms:        {}", result.matter_forms_identified.join(", "));
    println!("  Source depth:        {}", result.source_depth);
    println!("  Gaps filled:         {}", result.gaps_filled);
    println!();

    println!("By Level:");
    for (level, summary) in &result.granularity_levels {
        println!("  {:<16} {}", level.as_str(), summary.count);
    }
    println!();

    println!("Proposed Processes:");
    for p in &result.proposed_processes {
        println!("  [{:<8}] {}", p.priority.as_str(), p.process);
    }

    if result.event_log_state == PersistenceState::Failed {
        eprintln!("WARNING: event log append failed; manifest state is unaffected.");
    }
}
