use anyhow::Result;
use std::path::Path;

use mmi::config::MmiConfig;
use mmi::ingest::types::PersistenceState;
use mmi::ingest::MassiveMicroIngestor;

/// Ingest every text file under `dir` and print a summary.
pub fn retro(config: &MmiConfig, dir: &Path) -> Result<()> {
    anyhow::ensure!(dir.is_dir(), "not a directory: {}", dir.display());

    let mut mmi = MassiveMicroIngestor::from_config(config)?;
    let summary = mmi.ingest_directory(dir);

    println!("Batch Ingestion");
    println!("{}", "=".repeat(40));
    println!("  Files ingested:      {}", summary.files_ingested);
    println!("  Files skipped:       {}", summary.files_skipped);
    println!("  Total components:    {}", summary.total_components);
    println!("  Gaps filled:         {}", summary.gaps_filled);
    println!("  Processes proposed:  {}", summary.processes_proposed);
    println!("  Errors:              {}", summary.errors.len());
    for err in &summary.errors {
        println!("    - {err}");
    }

    if summary.event_log_state == PersistenceState::Failed {
        eprintln!("WARNING: event log append failed; manifest state is unaffected.");
    }
    if summary.persistence_state == PersistenceState::Failed {
        anyhow::bail!(
            "manifest could not be written to {}",
            config.resolved_manifest_path().display()
        );
    }
    Ok(())
}
