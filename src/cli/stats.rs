use anyhow::Result;

use mmi::config::MmiConfig;
use mmi::ingest::types::Level;
use mmi::store::manifest::ManifestStore;

/// Display the cumulative manifest in the terminal.
pub fn stats(config: &MmiConfig) -> Result<()> {
    let path = config.resolved_manifest_path();
    if !path.exists() {
        println!("Manifest: not found at {}", path.display());
        println!("Run `mmi ingest <file>` to create it.");
        return Ok(());
    }

    let store = ManifestStore::open(&path)?;
    let manifest = store.manifest();

    println!("MMI Manifest");
    println!("{}", "=".repeat(40));
    println!("  Version:             {}", manifest.version);
    println!("  Created:             {}", manifest.created_at);
    if let Some(ref updated) = manifest.last_updated {
        println!("  Last updated:        {updated}");
    }
    println!("  Total ingestions:    {}", manifest.total_ingestions);
    println!("  Source depth:        {}", manifest.source_depth_reached);
    println!("  Gaps filled:         {}", manifest.gaps_filled);
    println!("  Processes proposed:  {}", manifest.processes_proposed);
    println!();

    println!("Granularity Coverage:");
    for level in Level::ALL {
        println!("  {:<16} {}", level.as_str(), manifest.coverage(level));
    }

    Ok(())
}
