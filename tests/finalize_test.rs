mod helpers;

use helpers::{open_ingestor, payload, TestEnv};
use mmi::ingest::types::{Level, PersistenceState};
use mmi::ingest::MassiveMicroIngestor;
use mmi::store::event_log::EventLog;
use mmi::store::manifest::ManifestStore;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn finalize_persists_manifest_and_appends_log() {
    let mut env = TestEnv::new();
    let result = env
        .mmi
        .ingest_payload(&payload(json!({"count": null, "b": [1, 2]})), "demo")
        .unwrap();
    let result = env.mmi.finalize_ingestion(result);

    assert_eq!(result.persistence_state, PersistenceState::Persisted);
    assert_eq!(result.event_log_state, PersistenceState::Persisted);

    let manifest = env.reopen().manifest().clone();
    assert_eq!(manifest.total_ingestions, 1);
    assert_eq!(manifest.gaps_filled, 1);
    assert_eq!(manifest.processes_proposed, result.proposed_processes.len() as u64);
    assert!(manifest.last_updated.is_some());
    for level in Level::ALL {
        assert_eq!(manifest.coverage(level), result.level_count(level) as u64);
    }

    let log = fs::read_to_string(env.log_path()).unwrap();
    assert!(log.contains(&format!("## MMI Ingestion: {}", result.timestamp)));
    assert!(log.contains("**Payload**: demo"));
    assert!(log.contains("- **planckments**: 4 components"));
    assert!(log.contains("- solid"));
    assert!(log.contains("### Gaps Filled: 1"));
    assert!(log.contains("- **continuous_gap_filling** (Priority: critical)"));
    assert!(log.trim_end().ends_with("---"));
}

#[test]
fn each_finalized_run_adds_its_counts() {
    let mut env = TestEnv::new();
    let inputs = [json!({"a": 1}), json!({"a": {"b": [1, 2, 3]}}), json!([1, [2]])];

    for (i, input) in inputs.iter().enumerate() {
        let before = env.mmi.manifest().clone();
        let result = env
            .mmi
            .ingest_payload(&payload(input.clone()), &format!("run{i}"))
            .unwrap();
        let result = env.mmi.finalize_ingestion(result);
        let after = env.mmi.manifest();

        assert_eq!(after.total_ingestions, before.total_ingestions + 1);
        for level in Level::ALL {
            assert_eq!(
                after.coverage(level) - before.coverage(level),
                result.level_count(level) as u64
            );
        }
    }

    let log = fs::read_to_string(env.log_path()).unwrap();
    assert_eq!(log.matches("## MMI Ingestion:").count(), 3);
}

#[test]
fn manifest_failure_is_reported_not_raised() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();

    let manifest = ManifestStore::open(blocker.join("mmi-manifest.json")).unwrap();
    let mut mmi = MassiveMicroIngestor::new(manifest, EventLog::new(tmp.path().join("log.md")));

    let result = mmi.ingest_payload(&payload(json!({"a": 1})), "p").unwrap();
    let result = mmi.finalize_ingestion(result);

    assert_eq!(result.persistence_state, PersistenceState::Failed);
    assert_eq!(result.event_log_state, PersistenceState::Persisted);
    // in-memory state still reflects the run
    assert_eq!(mmi.manifest().total_ingestions, 1);
    assert!(mmi.manifest().last_updated.is_some());
}

#[test]
fn event_log_failure_keeps_manifest_update() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();

    let manifest_path = tmp.path().join("mmi-manifest.json");
    let manifest = ManifestStore::open(&manifest_path).unwrap();
    let mut mmi = MassiveMicroIngestor::new(manifest, EventLog::new(blocker.join("log.md")));

    let result = mmi.ingest_payload(&payload(json!({"a": 1})), "p").unwrap();
    let result = mmi.finalize_ingestion(result);

    assert_eq!(result.persistence_state, PersistenceState::Persisted);
    assert_eq!(result.event_log_state, PersistenceState::Failed);
    let reopened = ManifestStore::open(&manifest_path).unwrap();
    assert_eq!(reopened.manifest().total_ingestions, 1);
}

#[test]
fn finalizing_walked_root_proposes_recursive_synthesis() {
    let mut env = TestEnv::new();
    let root = payload(helpers::source_chain(3));
    let walk = env.mmi.ingest_sources_recursive(&root, "chain", 0, 2).unwrap();
    let ingestion = walk.into_node().unwrap().ingestion;
    let result = env.mmi.finalize_ingestion(ingestion);

    assert!(result
        .proposed_processes
        .iter()
        .any(|p| p.process == "recursive_synthesis"));

    let manifest = open_ingestor(env.dir.path()).manifest().clone();
    // Root plus its three chain links at depth 1; depth 2 is the limit.
    assert_eq!(manifest.total_ingestions, 4);
    assert_eq!(manifest.source_depth_reached, 1);
}
