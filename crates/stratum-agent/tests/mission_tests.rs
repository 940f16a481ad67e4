//! Integration tests for stratum-agent
//!
//! Missions run against a real in-memory store, with the Promotion Engine
//! driven by a mock oracle.

use std::sync::Arc;
use stratum_agent::{AgentError, HierarchyConfig, Mission, ORCHESTRATOR_ID};
use stratum_curator::{CuratorConfig, PromotionEngine};
use stratum_domain::EntryState;
use stratum_oracle::{LlmOracle, MockProvider};
use stratum_store::{MemoryStore, StoreConfig};

type Engine = PromotionEngine<LlmOracle<MockProvider>, MemoryStore>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn store() -> Arc<MemoryStore> {
    init_tracing();
    Arc::new(MemoryStore::open(&StoreConfig::in_memory().without_seed()).unwrap())
}

fn engine(store: &Arc<MemoryStore>, provider: &MockProvider) -> Engine {
    PromotionEngine::new(
        LlmOracle::new(provider.clone()),
        Arc::clone(store),
        CuratorConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_finish_promotes_specialist_claims() {
    let store = store();
    let mission = Mission::start(Arc::clone(&store), "Find X", HierarchyConfig::default()).unwrap();
    let research = mission.root().spawn_child("research").unwrap();
    let id = research.propose("X=5", "reasoning", Some(0.8)).unwrap();
    research.record_output("X appears to be 5").unwrap();

    let provider = MockProvider::new("[]");
    provider.add_response(
        "Curate these",
        &format!(
            r#"[{{"action": "promote", "entry_id": "{}", "namespace": "facts", "key": "X", "confidence": 0.8}}]"#,
            id
        ),
    );
    let engine = engine(&store, &provider);

    let task_id = mission.task_id().to_string();
    let report = mission.finish("X is 5", &engine).await.unwrap();
    assert_eq!(report.promoted(), 1);

    let fact = store.canonical().get("facts/X").unwrap().unwrap();
    assert_eq!(fact.content, "X=5");
    assert_eq!(store.low_trust().get(id).unwrap().unwrap().state(), EntryState::Promoted);

    let record = store.tasks().read(&task_id).unwrap().unwrap();
    assert_eq!(record.outputs.get(ORCHESTRATOR_ID).unwrap(), "X is 5");
    assert_eq!(record.outputs.get("research").unwrap(), "X appears to be 5");
}

#[tokio::test]
async fn test_finish_truncates_output() {
    let store = store();
    let config = HierarchyConfig {
        output_chars: 10,
        ..HierarchyConfig::default()
    };
    let mission = Mission::start(Arc::clone(&store), "Write", config).unwrap();
    let task_id = mission.task_id().to_string();

    let provider = MockProvider::new("[]");
    let engine = engine(&store, &provider);
    let report = mission.finish(&"é".repeat(40), &engine).await.unwrap();

    // Nothing pending, so the oracle is never asked
    assert!(report.is_noop());
    assert_eq!(provider.call_count(), 0);

    let record = store.tasks().read(&task_id).unwrap().unwrap();
    assert_eq!(record.outputs.get(ORCHESTRATOR_ID).unwrap().chars().count(), 10);
}

#[tokio::test]
async fn test_specialist_cannot_curate() {
    let store = store();
    let mission = Mission::start(Arc::clone(&store), "p", HierarchyConfig::default()).unwrap();
    let child = mission.root().spawn_child("code").unwrap();
    child.propose("use tokio", "reasoning", None).unwrap();

    let provider = MockProvider::new("[]");
    let engine = engine(&store, &provider);
    assert!(matches!(
        child.curate(&engine).await,
        Err(AgentError::NotPermitted(_))
    ));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_curate_refuses_foreign_engine() {
    let store = store();
    let other = self::store();
    let mission = Mission::start(Arc::clone(&store), "p", HierarchyConfig::default()).unwrap();

    let provider = MockProvider::new("[]");
    let engine = engine(&other, &provider);
    assert!(matches!(
        mission.root().curate(&engine).await,
        Err(AgentError::NotPermitted(_))
    ));
}

#[tokio::test]
async fn test_oracle_failure_keeps_output_and_claims() {
    let store = store();
    let mission = Mission::start(Arc::clone(&store), "p", HierarchyConfig::default()).unwrap();
    let root = mission.root().clone();
    let id = root
        .spawn_child("data")
        .unwrap()
        .propose("rows=10", "csv", None)
        .unwrap();

    let engine = engine(&store, &MockProvider::failing("down"));
    assert!(matches!(
        mission.finish("done", &engine).await,
        Err(AgentError::Curation(_))
    ));

    let record = store.tasks().read(root.task_id()).unwrap().unwrap();
    assert_eq!(record.outputs.get(ORCHESTRATOR_ID).unwrap(), "done");
    assert!(store.low_trust().get(id).unwrap().unwrap().is_pending());
}

#[test]
fn test_orchestrator_direct_write_is_not_overwritten() {
    let store = store();
    let mission = Mission::start(Arc::clone(&store), "p", HierarchyConfig::default()).unwrap();
    let root = mission.root();

    let key = root
        .write_canonical("facts", "X", "X=5", None, None, false)
        .unwrap();
    assert_eq!(key.id(), "facts/X");
    let fact = store.canonical().get("facts/X").unwrap().unwrap();
    assert_eq!(fact.source, ORCHESTRATOR_ID);
    assert_eq!(fact.confidence.value(), 0.9);
    assert!(!fact.confirmed_by_human);

    assert!(matches!(
        root.write_canonical("facts", "X", "X=6", Some("user_confirmed"), None, true),
        Err(AgentError::Store(_))
    ));
    assert_eq!(store.canonical().get("facts/X").unwrap().unwrap().content, "X=5");
}

#[test]
fn test_orchestrator_records_who_confirmed_a_fact() {
    let store = store();
    let mission = Mission::start(Arc::clone(&store), "p", HierarchyConfig::default()).unwrap();
    let root = mission.root();

    root.write_canonical("decisions", "runtime", "use tokio", Some("test_passed"), Some(1.0), false)
        .unwrap();
    root.write_canonical("facts", "owner", "Ada", Some("user_confirmed"), None, true)
        .unwrap();

    let runtime = store.canonical().get("decisions/runtime").unwrap().unwrap();
    assert_eq!(runtime.source, "test_passed");
    assert_eq!(runtime.confidence.value(), 1.0);
    assert!(!runtime.confirmed_by_human);

    let owner = store.canonical().get("facts/owner").unwrap().unwrap();
    assert_eq!(owner.source, "user_confirmed");
    assert!(owner.confirmed_by_human);
}

#[test]
fn test_missions_get_separate_ledgers() {
    let store = store();
    let a = Mission::start(Arc::clone(&store), "a", HierarchyConfig::default()).unwrap();
    let b = Mission::start(Arc::clone(&store), "b", HierarchyConfig::default()).unwrap();
    assert_ne!(a.task_id(), b.task_id());

    a.root().spawn_child("research").unwrap().propose("only in a", "s", None).unwrap();
    let context = b.root().context().unwrap();
    assert!(!context.contains("only in a"));
    assert_eq!(store.tasks().len().unwrap(), 2);
}
