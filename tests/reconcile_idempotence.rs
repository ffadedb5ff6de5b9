//! Reconciliation invariant tests
//!
//! - Re-running reconcile converges with an empty diff and no failed steps
//! - An existing collection is never dropped or recreated
//! - Step failures are reported, never silently swallowed
//! - Concurrent runs against the same target serialize under the advisory
//!   lock; distinct targets run in parallel

use std::path::Path;
use std::sync::Arc;
use std::thread;

use docward::config::{CollectionTarget, CredentialSpec, ProvisioningConfig};
use docward::index::IndexDefinition;
use docward::observability::{EventKind, MemoryRecorder};
use docward::provision::{
    EngineAdmin, MemoryEngine, ProvisioningOrchestrator, Step, StepOutcome, TargetLocks,
};
use docward::schema::{FieldDomain, FieldSpec, SchemaDescriptor};
use docward::validation::ValidationMode;

// =============================================================================
// Helpers
// =============================================================================

fn movie_target() -> CollectionTarget {
    let schema = SchemaDescriptor::new(vec![
        FieldSpec::required("id", FieldDomain::Integer),
        FieldSpec::required("title", FieldDomain::String),
        FieldSpec::optional("genres", FieldDomain::String),
        FieldSpec::optional("vote_average", FieldDomain::Double),
    ])
    .unwrap();

    CollectionTarget::new(
        "tmdb_movies",
        schema,
        ValidationMode::Warn,
        vec![
            IndexDefinition::ascending("idx_tmdb_id", "id").into_unique(),
            IndexDefinition::ascending("idx_genres", "genres"),
            IndexDefinition::descending("idx_vote_avg", "vote_average"),
        ],
        Some(CredentialSpec::new(
            "movies_user",
            "MOVIES_DB_PASSWORD",
            vec!["readWrite".into()],
        )),
    )
    .unwrap()
}

// =============================================================================
// Idempotence
// =============================================================================

/// Two consecutive runs with no external change: the second reports zero
/// failed steps and touches neither collection nor indexes.
#[test]
fn test_reconcile_twice_converges() {
    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);
    let target = movie_target();

    let first = orchestrator.reconcile(&target);
    assert!(first.fully_converged());

    let mark = engine.operations().len();
    let second = orchestrator.reconcile(&target);

    assert!(second.fully_converged());
    assert_eq!(second.failed_steps().count(), 0);
    assert_eq!(
        second.step(Step::ApplyIndexes).unwrap().outcome,
        StepOutcome::Unchanged
    );

    // The only mutation on a converged target is the idempotent validator set
    assert_eq!(
        &engine.operations()[mark..],
        &["set_validator tmdb_movies"]
    );
}

/// Reconciling over an existing collection applies "set" semantics only;
/// the collection itself is never recreated.
#[test]
fn test_existing_collection_never_recreated() {
    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);
    let target = movie_target();

    orchestrator.reconcile(&target);
    orchestrator.reconcile(&target);
    orchestrator.reconcile(&target);

    let creates = engine
        .operations()
        .iter()
        .filter(|op| op.starts_with("create_collection"))
        .count();
    assert_eq!(creates, 1);
}

/// A stale live index is dropped and a drifted one replaced, with drops
/// ahead of creates.
#[test]
fn test_drift_convergence() {
    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);
    let target = movie_target();

    orchestrator.reconcile(&target);

    // Inject drift: one stale index, one with a flipped direction
    engine
        .create_index("tmdb_movies", &IndexDefinition::ascending("idx_stale", "x"))
        .unwrap();
    engine.drop_index("tmdb_movies", "idx_vote_avg").unwrap();
    engine
        .create_index(
            "tmdb_movies",
            &IndexDefinition::ascending("idx_vote_avg", "vote_average"),
        )
        .unwrap();

    let mark = engine.operations().len();
    let report = orchestrator.reconcile(&target);
    assert!(report.fully_converged());

    let ops: Vec<String> = engine.operations()[mark..].to_vec();
    assert_eq!(
        ops,
        vec![
            "set_validator tmdb_movies",
            "drop_index tmdb_movies idx_stale",
            "drop_index tmdb_movies idx_vote_avg",
            "create_index tmdb_movies idx_vote_avg",
        ]
    );

    let live = engine.collection("tmdb_movies").unwrap().indexes;
    assert_eq!(live.len(), 3);
    assert!(live.iter().all(|i| i.name != "idx_stale"));
}

// =============================================================================
// Failure reporting
// =============================================================================

/// A failed index build surfaces as a failed step; the report never claims
/// full convergence.
#[test]
fn test_partial_convergence_is_reported() {
    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);
    engine.fail_index_create("idx_genres");

    let report = orchestrator.reconcile(&movie_target());

    assert!(!report.fully_converged());
    assert_eq!(report.failed_steps().count(), 1);
    assert_eq!(recorder.of_kind(EventKind::StepFailed).len(), 1);
    assert!(report.to_string().contains("partially converged"));
}

/// Credential privilege failure is reported against the credential step,
/// leaving collection provisioning converged.
#[test]
fn test_credential_failure_distinct_from_collection() {
    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);
    engine.deny_credential_creation(true);

    let report = orchestrator.reconcile(&movie_target());

    let failed: Vec<_> = report.failed_steps().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].step, Step::EnsureCredential);
    assert!(report.step(Step::EnsureCollection).unwrap().outcome.is_converged());
}

// =============================================================================
// Concurrency
// =============================================================================

/// Parallel reconciles of the same target under the advisory lock leave
/// exactly one collection create and one credential create.
#[test]
fn test_same_target_serialized_under_lock() {
    let engine = Arc::new(MemoryEngine::new());
    let recorder = Arc::new(MemoryRecorder::new());
    let locks = Arc::new(TargetLocks::new());
    let target = movie_target();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let recorder = recorder.clone();
            let locks = locks.clone();
            let target = target.clone();
            thread::spawn(move || {
                let orchestrator = ProvisioningOrchestrator::new(&*engine, &*recorder);
                orchestrator.reconcile_serialized(&locks, &target)
            })
        })
        .collect();

    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(reports.iter().all(|r| r.fully_converged()));

    let ops = engine.operations();
    let collection_creates = ops.iter().filter(|op| op.starts_with("create_collection")).count();
    let credential_creates = ops.iter().filter(|op| op.starts_with("create_credential")).count();
    assert_eq!(collection_creates, 1);
    assert_eq!(credential_creates, 1);

    let live = engine.collection("tmdb_movies").unwrap().indexes;
    assert_eq!(live.len(), 3);
}

/// Distinct targets reconcile in parallel without coordination.
#[test]
fn test_distinct_targets_run_in_parallel() {
    let engine = Arc::new(MemoryEngine::new());
    let recorder = Arc::new(MemoryRecorder::new());
    let locks = Arc::new(TargetLocks::new());

    let schema = SchemaDescriptor::new(vec![FieldSpec::required("id", FieldDomain::Integer)])
        .unwrap();
    let targets: Vec<CollectionTarget> = (0..4)
        .map(|i| {
            CollectionTarget::new(
                format!("collection_{}", i),
                schema.clone(),
                ValidationMode::Enforce,
                vec![IndexDefinition::ascending(format!("idx_{}", i), "id").into_unique()],
                None,
            )
            .unwrap()
        })
        .collect();

    let handles: Vec<_> = targets
        .into_iter()
        .map(|target| {
            let engine = engine.clone();
            let recorder = recorder.clone();
            let locks = locks.clone();
            thread::spawn(move || {
                let orchestrator = ProvisioningOrchestrator::new(&*engine, &*recorder);
                orchestrator.reconcile_serialized(&locks, &target)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().fully_converged());
    }
    for i in 0..4 {
        assert!(engine.collection(&format!("collection_{}", i)).is_some());
    }
}

// =============================================================================
// Shipped configuration
// =============================================================================

/// The shipped movie-catalog configuration loads and fully converges on an
/// empty engine.
#[test]
fn test_demo_config_provisions() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/movies.json");
    let config = ProvisioningConfig::from_file(&path).unwrap();

    let target = config.target("tmdb_movies").unwrap();
    assert_eq!(target.mode(), ValidationMode::Warn);
    assert_eq!(target.schema().fields().len(), 13);
    assert_eq!(target.index_plan().len(), 5);

    let engine = MemoryEngine::new();
    let recorder = MemoryRecorder::new();
    let orchestrator = ProvisioningOrchestrator::new(&engine, &recorder);

    let report = orchestrator.reconcile(target);
    assert!(report.fully_converged());

    let collection = engine.collection("tmdb_movies").unwrap();
    assert_eq!(collection.indexes.len(), 5);
    assert_eq!(collection.validator["required"], serde_json::json!(["id", "title"]));
    assert_eq!(
        engine.credential("movies_user").unwrap().roles,
        vec!["readWrite".to_string()]
    );
}
