//! End-to-end tests for the decomposition service

use decomp_cache::{AnalysisCache, AnalysisRequest, MemoryCache};
use decomp_core::{
    AnalyzerConfig, CacheBackend, CacheConfig, CacheStatus, DecompositionService, ServiceError,
};
use decomp_model::{ConfidenceLevel, HealthMetrics};
use decomp_test_utils::{
    invoice_decomposition, invoice_response, test_config, ScriptedCompletion, TEST_MODEL_ID,
    TEST_PROMPT_VERSION,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn service_with(source: Arc<ScriptedCompletion>) -> (DecompositionService, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let service = DecompositionService::new(test_config(), cache.clone(), source);
    (service, cache)
}

#[tokio::test]
async fn miss_then_hits_call_the_model_once() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let (service, cache) = service_with(source.clone());
    let request = AnalysisRequest::new("Approve supplier invoices").with_team_size(4);

    let first = service.analyze(&request).await.unwrap();
    assert_eq!(first.cache_status, CacheStatus::Miss);
    assert!(!first.output.partial);
    assert_eq!(first.output.meta.prompt_version, TEST_PROMPT_VERSION);
    assert_eq!(first.output.meta.model_used, TEST_MODEL_ID);
    assert_eq!(first.output.meta.input_tokens, 1000);
    assert_eq!(first.output.decomposition.health.team_size, Some(4));
    assert_eq!(cache.len(), 1);

    for expected in 1..=3 {
        let hit = service.analyze(&request).await.unwrap();
        assert_eq!(hit.cache_status, CacheStatus::Hit);
        assert_eq!(hit.hit_count, expected);
        assert_eq!(hit.hash, first.hash);
        assert_eq!(hit.output.decomposition, first.output.decomposition);
    }

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn reference_scores_survive_the_service() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let (service, _) = service_with(source);

    let outcome = service
        .analyze(&AnalysisRequest::new("Approve supplier invoices"))
        .await
        .unwrap();
    let health = &outcome.output.decomposition.health;

    assert_eq!(health.complexity, 31);
    assert_eq!(health.fragility, 45);
    assert_eq!(health.automation_potential, 60);
    assert_eq!(health.team_load_balance, 100);
    assert_eq!(health.confidence.as_ref().unwrap().level, ConfidenceLevel::Inferred);
    assert!(outcome.integrity.unwrap().is_clean());
}

#[tokio::test]
async fn cost_figures_share_a_cache_entry() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let (service, _) = service_with(source.clone());

    let cheap = AnalysisRequest::new("Approve  supplier invoices").with_costs(20.0, 1.0);
    let pricey = AnalysisRequest::new("Approve supplier invoices ").with_costs(300.0, 8.0);

    service.analyze(&cheap).await.unwrap();
    let second = service.analyze(&pricey).await.unwrap();

    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn partial_results_are_not_cached() {
    let source = Arc::new(ScriptedCompletion::new([
        "I am not able to describe this workflow.".to_string(),
        invoice_response(),
    ]));
    let (service, cache) = service_with(source.clone());
    let request = AnalysisRequest::new("Something vague");

    let degraded = service.analyze(&request).await.unwrap();
    assert!(degraded.output.partial);
    assert!(degraded
        .output
        .recovery_reason
        .as_deref()
        .unwrap()
        .contains("Could not extract"));
    assert_eq!(degraded.output.decomposition.title, "Untitled workflow");
    assert!(cache.is_empty());

    let retried = service.analyze(&request).await.unwrap();
    assert_eq!(retried.cache_status, CacheStatus::Miss);
    assert!(!retried.output.partial);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn numeric_payload_id_is_cached_as_complete() {
    let response = r#"{"id": 42, "title": "T",
        "steps": [{"id": "a", "name": "A", "layer": "human", "automationScore": 10}],
        "gaps": []}"#;
    let source = Arc::new(ScriptedCompletion::new([response]));
    let (service, cache) = service_with(source.clone());
    let request = AnalysisRequest::new("Numbered flow");

    let first = service.analyze(&request).await.unwrap();
    assert!(!first.output.partial);
    assert_eq!(first.output.decomposition.id, "42");
    assert_eq!(cache.len(), 1);

    let second = service.analyze(&request).await.unwrap();
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn non_object_response_is_an_error() {
    let source = Arc::new(ScriptedCompletion::new(["[\"step one\", \"step two\"]"]));
    let (service, cache) = service_with(source);

    let err = service
        .analyze(&AnalysisRequest::new("List steps"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Pipeline(_)));
    assert!(!err.is_retryable());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn completion_failure_is_retryable() {
    let source = Arc::new(ScriptedCompletion::failing("upstream 503"));
    let (service, _) = service_with(source);

    let err = service
        .analyze(&AnalysisRequest::new("Anything"))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("upstream 503"));
}

#[tokio::test]
async fn prompt_version_bump_misses_the_cache() {
    let cache = Arc::new(MemoryCache::new());
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let request = AnalysisRequest::new("Approve supplier invoices");

    let v1 = DecompositionService::new(test_config(), cache.clone(), source.clone());
    let v2 = DecompositionService::new(
        test_config().with_prompt_version("test-v2"),
        cache.clone(),
        source.clone(),
    );

    let a = v1.analyze(&request).await.unwrap();
    let b = v2.analyze(&request).await.unwrap();

    assert_ne!(a.hash, b.hash);
    assert_eq!(b.cache_status, CacheStatus::Miss);
    assert_eq!(cache.len(), 2);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn from_config_builds_bounded_store() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let config = test_config().with_cache(CacheConfig {
        backend: CacheBackend::Bounded,
        max_capacity: 10,
        ttl_secs: Some(60),
    });

    let service = DecompositionService::from_config(config, source.clone()).unwrap();
    assert_eq!(service.config().cache.max_capacity, 10);
    let request = AnalysisRequest::new("Approve supplier invoices");
    service.analyze(&request).await.unwrap();
    let hit = service.analyze(&request).await.unwrap();

    assert_eq!(hit.cache_status, CacheStatus::Hit);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn from_config_rejects_invalid_config() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let err = DecompositionService::from_config(AnalyzerConfig::new().with_model_id(""), source)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));
}

#[tokio::test]
async fn cached_entry_is_visible_through_the_store() {
    let source = Arc::new(ScriptedCompletion::new([invoice_response()]));
    let (service, cache) = service_with(source);

    let outcome = service
        .analyze(&AnalysisRequest::new("Approve supplier invoices"))
        .await
        .unwrap();

    let entry = cache.get(&outcome.hash).await.unwrap().unwrap();
    assert_eq!(entry.hash, outcome.hash);
    assert_eq!(entry.metadata, outcome.output.meta);
    assert_eq!(entry.hit_count, 1);
}

#[test]
fn compare_through_the_service() {
    let (service, _) = service_with(Arc::new(ScriptedCompletion::new([invoice_response()])));

    let before = invoice_decomposition(HealthMetrics {
        fragility: 45,
        automation_potential: 60,
        ..HealthMetrics::default()
    });
    let mut after = before.clone();
    after.gaps.remove(0);
    after.health.fragility = 25;

    let report = service.compare(&before, &after);
    assert_eq!(report.gaps_resolved.len(), 1);
    assert_eq!(report.gaps_persistent.len(), 1);
    assert_eq!(report.summary, "1 gap resolved, fragility reduced by 20 points.");
}
