//! Tests for router module

use super::*;
use crate::catalog::{ModelSpec, ProviderCatalog, ProviderKind, ProviderSettings};
use crate::cost::UsageEvent;
use crate::error::Error;
use crate::providers::ScriptedProvider;
use crate::resilience::{CircuitBreakerConfig, CircuitState, RetryConfig};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fixtures
// ============================================================================

fn catalog() -> ProviderCatalog {
    ProviderCatalog::new(vec![
        ProviderSettings::new(
            "alpha",
            ProviderKind::OpenAi,
            1,
            ModelSpec::new("alpha-fast", ModelTier::Fast, 1.0, 2.0, 128_000),
        )
        .with_model(ModelSpec::new(
            "alpha-premium",
            ModelTier::Premium,
            10.0,
            30.0,
            128_000,
        )),
        ProviderSettings::new(
            "beta",
            ProviderKind::Mistral,
            2,
            ModelSpec::new("beta-fast", ModelTier::Fast, 0.1, 0.2, 32_000),
        ),
        ProviderSettings::new(
            "gamma",
            ProviderKind::Groq,
            3,
            ModelSpec::new("gamma-fast", ModelTier::Fast, 0.5, 1.0, 32_000),
        ),
    ])
}

fn fast_retry() -> RetryConfig {
    RetryConfig::new()
        .with_max_attempts(2)
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(10))
        .with_jitter(false)
}

fn config() -> RouterConfig {
    RouterConfig::default().with_retry(fast_retry())
}

struct Harness {
    router: LlmRouter,
    alpha: Arc<ScriptedProvider>,
    beta: Arc<ScriptedProvider>,
    gamma: Arc<ScriptedProvider>,
}

fn harness_with(catalog: ProviderCatalog, config: RouterConfig) -> Harness {
    let alpha = Arc::new(ScriptedProvider::new("alpha", ProviderKind::OpenAi));
    let beta = Arc::new(ScriptedProvider::new("beta", ProviderKind::Mistral));
    let gamma = Arc::new(ScriptedProvider::new("gamma", ProviderKind::Groq));

    let mut router = LlmRouter::new(catalog, config);
    router.register(alpha.clone()).unwrap();
    router.register(beta.clone()).unwrap();
    router.register(gamma.clone()).unwrap();

    Harness {
        router,
        alpha,
        beta,
        gamma,
    }
}

fn harness() -> Harness {
    harness_with(catalog(), config())
}

fn conversation() -> Vec<Message> {
    vec![
        Message::system("You are a calm relationship coach."),
        Message::user("We keep arguing about chores."),
    ]
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_task_type_recommended_tier() {
    assert_eq!(
        TaskType::Classification.recommended_tier(),
        ModelTier::UltraBudget
    );
    assert_eq!(TaskType::Summarization.recommended_tier(), ModelTier::Fast);
    assert_eq!(
        TaskType::WhisperSuggestion.recommended_tier(),
        ModelTier::Fast
    );
    assert_eq!(
        TaskType::Conversation.recommended_tier(),
        ModelTier::Standard
    );
    assert_eq!(
        TaskType::ComprehensiveAnalysis.recommended_tier(),
        ModelTier::Premium
    );
}

#[test]
fn test_task_type_serde_names() {
    for task in TaskType::ALL {
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, format!("\"{}\"", task.as_str()));
    }
}

#[test]
fn test_model_tier_constrain() {
    assert_eq!(
        ModelTier::Premium.constrain_to(&ModelTier::Fast),
        ModelTier::Fast
    );
    assert_eq!(
        ModelTier::UltraBudget.constrain_to(&ModelTier::Standard),
        ModelTier::UltraBudget
    );
}

#[test]
fn test_rules_token_budget_override() {
    let mut rules = RoutingRules::default();
    rules
        .task_token_budgets
        .insert(TaskType::Summarization, crate::token::TokenBudget::new(64, 0.1));

    assert_eq!(rules.get_token_budget(TaskType::Summarization).max_tokens, 64);
    assert_eq!(
        rules.get_token_budget(TaskType::Conversation).max_tokens,
        TaskType::Conversation.default_token_budget().max_tokens
    );
}

#[test]
fn test_rules_target_tier_caps() {
    let rules = RoutingRules {
        max_tier: Some(ModelTier::Standard),
        ..Default::default()
    };
    assert_eq!(
        rules.target_tier(TaskType::ComprehensiveAnalysis, None),
        ModelTier::Standard
    );
    assert_eq!(
        rules.target_tier(TaskType::ComprehensiveAnalysis, Some(ModelTier::Fast)),
        ModelTier::Fast
    );
}

#[test]
fn test_register_requires_catalog_entry() {
    let mut router = LlmRouter::new(catalog(), config());
    let stranger = Arc::new(ScriptedProvider::new("stranger", ProviderKind::OpenAi));
    assert!(matches!(router.register(stranger), Err(Error::Config(_))));
}

// ============================================================================
// Planning
// ============================================================================

#[tokio::test]
async fn test_plan_priority_order() {
    let h = harness();
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;

    assert_eq!(plan.strategy, RoutingStrategy::Priority);
    assert_eq!(plan.provider_order(), vec!["alpha", "beta", "gamma"]);
    // Standard is not served by alpha; the best model below it is chosen
    assert_eq!(plan.candidates[0].model, "alpha-fast");
    assert!(plan.skipped.is_empty());
}

#[tokio::test]
async fn test_plan_cost_optimized() {
    let h = harness_with(
        catalog(),
        config().with_strategy(RoutingStrategy::CostOptimized),
    );
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;

    assert_eq!(plan.provider_order(), vec!["beta", "gamma", "alpha"]);
    assert!(plan.candidates[0].estimated_cost < plan.candidates[2].estimated_cost);
}

#[tokio::test]
async fn test_plan_latency_optimized() {
    let h = harness();
    h.router
        .health("alpha")
        .unwrap()
        .record_success(Duration::from_millis(200));
    h.router
        .health("gamma")
        .unwrap()
        .record_success(Duration::from_millis(10));

    let options = RouteOptions::default().with_strategy(RoutingStrategy::LatencyOptimized);
    let plan = h.router.plan(TaskType::Conversation, &options).await;

    // Providers without observations go last
    assert_eq!(plan.provider_order(), vec!["gamma", "alpha", "beta"]);
}

#[tokio::test]
async fn test_latency_sensitive_task_defaults_to_latency_strategy() {
    let h = harness();
    let plan = h
        .router
        .plan(TaskType::WhisperSuggestion, &RouteOptions::default())
        .await;
    assert_eq!(plan.strategy, RoutingStrategy::LatencyOptimized);

    let forced = RouteOptions::default().with_strategy(RoutingStrategy::Priority);
    let plan = h.router.plan(TaskType::WhisperSuggestion, &forced).await;
    assert_eq!(plan.strategy, RoutingStrategy::Priority);
}

#[tokio::test]
async fn test_plan_skip_reasons() {
    let mut catalog = catalog();
    catalog.push(
        ProviderSettings::new(
            "off",
            ProviderKind::Anthropic,
            4,
            ModelSpec::new("off-fast", ModelTier::Fast, 0.1, 0.1, 8_000),
        )
        .with_enabled(false),
    );
    catalog.push(ProviderSettings::new(
        "keyless",
        ProviderKind::HuggingFace,
        5,
        ModelSpec::new("keyless-fast", ModelTier::Fast, 0.1, 0.1, 8_000),
    ));
    catalog.push(
        ProviderSettings::new(
            "labeler",
            ProviderKind::OpenRouter,
            6,
            ModelSpec::new("labeler-tiny", ModelTier::UltraBudget, 0.01, 0.01, 8_000),
        )
        .with_tasks(vec![TaskType::Classification]),
    );

    let mut h = harness_with(catalog, config());
    h.router
        .register(Arc::new(ScriptedProvider::new("off", ProviderKind::Anthropic)))
        .unwrap();
    h.router
        .register(Arc::new(ScriptedProvider::new(
            "labeler",
            ProviderKind::OpenRouter,
        )))
        .unwrap();

    let options = RouteOptions::default().exclude("gamma");
    let plan = h.router.plan(TaskType::Conversation, &options).await;

    assert_eq!(plan.provider_order(), vec!["alpha", "beta"]);
    assert_eq!(plan.skip_reason("off"), Some(&SkipReason::Disabled));
    assert_eq!(plan.skip_reason("keyless"), Some(&SkipReason::NotConfigured));
    assert_eq!(
        plan.skip_reason("labeler"),
        Some(&SkipReason::UnsupportedTask)
    );
    assert_eq!(plan.skip_reason("gamma"), Some(&SkipReason::Excluded));
    assert!(plan.describe_skips().contains("keyless: not configured"));

    let plan = h
        .router
        .plan(TaskType::Classification, &RouteOptions::default())
        .await;
    assert!(plan.provider_order().contains(&"labeler"));
}

#[tokio::test]
async fn test_preferred_provider_moves_to_front() {
    let h = harness();
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default().prefer("gamma"))
        .await;
    assert_eq!(plan.provider_order(), vec!["gamma", "alpha", "beta"]);

    // An ineligible preference is ignored
    let options = RouteOptions::default().prefer("gamma").exclude("gamma");
    let plan = h.router.plan(TaskType::Conversation, &options).await;
    assert_eq!(plan.provider_order(), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_rule_preferred_provider_and_model() {
    let mut rules = RoutingRules::default();
    rules
        .task_providers
        .insert(TaskType::Conversation, "beta".to_string());
    rules
        .task_models
        .insert(TaskType::Conversation, "alpha-premium".to_string());

    let h = harness_with(catalog(), config().with_rules(rules));
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;

    assert_eq!(plan.provider_order(), vec!["beta", "alpha", "gamma"]);
    assert_eq!(plan.candidates[1].model, "alpha-premium");
    assert_eq!(plan.candidates[1].tier, ModelTier::Premium);
    // beta does not serve the override and keeps its tier choice
    assert_eq!(plan.candidates[0].model, "beta-fast");
}

#[tokio::test]
async fn test_plan_truncated_to_max_fallbacks() {
    let h = harness_with(catalog(), config().with_max_fallbacks(1));
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;
    assert_eq!(plan.provider_order(), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_plan_skips_over_budget() {
    let h = harness_with(catalog(), config().with_daily_budget(1.0005));
    // 1M input tokens on alpha-fast at $1/M
    h.router
        .cost_tracker()
        .record_usage(UsageEvent::new("alpha", "alpha-fast").tokens(1_000_000, 0))
        .await;

    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;

    assert_eq!(plan.provider_order(), vec!["beta"]);
    assert!(matches!(
        plan.skip_reason("alpha"),
        Some(SkipReason::OverBudget { .. })
    ));
    assert!(matches!(
        plan.skip_reason("gamma"),
        Some(SkipReason::OverBudget { .. })
    ));
}

#[tokio::test]
async fn test_exhausted_budget_blocks_routing() {
    let h = harness_with(catalog(), config().with_daily_budget(1.0));
    h.router
        .cost_tracker()
        .record_usage(UsageEvent::new("alpha", "alpha-fast").tokens(1_000_000, 0))
        .await;

    assert!(h.router.budget_status().await.exhausted);
    let err = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoProviderAvailable { .. }));
    assert_eq!(h.alpha.call_count() + h.beta.call_count() + h.gamma.call_count(), 0);
}

#[tokio::test]
async fn test_half_open_provider_sorts_last() {
    let breaker = CircuitBreakerConfig::new()
        .with_failure_threshold(1)
        .with_reset_timeout(Duration::from_millis(20));
    let h = harness_with(catalog(), config().with_circuit_breaker(breaker));

    h.router
        .health("alpha")
        .unwrap()
        .record_failure(&Error::Api("down".into()));
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;
    assert!(matches!(
        plan.skip_reason("alpha"),
        Some(SkipReason::CircuitOpen { .. })
    ));

    tokio::time::sleep(Duration::from_millis(40)).await;
    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;
    assert_eq!(plan.provider_order(), vec!["beta", "gamma", "alpha"]);
    assert_eq!(plan.candidates[2].circuit, CircuitState::HalfOpen);
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_route_primary_success() {
    let h = harness();
    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "alpha");
    assert_eq!(routed.model, "alpha-fast");
    assert!(!routed.used_fallback);
    assert!(!routed.low_confidence);
    assert_eq!(routed.attempts.len(), 1);
    assert_eq!(routed.attempts[0].tries, 1);

    let sent = h.alpha.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model, "alpha-fast");
    assert_eq!(sent[0].max_tokens, Some(2000));
    assert!(!sent[0].json_mode);
    assert_eq!(sent[0].messages.len(), 2);
    assert_eq!(h.beta.call_count(), 0);
}

#[tokio::test]
async fn test_structured_task_requests_json() {
    let h = harness();
    h.alpha.push_reply(r#"{"overall": 0.2, "notes": "tense but respectful"}"#);
    h.router
        .route(TaskType::SentimentAnalysis, conversation(), RouteOptions::default())
        .await
        .unwrap();
    assert!(h.alpha.requests()[0].json_mode);
}

#[tokio::test]
async fn test_fallback_after_retries() {
    let h = harness();
    h.alpha
        .push_error(Error::Api("overloaded".into()))
        .push_error(Error::Api("overloaded".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert!(routed.used_fallback);
    assert_eq!(h.alpha.call_count(), 2);
    assert_eq!(routed.attempts.len(), 2);
    assert_eq!(routed.attempts[0].tries, 2);
    assert!(matches!(
        &routed.attempts[0].outcome,
        AttemptOutcome::Failed { error_kind, .. } if error_kind == "api"
    ));
}

#[tokio::test]
async fn test_retry_recovers_on_same_provider() {
    let h = harness();
    h.alpha.push_error(Error::Network("reset".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "alpha");
    assert_eq!(routed.attempts[0].tries, 2);
    assert_eq!(h.beta.call_count(), 0);
}

#[tokio::test]
async fn test_auth_error_falls_back_without_retry() {
    let h = harness();
    h.alpha.push_error(Error::Auth("bad key".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert_eq!(h.alpha.call_count(), 1);
}

#[tokio::test]
async fn test_context_length_falls_back_without_retry() {
    let h = harness();
    h.alpha
        .push_error(Error::ContextLength("prompt too long".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert_eq!(h.alpha.call_count(), 1);
    // Request-shaped failures do not count against the provider
    assert_eq!(
        h.router.health("alpha").unwrap().breaker().failure_count(),
        0
    );
}

#[tokio::test]
async fn test_invalid_request_stops_the_chain() {
    let h = harness();
    h.alpha
        .push_error(Error::InvalidRequest("unknown field".into()));

    let err = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
    assert_eq!(h.alpha.call_count(), 1);
    assert_eq!(h.beta.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_model_falls_back_and_counts_against_provider() {
    let h = harness();
    h.alpha
        .push_error(Error::ModelNotFound("The model `alpha-fast` does not exist".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert!(routed.used_fallback);
    assert_eq!(h.alpha.call_count(), 1);
    assert_eq!(
        h.router.health("alpha").unwrap().breaker().failure_count(),
        1
    );
    assert!(matches!(
        &routed.attempts[0].outcome,
        AttemptOutcome::Failed { error_kind, .. } if error_kind == "model_not_found"
    ));
}

#[tokio::test]
async fn test_rejected_request_keeps_earlier_low_confidence_response() {
    let h = harness();
    h.alpha
        .push_reply("A plain text summary of a calm conversation.");
    h.beta
        .push_error(Error::InvalidRequest("response_format unsupported".into()));

    let routed = h
        .router
        .route(TaskType::Summarization, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "alpha");
    assert!(routed.low_confidence);
    assert!(!routed.used_fallback);
    assert_eq!(routed.attempts.len(), 2);
    assert_eq!(h.gamma.call_count(), 0);
}

#[tokio::test]
async fn test_all_providers_failed() {
    let h = harness();
    for provider in [&h.alpha, &h.beta, &h.gamma] {
        provider
            .push_error(Error::Network("down".into()))
            .push_error(Error::Network("still down".into()));
    }

    let err = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::AllProvidersFailed {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("still down"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_messages_rejected() {
    let h = harness();
    let err = h
        .router
        .route(TaskType::Conversation, Vec::new(), RouteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_no_provider_available() {
    let router = LlmRouter::new(catalog(), config());
    let err = router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::NoProviderAvailable { task, reasons } => {
            assert_eq!(task, "conversation");
            assert!(reasons.contains("alpha: not configured"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_low_confidence_escalates() {
    let h = harness();
    h.alpha
        .push_reply("They talked for a while and it went fine I think.");
    h.beta
        .push_reply(r#"{"summary": "A calm talk about splitting chores", "confidence": 0.9}"#);

    let routed = h
        .router
        .route(TaskType::Summarization, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert!(routed.used_fallback);
    assert!(!routed.low_confidence);
    assert!((routed.confidence - 0.9).abs() < 1e-5);
    assert!(matches!(
        routed.attempts[0].outcome,
        AttemptOutcome::LowConfidence { .. }
    ));
}

#[tokio::test]
async fn test_best_low_confidence_returned_and_flagged() {
    let h = harness();
    h.alpha
        .push_reply("A plain text summary of a calm conversation.");
    h.beta.push_reply("no");
    h.gamma
        .push_reply("Another plain text summary that is not JSON.");

    let routed = h
        .router
        .route(TaskType::Summarization, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "alpha");
    assert!(routed.low_confidence);
    assert!(!routed.used_fallback);
    assert_eq!(routed.attempts.len(), 3);
}

#[tokio::test]
async fn test_escalation_disabled_accepts_low_confidence() {
    let mut config = config();
    config.escalate_on_low_confidence = false;
    let h = harness_with(catalog(), config);
    h.alpha.push_reply("Plain text where JSON was expected.");

    let routed = h
        .router
        .route(TaskType::Summarization, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "alpha");
    assert!(routed.low_confidence);
    assert_eq!(h.beta.call_count(), 0);
}

#[tokio::test]
async fn test_circuit_opens_after_repeated_failures() {
    let breaker = CircuitBreakerConfig::new().with_failure_threshold(2);
    let config = config()
        .with_retry(fast_retry().with_max_attempts(1))
        .with_circuit_breaker(breaker);
    let h = harness_with(catalog(), config);
    h.alpha
        .push_error(Error::Api("500".into()))
        .push_error(Error::Api("500".into()));

    for _ in 0..2 {
        let routed = h
            .router
            .route(TaskType::Conversation, conversation(), RouteOptions::default())
            .await
            .unwrap();
        assert_eq!(routed.provider, "beta");
    }

    assert_eq!(
        h.router.health("alpha").unwrap().circuit_state(),
        CircuitState::Open
    );

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();
    assert_eq!(routed.provider, "beta");
    assert_eq!(h.alpha.call_count(), 2);
}

#[tokio::test]
async fn test_rate_limited_provider_is_skipped() {
    let mut catalog = catalog();
    let alpha = catalog.get("alpha").unwrap().clone().with_requests_per_minute(1);
    catalog = ProviderCatalog::new(
        std::iter::once(alpha)
            .chain(catalog.providers().iter().skip(1).cloned())
            .collect(),
    );
    let h = harness_with(catalog, config());

    let first = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();
    assert_eq!(first.provider, "alpha");

    let plan = h
        .router
        .plan(TaskType::Conversation, &RouteOptions::default())
        .await;
    assert!(matches!(
        plan.skip_reason("alpha"),
        Some(SkipReason::RateLimited { .. })
    ));

    let second = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();
    assert_eq!(second.provider, "beta");
    assert_eq!(h.alpha.call_count(), 1);
}

#[tokio::test]
async fn test_retries_respect_rate_limit() {
    let mut catalog = catalog();
    let alpha = catalog.get("alpha").unwrap().clone().with_requests_per_minute(1);
    catalog = ProviderCatalog::new(
        std::iter::once(alpha)
            .chain(catalog.providers().iter().skip(1).cloned())
            .collect(),
    );
    let h = harness_with(catalog, config());
    h.alpha
        .push_error(Error::Api("overloaded".into()))
        .push_error(Error::Api("overloaded".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert_eq!(h.alpha.call_count(), 1);
    assert_eq!(routed.attempts[0].tries, 1);
    assert!(matches!(
        &routed.attempts[0].outcome,
        AttemptOutcome::Failed { error_kind, .. } if error_kind == "rate_limit"
    ));
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let mut catalog = catalog();
    let alpha = catalog.get("alpha").unwrap().clone().with_timeout_ms(20);
    catalog = ProviderCatalog::new(
        std::iter::once(alpha)
            .chain(catalog.providers().iter().skip(1).cloned())
            .collect(),
    );

    let slow = Arc::new(
        ScriptedProvider::new("alpha", ProviderKind::OpenAi).with_delay(Duration::from_millis(200)),
    );
    let beta = Arc::new(ScriptedProvider::new("beta", ProviderKind::Mistral));
    let mut router = LlmRouter::new(catalog, config());
    router.register(slow).unwrap();
    router.register(beta).unwrap();

    let routed = router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    assert_eq!(routed.provider, "beta");
    assert!(matches!(
        &routed.attempts[0].outcome,
        AttemptOutcome::Failed { error_kind, .. } if error_kind == "timeout"
    ));
}

#[tokio::test]
async fn test_usage_recorded_per_attempt() {
    let h = harness();
    h.alpha
        .push_error(Error::Auth("bad key".into()));

    let routed = h
        .router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    let records = h.router.cost_tracker().get_route_records(routed.route_id).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].provider, "alpha");
    assert!(!records[0].success);
    assert!(records[1].success);
    assert!(records[1].fallback);
    assert_eq!(records[1].task, Some(TaskType::Conversation));
    // ScriptedProvider reports 100 prompt / 50 completion tokens at $0.1 / $0.2 per M
    assert!((records[1].estimated_cost - 0.00002).abs() < 1e-9);
    assert!((routed.estimated_cost - records[1].estimated_cost).abs() < 1e-12);
}

#[tokio::test]
async fn test_complete_for_task() {
    let h = harness();
    h.alpha.push_reply("Try naming one feeling each before problem solving.");
    let response = h
        .router
        .complete_for_task(TaskType::Conversation, conversation())
        .await
        .unwrap();
    assert!(response.content.starts_with("Try naming"));
}

// ============================================================================
// Status and probes
// ============================================================================

#[tokio::test]
async fn test_probe_feeds_health() {
    let h = harness();
    assert!(h.router.probe("alpha").await.is_ok());
    assert_eq!(h.router.health("alpha").unwrap().snapshot().successes, 1);

    h.beta.set_healthy(false);
    assert!(matches!(
        h.router.probe("beta").await,
        Err(Error::Network(_))
    ));
    let snapshot = h.router.health("beta").unwrap().snapshot();
    assert_eq!(snapshot.failures, 1);
    assert!(snapshot.last_error.is_some());

    assert!(matches!(
        h.router.probe("nobody").await,
        Err(Error::NotConfigured(_))
    ));
}

#[tokio::test]
async fn test_provider_statuses() {
    let mut catalog = catalog();
    catalog.push(ProviderSettings::new(
        "keyless",
        ProviderKind::HuggingFace,
        0,
        ModelSpec::new("keyless-fast", ModelTier::Fast, 0.1, 0.1, 8_000),
    ));
    let h = harness_with(catalog, config());
    h.router
        .route(TaskType::Conversation, conversation(), RouteOptions::default())
        .await
        .unwrap();

    let statuses = h.router.provider_statuses().await;
    let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["keyless", "alpha", "beta", "gamma"]);

    assert!(!statuses[0].configured);
    let alpha = &statuses[1];
    assert!(alpha.configured);
    assert_eq!(alpha.successes, 1);
    assert_eq!(alpha.requests_in_window, 1);
    assert_eq!(alpha.requests_per_minute, 60);
    assert_eq!(alpha.circuit, CircuitState::Closed);
    assert!(alpha.ewma_latency_ms.is_some());
}
