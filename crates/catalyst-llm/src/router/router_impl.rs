//! LLM Router implementation
//!
//! `LlmRouter` owns the catalog, one transport per configured provider and
//! the per-provider resilience state. Routing happens in two steps:
//! `plan` ranks eligible providers for a task, `route` walks that plan with
//! retries, fallback and confidence escalation.

use super::config::{RouteOptions, RouterConfig, RoutingStrategy};
use super::health::ProviderHealth;
use super::plan::{
    AttemptOutcome, AttemptRecord, RouteCandidate, RoutePlan, RoutedResponse, SkipReason,
    SkippedProvider,
};
use super::provider::LlmProvider;
use super::types::{ModelTier, TaskType};
use crate::catalog::{ModelSpec, ProviderCatalog, ProviderKind, ProviderSettings};
use crate::completion::{CompletionRequest, CompletionResponse};
use crate::confidence::ConfidenceScorer;
use crate::cost::{BudgetStatus, CostTracker, UsageEvent};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::resilience::{
    retry_with_backoff, CircuitState, RateLimitConfig, RateLimiter, Retried, RetryDecision,
    RetryError,
};
use crate::token::{count_message_tokens, count_tokens};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Limiter key; each provider has its own limiter
const RATE_KEY: &str = "requests";

/// Prompt size assumed for cost estimates when the caller gives none
const DEFAULT_INPUT_TOKENS: u32 = 500;

/// Snapshot of one catalog entry for admin views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Provider name
    pub name: String,
    /// Provider family
    pub kind: ProviderKind,
    /// Enabled in the catalog
    pub enabled: bool,
    /// Credentials present and transport registered
    pub configured: bool,
    /// Catalog priority
    pub priority: u32,
    /// Default model
    pub default_model: String,
    /// Models served
    pub models: Vec<String>,
    /// Tasks served (empty = all)
    pub tasks: Vec<TaskType>,
    /// Circuit breaker state
    pub circuit: CircuitState,
    /// Smoothed latency of successful calls
    pub ewma_latency_ms: Option<f64>,
    /// Successful calls
    pub successes: u64,
    /// Failed calls
    pub failures: u64,
    /// Most recent failure
    pub last_error: Option<String>,
    /// Requests in the current rate-limit window
    pub requests_in_window: u32,
    /// Requests allowed per minute
    pub requests_per_minute: u32,
}

/// Response accepted below the confidence threshold, kept in case nothing better arrives
struct Fallback {
    response: CompletionResponse,
    provider: String,
    model: String,
    confidence: f32,
    estimated_cost: f64,
    used_fallback: bool,
}

/// LLM Router for managing multiple providers with task-based routing
pub struct LlmRouter {
    config: RouterConfig,
    catalog: ProviderCatalog,
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    health: HashMap<String, ProviderHealth>,
    limiters: HashMap<String, RateLimiter>,
    cost_tracker: Arc<CostTracker>,
    scorer: ConfidenceScorer,
}

impl std::fmt::Debug for LlmRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRouter")
            .field("strategy", &self.config.strategy)
            .field("catalog", &self.catalog.len())
            .field("registered", &self.list_providers())
            .finish()
    }
}

impl LlmRouter {
    /// Create a router for a catalog; providers are registered separately
    #[must_use]
    pub fn new(catalog: ProviderCatalog, config: RouterConfig) -> Self {
        let health = catalog
            .providers()
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    ProviderHealth::new(&p.name, config.circuit_breaker.clone()),
                )
            })
            .collect();
        let limiters = catalog
            .providers()
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    RateLimiter::new(RateLimitConfig::per_minute(
                        p.rate_limit.requests_per_minute,
                    )),
                )
            })
            .collect();
        let cost_tracker = Arc::new(CostTracker::with_catalog(&catalog));

        Self {
            config,
            catalog,
            providers: HashMap::new(),
            health,
            limiters,
            cost_tracker,
            scorer: ConfidenceScorer::default(),
        }
    }

    /// Share an existing cost tracker
    #[must_use]
    pub fn with_cost_tracker(mut self, tracker: Arc<CostTracker>) -> Self {
        self.cost_tracker = tracker;
        self
    }

    /// Replace the confidence scorer
    #[must_use]
    pub fn with_scorer(mut self, scorer: ConfidenceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Register a provider transport; its name must exist in the catalog
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) -> Result<()> {
        let name = provider.name().to_string();
        if self.catalog.get(&name).is_none() {
            return Err(Error::Config(format!(
                "provider '{}' is not in the catalog",
                name
            )));
        }
        debug!(provider = %name, "Registering LLM provider");
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Router configuration
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Provider catalog
    #[must_use]
    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Shared cost tracker
    #[must_use]
    pub fn cost_tracker(&self) -> Arc<CostTracker> {
        Arc::clone(&self.cost_tracker)
    }

    /// Get a registered provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(name).cloned()
    }

    /// Check if a provider is registered
    #[must_use]
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered provider names in priority order
    #[must_use]
    pub fn list_providers(&self) -> Vec<&str> {
        self.catalog
            .providers()
            .iter()
            .filter(|p| self.providers.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Health state of a provider
    #[must_use]
    pub fn health(&self, name: &str) -> Option<&ProviderHealth> {
        self.health.get(name)
    }

    /// Spending against the configured daily budget
    pub async fn budget_status(&self) -> BudgetStatus {
        self.cost_tracker
            .budget_status(self.config.daily_budget_usd)
            .await
    }

    // ========================================================================
    // Planning
    // ========================================================================

    /// Strategy used for a task
    #[must_use]
    pub fn strategy_for(&self, task: TaskType, options: &RouteOptions) -> RoutingStrategy {
        match options.strategy {
            Some(strategy) => strategy,
            None if task.is_latency_sensitive() => RoutingStrategy::LatencyOptimized,
            None => self.config.strategy,
        }
    }

    /// Rank eligible providers for a task
    pub async fn plan(&self, task: TaskType, options: &RouteOptions) -> RoutePlan {
        let strategy = self.strategy_for(task, options);
        let tier = self.config.rules.target_tier(task, options.max_tier);
        let budget = self.config.rules.get_token_budget(task);
        let input_tokens = options
            .estimated_input_tokens
            .unwrap_or(DEFAULT_INPUT_TOKENS);
        let remaining_budget = match self.config.daily_budget_usd {
            Some(_) => self.budget_status().await.remaining_usd,
            None => None,
        };

        let mut candidates = Vec::new();
        let mut skipped = Vec::new();

        for settings in self.catalog.providers() {
            let evaluated = self
                .evaluate(
                    settings,
                    task,
                    tier,
                    options,
                    input_tokens,
                    budget.max_tokens,
                    remaining_budget,
                )
                .await;
            match evaluated {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => skipped.push(SkippedProvider {
                    provider: settings.name.clone(),
                    reason,
                }),
            }
        }

        candidates.sort_by(|a, b| {
            let a_probe = a.circuit == CircuitState::HalfOpen;
            let b_probe = b.circuit == CircuitState::HalfOpen;
            a_probe
                .cmp(&b_probe)
                .then_with(|| compare_by_strategy(strategy, a, b))
        });

        let preferred = options
            .preferred_provider
            .as_ref()
            .or_else(|| self.config.rules.task_providers.get(&task));
        if let Some(preferred) = preferred {
            if let Some(pos) = candidates.iter().position(|c| &c.provider == preferred) {
                let candidate = candidates.remove(pos);
                candidates.insert(0, candidate);
            }
        }

        candidates.truncate(1 + self.config.max_fallbacks);

        debug!(
            task = %task,
            strategy = %strategy,
            candidates = ?candidates.iter().map(|c| c.provider.as_str()).collect::<Vec<_>>(),
            skipped = skipped.len(),
            "Route plan ready"
        );

        RoutePlan {
            task,
            strategy,
            candidates,
            skipped,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn evaluate(
        &self,
        settings: &ProviderSettings,
        task: TaskType,
        tier: ModelTier,
        options: &RouteOptions,
        input_tokens: u32,
        output_tokens: u32,
        remaining_budget: Option<f64>,
    ) -> std::result::Result<RouteCandidate, SkipReason> {
        let name = settings.name.as_str();

        if !settings.enabled {
            return Err(SkipReason::Disabled);
        }
        if !self.providers.contains_key(name) {
            return Err(SkipReason::NotConfigured);
        }
        if !settings.supports_task(task) {
            return Err(SkipReason::UnsupportedTask);
        }
        if options.exclude.iter().any(|e| e == name) {
            return Err(SkipReason::Excluded);
        }

        let health = self.health.get(name);
        let circuit = health
            .map(|h| h.circuit_state())
            .unwrap_or(CircuitState::Closed);
        if circuit == CircuitState::Open {
            let retry_in_secs = health
                .and_then(|h| h.breaker().remaining_open())
                .map(|d| d.as_secs())
                .unwrap_or(0);
            return Err(SkipReason::CircuitOpen { retry_in_secs });
        }

        if let Some(limiter) = self.limiters.get(name) {
            let check = limiter.check(RATE_KEY).await;
            if !check.allowed {
                return Err(SkipReason::RateLimited {
                    reset_in_ms: check.reset_after.as_millis() as u64,
                });
            }
        }

        let model = self
            .select_model(settings, task, tier)
            .ok_or(SkipReason::NotConfigured)?;
        let estimated_cost = model.calculate_cost(input_tokens, output_tokens);

        if let Some(remaining) = remaining_budget {
            if estimated_cost > remaining {
                return Err(SkipReason::OverBudget {
                    estimated_cost,
                    remaining,
                });
            }
        }

        Ok(RouteCandidate {
            provider: settings.name.clone(),
            model: model.name.clone(),
            tier: model.tier,
            priority: settings.priority,
            estimated_cost,
            latency_ms: health.and_then(|h| h.ewma_latency_ms()),
            circuit,
        })
    }

    /// Model for a task: per-task override when the provider serves it, else by tier
    fn select_model<'a>(
        &self,
        settings: &'a ProviderSettings,
        task: TaskType,
        tier: ModelTier,
    ) -> Option<&'a ModelSpec> {
        self.config
            .rules
            .task_models
            .get(&task)
            .and_then(|name| settings.model(name))
            .or_else(|| settings.model_for_tier(tier))
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Route a conversation to the best available provider
    ///
    /// Walks the plan in order. Each candidate gets a rate-limit slot and
    /// same-provider retries; failures and low-confidence answers move on to
    /// the next candidate. A malformed request stops the walk immediately.
    #[instrument(skip(self, messages, options), fields(task = %task))]
    pub async fn route(
        &self,
        task: TaskType,
        messages: Vec<Message>,
        options: RouteOptions,
    ) -> Result<RoutedResponse> {
        if messages.is_empty() {
            return Err(Error::InvalidRequest("no messages to send".to_string()));
        }

        let route_id = Uuid::new_v4();
        let started = Instant::now();
        let budget = self.config.rules.get_token_budget(task);
        let input_tokens = u32::try_from(count_message_tokens(&messages)).unwrap_or(u32::MAX);

        let mut options = options;
        options.estimated_input_tokens.get_or_insert(input_tokens);
        let plan = self.plan(task, &options).await;

        if plan.is_empty() {
            let reasons = plan.describe_skips();
            warn!(task = %task, reasons = %reasons, "No provider available");
            return Err(Error::NoProviderAvailable {
                task: task.to_string(),
                reasons,
            });
        }

        let threshold = self.config.confidence_threshold;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut best_low: Option<Fallback> = None;
        let mut last_error: Option<Error> = None;

        for (index, candidate) in plan.candidates.iter().enumerate() {
            let Some(provider) = self.providers.get(&candidate.provider) else {
                continue;
            };
            let is_fallback = index > 0;

            if !self.acquire_slot(&candidate.provider).await {
                debug!(provider = %candidate.provider, "Rate limited at dispatch");
                attempts.push(AttemptRecord {
                    provider: candidate.provider.clone(),
                    model: candidate.model.clone(),
                    outcome: AttemptOutcome::RateLimited,
                    tries: 0,
                    latency_ms: 0,
                });
                continue;
            }

            let request = CompletionRequest::new(candidate.model.clone())
                .with_messages(messages.clone())
                .with_max_tokens(budget.max_tokens)
                .with_temperature(budget.temperature)
                .with_json_mode(task.expects_json());

            // Every retry is another request and needs its own slot
            let calls = AtomicU32::new(0);
            let slot_denied = AtomicBool::new(false);
            let (calls_ref, denied_ref) = (&calls, &slot_denied);

            let call_started = Instant::now();
            let result = retry_with_backoff(
                &self.config.retry,
                || {
                    let request = request.clone();
                    async move {
                        if calls_ref.fetch_add(1, AtomicOrdering::Relaxed) > 0
                            && !self.acquire_slot(&candidate.provider).await
                        {
                            denied_ref.store(true, AtomicOrdering::Relaxed);
                            return Err(Error::RateLimit { retry_after: None });
                        }
                        self.call_provider(provider, candidate, request).await
                    }
                },
                |error: &Error| {
                    if denied_ref.load(AtomicOrdering::Relaxed) {
                        RetryDecision::GiveUp
                    } else {
                        classify_error(error)
                    }
                },
            )
            .await;
            let elapsed_ms = call_started.elapsed().as_millis() as u64;
            let slot_denied = slot_denied.load(AtomicOrdering::Relaxed);

            match result {
                Ok(Retried {
                    value: response,
                    attempts: tries,
                }) => {
                    let (input, output) = usage_tokens(&response, input_tokens);
                    let record = self
                        .cost_tracker
                        .record_usage(
                            UsageEvent::new(&candidate.provider, &candidate.model)
                                .tokens(input, output)
                                .latency_ms(elapsed_ms)
                                .task(task)
                                .route(route_id)
                                .fallback(is_fallback),
                        )
                        .await;

                    let confidence = self.scorer.score(task, &response);
                    let accepted = confidence >= threshold || !self.config.escalate_on_low_confidence;

                    if accepted {
                        attempts.push(AttemptRecord {
                            provider: candidate.provider.clone(),
                            model: candidate.model.clone(),
                            outcome: AttemptOutcome::Success { confidence },
                            tries,
                            latency_ms: elapsed_ms,
                        });
                        info!(
                            task = %task,
                            provider = %candidate.provider,
                            model = %candidate.model,
                            confidence,
                            fallback = is_fallback,
                            latency_ms = elapsed_ms,
                            "Routed request completed"
                        );
                        return Ok(RoutedResponse {
                            route_id,
                            task,
                            response,
                            provider: candidate.provider.clone(),
                            model: candidate.model.clone(),
                            confidence,
                            attempts,
                            used_fallback: is_fallback,
                            low_confidence: confidence < threshold,
                            latency_ms: started.elapsed().as_millis() as u64,
                            estimated_cost: record.estimated_cost,
                        });
                    }

                    warn!(
                        provider = %candidate.provider,
                        confidence,
                        threshold,
                        "Low confidence response, escalating"
                    );
                    attempts.push(AttemptRecord {
                        provider: candidate.provider.clone(),
                        model: candidate.model.clone(),
                        outcome: AttemptOutcome::LowConfidence { confidence },
                        tries,
                        latency_ms: elapsed_ms,
                    });
                    if best_low
                        .as_ref()
                        .map_or(true, |best| confidence > best.confidence)
                    {
                        best_low = Some(Fallback {
                            response,
                            provider: candidate.provider.clone(),
                            model: candidate.model.clone(),
                            confidence,
                            estimated_cost: record.estimated_cost,
                            used_fallback: is_fallback,
                        });
                    }
                }
                Err(RetryError {
                    last_error: error,
                    attempts: tries,
                }) => {
                    let tries = if slot_denied {
                        debug!(provider = %candidate.provider, "Rate limited before retry");
                        tries.saturating_sub(1)
                    } else {
                        tries
                    };
                    self.cost_tracker
                        .record_usage(
                            UsageEvent::new(&candidate.provider, &candidate.model)
                                .latency_ms(elapsed_ms)
                                .task(task)
                                .route(route_id)
                                .fallback(is_fallback)
                                .failed(),
                        )
                        .await;
                    attempts.push(AttemptRecord {
                        provider: candidate.provider.clone(),
                        model: candidate.model.clone(),
                        outcome: AttemptOutcome::Failed {
                            error_kind: error.kind().to_string(),
                            message: error.to_string(),
                        },
                        tries,
                        latency_ms: elapsed_ms,
                    });

                    if !error.should_fallback() {
                        if best_low.is_some() {
                            warn!(
                                provider = %candidate.provider,
                                error = %error,
                                "Request rejected, keeping earlier low-confidence response"
                            );
                            break;
                        }
                        warn!(
                            provider = %candidate.provider,
                            error = %error,
                            "Request rejected, not falling back"
                        );
                        return Err(error);
                    }

                    warn!(
                        provider = %candidate.provider,
                        error = %error,
                        tries,
                        "Provider failed, trying next candidate"
                    );
                    last_error = Some(error);
                }
            }
        }

        if let Some(best) = best_low {
            info!(
                task = %task,
                provider = %best.provider,
                confidence = best.confidence,
                "Returning best low-confidence response"
            );
            return Ok(RoutedResponse {
                route_id,
                task,
                response: best.response,
                provider: best.provider,
                model: best.model,
                confidence: best.confidence,
                attempts,
                used_fallback: best.used_fallback,
                low_confidence: true,
                latency_ms: started.elapsed().as_millis() as u64,
                estimated_cost: best.estimated_cost,
            });
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "every candidate was rate limited".to_string());
        warn!(task = %task, attempts = attempts.len(), "All providers failed");
        Err(Error::AllProvidersFailed {
            task: task.to_string(),
            attempts: attempts.len(),
            last_error,
        })
    }

    /// Route and return only the response
    pub async fn complete_for_task(
        &self,
        task: TaskType,
        messages: Vec<Message>,
    ) -> Result<CompletionResponse> {
        self.route(task, messages, RouteOptions::default())
            .await
            .map(|routed| routed.response)
    }

    /// One provider call under its timeout, feeding provider health
    /// Take one request slot from the provider's limiter
    async fn acquire_slot(&self, provider: &str) -> bool {
        match self.limiters.get(provider) {
            Some(limiter) => limiter.acquire(RATE_KEY).await.allowed,
            None => true,
        }
    }

    async fn call_provider(
        &self,
        provider: &Arc<dyn LlmProvider>,
        candidate: &RouteCandidate,
        request: CompletionRequest,
    ) -> Result<CompletionResponse> {
        let timeout = self.timeout_for(&candidate.provider);
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
        };

        if let Some(health) = self.health.get(&candidate.provider) {
            match &result {
                Ok(_) => health.record_success(started.elapsed()),
                Err(e) => health.record_failure(e),
            }
        }
        result
    }

    /// Run a provider's health check under its timeout, feeding provider health
    pub async fn probe(&self, name: &str) -> Result<Duration> {
        let provider = self
            .get(name)
            .ok_or_else(|| Error::NotConfigured(name.to_string()))?;
        let timeout = self.timeout_for(name);
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, provider.health_check()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
        };
        let elapsed = started.elapsed();

        if let Some(health) = self.health.get(name) {
            match &result {
                Ok(()) => health.record_success(elapsed),
                Err(e) => health.record_failure(e),
            }
        }
        result.map(|()| elapsed)
    }

    fn timeout_for(&self, name: &str) -> Duration {
        self.catalog
            .get(name)
            .map(ProviderSettings::timeout)
            .unwrap_or_else(|| Duration::from_millis(crate::catalog::DEFAULT_TIMEOUT_MS))
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Status of every catalog entry in priority order
    pub async fn provider_statuses(&self) -> Vec<ProviderStatus> {
        let mut entries: Vec<&ProviderSettings> = self.catalog.providers().iter().collect();
        entries.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));

        let mut statuses = Vec::with_capacity(entries.len());
        for settings in entries {
            let snapshot = self.health.get(&settings.name).map(ProviderHealth::snapshot);
            let requests_in_window = match self.limiters.get(&settings.name) {
                Some(limiter) => limiter.usage(RATE_KEY).await.0,
                None => 0,
            };

            statuses.push(ProviderStatus {
                name: settings.name.clone(),
                kind: settings.kind,
                enabled: settings.enabled,
                configured: self.providers.contains_key(&settings.name),
                priority: settings.priority,
                default_model: settings.default_model.clone(),
                models: settings.models.iter().map(|m| m.name.clone()).collect(),
                tasks: settings.tasks.clone(),
                circuit: snapshot
                    .as_ref()
                    .map_or(CircuitState::Closed, |s| s.circuit),
                ewma_latency_ms: snapshot.as_ref().and_then(|s| s.ewma_latency_ms),
                successes: snapshot.as_ref().map_or(0, |s| s.successes),
                failures: snapshot.as_ref().map_or(0, |s| s.failures),
                last_error: snapshot.and_then(|s| s.last_error),
                requests_in_window,
                requests_per_minute: settings.rate_limit.requests_per_minute,
            });
        }
        statuses
    }
}

fn compare_by_strategy(strategy: RoutingStrategy, a: &RouteCandidate, b: &RouteCandidate) -> Ordering {
    let by_priority = || a.priority.cmp(&b.priority).then_with(|| a.provider.cmp(&b.provider));

    match strategy {
        RoutingStrategy::Priority => by_priority(),
        RoutingStrategy::CostOptimized => a
            .estimated_cost
            .partial_cmp(&b.estimated_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(by_priority),
        RoutingStrategy::LatencyOptimized => match (a.latency_ms, b.latency_ms) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(by_priority),
    }
}

/// Retry policy for provider errors
fn classify_error(error: &Error) -> RetryDecision {
    match error {
        Error::RateLimit {
            retry_after: Some(delay),
        } => RetryDecision::RetryAfter(*delay),
        e if e.is_retryable() => RetryDecision::Retry,
        _ => RetryDecision::GiveUp,
    }
}

/// Token counts reported by the provider, or estimated locally
fn usage_tokens(response: &CompletionResponse, input_estimate: u32) -> (u32, u32) {
    match &response.usage {
        Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
        None => (
            input_estimate,
            u32::try_from(count_tokens(&response.content)).unwrap_or(u32::MAX),
        ),
    }
}
