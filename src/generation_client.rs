use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, GenerationConfig};
use crate::credential_pool::{mask_key, CredentialPool};
use crate::llm_providers::{GeminiResponseBody, GeminiTransport, GenerationTransport, TransportResponse};
use crate::models::ApiLogEntry;

// Import logging macros
use crate::log_llm_operation;

/// Result of a single (model, key) attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(String),
    RateLimited,
    Failed(String),
}

/// Every model and key was tried without a usable result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("generation unavailable after {attempts} attempts: {last_message}")]
pub struct TerminalFailure {
    pub attempts: usize,
    pub last_message: String,
}

/// Sink for per-attempt records.
#[async_trait]
pub trait AttemptLog: Send + Sync {
    async fn record_attempt(&self, entry: ApiLogEntry) -> Result<()>;
}

/// Map a boundary response onto an attempt outcome.
pub fn classify_response(response: &TransportResponse) -> GenerationOutcome {
    if response.is_rate_limited() {
        return GenerationOutcome::RateLimited;
    }

    if !response.is_success() {
        return GenerationOutcome::Failed(format!(
            "status {}: {}",
            response.status,
            response.body.chars().take(200).collect::<String>()
        ));
    }

    match GeminiResponseBody::parse(&response.body) {
        Ok(body) => match body.first_candidate_text() {
            Some(text) => GenerationOutcome::Success(text),
            None => GenerationOutcome::Failed("no candidates in response".to_string()),
        },
        Err(e) => GenerationOutcome::Failed(e.to_string()),
    }
}

/// Failover client over the generation boundary.
///
/// Models are tried in configured order; within a model each key of the
/// pool gets one attempt, separated by a flat backoff.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn GenerationTransport>,
    pool: Arc<CredentialPool>,
    models: Vec<String>,
    backoff: Duration,
    attempt_log: Option<Arc<dyn AttemptLog>>,
}

impl GenerationClient {
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        pool: Arc<CredentialPool>,
        models: Vec<String>,
        backoff: Duration,
    ) -> Result<Self, ConfigError> {
        if models.is_empty() {
            return Err(ConfigError::NoModels);
        }

        Ok(Self {
            transport,
            pool,
            models,
            backoff,
            attempt_log: None,
        })
    }

    /// Build a Gemini-backed client from configuration.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ConfigError> {
        let pool = Arc::new(CredentialPool::new(config.api_keys.clone())?);
        let transport = Arc::new(GeminiTransport::new(config.base_url.clone()));
        Self::new(transport, pool, config.models.clone(), config.backoff)
    }

    pub fn with_attempt_log(mut self, attempt_log: Arc<dyn AttemptLog>) -> Self {
        self.attempt_log = Some(attempt_log);
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// Upper bound on attempts for one request.
    pub fn max_attempts(&self) -> usize {
        self.models.len() * self.pool.len()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, TerminalFailure> {
        self.generate_tagged("generation", prompt).await
    }

    /// Run the model x key matrix, returning the first successful text.
    pub async fn generate_tagged(&self, request_type: &str, prompt: &str) -> Result<String, TerminalFailure> {
        let key_count = self.pool.len();
        let mut attempts = 0;
        let mut last_message = String::from("no attempts made");

        log_llm_operation!(
            start,
            request_type,
            models = self.models.len(),
            keys = key_count
        );

        for model in &self.models {
            for key_attempt in 0..key_count {
                if key_attempt > 0 && !self.backoff.is_zero() {
                    debug!(
                        model = %model,
                        backoff_secs = self.backoff.as_secs_f64(),
                        "Waiting before next key attempt"
                    );
                    tokio::time::sleep(self.backoff).await;
                }

                let api_key = self.pool.next_key();
                attempts += 1;

                debug!(
                    model = %model,
                    key = %mask_key(&api_key),
                    key_attempt = key_attempt + 1,
                    key_count,
                    "Trying generation attempt"
                );

                let outcome = self.attempt(model, &api_key, prompt).await;
                self.record(request_type, model, &outcome).await;

                match outcome {
                    GenerationOutcome::Success(text) => {
                        info!(
                            component = "generation_client",
                            operation = request_type,
                            model = %model,
                            attempts,
                            response_length = text.len(),
                            "Generation succeeded"
                        );
                        return Ok(text);
                    }
                    GenerationOutcome::RateLimited => {
                        warn!(
                            model = %model,
                            key_attempt = key_attempt + 1,
                            key_count,
                            "Key hit rate limit"
                        );
                        last_message = format!("model {} rate limited", model);
                    }
                    GenerationOutcome::Failed(message) => {
                        warn!(
                            model = %model,
                            key_attempt = key_attempt + 1,
                            key_count,
                            error = %message,
                            "Generation attempt failed"
                        );
                        last_message = format!("model {}: {}", model, message);
                    }
                }
            }
        }

        let failure = TerminalFailure { attempts, last_message };
        log_llm_operation!(error, request_type, error = failure, attempts = attempts);
        Err(failure)
    }

    async fn attempt(&self, model: &str, api_key: &str, prompt: &str) -> GenerationOutcome {
        match self.transport.send(model, api_key, prompt).await {
            Ok(response) => classify_response(&response),
            Err(e) => GenerationOutcome::Failed(format!("transport error: {}", e)),
        }
    }

    async fn record(&self, request_type: &str, model: &str, outcome: &GenerationOutcome) {
        let Some(attempt_log) = &self.attempt_log else {
            return;
        };

        let status = match outcome {
            GenerationOutcome::Success(_) => "success".to_string(),
            GenerationOutcome::RateLimited => "rate_limited".to_string(),
            GenerationOutcome::Failed(message) => format!("failed: {}", message),
        };

        let entry = ApiLogEntry {
            id: Uuid::new_v4(),
            request_type: request_type.to_string(),
            model: model.to_string(),
            status,
            timestamp: Utc::now(),
        };

        if let Err(e) = attempt_log.record_attempt(entry).await {
            warn!(error = %e, "Failed to record generation attempt");
        }
    }
}
