use anyhow::{anyhow, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::EvaluationStore;
use crate::essay_scorer::HeuristicEssayScorer;
use crate::evaluation_parser::EvaluationResponseParser;
use crate::generation_client::GenerationClient;
use crate::models::{EvaluationResult, StoredEvaluation};
use crate::prompts;

// Import logging macros
use crate::{log_service_error, log_service_start};

/// Essay evaluation. Always produces a result: anything that goes wrong on
/// the generation path falls back to [`HeuristicEssayScorer`].
#[derive(Clone)]
pub struct WritingService {
    client: Option<GenerationClient>,
    store: Arc<dyn EvaluationStore>,
}

impl WritingService {
    pub fn new(client: Option<GenerationClient>, store: Arc<dyn EvaluationStore>) -> Self {
        Self { client, store }
    }

    pub async fn evaluate_essay(&self, topic: &str, text: &str) -> EvaluationResult {
        log_service_start!("writing_service", "evaluate_essay", word_count = crate::essay_scorer::word_count(text));

        match self.generated_evaluation(topic, text).await {
            Ok(result) => {
                info!(
                    service = "writing_service",
                    score = result.score,
                    source = "generated",
                    "Essay evaluated"
                );
                result
            }
            Err(e) => {
                warn!(
                    service = "writing_service",
                    error = %e,
                    "Generated evaluation unavailable, using offline scorer"
                );
                let result = HeuristicEssayScorer::score(text, topic);
                info!(
                    service = "writing_service",
                    score = result.score,
                    source = "heuristic",
                    "Essay evaluated"
                );
                result
            }
        }
    }

    /// Evaluate and store the result against a writing session.
    ///
    /// A storage failure is logged; the evaluation is still returned.
    pub async fn evaluate_and_save(&self, session_id: Uuid, topic: &str, text: &str) -> EvaluationResult {
        let result = self.evaluate_essay(topic, text).await;

        let stored = StoredEvaluation {
            session_id,
            topic: topic.to_string(),
            essay: text.to_string(),
            result: result.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.save_evaluation(&stored).await {
            log_service_error!("writing_service", "save_evaluation", error = e);
        }

        result
    }

    async fn generated_evaluation(&self, topic: &str, text: &str) -> Result<EvaluationResult> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("no generation client configured"))?;

        let raw = client
            .generate_tagged("essay_evaluation", &prompts::essay_evaluation(topic, text))
            .await?;

        Ok(EvaluationResponseParser::parse(&raw))
    }
}
