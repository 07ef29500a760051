use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::errors::ServiceError;
use crate::generation_client::GenerationClient;
use crate::models::ParsedQuestion;
use crate::prompts;
use crate::quiz_parser::QuizResponseParser;

// Import logging macros
use crate::{log_service_error, log_service_start, log_service_success, log_service_warn};

/// Reading quiz generation. Has no offline fallback: when the boundary is
/// exhausted the caller gets [`ServiceError::GenerationUnavailable`].
#[derive(Clone)]
pub struct ReadingService {
    client: Option<GenerationClient>,
    store: Arc<dyn QuizStore>,
}

impl ReadingService {
    pub fn new(client: Option<GenerationClient>, store: Arc<dyn QuizStore>) -> Self {
        Self { client, store }
    }

    pub async fn generate_quiz(&self, passage: &str) -> Result<Vec<ParsedQuestion>, ServiceError> {
        log_service_start!("reading_service", "generate_quiz", passage_length = passage.len());
        let start = Instant::now();

        let Some(client) = &self.client else {
            log_service_warn!("reading_service", "generate_quiz", "no generation client configured");
            return Err(ServiceError::GenerationUnavailable(
                "no API keys configured".to_string(),
            ));
        };

        let raw = client
            .generate_tagged("reading_questions", &prompts::reading_questions(passage))
            .await
            .inspect_err(|e| {
                log_service_error!("reading_service", "generate_quiz", error = e);
            })?;

        let questions = QuizResponseParser::parse(&raw);
        if questions.is_empty() {
            log_service_warn!("reading_service", "generate_quiz", "generation returned no parseable questions");
        }

        log_service_success!(
            "reading_service",
            "generate_quiz",
            question_count = questions.len(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(questions)
    }

    /// Generate, parse and hand the questions to the quiz store.
    pub async fn generate_and_save_quiz(
        &self,
        quiz_id: Uuid,
        passage: &str,
    ) -> Result<Vec<ParsedQuestion>, ServiceError> {
        let questions = self.generate_quiz(passage).await?;

        self.store
            .save_questions(quiz_id, &questions)
            .await
            .inspect_err(|e| {
                log_service_error!("reading_service", "save_quiz", error = e);
            })?;

        Ok(questions)
    }
}
