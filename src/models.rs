use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of suggestions every evaluation carries.
pub const SUGGESTION_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub label: String, // "A".."D" as written by the generator
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub question_text: String,
    pub options: Vec<QuizOption>,
    pub explanation: String,
    pub is_multiple_choice: bool,
}

impl ParsedQuestion {
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    pub fn correct_labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.label.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64, // IELTS band, 0.0-9.0
    pub feedback: String,
    pub suggestions: Vec<String>,
}

/// One generation attempt, as recorded in the API log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLogEntry {
    pub id: Uuid,
    pub request_type: String,
    pub model: String,
    pub status: String, // "success", "rate_limited", "failed: ..."
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvaluation {
    pub session_id: Uuid,
    pub topic: String,
    pub essay: String,
    pub result: EvaluationResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizRequest {
    pub passage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateEssayRequest {
    pub topic: String,
    pub text: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingTitleRequest {
    pub band: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingSuggestionsRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuizResponse {
    pub quiz_id: Uuid,
    pub question_count: usize,
    pub questions: Vec<ParsedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
}
