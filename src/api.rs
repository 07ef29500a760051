use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    admin_service::AdminService,
    database::Database,
    errors::{ApiError, ErrorContext},
    models::*,
    reading_service::ReadingService,
    writing_service::WritingService,
};

// Import logging macros
use crate::{log_api_start, log_api_success};

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

#[derive(Clone)]
pub struct AppState {
    pub reading_service: ReadingService,
    pub writing_service: WritingService,
    pub admin_service: AdminService,
    pub database: Database,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

fn require_text(value: &str, field: &str, context: ErrorContext) -> Result<(), (StatusCode, Json<ApiResponse<()>>)> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{} must not be empty", field))
            .to_response_with_context(context));
    }
    Ok(())
}

// Reading endpoints
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuizRequest>,
) -> ApiResult<Vec<ParsedQuestion>> {
    log_api_start!("generate_quiz");
    require_text(&request.passage, "passage", ErrorContext::new("generate_quiz", "quiz"))?;

    match state.reading_service.generate_quiz(&request.passage).await {
        Ok(questions) => {
            log_api_success!("generate_quiz", count = questions.len(), "questions generated");
            Ok(Json(ApiResponse::success(questions)))
        }
        Err(e) => Err(ApiError::from(e).to_response_with_context(ErrorContext::new("generate_quiz", "quiz"))),
    }
}

pub async fn generate_and_save_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(request): Json<GenerateQuizRequest>,
) -> ApiResult<SavedQuizResponse> {
    log_api_start!("generate_and_save_quiz", quiz_id = quiz_id);
    let context = || ErrorContext::new("generate_and_save_quiz", "quiz").with_id(&quiz_id.to_string());
    require_text(&request.passage, "passage", context())?;

    match state.reading_service.generate_and_save_quiz(quiz_id, &request.passage).await {
        Ok(questions) => {
            log_api_success!("generate_and_save_quiz", quiz_id = quiz_id, "quiz saved");
            Ok(Json(ApiResponse::success(SavedQuizResponse {
                quiz_id,
                question_count: questions.len(),
                questions,
            })))
        }
        Err(e) => Err(ApiError::from(e).to_response_with_context(context())),
    }
}

pub async fn get_quiz_questions(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> ApiResult<Vec<ParsedQuestion>> {
    log_api_start!("get_quiz_questions", quiz_id = quiz_id);
    let context = || ErrorContext::new("get_quiz_questions", "quiz").with_id(&quiz_id.to_string());

    match state.database.get_quiz_questions(quiz_id).await {
        Ok(questions) if questions.is_empty() => {
            Err(ApiError::NotFound(quiz_id.to_string()).to_response_with_context(context()))
        }
        Ok(questions) => Ok(Json(ApiResponse::success(questions))),
        Err(e) => Err(ApiError::DatabaseError(e).to_response_with_context(context())),
    }
}

// Writing endpoints
pub async fn evaluate_essay(
    State(state): State<AppState>,
    Json(request): Json<EvaluateEssayRequest>,
) -> ApiResult<EvaluationResult> {
    log_api_start!("evaluate_essay");

    let result = match request.session_id {
        Some(session_id) => {
            state
                .writing_service
                .evaluate_and_save(session_id, &request.topic, &request.text)
                .await
        }
        None => state.writing_service.evaluate_essay(&request.topic, &request.text).await,
    };

    log_api_success!("evaluate_essay", "essay evaluated");
    Ok(Json(ApiResponse::success(result)))
}

pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StoredEvaluation> {
    log_api_start!("get_evaluation", session_id = session_id);
    let context = || ErrorContext::new("get_evaluation", "writing_session").with_id(&session_id.to_string());

    match state.database.get_evaluation(session_id).await {
        Ok(Some(evaluation)) => Ok(Json(ApiResponse::success(evaluation))),
        Ok(None) => Err(ApiError::NotFound(session_id.to_string()).to_response_with_context(context())),
        Err(e) => Err(ApiError::DatabaseError(e).to_response_with_context(context())),
    }
}

// Admin endpoints
pub async fn generate_passage(
    State(state): State<AppState>,
    Json(request): Json<PassageRequest>,
) -> ApiResult<GeneratedText> {
    log_api_start!("generate_passage");
    require_text(&request.title, "title", ErrorContext::new("generate_passage", "passage"))?;

    let text = state.admin_service.generate_reading_passage(&request.title).await;
    Ok(Json(ApiResponse::success(GeneratedText { text })))
}

pub async fn generate_writing_title(
    State(state): State<AppState>,
    Json(request): Json<WritingTitleRequest>,
) -> ApiResult<GeneratedText> {
    log_api_start!("generate_writing_title");

    match state.admin_service.generate_writing_title(&request.band).await {
        Ok(text) => Ok(Json(ApiResponse::success(GeneratedText { text }))),
        Err(e) => Err(ApiError::from(e)
            .to_response_with_context(ErrorContext::new("generate_writing_title", "writing_topic"))),
    }
}

pub async fn generate_writing_suggestions(
    State(state): State<AppState>,
    Json(request): Json<WritingSuggestionsRequest>,
) -> ApiResult<GeneratedText> {
    log_api_start!("generate_writing_suggestions");
    require_text(&request.topic, "topic", ErrorContext::new("generate_writing_suggestions", "writing_topic"))?;

    match state.admin_service.generate_writing_suggestions(&request.topic).await {
        Ok(text) => Ok(Json(ApiResponse::success(GeneratedText { text }))),
        Err(e) => Err(ApiError::from(e)
            .to_response_with_context(ErrorContext::new("generate_writing_suggestions", "writing_topic"))),
    }
}

pub async fn get_api_logs(State(state): State<AppState>) -> ApiResult<Vec<ApiLogEntry>> {
    log_api_start!("get_api_logs");

    match state.database.get_api_logs().await {
        Ok(logs) => {
            log_api_success!("get_api_logs", count = logs.len(), "logs listed");
            Ok(Json(ApiResponse::success(logs)))
        }
        Err(e) => Err(ApiError::DatabaseError(e).to_response_with_context(ErrorContext::new("get_api_logs", "api_log"))),
    }
}

pub async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))

        // Reading routes
        .route("/api/reading/quiz", post(generate_quiz))
        .route("/api/reading/quizzes/:quiz_id/generate", post(generate_and_save_quiz))
        .route("/api/reading/quizzes/:quiz_id/questions", get(get_quiz_questions))

        // Writing routes
        .route("/api/writing/evaluate", post(evaluate_essay))
        .route("/api/writing/sessions/:session_id", get(get_evaluation))

        // Admin routes
        .route("/api/admin/passage", post(generate_passage))
        .route("/api/admin/writing-title", post(generate_writing_title))
        .route("/api/admin/writing-suggestions", post(generate_writing_suggestions))
        .route("/api/admin/logs", get(get_api_logs))

        .with_state(state)
}
