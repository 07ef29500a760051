mod common;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::*;
use ielts_practice::{
    AdminService, Database, EvaluationStore, HeuristicEssayScorer, ReadingService, ServiceError,
    StoredEvaluation, WritingService,
};

/// Evaluation store whose writes always fail.
struct FailingEvaluationStore;

#[async_trait]
impl EvaluationStore for FailingEvaluationStore {
    async fn save_evaluation(&self, _evaluation: &StoredEvaluation) -> Result<()> {
        Err(anyhow!("database is locked"))
    }
}

async fn memory_db() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn test_generate_quiz_parses_generated_text() {
    let db = memory_db().await;
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success(QUIZ_TEXT))]));
    let service = ReadingService::new(Some(client_with(transport, &["k1"], &["m1"])), Arc::new(db));

    let questions = service.generate_quiz("Bees are social insects.").await.unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions[1].is_multiple_choice);
}

#[tokio::test]
async fn test_generate_quiz_reports_unavailable() {
    let db = memory_db().await;
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let service = ReadingService::new(Some(client_with(transport, &["k1", "k2"], &["m1"])), Arc::new(db));

    let result = service.generate_quiz("passage").await;
    assert!(matches!(result, Err(ServiceError::GenerationUnavailable(_))));
}

#[tokio::test]
async fn test_generate_quiz_without_client_is_unavailable() {
    let service = ReadingService::new(None, Arc::new(memory_db().await));
    let result = service.generate_quiz("passage").await;
    assert!(matches!(result, Err(ServiceError::GenerationUnavailable(_))));
}

#[tokio::test]
async fn test_generate_and_save_quiz_round_trips_through_store() {
    let db = memory_db().await;
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success(QUIZ_TEXT))]));
    let service = ReadingService::new(
        Some(client_with(transport, &["k1"], &["m1"])),
        Arc::new(db.clone()),
    );
    let quiz_id = Uuid::new_v4();

    let generated = service.generate_and_save_quiz(quiz_id, "passage").await.unwrap();
    let stored = db.get_quiz_questions(quiz_id).await.unwrap();

    assert_eq!(stored, generated);
    for question in &stored {
        assert_eq!(question.is_multiple_choice, question.correct_count() > 1);
    }
}

#[tokio::test]
async fn test_failed_generation_saves_nothing() {
    let db = memory_db().await;
    let transport = Arc::new(ScriptedTransport::always(server_error()));
    let service = ReadingService::new(
        Some(client_with(transport, &["k1"], &["m1"])),
        Arc::new(db.clone()),
    );
    let quiz_id = Uuid::new_v4();

    assert!(service.generate_and_save_quiz(quiz_id, "passage").await.is_err());
    assert!(db.get_quiz_questions(quiz_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_evaluate_essay_uses_generated_result() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success(EVALUATION_TEXT))]));
    let service = WritingService::new(
        Some(client_with(transport, &["k1"], &["m1"])),
        Arc::new(memory_db().await),
    );

    let result = service.evaluate_essay("Technology", "Some essay text").await;
    assert_eq!(result.score, 6.5);
    assert_eq!(result.suggestions[0], "Add concrete examples to each body paragraph");
}

#[tokio::test]
async fn test_evaluate_essay_falls_back_to_heuristic() {
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let service = WritingService::new(
        Some(client_with(transport, &["k1", "k2"], &["m1", "m2"])),
        Arc::new(memory_db().await),
    );
    let essay = "Technology changes how we work. However, not everyone benefits. ".repeat(10);

    let result = service.evaluate_essay("Technology at work", &essay).await;
    assert_eq!(result, HeuristicEssayScorer::score(&essay, "Technology at work"));
    assert_eq!(result.score, 5.5);
}

#[tokio::test]
async fn test_evaluate_essay_without_client_is_heuristic() {
    let service = WritingService::new(None, Arc::new(memory_db().await));
    let result = service.evaluate_essay("Anything", "too short").await;
    assert_eq!(result.score, 1.0);
    assert_eq!(result.suggestions.len(), 5);
}

#[tokio::test]
async fn test_evaluate_and_save_persists_against_session() {
    let db = memory_db().await;
    let service = WritingService::new(None, Arc::new(db.clone()));
    let session_id = Uuid::new_v4();

    let result = service
        .evaluate_and_save(session_id, "Cities", "Cities are growing quickly.")
        .await;

    let stored = db.get_evaluation(session_id).await.unwrap().unwrap();
    assert_eq!(stored.result, result);
    assert_eq!(stored.topic, "Cities");
}

#[tokio::test]
async fn test_evaluate_and_save_keeps_result_when_storage_fails() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success(EVALUATION_TEXT))]));
    let service = WritingService::new(
        Some(client_with(transport, &["k1"], &["m1"])),
        Arc::new(FailingEvaluationStore),
    );

    let result = service
        .evaluate_and_save(Uuid::new_v4(), "Technology", "Some essay text")
        .await;

    assert_eq!(result.score, 6.5);
    assert_eq!(result.suggestions.len(), 5);
}

#[tokio::test]
async fn test_admin_title_uses_first_line() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success(
        "\nThe Impact of Remote Work on Cities\nThis title suits band 7.",
    ))]));
    let service = AdminService::new(Some(client_with(transport, &["k1"], &["m1"])));

    let title = service.generate_writing_title("7").await.unwrap();
    assert_eq!(title, "The Impact of Remote Work on Cities");
}

#[tokio::test]
async fn test_admin_passage_falls_back_to_sample() {
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let service = AdminService::new(Some(client_with(transport, &["k1"], &["m1"])));

    let passage = service.generate_reading_passage("Urban Farming").await;
    assert!(passage.starts_with("Passage: This is a sample IELTS reading passage about Urban Farming."));
}

#[tokio::test]
async fn test_attempts_are_logged_to_database() {
    let db = memory_db().await;
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(rate_limited()),
        Ok(success("Some suggestions")),
    ]));
    let client = client_with(transport, &["k1", "k2"], &["m1"]).with_attempt_log(Arc::new(db.clone()));
    let service = AdminService::new(Some(client));

    service.generate_writing_suggestions("Tourism").await.unwrap();

    let logs = db.get_api_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.request_type == "writing_suggestions"));
    assert!(logs.iter().any(|l| l.status == "rate_limited"));
    assert!(logs.iter().any(|l| l.status == "success"));
}
