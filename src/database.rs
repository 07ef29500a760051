use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Instant;
use uuid::Uuid;

use crate::generation_client::AttemptLog;
use crate::models::*;

// Import logging macros
use crate::log_db_operation;

/// Storage for generated reading questions.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn save_questions(&self, quiz_id: Uuid, questions: &[ParsedQuestion]) -> Result<()>;
}

/// Storage for essay evaluations.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn save_evaluation(&self, evaluation: &StoredEvaluation) -> Result<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Every in-memory connection is its own database, keep a single one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reading_questions (
                id TEXT PRIMARY KEY,
                quiz_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                question_text TEXT NOT NULL,
                explanation TEXT,
                is_multiple_choice INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reading_options (
                question_id TEXT NOT NULL,
                option_label TEXT NOT NULL,
                option_text TEXT,
                is_correct INTEGER NOT NULL DEFAULT 0,
                position INTEGER NOT NULL,
                FOREIGN KEY (question_id) REFERENCES reading_questions(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS writing_sessions (
                session_id TEXT PRIMARY KEY,
                topic TEXT NOT NULL,
                user_text TEXT NOT NULL,
                score REAL NOT NULL,
                ai_feedback TEXT NOT NULL,
                suggestions TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_logs (
                id TEXT PRIMARY KEY,
                request_type TEXT NOT NULL,
                model TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        log_db_operation!(info, "migrate", "schema ready");
        Ok(())
    }

    pub async fn get_quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<ParsedQuestion>> {
        let start = Instant::now();
        let rows = sqlx::query(
            "SELECT id, question_text, explanation, is_multiple_choice FROM reading_questions WHERE quiz_id = ?1 ORDER BY position ASC"
        )
        .bind(quiz_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let question_id: String = row.get("id");
            let option_rows = sqlx::query(
                "SELECT option_label, option_text, is_correct FROM reading_options WHERE question_id = ?1 ORDER BY position ASC"
            )
            .bind(&question_id)
            .fetch_all(&self.pool)
            .await?;

            let options = option_rows
                .into_iter()
                .map(|o| QuizOption {
                    label: o.get("option_label"),
                    text: o.get::<Option<String>, _>("option_text").unwrap_or_default(),
                    is_correct: o.get::<i64, _>("is_correct") != 0,
                })
                .collect();

            questions.push(ParsedQuestion {
                question_text: row.get("question_text"),
                options,
                explanation: row.get::<Option<String>, _>("explanation").unwrap_or_default(),
                is_multiple_choice: row.get::<i64, _>("is_multiple_choice") != 0,
            });
        }

        log_db_operation!(
            debug,
            "get_quiz_questions",
            count = questions.len(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(questions)
    }

    pub async fn get_evaluation(&self, session_id: Uuid) -> Result<Option<StoredEvaluation>> {
        let row = sqlx::query("SELECT * FROM writing_sessions WHERE session_id = ?1")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let suggestions: Vec<String> = serde_json::from_str(&row.get::<String, _>("suggestions"))?;
        Ok(Some(StoredEvaluation {
            session_id: Uuid::parse_str(&row.get::<String, _>("session_id"))?,
            topic: row.get("topic"),
            essay: row.get("user_text"),
            result: EvaluationResult {
                score: row.get("score"),
                feedback: row.get("ai_feedback"),
                suggestions,
            },
            created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("created_at"))?
                .with_timezone(&Utc),
        }))
    }

    pub async fn get_api_logs(&self) -> Result<Vec<ApiLogEntry>> {
        let rows = sqlx::query("SELECT * FROM api_logs ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await?;

        let mut logs = Vec::with_capacity(rows.len());
        for row in rows {
            logs.push(ApiLogEntry {
                id: Uuid::parse_str(&row.get::<String, _>("id"))?,
                request_type: row.get("request_type"),
                model: row.get("model"),
                status: row.get("status"),
                timestamp: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("timestamp"))?
                    .with_timezone(&Utc),
            });
        }
        Ok(logs)
    }
}

#[async_trait]
impl QuizStore for Database {
    async fn save_questions(&self, quiz_id: Uuid, questions: &[ParsedQuestion]) -> Result<()> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await?;

        for (position, question) in questions.iter().enumerate() {
            let question_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO reading_questions (id, quiz_id, position, question_text, explanation, is_multiple_choice)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&question_id)
            .bind(quiz_id.to_string())
            .bind(position as i64)
            .bind(&question.question_text)
            .bind(&question.explanation)
            .bind(question.is_multiple_choice)
            .execute(&mut *tx)
            .await?;

            for (option_position, option) in question.options.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO reading_options (question_id, option_label, option_text, is_correct, position) VALUES (?1, ?2, ?3, ?4, ?5)"
                )
                .bind(&question_id)
                .bind(&option.label)
                .bind(&option.text)
                .bind(option.is_correct)
                .bind(option_position as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        log_db_operation!(
            debug,
            "save_questions",
            count = questions.len(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(())
    }
}

#[async_trait]
impl EvaluationStore for Database {
    async fn save_evaluation(&self, evaluation: &StoredEvaluation) -> Result<()> {
        let suggestions = serde_json::to_string(&evaluation.result.suggestions)?;

        sqlx::query(
            r#"
            INSERT INTO writing_sessions (session_id, topic, user_text, score, ai_feedback, suggestions, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(session_id) DO UPDATE SET
                topic = excluded.topic,
                user_text = excluded.user_text,
                score = excluded.score,
                ai_feedback = excluded.ai_feedback,
                suggestions = excluded.suggestions,
                created_at = excluded.created_at
            "#,
        )
        .bind(evaluation.session_id.to_string())
        .bind(&evaluation.topic)
        .bind(&evaluation.essay)
        .bind(evaluation.result.score)
        .bind(&evaluation.result.feedback)
        .bind(suggestions)
        .bind(evaluation.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AttemptLog for Database {
    async fn record_attempt(&self, entry: ApiLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO api_logs (id, request_type, model, status, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)"
        )
        .bind(entry.id.to_string())
        .bind(&entry.request_type)
        .bind(&entry.model)
        .bind(&entry.status)
        .bind(entry.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
