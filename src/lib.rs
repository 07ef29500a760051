pub mod admin_service;
pub mod api;
pub mod config;
pub mod credential_pool;
pub mod database;
pub mod errors;
pub mod essay_scorer;
pub mod evaluation_parser;
pub mod generation_client;
pub mod llm_providers;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod quiz_parser;
pub mod reading_service;
pub mod writing_service;

pub use admin_service::AdminService;
pub use credential_pool::CredentialPool;
pub use database::{Database, EvaluationStore, QuizStore};
pub use errors::*;
pub use essay_scorer::HeuristicEssayScorer;
pub use evaluation_parser::EvaluationResponseParser;
pub use generation_client::{GenerationClient, GenerationOutcome, TerminalFailure};
pub use llm_providers::{GeminiTransport, GenerationTransport, TransportResponse};
pub use models::*;
pub use quiz_parser::QuizResponseParser;
pub use reading_service::ReadingService;
pub use writing_service::WritingService;
