mod common;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::*;
use ielts_practice::generation_client::AttemptLog;
use ielts_practice::{ApiLogEntry, CredentialPool, GeminiTransport, GenerationClient};

#[tokio::test]
async fn test_all_rate_limited_exhausts_matrix() {
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let client = client_with(transport.clone(), &["k1", "k2"], &["m1", "m2", "m3", "m4"]);

    let result = client.generate("prompt").await;

    let failure = result.unwrap_err();
    assert_eq!(failure.attempts, 8);
    assert_eq!(transport.calls().len(), 8);
    assert_eq!(client.max_attempts(), 8);
    assert!(failure.last_message.contains("m4"));
}

#[tokio::test]
async fn test_success_stops_immediately() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(rate_limited()),
        Ok(success("generated text")),
    ]));
    let client = client_with(transport.clone(), &["k1", "k2", "k3"], &["m1", "m2"]);

    let text = client.generate("prompt").await.unwrap();

    assert_eq!(text, "generated text");
    assert_eq!(
        transport.calls(),
        vec![
            ("m1".to_string(), "k1".to_string()),
            ("m1".to_string(), "k2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_models_tried_in_configured_order_with_one_attempt_per_key() {
    let transport = Arc::new(ScriptedTransport::always(server_error()));
    let client = client_with(transport.clone(), &["k1", "k2"], &["flash", "pro"]);

    assert!(client.generate("prompt").await.is_err());

    assert_eq!(
        transport.calls(),
        vec![
            ("flash".to_string(), "k1".to_string()),
            ("flash".to_string(), "k2".to_string()),
            ("pro".to_string(), "k1".to_string()),
            ("pro".to_string(), "k2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_empty_candidates_moves_to_next_key() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(no_candidates()),
        Ok(success("second key worked")),
    ]));
    let client = client_with(transport.clone(), &["k1", "k2"], &["m1"]);

    assert_eq!(client.generate("prompt").await.unwrap(), "second key worked");
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_transport_errors_and_bad_statuses_are_retried() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Err("connection reset".to_string()),
        Ok(server_error()),
        Ok(success("third time")),
    ]));
    let client = client_with(transport.clone(), &["k1", "k2"], &["m1", "m2"]);

    assert_eq!(client.generate("prompt").await.unwrap(), "third time");
    assert_eq!(transport.calls()[2], ("m2".to_string(), "k1".to_string()));
}

#[tokio::test]
async fn test_terminal_failure_keeps_last_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(rate_limited()),
        Err("dns failure".to_string()),
    ]));
    let client = client_with(transport, &["k1"], &["m1", "m2"]);

    let failure = client.generate("prompt").await.unwrap_err();
    assert_eq!(failure.attempts, 2);
    assert!(failure.last_message.contains("dns failure"));
}

#[tokio::test]
async fn test_generated_failure_word_is_still_success() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success("failure"))]));
    let client = client_with(transport, &["k1"], &["m1"]);

    assert_eq!(client.generate("prompt").await, Ok("failure".to_string()));
}

#[tokio::test]
async fn test_cursor_advances_once_per_attempt_across_requests() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(rate_limited()),
        Ok(success("first")),
        Ok(success("second")),
    ]));
    let pool = Arc::new(CredentialPool::new(keys(&["k1", "k2", "k3"])).unwrap());
    let client = GenerationClient::new(transport.clone(), pool.clone(), models(&["m1"]), Duration::ZERO).unwrap();

    client.generate("one").await.unwrap();
    assert_eq!(pool.cursor(), 2);

    client.generate("two").await.unwrap();
    assert_eq!(pool.cursor(), 0);

    let used: Vec<String> = transport.calls().into_iter().map(|(_, k)| k).collect();
    assert_eq!(used, vec!["k1", "k2", "k3"]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_between_keys_of_same_model_only() {
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let pool = Arc::new(CredentialPool::new(keys(&["k1", "k2", "k3"])).unwrap());
    let client = GenerationClient::new(
        transport.clone(),
        pool,
        models(&["m1", "m2"]),
        Duration::from_secs(60),
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    let result = client.generate("prompt").await;

    assert!(result.is_err());
    assert_eq!(transport.calls().len(), 6);
    // Two waits per model, none before a model's first key.
    assert_eq!(start.elapsed(), Duration::from_secs(240));
}

#[tokio::test(start_paused = true)]
async fn test_no_backoff_when_first_attempt_succeeds() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(success("fast"))]));
    let pool = Arc::new(CredentialPool::new(keys(&["k1", "k2"])).unwrap());
    let client = GenerationClient::new(transport, pool, models(&["m1"]), Duration::from_secs(60)).unwrap();

    let start = tokio::time::Instant::now();
    client.generate("prompt").await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[derive(Default)]
struct MemoryAttemptLog {
    entries: Mutex<Vec<ApiLogEntry>>,
}

#[async_trait]
impl AttemptLog for MemoryAttemptLog {
    async fn record_attempt(&self, entry: ApiLogEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[tokio::test]
async fn test_every_attempt_is_recorded() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(rate_limited()),
        Ok(server_error()),
        Ok(success("done")),
    ]));
    let log = Arc::new(MemoryAttemptLog::default());
    let client = client_with(transport, &["k1", "k2"], &["m1", "m2"]).with_attempt_log(log.clone());

    client.generate_tagged("reading_questions", "prompt").await.unwrap();

    let entries = log.entries.lock().unwrap();
    let statuses: Vec<&str> = entries.iter().map(|e| e.status.as_str()).collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(statuses[0], "rate_limited");
    assert!(statuses[1].starts_with("failed: status 500"));
    assert_eq!(statuses[2], "success");
    assert!(entries.iter().all(|e| e.request_type == "reading_questions"));
    assert_eq!(entries[2].model, "m2");
}

#[test]
fn test_empty_model_list_is_rejected() {
    let transport = Arc::new(ScriptedTransport::always(rate_limited()));
    let pool = Arc::new(CredentialPool::new(keys(&["k1"])).unwrap());
    assert!(GenerationClient::new(transport, pool, vec![], Duration::ZERO).is_err());
}

#[tokio::test]
async fn test_transport_errors_do_not_expose_keys() {
    let secret = "AIzaSECRETKEY1234567890";
    let transport = Arc::new(GeminiTransport::new(Some("http://127.0.0.1:1/v1beta".to_string())));
    let pool = Arc::new(CredentialPool::new(keys(&[secret])).unwrap());
    let log = Arc::new(MemoryAttemptLog::default());
    let client = GenerationClient::new(transport, pool, models(&["m1"]), Duration::ZERO)
        .unwrap()
        .with_attempt_log(log.clone());

    let failure = client.generate("prompt").await.unwrap_err();

    assert!(failure.last_message.contains("transport error"));
    assert!(!failure.to_string().contains(secret));
    let entries = log.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].status.contains(secret));
}
