#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ielts_practice::{CredentialPool, GenerationClient, GenerationTransport, TransportResponse};

/// Transport that replays scripted responses and records every call.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, String>>>,
    fallback: TransportResponse,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportResponse, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: rate_limited(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same response.
    pub fn always(response: TransportResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (model, key) pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn send(&self, model: &str, api_key: &str, _prompt: &str) -> Result<TransportResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), api_key.to_string()));

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}

pub fn success(text: &str) -> TransportResponse {
    let body = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    });
    TransportResponse {
        status: 200,
        body: body.to_string(),
    }
}

pub fn no_candidates() -> TransportResponse {
    TransportResponse {
        status: 200,
        body: r#"{"candidates":[]}"#.to_string(),
    }
}

pub fn rate_limited() -> TransportResponse {
    TransportResponse {
        status: 429,
        body: r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
    }
}

pub fn server_error() -> TransportResponse {
    TransportResponse {
        status: 500,
        body: "internal".to_string(),
    }
}

pub fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|k| k.to_string()).collect()
}

/// Client with no backoff over the given transport.
pub fn client_with(
    transport: Arc<ScriptedTransport>,
    key_names: &[&str],
    model_names: &[&str],
) -> GenerationClient {
    let pool = Arc::new(CredentialPool::new(keys(key_names)).unwrap());
    GenerationClient::new(transport, pool, models(model_names), Duration::ZERO).unwrap()
}

pub const QUIZ_TEXT: &str = "1. What is the main purpose of the passage?\nA. To entertain readers\nB. To describe bee behaviour\nC. To sell honey\nD. To criticise farmers\nAnswer: B\nExplanation: The passage mostly describes how bees behave.\n\n2. Which TWO statements are supported by the passage? Select all that apply.\nA. Bees communicate by dancing\nB. Bees live alone\nC. Bees pollinate crops\nD. Bees hibernate underwater\nAnswer: A, C\nExplanation: Dancing is described in paragraph two.\nPollination is covered in paragraph three.\n\n3. What does the word 'forage' most likely mean?\nA. search for food\nB. build a nest\nC. sleep\nD. migrate\nAnswer: A\nExplanation: The context describes bees looking for nectar.";

pub const EVALUATION_TEXT: &str = "Score: 6.5\nFeedback: The essay presents a clear position but lacks specific examples.\nSuggestions:\n1. Add concrete examples to each body paragraph\n2. Use a wider range of linking words\n3. Vary sentence structures\n4. Check subject-verb agreement\n5. Restate your position in the conclusion";
