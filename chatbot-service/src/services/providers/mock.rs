//! Mock provider implementation for testing and local runs.

use super::{InferenceProvider, InvokeRequest, ProviderError};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Echo the user's message back as `Mock response for: <message>`.
    Echo,
    /// A well-formed response whose first content block carries this text.
    Text(String),
    /// Raw response bytes, returned verbatim.
    Raw(Vec<u8>),
    /// Fail the call.
    Error(ProviderError),
}

/// Mock inference provider. Records every request it receives.
pub struct MockProvider {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<InvokeRequest>>,
}

impl MockProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockReply::Echo)
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockReply::Error(error))
    }

    /// Number of `invoke` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<InvokeRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

fn text_response(text: &str) -> Result<Vec<u8>, ProviderError> {
    serde_json::to_vec(&json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    }))
    .map_err(|e| ProviderError::ApiError(e.to_string()))
}

fn user_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value["messages"][0]["content"].as_str().map(str::to_string)
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let result = match &self.reply {
            MockReply::Echo => {
                let message = user_message(&request.body).unwrap_or_default();
                text_response(&format!("Mock response for: {}", message))
            }
            MockReply::Text(text) => text_response(text),
            MockReply::Raw(bytes) => Ok(bytes.clone()),
            MockReply::Error(err) => Err(err.clone()),
        };

        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }

        result
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
