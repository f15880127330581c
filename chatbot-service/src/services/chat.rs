//! The chat request handler.
//!
//! Turns a trigger envelope into a response envelope: decode the message, invoke the
//! model once, extract the first content block's text. Every failure becomes an
//! error envelope; nothing escapes [`ChatHandler::handle`].

use crate::config::InferenceSettings;
use crate::error::ChatError;
use crate::models::{
    IncomingRequest, InferencePayload, InferenceResponse, RequestEnvelope, ResponseEnvelope,
};
use crate::services::metrics;
use crate::services::providers::{InferenceProvider, InvokeRequest};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ChatHandler {
    provider: Arc<dyn InferenceProvider>,
    settings: InferenceSettings,
}

impl ChatHandler {
    pub fn new(provider: Arc<dyn InferenceProvider>, settings: InferenceSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn InferenceProvider> {
        &self.provider
    }

    /// Handle one invocation. Always returns an envelope.
    pub async fn handle(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let started = Instant::now();
        let result = self.reply(envelope).await;
        self.finish(result, started)
    }

    /// Envelope for a request that failed before it could be handed to [`Self::handle`].
    pub fn reject(&self, err: ChatError) -> ResponseEnvelope {
        self.finish(Err(err), Instant::now())
    }

    fn finish(&self, result: Result<String, ChatError>, started: Instant) -> ResponseEnvelope {
        let response = match result {
            Ok(text) => ResponseEnvelope::success(&text),
            Err(ChatError::Validation) => {
                tracing::debug!("Rejected chat request without a message");
                ResponseEnvelope::error(400, &ChatError::Validation.to_string())
            }
            Err(e) => {
                tracing::error!(error = %e, status = e.status_code(), "Chat request failed");
                ResponseEnvelope::error(e.status_code(), &e.to_string())
            }
        };

        metrics::record_chat_request(response.status_code, started.elapsed().as_secs_f64());
        response
    }

    /// The reply text for `envelope`, or the reason there is none.
    pub async fn reply(&self, envelope: &RequestEnvelope) -> Result<String, ChatError> {
        let body = envelope.body.as_deref().ok_or(ChatError::MissingBody)?;
        let message = IncomingRequest::parse(body)?
            .message
            .ok_or(ChatError::Validation)?;

        let payload = InferencePayload::user_turn(message, &self.settings);
        let encoded = serde_json::to_vec(&payload).map_err(ChatError::PayloadEncoding)?;
        let invoke = InvokeRequest::json(&self.settings.model_id, encoded);

        let provider = self.provider.name();
        let started = Instant::now();
        let raw = self.provider.invoke(invoke).await.map_err(|e| {
            metrics::record_inference_error(provider, e.kind());
            e
        })?;
        metrics::record_inference_latency(
            provider,
            &self.settings.model_id,
            started.elapsed().as_secs_f64(),
        );

        tracing::debug!(
            provider,
            model = %self.settings.model_id,
            response_len = raw.len(),
            "Received inference response"
        );

        let response: InferenceResponse = serde_json::from_slice(&raw)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        response.into_first_text().ok_or_else(|| {
            ChatError::MalformedResponse("missing content[0].text".to_string())
        })
    }
}
