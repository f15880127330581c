//! HTTP handlers for the chatbot service.
//!
//! `/invoke` speaks the trigger envelope format directly; `/chat` unwraps it so a browser
//! can post `{"message": ...}` and read the reply with the real status code.

pub mod health;

use crate::error::ChatError;
use crate::models::{RequestEnvelope, ResponseEnvelope};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Envelope in, envelope out. The transport status is always 200; the outcome lives in
/// `statusCode`.
pub async fn invoke(
    State(state): State<AppState>,
    Json(envelope): Json<RequestEnvelope>,
) -> Json<ResponseEnvelope> {
    Json(state.chat.handle(&envelope).await)
}

/// The raw request body becomes the envelope body. Bodies that are not UTF-8 still get
/// a JSON error envelope.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope = match String::from_utf8(body.to_vec()) {
        Ok(text) => RequestEnvelope::new(text),
        Err(e) => return state.chat.reject(ChatError::from(e)).into_response(),
    };
    state.chat.handle(&envelope).await.into_response()
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}
