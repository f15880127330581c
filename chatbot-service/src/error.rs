use crate::services::providers::ProviderError;
use thiserror::Error;

/// Validation failure text returned to callers.
pub const NO_MESSAGE_PROVIDED: &str = "No message provided";

/// Everything that can end a chat invocation early.
///
/// Status codes are only assigned at the envelope boundary via [`ChatError::status_code`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No message provided")]
    Validation,

    #[error("Request envelope has no body")]
    MissingBody,

    #[error("Invalid request body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request body: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Invalid request body: expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Invalid message: expected a string, found {0}")]
    InvalidMessage(&'static str),

    #[error("Failed to encode inference payload: {0}")]
    PayloadEncoding(serde_json::Error),

    #[error(transparent)]
    RemoteService(#[from] ProviderError),

    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::Validation => 400,
            ChatError::MissingBody
            | ChatError::Decode(_)
            | ChatError::Encoding(_)
            | ChatError::NotAnObject(_)
            | ChatError::InvalidMessage(_)
            | ChatError::PayloadEncoding(_)
            | ChatError::RemoteService(_)
            | ChatError::MalformedResponse(_) => 500,
        }
    }
}
