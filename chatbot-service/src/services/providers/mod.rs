//! Inference provider abstractions and implementations.
//!
//! The handler only ever sees [`InferenceProvider`], so the hosted backend (Bedrock)
//! and the deterministic test double are interchangeable.

pub mod bedrock;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Media type used for both the request body and the accepted response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::NetworkError(_) => "network",
        }
    }
}

/// A single model invocation: the already-encoded body plus its addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub model_id: String,
    pub content_type: String,
    pub accept: String,
    pub body: Vec<u8>,
}

impl InvokeRequest {
    /// JSON in, JSON out.
    pub fn json(model_id: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            model_id: model_id.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            accept: JSON_CONTENT_TYPE.to_string(),
            body,
        }
    }
}

/// Trait for remote model hosts.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Invoke the model and return the raw response body.
    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
