//! Amazon Bedrock provider implementation.
//!
//! Calls `InvokeModel` on the Bedrock runtime with a pre-encoded JSON body.

use super::{InferenceProvider, InvokeRequest, ProviderError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client as BedrockClient;

/// Bedrock provider configuration.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: String,
}

/// Bedrock runtime provider.
pub struct BedrockProvider {
    client: BedrockClient,
    credentials: Option<SharedCredentialsProvider>,
}

impl BedrockProvider {
    /// `credentials` is the chain the client signs with; health checks resolve it.
    pub fn new(client: BedrockClient, credentials: Option<SharedCredentialsProvider>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Resolve credentials from the default chain and build a client pinned to `region`.
    pub async fn from_config(config: BedrockConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .load()
            .await;

        Self::new(
            BedrockClient::new(&sdk_config),
            sdk_config.credentials_provider(),
        )
    }
}

fn map_sdk_error<R>(err: SdkError<InvokeModelError, R>) -> ProviderError
where
    R: std::fmt::Debug + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(service) if service.err().is_throttling_exception() => {
            ProviderError::RateLimited(message)
        }
        SdkError::ServiceError(_) => ProviderError::ApiError(message),
        _ => ProviderError::NetworkError(message),
    }
}

#[async_trait]
impl InferenceProvider for BedrockProvider {
    fn name(&self) -> &'static str {
        "bedrock"
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!(
            model = %request.model_id,
            body_len = request.body.len(),
            "Sending request to Bedrock"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(request.model_id)
            .content_type(request.content_type)
            .accept(request.accept)
            .body(Blob::new(request.body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.body.into_inner())
    }

    /// Region must be set and credentials must resolve. Makes no Bedrock call.
    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.client.config().region().is_none() {
            return Err(ProviderError::NotConfigured(
                "Bedrock client has no region".to_string(),
            ));
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("No AWS credentials provider configured".to_string())
        })?;

        credentials
            .provide_credentials()
            .await
            .map(|_| ())
            .map_err(|e| {
                ProviderError::NotConfigured(format!(
                    "AWS credentials unavailable: {}",
                    DisplayErrorContext(&e)
                ))
            })
    }
}
