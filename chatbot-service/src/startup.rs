//! Application startup and lifecycle management.
//!
//! Builds the inference provider, wires the chat handler into an axum router and runs
//! the HTTP server until a shutdown signal arrives.

use crate::config::{ChatbotConfig, ProviderKind};
use crate::handlers::{self, health};
use crate::services::chat::ChatHandler;
use crate::services::providers::bedrock::{BedrockConfig, BedrockProvider};
use crate::services::providers::mock::MockProvider;
use crate::services::providers::InferenceProvider;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatHandler,
}

/// Build the provider selected by configuration.
pub async fn build_provider(config: &ChatbotConfig) -> Arc<dyn InferenceProvider> {
    match config.provider {
        ProviderKind::Bedrock => {
            let provider = BedrockProvider::from_config(BedrockConfig {
                region: config.inference.region.clone(),
            })
            .await;
            tracing::info!(
                region = %config.inference.region,
                model = %config.inference.model_id,
                "Initialized Bedrock provider"
            );
            Arc::new(provider)
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock inference provider");
            Arc::new(MockProvider::echo())
        }
    }
}

/// All routes with their middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/invoke", post(handlers::invoke))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config).await;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: ChatbotConfig,
        provider: Arc<dyn InferenceProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            chat: ChatHandler::new(provider, config.inference.clone()),
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chatbot service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}
