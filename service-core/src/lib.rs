//! service-core: Shared infrastructure for the chatbot service.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
