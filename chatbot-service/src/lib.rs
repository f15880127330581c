//! chatbot-service: relays a user chat message to a hosted LLM and returns the reply.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
