//! Domain models for the chatbot service.

pub mod envelope;
pub mod inference;

pub use envelope::{IncomingRequest, RequestEnvelope, ResponseEnvelope};
pub use inference::{ContentBlock, InferenceMessage, InferencePayload, InferenceResponse, Role};
