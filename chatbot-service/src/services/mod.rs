pub mod chat;
pub mod metrics;
pub mod providers;

pub use chat::ChatHandler;
pub use providers::{InferenceProvider, InvokeRequest, ProviderError};
