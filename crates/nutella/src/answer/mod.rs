//! Answer generation against the LLM proxy
//!
//! The pipeline talks to the proxy through the [`AnswerGenerator`] seam so
//! tests and alternative backends can stand in for the HTTP client.

pub mod prompts;
pub mod provider;
pub mod proxy;
pub mod types;

pub use provider::AnswerGenerator;
pub use proxy::ProxyAnswerer;
pub use types::{ChatMessage, ChatOutcome, ReasoningEntry};
