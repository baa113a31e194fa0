//! Trait for answer-generation backends

use async_trait::async_trait;

use crate::answer::types::{ChatMessage, ChatOutcome, ReasoningEntry};
use crate::error::Result;

/// An answer-generation backend.
///
/// Implementations take an ordered message sequence and return the
/// generated outcome. The pipeline converts any error from [`generate`]
/// into answer text, so implementations should surface failures as errors
/// rather than sentinel responses.
///
/// [`generate`]: AnswerGenerator::generate
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer for the given messages
    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatOutcome>;

    /// Submit a reasoning entry for observability.
    ///
    /// Fire-and-forget by contract: callers never observe success or
    /// failure. The default implementation drops the entry.
    fn submit_reasoning(&self, _entry: ReasoningEntry) {}

    /// Human-readable backend name
    fn name(&self) -> &'static str;
}
