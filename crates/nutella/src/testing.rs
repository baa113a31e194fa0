//! Test utilities for nutella - scripted collaborators
//!
//! Provides a scripted answer generator so pipeline tests can run without
//! an LLM proxy and can observe exactly what the pipeline sent.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::answer::{AnswerGenerator, ChatMessage, ChatOutcome, ReasoningEntry};
use crate::error::{NutellaError, Result};

enum Mode {
    Answer(String),
    Fail(String),
}

/// Scripted [`AnswerGenerator`] that records every call it receives.
pub struct MockAnswerer {
    mode: Mode,
    /// Message lists passed to `generate`, in call order
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    /// Reasoning entries submitted by the pipeline
    pub reasoning: Mutex<Vec<ReasoningEntry>>,
}

impl MockAnswerer {
    /// Always answer with the given text
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            mode: Mode::Answer(text.into()),
            calls: Mutex::new(Vec::new()),
            reasoning: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with the given cause
    pub fn failing(cause: impl Into<String>) -> Self {
        Self {
            mode: Mode::Fail(cause.into()),
            calls: Mutex::new(Vec::new()),
            reasoning: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnswerGenerator for MockAnswerer {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatOutcome> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(messages.to_vec());

        match &self.mode {
            Mode::Answer(text) => Ok(ChatOutcome {
                assistant: Some(text.clone()),
                raw: json!({"assistant": text}),
            }),
            Mode::Fail(cause) => Err(NutellaError::Answer(cause.clone())),
        }
    }

    fn submit_reasoning(&self, entry: ReasoningEntry) {
        self.reasoning
            .lock()
            .expect("reasoning lock poisoned")
            .push(entry);
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
