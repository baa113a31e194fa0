//! Prompts for LLM-backed answer generation
//!
//! Templates used by the pipeline to frame fetched admin data and the
//! user's question for the proxy.

/// System prompt framing the assistant's role
pub const SYSTEM_PROMPT: &str = "You are an administrative assistant. Answer the user's question using only the data provided. Be concise and factual; if the data does not contain the answer, say so.";

/// User prompt combining fetched data with the original question
///
/// Placeholders: {resource} - data kind ("users" or "domains"),
/// {data} - fetched payload as JSON, {query} - the original question
pub const DATA_QUESTION_PROMPT: &str = r#"Here is the current {resource} data from the admin API:

{data}

Question: {query}"#;
