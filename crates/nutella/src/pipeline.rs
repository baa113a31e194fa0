//! Request pipeline: classify, fetch, answer
//!
//! Each request moves through a fixed stage sequence with no backward
//! transitions: the query is classified onto a route, exactly one fetch
//! branch runs, and the fetched data plus the question go to the answer
//! generator. Fetch failures (after cache fallback) are hard errors;
//! answer-generation failures are converted into answer text so the final
//! stage never fails from the caller's point of view.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::{AdminClient, AuthScheme};
use crate::answer::prompts::{DATA_QUESTION_PROMPT, SYSTEM_PROMPT};
use crate::answer::{AnswerGenerator, ChatMessage, ReasoningEntry};
use crate::cache::HourlyCache;
use crate::classify::{Route, classify};
use crate::config::{ApiConfig, Config};
use crate::error::{NutellaError, Result};
use crate::normalize::normalize_users;

/// Pipeline entry-point input
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub query: String,
    pub auth_token: Option<String>,
}

/// Pipeline output; always well-formed, see the error-as-content contract
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub answer: String,
}

/// Per-request transient state threaded through the stages.
///
/// Owned by exactly one in-flight request; never shared across requests.
#[derive(Debug)]
pub struct PipelineContext {
    pub request_id: Uuid,
    pub query: String,
    pub auth_token: Option<String>,
    pub route: Option<Route>,
    pub fetched: Option<Value>,
    pub data_kind: Option<&'static str>,
}

impl PipelineContext {
    fn new(input: PipelineInput) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            query: input.query,
            auth_token: input.auth_token,
            route: None,
            fetched: None,
            data_kind: None,
        }
    }
}

/// The routing pipeline: one entry point, one pass per request
pub struct Pipeline {
    api: ApiConfig,
    cache: HourlyCache,
    answerer: Arc<dyn AnswerGenerator>,
}

impl Pipeline {
    pub fn new(config: &Config, answerer: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            api: config.api.clone(),
            cache: HourlyCache::new(config.cache.dir.clone()),
            answerer,
        }
    }

    /// Run one query through classify, fetch, and answer.
    ///
    /// Returns an error for an empty query or when the fetch path is
    /// exhausted (live call failed and no cache fallback existed). The
    /// answer stage itself never fails: generation errors come back as
    /// answer text.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineOutput> {
        if input.query.trim().is_empty() {
            return Err(NutellaError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        let mut ctx = PipelineContext::new(input);

        let route = classify(&ctx.query);
        ctx.route = Some(route);
        info!(request_id = %ctx.request_id, route = %route, "Query classified");

        let payload = self.fetch_data(route, ctx.auth_token.clone()).await?;
        ctx.data_kind = Some(route.resource());
        ctx.fetched = Some(payload);

        let (answer, outcome) = self.generate_answer(&ctx, route).await;

        self.answerer.submit_reasoning(ReasoningEntry {
            request_id: ctx.request_id,
            route,
            query: ctx.query.clone(),
            outcome,
        });

        Ok(PipelineOutput { answer })
    }

    /// Fetch the resource for the route; users are normalized, domains
    /// pass through as received.
    async fn fetch_data(&self, route: Route, auth_token: Option<String>) -> Result<Value> {
        let auth = AuthScheme::from_parts(auth_token, None);
        let client = AdminClient::new(&self.api, self.cache.clone(), auth)?;
        let raw = client.fetch(route).await?;

        match route {
            Route::Users => serde_json::to_value(normalize_users(raw))
                .map_err(|e| NutellaError::Parse(e.to_string())),
            Route::Domains => Ok(raw),
        }
    }

    /// Ask the answer generator; failures become answer text.
    ///
    /// Returns the answer and a short outcome tag for the reasoning log.
    async fn generate_answer(&self, ctx: &PipelineContext, route: Route) -> (String, String) {
        let data = ctx.fetched.as_ref().unwrap_or(&Value::Null);
        let data_json = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());

        let prompt = DATA_QUESTION_PROMPT
            .replace("{resource}", route.resource())
            .replace("{data}", &data_json)
            .replace("{query}", &ctx.query);
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        match self.answerer.generate(&messages).await {
            Ok(outcome) => (outcome.text(), "answered".to_string()),
            Err(err) => {
                let cause = match err {
                    NutellaError::Answer(cause) => cause,
                    other => other.to_string(),
                };
                warn!(request_id = %ctx.request_id, "AI call failed: {cause}");
                (
                    format!("Error calling AI service: {cause}"),
                    "error".to_string(),
                )
            }
        }
    }
}
