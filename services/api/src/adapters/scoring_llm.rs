//! services/api/src/adapters/scoring_llm.rs
//!
//! This module contains the adapter for the live priority-scoring LLM.
//! It implements the `PriorityScorer` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint (Gemini's compatibility endpoint
//! by default).

const SYSTEM_INSTRUCTIONS: &str = r#"You are a municipal issue classification assistant. Given the fields of a citizen's report, produce a JSON object that includes:
1) "score": a priority score from 0 to 100 (higher is more urgent). Consider public safety, environmental risks, time-sensitivity, and the potential for spread or damage.
2) "summary": a concise 2-sentence summary for the municipal admin.
3) "department": the suggested municipal department to handle the issue (e.g. "Roads Department", "Public Works").
4) "recommended_action": a single, specific, physical first action (e.g. "Dispatch crew to cone off the area and assess the damage.").
5) "resolution_timeframe": a suggested resolution timeframe based on urgency (e.g. "Within 24 hours", "1-3 business days", "Within 2 weeks").

Respond ONLY with the JSON object matching the provided schema."#;

const USER_INPUT_TEMPLATE: &str = r#"Report Details:
Title: {title}
Description: {description}
Category: {category}
Address: {address}"#;

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use civic_connect_core::{
    domain::{Assessment, ScoringRequest},
    ports::{PortError, PortResult, PriorityScorer, ScoringMode},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};

//=========================================================================================
// Wire Shape of the Assessment
//=========================================================================================

/// The JSON object the model is asked to return. Every field is required and
/// must have the declared primitive type; nothing is coerced.
#[derive(Debug, Deserialize, JsonSchema)]
struct AssessmentPayload {
    /// A priority score from 0 to 100, where higher is more urgent.
    score: f64,
    /// A concise 2-sentence summary for the municipal admin.
    summary: String,
    /// The suggested municipal department to handle the issue.
    department: String,
    /// A single, specific, physical first action to be taken.
    recommended_action: String,
    /// A suggested timeframe for resolution.
    resolution_timeframe: String,
}

impl AssessmentPayload {
    fn into_domain(self) -> Assessment {
        Assessment {
            score: Assessment::clamp_score(self.score),
            summary: self.summary,
            department: self.department,
            recommended_action: self.recommended_action,
            resolution_timeframe: self.resolution_timeframe,
        }
    }
}

fn assessment_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(AssessmentPayload)).unwrap_or_default()
}

/// Pulls the JSON object out of a model reply, tolerating a markdown code fence.
fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Skip an optional language tag on the opening fence line.
            let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
            body.rsplit_once("```").map_or(body, |(body, _)| body).trim()
        }
        None => trimmed,
    };
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (start < end).then(|| &unfenced[start..=end])
}

/// Decodes a model reply into a typed assessment or an explicit shape error.
pub fn decode_assessment(text: &str) -> PortResult<Assessment> {
    let json = extract_json_object(text).ok_or_else(|| {
        PortError::InvalidAssessmentShape("No JSON object found in response".to_string())
    })?;
    let payload: AssessmentPayload = serde_json::from_str(json)
        .map_err(|e| PortError::InvalidAssessmentShape(e.to_string()))?;
    Ok(payload.into_domain())
}

fn render_user_input(request: &ScoringRequest<'_>) -> String {
    USER_INPUT_TEMPLATE
        .replace("{title}", request.title)
        .replace("{description}", request.description)
        .replace("{category}", request.category.as_str())
        .replace("{address}", request.address)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Builds a client for the scoring endpoint. Retries are disabled: a failed
/// call surfaces immediately as an error.
pub fn scoring_client(api_key: &str, api_base: &str) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base);
    let no_retry = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();
    Client::with_config(config).with_backoff(no_retry)
}

/// An adapter that implements `PriorityScorer` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiScoringAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiScoringAdapter {
    /// Creates a new `OpenAiScoringAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, temperature: f32, timeout: Duration) -> Self {
        Self {
            client,
            model,
            temperature,
            timeout,
        }
    }
}

//=========================================================================================
// `PriorityScorer` Trait Implementation
//=========================================================================================

#[async_trait]
impl PriorityScorer for OpenAiScoringAdapter {
    /// Makes exactly one chat-completion call; failures are surfaced, never retried.
    async fn assess(&self, request: &ScoringRequest<'_>) -> PortResult<Assessment> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(render_user_input(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name: "priority_assessment".to_string(),
                description: Some("Priority assessment of a civic issue report".to_string()),
                schema: Some(assessment_schema()),
                strict: None,
            },
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .response_format(response_format)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %self.model, category = %request.category, "Requesting priority assessment");

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| {
                PortError::ExternalService(format!(
                    "Scoring call timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::ExternalService(e.to_string()))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::ExternalService("Scoring LLM returned no choices in its response.".to_string())
        })?;
        let content = choice.message.content.ok_or_else(|| {
            PortError::InvalidAssessmentShape(
                "Scoring LLM response contained no text content.".to_string(),
            )
        })?;

        let assessment = decode_assessment(&content)?;
        info!(score = assessment.score, department = %assessment.department, "Live assessment received");
        Ok(assessment)
    }

    fn mode(&self) -> ScoringMode {
        ScoringMode::Live
    }
}
