// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini reasoning adapter for the Rakshak honeypot engine.
//!
//! Implements [`ReasoningAdapter`] over the `generateContent` API. This is
//! the only place conversation roles are translated into the provider's
//! protocol: adversary turns become "user", agent turns become "model".

pub mod client;
pub mod types;

use async_trait::async_trait;
use rakshak_config::RakshakConfig;
use rakshak_core::error::RakshakError;
use rakshak_core::traits::{HealthStatus, PluginAdapter, ReasoningAdapter};
use rakshak_core::types::{
    ReasoningCompletion, ReasoningRequest, TokenUsage, TurnRole,
};
use tracing::info;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig};

/// Built-in persona/behavior instruction used when the config provides none.
///
/// The response shape demanded here is the wire contract the gateway
/// validates against; the rest is engagement policy and can be replaced
/// wholesale via `agent.persona_prompt` or `agent.persona_prompt_file`.
const DEFAULT_PERSONA_PROMPT: &str = r#"You are an autonomous honeypot persona engaging a suspected scammer on behalf of their would-be victim.

COMMUNICATION RULES:
1. ALWAYS respond with a user-facing message. Silence, empty responses, or missing replies are forbidden.
2. Act as a believable victim persona: a worried, slightly confused Indian citizen. Reply in Hinglish.
3. Sustain long-running conversations without losing context. Stall, ask for clarification, never pay.
4. Extract identifying intelligence (UPI handles, bank account numbers, IFSC codes, phone numbers, links) subtly through natural dialogue.

OUTPUT FORMAT (STRICT CONTRACT): return a single JSON object, nothing else:
{"reply": string, "intent": string, "riskLevel": "low" | "medium" | "high", "continueConversation": boolean, "scam_type": string, "extracted_intelligence": {"upi_ids": string[], "bank_accounts": string[], "ifsc_codes": string[], "phone_numbers": string[], "phishing_urls": string[]}}"#;

/// Gemini reasoning provider implementing [`ReasoningAdapter`].
pub struct GeminiReasoning {
    client: GeminiClient,
    persona_prompt: String,
    max_output_tokens: u32,
}

impl GeminiReasoning {
    /// Creates a new Gemini adapter from configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.gemini.api_key` if set and non-empty
    /// 2. `GEMINI_API_KEY` environment variable
    /// 3. Returns an error if neither is available
    ///
    /// # Persona Prompt Resolution
    /// 1. `config.agent.persona_prompt_file` if readable and non-empty
    /// 2. `config.agent.persona_prompt` if set
    /// 3. The built-in default
    pub async fn new(config: &RakshakConfig) -> Result<Self, RakshakError> {
        let api_key = resolve_api_key(&config.gemini.api_key)?;
        let persona_prompt = load_persona_prompt(
            &config.agent.persona_prompt,
            &config.agent.persona_prompt_file,
        )
        .await;

        let client = GeminiClient::new(api_key, config.gemini.model.clone())?;

        info!(model = config.gemini.model, "Gemini reasoning adapter initialized");

        Ok(Self {
            client,
            persona_prompt,
            max_output_tokens: config.gemini.max_output_tokens,
        })
    }

    /// Creates an adapter with an existing client (for testing).
    pub fn with_client(client: GeminiClient, persona_prompt: String, max_output_tokens: u32) -> Self {
        Self {
            client,
            persona_prompt,
            max_output_tokens,
        }
    }

    /// Converts a [`ReasoningRequest`] into the wire request.
    fn to_generate_request(&self, request: &ReasoningRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    TurnRole::Adversary => "user",
                    TurnRole::Agent => "model",
                };
                Content::text(Some(role), m.content.clone())
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(None, self.persona_prompt.clone())),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                max_output_tokens: Some(self.max_output_tokens),
            }),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiReasoning {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, RakshakError> {
        // No lightweight ping endpoint worth spending quota on.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RakshakError> {
        Ok(())
    }
}

#[async_trait]
impl ReasoningAdapter for GeminiReasoning {
    async fn complete(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningCompletion, RakshakError> {
        let api_request = self.to_generate_request(&request);
        let response = self.client.generate_content(&api_request).await?;

        let usage = response.usage_metadata.as_ref().map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(ReasoningCompletion {
            text: response.text(),
            model: response
                .model_version
                .unwrap_or_else(|| self.client.model().to_string()),
            usage,
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, RakshakError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        RakshakError::Config(
            "Gemini API key not found. Set gemini.api_key in config or the GEMINI_API_KEY environment variable.".into(),
        )
    })
}

/// Loads the persona prompt following priority: file > inline > default.
async fn load_persona_prompt(
    inline_prompt: &Option<String>,
    prompt_file: &Option<String>,
) -> String {
    if let Some(file_path) = prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim().to_string();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded persona prompt from file");
                    return trimmed;
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = file_path,
                    error = %e,
                    "failed to read persona prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = inline_prompt
        && !prompt.is_empty()
    {
        return prompt.clone();
    }

    DEFAULT_PERSONA_PROMPT.to_string()
}
