// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rakshak honeypot engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized config
//! keys are rejected at startup with actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rakshak configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RakshakConfig {
    /// Agent persona identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini reasoning provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Engagement loop tuning.
    #[serde(default)]
    pub engagement: EngagementConfig,
}

/// Agent persona identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent persona.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline persona/behavior instruction. Overridden by
    /// `persona_prompt_file` if both are set.
    #[serde(default)]
    pub persona_prompt: Option<String>,

    /// Path to a file containing the persona instruction. Takes precedence
    /// over `persona_prompt`.
    #[serde(default)]
    pub persona_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            persona_prompt: None,
            persona_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "rakshak".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini reasoning provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier used for engagement turns.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum output tokens per generation.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Retry attempts for transient provider errors (rate limits are never
    /// retried). Bounded by validation.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_max_retries() -> u32 {
    1
}

/// Engagement loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngagementConfig {
    /// Delay before a queued agent turn fires, in milliseconds. Models
    /// typing realism and doubles as the debounce window for rapid
    /// adversary fragments.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// When set to N, the session closes after N consecutive agent turns
    /// with no new intelligence once the model has signalled the
    /// conversation is no longer worth continuing. Unset means indefinite
    /// engagement.
    #[serde(default)]
    pub disengage_after_stale_turns: Option<u32>,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            disengage_after_stale_turns: None,
        }
    }
}

fn default_reply_delay_ms() -> u64 {
    1800
}
