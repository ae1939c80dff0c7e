// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Rakshak workspace: conversation turns,
//! the canonical reasoning contract, and process-wide advisory status.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for one engagement session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the conversation produced a turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnRole {
    /// The scammer being engaged.
    Adversary,
    /// The honeypot persona.
    Agent,
}

/// Self-assessed risk attached to agent turns by the reasoning model.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Fixed scam taxonomy from the reasoning contract. Anything the model emits
/// outside this list maps to `Unknown`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ScamType {
    Bank,
    #[strum(serialize = "KYC")]
    #[serde(rename = "KYC")]
    Kyc,
    Courier,
    Job,
    Crypto,
    Romance,
    Loan,
    #[default]
    Unknown,
}

impl ScamType {
    /// Parses a wire string leniently; unrecognized labels become `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        s.trim().parse().unwrap_or(ScamType::Unknown)
    }
}

/// One normalized batch of indicators extracted from a single agent turn.
///
/// Values are already canonicalized strings (bank-account objects serialized
/// to a stable form); deduplication against the session record happens in the
/// intelligence extractor, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligencePayload {
    pub upi_ids: Vec<String>,
    pub bank_accounts: Vec<String>,
    pub ifsc_codes: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub phishing_urls: Vec<String>,
}

impl IntelligencePayload {
    /// True when no indicator class holds any value.
    pub fn is_empty(&self) -> bool {
        self.upi_ids.is_empty()
            && self.bank_accounts.is_empty()
            && self.ifsc_codes.is_empty()
            && self.phone_numbers.is_empty()
            && self.phishing_urls.is_empty()
    }

    /// Total values across all classes.
    pub fn len(&self) -> usize {
        self.upi_ids.len()
            + self.bank_accounts.len()
            + self.ifsc_codes.len()
            + self.phone_numbers.len()
            + self.phishing_urls.len()
    }
}

/// One utterance in the session transcript.
///
/// Transcripts are append-only: once committed a turn is never edited or
/// removed, and `sent_at` is strictly increasing within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    /// Unix milliseconds; the logical ordering key.
    pub sent_at: i64,
    /// Indicators captured on this turn (agent turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<IntelligencePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Tactical purpose of the turn, e.g. "stalling for payment details".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// The model's running scam-type verdict at this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ScamType>,
}

impl ConversationTurn {
    /// A bare turn with no agent-side annotations.
    pub fn new(role: TurnRole, content: impl Into<String>, sent_at: i64) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at,
            extracted: None,
            risk_level: None,
            intent: None,
            verdict: None,
        }
    }
}

/// A role + content pair as sent to the reasoning provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: TurnRole,
    pub content: String,
}

/// Request at the reasoning seam: the full ordered transcript.
#[derive(Debug, Clone, Default)]
pub struct ReasoningRequest {
    pub messages: Vec<ChatMessage>,
}

impl ReasoningRequest {
    /// Builds a request from transcript turns, dropping annotations.
    pub fn from_turns(turns: &[ConversationTurn]) -> Self {
        Self {
            messages: turns
                .iter()
                .map(|t| ChatMessage {
                    role: t.role,
                    content: t.content.clone(),
                })
                .collect(),
        }
    }
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw output of a reasoning adapter call: the model text before any
/// contract validation.
#[derive(Debug, Clone)]
pub struct ReasoningCompletion {
    pub text: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Stock persona reply used whenever generation fails or the model omits one.
pub const FALLBACK_REPLY: &str = "Ji sir, main thoda confused hoon. Kahan pay karna hai?";

/// Intent label substituted when the model omits one.
pub const FALLBACK_INTENT: &str = "Maintaining persona";

/// The canonical, validated reasoning response. Every field is always
/// populated -- missing or malformed upstream fields are replaced by the
/// documented defaults before this type is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningResponse {
    pub reply: String,
    pub intent: String,
    pub risk_level: RiskLevel,
    pub continue_conversation: bool,
    pub scam_type: ScamType,
    pub intelligence: IntelligencePayload,
}

impl ReasoningResponse {
    /// The deterministic, schema-complete substitute used when the upstream
    /// call fails entirely or returns unparseable text.
    pub fn fallback() -> Self {
        Self {
            reply: FALLBACK_REPLY.to_string(),
            intent: FALLBACK_INTENT.to_string(),
            risk_level: RiskLevel::Medium,
            continue_conversation: true,
            scam_type: ScamType::Unknown,
            intelligence: IntelligencePayload::default(),
        }
    }
}

/// Process-wide advisory status for the reasoning provider.
///
/// Shared by reference between the gateway (writer) and any status surface
/// (reader). All fields are atomics; last-writer-wins is acceptable because
/// the flag is advisory, not correctness-critical.
#[derive(Debug, Default)]
pub struct ApiStatus {
    throttled: AtomicBool,
    last_throttle_ms: AtomicI64,
    error_count: AtomicU64,
}

impl ApiStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rate-limit signal from the provider.
    pub fn mark_throttled(&self, now_ms: i64) {
        self.throttled.store(true, Ordering::Relaxed);
        self.last_throttle_ms.store(now_ms, Ordering::Relaxed);
    }

    /// Clears the throttle flag after a successful call.
    pub fn clear_throttle(&self) {
        self.throttled.store(false, Ordering::Relaxed);
    }

    pub fn is_throttled(&self) -> bool {
        self.throttled.load(Ordering::Relaxed)
    }

    /// Unix millis of the most recent throttle signal, 0 if never throttled.
    pub fn last_throttle_ms(&self) -> i64 {
        self.last_throttle_ms.load(Ordering::Relaxed)
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}

/// Current wall-clock time in unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
