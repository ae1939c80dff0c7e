// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reasoning gateway: the single choke point between the engagement
//! controller and the external reasoning provider.
//!
//! `generate` never returns an error. Every call path terminates in either a
//! validated [`ReasoningResponse`] or the documented fallback, so the
//! controller has no exception-handling branches for this dependency.
//! Validation is two-stage: the raw text is parsed leniently into a JSON
//! object, then a pure normalization maps it onto the strict canonical
//! response with per-field defaults. Unvalidated upstream data never reaches
//! session state.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use rakshak_core::types::{now_ms, FALLBACK_INTENT, FALLBACK_REPLY};
use rakshak_core::{
    ApiStatus, RakshakError, ReasoningAdapter, ReasoningRequest, ReasoningResponse, RiskLevel,
    ScamType,
};
use rakshak_intel::normalize_payload;

/// Pause between attempts on transient provider errors.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Wraps a reasoning adapter with resilience policy and contract enforcement.
///
/// The advisory [`ApiStatus`] is injected at construction rather than read
/// from ambient global state, so tests can observe it in isolation.
pub struct ReasoningGateway {
    adapter: Arc<dyn ReasoningAdapter>,
    status: Arc<ApiStatus>,
    max_retries: u32,
}

impl ReasoningGateway {
    pub fn new(adapter: Arc<dyn ReasoningAdapter>, status: Arc<ApiStatus>, max_retries: u32) -> Self {
        Self {
            adapter,
            status,
            max_retries,
        }
    }

    /// The shared advisory status this gateway reports into.
    pub fn status(&self) -> Arc<ApiStatus> {
        Arc::clone(&self.status)
    }

    /// Translates the transcript into a provider call and returns a validated
    /// response, falling back field-by-field or wholesale as needed.
    ///
    /// Resilience policy: a rate-limit signal sets the throttle flag and
    /// falls back immediately with no retry; transient errors get up to
    /// `max_retries` additional attempts; anything else falls back at once.
    /// A successful call always clears the throttle flag.
    pub async fn generate(&self, request: ReasoningRequest) -> ReasoningResponse {
        let mut attempt = 0;

        loop {
            match self.adapter.complete(request.clone()).await {
                Ok(completion) => {
                    self.status.clear_throttle();
                    if let Some(usage) = completion.usage {
                        debug!(
                            model = completion.model.as_str(),
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "reasoning call complete"
                        );
                    }
                    return normalize_response(&completion.text);
                }
                Err(RakshakError::Throttled { message }) => {
                    warn!(message = message.as_str(), "provider throttled, using fallback reply");
                    self.status.mark_throttled(now_ms());
                    self.status.record_error();
                    return ReasoningResponse::fallback();
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "transient provider error, retrying");
                    tokio::time::sleep(RETRY_PAUSE).await;
                }
                Err(e) => {
                    warn!(error = %e, "provider call failed, using fallback reply");
                    self.status.record_error();
                    return ReasoningResponse::fallback();
                }
            }
        }
    }
}

/// Parses raw model text into the canonical response.
///
/// Unparseable text yields the full fallback; a parsed object is normalized
/// field-by-field so one bad field never discards the rest.
pub fn normalize_response(text: &str) -> ReasoningResponse {
    match parse_lenient_json(text) {
        Some(raw) => normalize_object(&raw),
        None => {
            warn!("reasoning response was not a JSON object, using full fallback");
            ReasoningResponse::fallback()
        }
    }
}

/// Maps a loosely-typed response object onto the strict canonical shape.
///
/// Per-field defaults: missing/blank `reply` -> stock persona phrase;
/// missing `intent` -> generic persona label; missing/invalid `riskLevel` ->
/// medium; missing `continueConversation` -> true (bias toward continued
/// engagement); unrecognized `scam_type` -> Unknown; missing or malformed
/// `extracted_intelligence` -> five empty lists.
fn normalize_object(raw: &Value) -> ReasoningResponse {
    let reply = raw
        .get("reply")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());

    let intent = raw
        .get("intent")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_INTENT.to_string());

    let risk_level = raw
        .get("riskLevel")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<RiskLevel>().ok())
        .unwrap_or_default();

    let continue_conversation = raw
        .get("continueConversation")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let scam_type = raw
        .get("scam_type")
        .and_then(Value::as_str)
        .map(ScamType::from_wire)
        .unwrap_or_default();

    let intelligence = raw
        .get("extracted_intelligence")
        .map(normalize_payload)
        .unwrap_or_default();

    ReasoningResponse {
        reply,
        intent,
        risk_level,
        continue_conversation,
        scam_type,
        intelligence,
    }
}

/// Extracts a JSON object from raw model text.
///
/// Strips markdown code-fence decoration first; if the cleaned text still
/// does not parse, falls back to the outermost `{...}` window. Anything that
/// is not a JSON object (arrays, bare strings, prose) yields `None`.
fn parse_lenient_json(text: &str) -> Option<Value> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    if let Ok(value) = serde_json::from_str::<Value>(cleaned)
        && value.is_object()
    {
        return Some(value);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rakshak_core::types::{ChatMessage, IntelligencePayload, TurnRole};
    use rakshak_test_utils::{canned_agent_json, MockOutcome, MockReasoning};

    fn request() -> ReasoningRequest {
        ReasoningRequest {
            messages: vec![ChatMessage {
                role: TurnRole::Adversary,
                content: "Pay fine to save your account, UPI: fraud@upi".into(),
            }],
        }
    }

    fn gateway_with(outcomes: Vec<MockOutcome>, max_retries: u32) -> (ReasoningGateway, Arc<MockReasoning>) {
        let mock = Arc::new(MockReasoning::with_outcomes(outcomes));
        let status = Arc::new(ApiStatus::new());
        let gateway = ReasoningGateway::new(mock.clone(), status, max_retries);
        (gateway, mock)
    }

    #[tokio::test]
    async fn success_parses_and_clears_throttle() {
        let (gateway, _mock) = gateway_with(
            vec![MockOutcome::Reply(canned_agent_json("kaunsa account sir?"))],
            1,
        );
        gateway.status().mark_throttled(1);

        let response = gateway.generate(request()).await;
        assert_eq!(response.reply, "kaunsa account sir?");
        assert_eq!(response.scam_type, ScamType::Kyc);
        assert!(!gateway.status().is_throttled());
        assert_eq!(gateway.status().error_count(), 0);
    }

    #[tokio::test]
    async fn throttle_sets_flag_without_retry() {
        let (gateway, mock) = gateway_with(vec![MockOutcome::Throttled], 3);

        let response = gateway.generate(request()).await;
        assert_eq!(response, ReasoningResponse::fallback());
        assert!(!response.reply.is_empty());
        assert!(gateway.status().is_throttled());
        assert_eq!(gateway.status().error_count(), 1);
        // Rate limits are terminal for the call: exactly one attempt.
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_retries_once_then_succeeds() {
        let (gateway, mock) = gateway_with(
            vec![
                MockOutcome::Transient("503".into()),
                MockOutcome::Reply(canned_agent_json("dobara boliye?")),
            ],
            1,
        );

        let response = gateway.generate(request()).await;
        assert_eq!(response.reply, "dobara boliye?");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(gateway.status().error_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fall_back() {
        let (gateway, mock) = gateway_with(
            vec![
                MockOutcome::Transient("503".into()),
                MockOutcome::Transient("500".into()),
            ],
            1,
        );

        let response = gateway.generate(request()).await;
        assert_eq!(response, ReasoningResponse::fallback());
        assert_eq!(mock.call_count(), 2);
        assert_eq!(gateway.status().error_count(), 1);
    }

    #[tokio::test]
    async fn zero_retries_fail_immediately() {
        let (gateway, mock) = gateway_with(vec![MockOutcome::Transient("502".into())], 0);

        let response = gateway.generate(request()).await;
        assert_eq!(response, ReasoningResponse::fallback());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn unparseable_text_equals_full_fallback() {
        let response = normalize_response("I am sorry, I cannot help with that.");
        assert_eq!(response, ReasoningResponse::fallback());
    }

    #[test]
    fn code_fenced_json_is_stripped() {
        let body = format!("```json\n{}\n```", canned_agent_json("theek hai"));
        let response = normalize_response(&body);
        assert_eq!(response.reply, "theek hai");
    }

    #[test]
    fn json_embedded_in_prose_is_extracted() {
        let body = format!(
            "Here is the response you asked for:\n{}\nLet me know!",
            canned_agent_json("ek minute")
        );
        let response = normalize_response(&body);
        assert_eq!(response.reply, "ek minute");
    }

    #[test]
    fn json_array_is_treated_as_malformed() {
        let response = normalize_response("[1, 2, 3]");
        assert_eq!(response, ReasoningResponse::fallback());
    }

    // Field-level fallback: a response missing one field must yield the same
    // state as one carrying that field's default explicitly.
    #[test]
    fn missing_reply_falls_back_to_stock_phrase() {
        let response = normalize_response(
            r#"{"intent": "Probing", "riskLevel": "high", "continueConversation": false,
                "scam_type": "Bank", "extracted_intelligence": {"upi_ids": ["x@upi"],
                "bank_accounts": [], "ifsc_codes": [], "phone_numbers": [], "phishing_urls": []}}"#,
        );
        assert_eq!(response.reply, FALLBACK_REPLY);
        // The rest of the object survives untouched.
        assert_eq!(response.intent, "Probing");
        assert_eq!(response.risk_level, RiskLevel::High);
        assert!(!response.continue_conversation);
        assert_eq!(response.scam_type, ScamType::Bank);
        assert_eq!(response.intelligence.upi_ids, vec!["x@upi"]);
    }

    #[test]
    fn blank_reply_treated_as_missing() {
        let response = normalize_response(r#"{"reply": "   "}"#);
        assert_eq!(response.reply, FALLBACK_REPLY);
    }

    #[test]
    fn missing_risk_level_defaults_to_medium() {
        let response = normalize_response(r#"{"reply": "ji"}"#);
        assert_eq!(response.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn mistyped_risk_level_defaults_to_medium() {
        let response = normalize_response(r#"{"reply": "ji", "riskLevel": 7}"#);
        assert_eq!(response.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn missing_intent_gets_generic_label() {
        let response = normalize_response(r#"{"reply": "ji"}"#);
        assert_eq!(response.intent, FALLBACK_INTENT);
    }

    #[test]
    fn missing_continue_flag_biases_to_true() {
        let response = normalize_response(r#"{"reply": "ji"}"#);
        assert!(response.continue_conversation);
    }

    #[test]
    fn explicit_continue_false_is_honored() {
        let response = normalize_response(r#"{"reply": "ji", "continueConversation": false}"#);
        assert!(!response.continue_conversation);
    }

    #[test]
    fn missing_intelligence_yields_empty_record() {
        let response = normalize_response(r#"{"reply": "ji"}"#);
        assert_eq!(response.intelligence, IntelligencePayload::default());
    }

    #[test]
    fn malformed_intelligence_yields_empty_record() {
        let response =
            normalize_response(r#"{"reply": "ji", "extracted_intelligence": "lots of it"}"#);
        assert_eq!(response.intelligence, IntelligencePayload::default());
    }

    #[test]
    fn unknown_scam_type_maps_to_unknown() {
        let response = normalize_response(r#"{"reply": "ji", "scam_type": "Astrology"}"#);
        assert_eq!(response.scam_type, ScamType::Unknown);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let response = normalize_response(
            r#"{"reply": "ji", "confidence_score": 0.93, "engagement": {"active": true, "turns": 4}}"#,
        );
        assert_eq!(response.reply, "ji");
        assert_eq!(response.scam_type, ScamType::Unknown);
    }
}
