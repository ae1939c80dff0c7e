// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reasoning adapter for deterministic testing.
//!
//! `MockReasoning` implements `ReasoningAdapter` with pre-scripted outcomes,
//! enabling fast, CI-runnable tests of the gateway and engagement controller
//! without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rakshak_core::error::RakshakError;
use rakshak_core::traits::{HealthStatus, PluginAdapter, ReasoningAdapter};
use rakshak_core::types::{ReasoningCompletion, ReasoningRequest};

/// One scripted outcome for a `complete` call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text as the model output.
    Reply(String),
    /// Sleep for the given milliseconds, then return the text. Lets tests
    /// observe in-flight generation states.
    DelayedReply(String, u64),
    /// Fail with a transient provider error.
    Transient(String),
    /// Fail with a rate-limit signal.
    Throttled,
}

/// A mock reasoning adapter that pops outcomes from a FIFO queue.
///
/// When the queue is empty, a canned schema-valid agent response is returned.
pub struct MockReasoning {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: AtomicU64,
    last_request: Mutex<Option<ReasoningRequest>>,
}

impl MockReasoning {
    /// Create a mock with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: AtomicU64::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: AtomicU64::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Append an outcome to the queue.
    pub async fn push_outcome(&self, outcome: MockOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The transcript of the most recent call, if any.
    pub async fn last_request(&self) -> Option<ReasoningRequest> {
        self.last_request.lock().await.clone()
    }

    async fn next_outcome(&self) -> MockOutcome {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Reply(canned_agent_json("Accha ji, batao kya karna hai?")))
    }
}

impl Default for MockReasoning {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockReasoning {
    fn name(&self) -> &str {
        "mock-reasoning"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, RakshakError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RakshakError> {
        Ok(())
    }
}

#[async_trait]
impl ReasoningAdapter for MockReasoning {
    async fn complete(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningCompletion, RakshakError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request);

        match self.next_outcome().await {
            MockOutcome::Reply(text) => Ok(ReasoningCompletion {
                text,
                model: "mock-model".to_string(),
                usage: None,
            }),
            MockOutcome::DelayedReply(text, delay_ms) => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(ReasoningCompletion {
                    text,
                    model: "mock-model".to_string(),
                    usage: None,
                })
            }
            MockOutcome::Transient(message) => Err(RakshakError::Provider {
                message,
                transient: true,
                source: None,
            }),
            MockOutcome::Throttled => Err(RakshakError::Throttled {
                message: "mock rate limit".to_string(),
            }),
        }
    }
}

/// A schema-valid agent response body with no extracted intelligence.
pub fn canned_agent_json(reply: &str) -> String {
    serde_json::json!({
        "reply": reply,
        "intent": "Stalling",
        "riskLevel": "medium",
        "continueConversation": true,
        "scam_type": "KYC",
        "extracted_intelligence": {
            "upi_ids": [],
            "bank_accounts": [],
            "ifsc_codes": [],
            "phone_numbers": [],
            "phishing_urls": []
        }
    })
    .to_string()
}

/// A schema-valid agent response body with the given `extracted_intelligence`
/// object spliced in.
pub fn canned_agent_json_with_intel(reply: &str, intelligence: serde_json::Value) -> String {
    serde_json::json!({
        "reply": reply,
        "intent": "Pressing for payment details",
        "riskLevel": "high",
        "continueConversation": true,
        "scam_type": "Bank",
        "extracted_intelligence": intelligence
    })
    .to_string()
}
