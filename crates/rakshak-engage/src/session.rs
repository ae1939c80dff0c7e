// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session conversation store: the append-only transcript, the
//! cumulative intelligence record, and the processing cursor.
//!
//! All mutation goes through the engagement controller; this module only
//! guarantees the store's invariants: turns are strictly ordered by
//! `sent_at`, committed turns are never edited or removed, and the cursor
//! only moves forward.

use rakshak_core::types::now_ms;
use rakshak_core::{ConversationTurn, ReasoningResponse, TurnRole};
use rakshak_intel::{IntelligenceRecord, MergeReport};

/// States of the engagement state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementPhase {
    /// Waiting for an unprocessed adversary turn.
    Idle,
    /// A reasoning call is in flight.
    AwaitingResponse,
    /// Session ended; no further turns are generated.
    Closed,
}

impl std::fmt::Display for EngagementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementPhase::Idle => write!(f, "idle"),
            EngagementPhase::AwaitingResponse => write!(f, "awaiting-response"),
            EngagementPhase::Closed => write!(f, "closed"),
        }
    }
}

/// Owned state of one engagement session.
pub(crate) struct SessionState {
    transcript: Vec<ConversationTurn>,
    intelligence: IntelligenceRecord,
    /// `sent_at` of the most recent adversary turn already answered.
    last_processed_ms: i64,
    phase: EngagementPhase,
    /// Last allocated timestamp; enforces strict ordering even when two
    /// appends land within the same wall-clock millisecond.
    last_ts: i64,
    /// Consecutive agent turns that produced no new intelligence.
    stale_agent_turns: u32,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            transcript: Vec::new(),
            intelligence: IntelligenceRecord::new(),
            last_processed_ms: 0,
            phase: EngagementPhase::Idle,
            last_ts: 0,
            stale_agent_turns: 0,
        }
    }

    pub(crate) fn phase(&self) -> EngagementPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: EngagementPhase) {
        self.phase = phase;
    }

    pub(crate) fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub(crate) fn intelligence(&self) -> &IntelligenceRecord {
        &self.intelligence
    }

    pub(crate) fn last_processed_ms(&self) -> i64 {
        self.last_processed_ms
    }

    pub(crate) fn stale_agent_turns(&self) -> u32 {
        self.stale_agent_turns
    }

    /// Allocates the next strictly-increasing timestamp.
    fn next_timestamp(&mut self) -> i64 {
        let ts = now_ms().max(self.last_ts + 1);
        self.last_ts = ts;
        ts
    }

    /// Appends an adversary turn. Content is assumed validated by the caller.
    pub(crate) fn append_adversary(&mut self, content: &str) -> i64 {
        let sent_at = self.next_timestamp();
        self.transcript
            .push(ConversationTurn::new(TurnRole::Adversary, content, sent_at));
        sent_at
    }

    /// Appends an agent turn derived from a validated reasoning response and
    /// folds its intelligence into the cumulative record.
    pub(crate) fn append_agent(&mut self, response: &ReasoningResponse) -> MergeReport {
        let sent_at = self.next_timestamp();
        let turn = ConversationTurn {
            role: TurnRole::Agent,
            content: response.reply.clone(),
            sent_at,
            extracted: Some(response.intelligence.clone()),
            risk_level: Some(response.risk_level),
            intent: Some(response.intent.clone()),
            verdict: Some(response.scam_type),
        };
        self.transcript.push(turn);

        let report = self.intelligence.merge(&response.intelligence, sent_at);
        if report.has_new() {
            self.stale_agent_turns = 0;
        } else {
            self.stale_agent_turns += 1;
        }
        report
    }

    /// `sent_at` of the newest adversary turn not yet answered, if any.
    pub(crate) fn newest_unprocessed(&self) -> Option<i64> {
        self.transcript
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::Adversary)
            .map(|t| t.sent_at)
            .filter(|&ts| ts > self.last_processed_ms)
    }

    /// Advances the processing cursor. Called before the reasoning dispatch
    /// so a re-read of the transcript during the in-flight call cannot
    /// re-trigger on the same message.
    pub(crate) fn mark_processed(&mut self, sent_at: i64) {
        debug_assert!(sent_at >= self.last_processed_ms);
        self.last_processed_ms = sent_at;
    }
}
