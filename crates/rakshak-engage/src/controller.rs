// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engagement controller: drives the turn-by-turn loop for exactly one
//! session.
//!
//! Guarantees at most one in-flight generation at a time and no duplicate
//! processing of the same inbound message. The controller does not poll --
//! submitting an adversary turn schedules a cancellable debounce timer, and
//! the timer firing is the sole automatic trigger for generation. Several
//! fragments arriving inside the window are all recorded but answered by a
//! single generation over the full transcript.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rakshak_config::RakshakConfig;
use rakshak_core::{ConversationTurn, RakshakError, ReasoningRequest, SessionId};
use rakshak_intel::IntelligenceRecord;

use crate::gateway::ReasoningGateway;
use crate::observer::EngagementObserver;
use crate::session::{EngagementPhase, SessionState};

/// Tunables for one controller.
#[derive(Debug, Clone)]
pub struct EngagementPolicy {
    /// Delay between an adversary submission and the generation it triggers.
    /// Models typing realism and debounces rapid fragments.
    pub reply_delay: Duration,
    /// When set to N, the session closes after N consecutive agent turns
    /// with no new intelligence once the model has signalled
    /// `continueConversation = false`. Unset means indefinite engagement.
    pub disengage_after_stale_turns: Option<u32>,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1800),
            disengage_after_stale_turns: None,
        }
    }
}

impl EngagementPolicy {
    pub fn from_config(config: &RakshakConfig) -> Self {
        Self {
            reply_delay: Duration::from_millis(config.engagement.reply_delay_ms),
            disengage_after_stale_turns: config.engagement.disengage_after_stale_turns,
        }
    }
}

/// Result of one `generate_now` invocation, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// An agent turn was appended.
    Completed,
    /// A generation was already in flight; this call was a no-op.
    Skipped,
    /// No adversary turn newer than the cursor; nothing to answer.
    NotTriggered,
    /// The session was closed before or during the call; any result was
    /// discarded.
    Discarded,
}

/// Per-session engagement state machine.
///
/// Cheaply cloneable; clones share the same session. All state mutation
/// happens under one async mutex, so the session has a single logical
/// writer; the only suspension point outside the lock is the reasoning call
/// itself.
#[derive(Clone)]
pub struct EngagementController {
    session_id: SessionId,
    gateway: Arc<ReasoningGateway>,
    state: Arc<Mutex<SessionState>>,
    observers: Arc<std::sync::Mutex<Vec<Arc<dyn EngagementObserver>>>>,
    policy: Arc<EngagementPolicy>,
    /// Token of the currently scheduled debounce timer, if any.
    debounce: Arc<Mutex<Option<CancellationToken>>>,
    /// Generations skipped because one was already in flight.
    skipped_generations: Arc<AtomicU64>,
}

impl EngagementController {
    /// Creates a controller for a fresh session. The transcript starts empty;
    /// seed the originating adversary message through
    /// [`submit_adversary_turn`](Self::submit_adversary_turn) -- manual test
    /// replies and real scammer replies take the identical path.
    pub fn new(
        session_id: SessionId,
        gateway: Arc<ReasoningGateway>,
        policy: EngagementPolicy,
    ) -> Self {
        info!(session_id = %session_id, "engagement session created");
        Self {
            session_id,
            gateway,
            state: Arc::new(Mutex::new(SessionState::new())),
            observers: Arc::new(std::sync::Mutex::new(Vec::new())),
            policy: Arc::new(policy),
            debounce: Arc::new(Mutex::new(None)),
            skipped_generations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Registers an observer for transcript and intelligence notifications.
    pub fn add_observer(&self, observer: Arc<dyn EngagementObserver>) {
        self.observers
            .lock()
            .expect("observer registry poisoned")
            .push(observer);
    }

    /// Records an adversary turn and schedules a generation.
    ///
    /// Empty or whitespace-only content is rejected with `InvalidInput` and
    /// causes no state change. Submissions are accepted while a generation
    /// is in flight -- the transcript append is independent of generation
    /// state -- but a closed session rejects them.
    pub async fn submit_adversary_turn(&self, content: &str) -> Result<(), RakshakError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(RakshakError::InvalidInput(
                "adversary turn must not be empty".into(),
            ));
        }

        let transcript = {
            let mut state = self.state.lock().await;
            if state.phase() == EngagementPhase::Closed {
                return Err(RakshakError::SessionClosed {
                    session_id: self.session_id.0.clone(),
                });
            }
            let sent_at = state.append_adversary(trimmed);
            debug!(session_id = %self.session_id, sent_at, "adversary turn recorded");
            state.transcript().to_vec()
        };

        self.notify_transcript(&transcript);
        self.schedule_generation().await;
        Ok(())
    }

    /// Schedules the debounce timer, cancelling any previously scheduled one
    /// for this session.
    fn schedule_generation(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let token = CancellationToken::new();
            {
                let mut pending = self.debounce.lock().await;
                if let Some(previous) = pending.take() {
                    previous.cancel();
                }
                *pending = Some(token.clone());
            }

            let controller = self.clone();
            let delay = self.policy.reply_delay;
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        controller.generate_now().await;
                    }
                }
            });
        })
    }

    /// Executes one Idle -> AwaitingResponse -> Idle generation cycle.
    ///
    /// This is the debounce timer's body and doubles as the manual-replay
    /// trigger. Idempotency guard: while a generation is in flight, further
    /// calls are counted no-ops. The cursor is advanced before dispatch, so
    /// re-reading the transcript during the in-flight call never re-triggers
    /// on the same message.
    pub async fn generate_now(&self) -> GenerationOutcome {
        let request = {
            let mut state = self.state.lock().await;
            match state.phase() {
                EngagementPhase::Closed => return GenerationOutcome::Discarded,
                EngagementPhase::AwaitingResponse => {
                    self.skipped_generations.fetch_add(1, Ordering::Relaxed);
                    debug!(session_id = %self.session_id, "generation already in flight, skipping");
                    return GenerationOutcome::Skipped;
                }
                EngagementPhase::Idle => {}
            }

            let Some(newest) = state.newest_unprocessed() else {
                return GenerationOutcome::NotTriggered;
            };
            state.mark_processed(newest);
            state.set_phase(EngagementPhase::AwaitingResponse);
            ReasoningRequest::from_turns(state.transcript())
        };

        // The only suspension point outside the state lock.
        let response = self.gateway.generate(request).await;

        let (transcript, new_intelligence, closed_now) = {
            let mut state = self.state.lock().await;
            if state.phase() == EngagementPhase::Closed {
                debug!(session_id = %self.session_id, "session closed mid-flight, discarding result");
                return GenerationOutcome::Discarded;
            }
            state.set_phase(EngagementPhase::Idle);

            let report = state.append_agent(&response);
            debug!(
                session_id = %self.session_id,
                new_entries = report.new_entries,
                risk = %response.risk_level,
                "agent turn committed"
            );

            let mut closed_now = false;
            if !response.continue_conversation
                && let Some(limit) = self.policy.disengage_after_stale_turns
                && state.stale_agent_turns() >= limit
            {
                state.set_phase(EngagementPhase::Closed);
                closed_now = true;
                info!(
                    session_id = %self.session_id,
                    stale_turns = state.stale_agent_turns(),
                    "disengaging: no new intelligence and model signalled end"
                );
            }

            let new_intelligence = report.has_new().then(|| state.intelligence().clone());
            (state.transcript().to_vec(), new_intelligence, closed_now)
        };

        self.notify_transcript(&transcript);
        if let Some(record) = new_intelligence {
            self.notify_intelligence(&record);
        }

        // An adversary turn that arrived mid-flight is answered without
        // waiting for another submission.
        if !closed_now {
            let pending = self.state.lock().await.newest_unprocessed().is_some();
            if pending {
                self.schedule_generation().await;
            }
        }

        GenerationOutcome::Completed
    }

    /// Closes the session. Pending debounce timers are cancelled; an
    /// in-flight generation is allowed to finish but its result is discarded.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            if state.phase() == EngagementPhase::Closed {
                return;
            }
            state.set_phase(EngagementPhase::Closed);
        }
        if let Some(token) = self.debounce.lock().await.take() {
            token.cancel();
        }
        info!(session_id = %self.session_id, "engagement session closed");
    }

    /// Snapshot of the full ordered transcript.
    pub async fn transcript(&self) -> Vec<ConversationTurn> {
        self.state.lock().await.transcript().to_vec()
    }

    /// Snapshot of the cumulative intelligence record.
    pub async fn intelligence(&self) -> IntelligenceRecord {
        self.state.lock().await.intelligence().clone()
    }

    /// Current state-machine phase.
    pub async fn phase(&self) -> EngagementPhase {
        self.state.lock().await.phase()
    }

    /// Processing cursor: `sent_at` of the newest answered adversary turn.
    pub async fn last_processed_ms(&self) -> i64 {
        self.state.lock().await.last_processed_ms()
    }

    /// Debug counter of generations skipped due to the in-flight guard.
    pub fn skipped_generations(&self) -> u64 {
        self.skipped_generations.load(Ordering::Relaxed)
    }

    fn notify_transcript(&self, transcript: &[ConversationTurn]) {
        let observers = self.observers.lock().expect("observer registry poisoned");
        for observer in observers.iter() {
            observer.on_transcript_changed(&self.session_id, transcript);
        }
    }

    fn notify_intelligence(&self, record: &IntelligenceRecord) {
        let observers = self.observers.lock().expect("observer registry poisoned");
        for observer in observers.iter() {
            observer.on_intelligence_changed(&self.session_id, record);
        }
    }
}
