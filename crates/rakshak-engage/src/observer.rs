// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observer interface consumed by the UI / case-log collaborators.

use rakshak_core::{ConversationTurn, SessionId};
use rakshak_intel::IntelligenceRecord;

/// Fire-and-forget notifications emitted by the engagement controller after
/// each committed mutation. An observer reading session state after a
/// notification always sees the notified state or newer.
///
/// Callbacks run synchronously on the controller's task; observers own their
/// persistence and rendering and must not block.
pub trait EngagementObserver: Send + Sync {
    /// The transcript gained one or more turns.
    fn on_transcript_changed(&self, session_id: &SessionId, transcript: &[ConversationTurn]);

    /// At least one indicator class gained a genuinely new entry.
    /// Re-confirmation of already-known indicators does not fire this.
    fn on_intelligence_changed(&self, session_id: &SessionId, record: &IntelligenceRecord);
}
