// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement loop for the Rakshak honeypot engine.
//!
//! The [`EngagementController`] drives the turn-by-turn conversation for one
//! session: it records adversary turns, debounces generation triggers, calls
//! the [`ReasoningGateway`], folds validated responses into the session
//! store, and notifies observers. The gateway enforces the structured-output
//! contract and resilience policy so that upstream failures degrade to a
//! persona-consistent fallback reply instead of breaking the conversation.

pub mod controller;
pub mod gateway;
pub mod observer;
pub mod session;

pub use controller::{EngagementController, EngagementPolicy, GenerationOutcome};
pub use gateway::{normalize_response, ReasoningGateway};
pub use observer::EngagementObserver;
pub use session::EngagementPhase;
