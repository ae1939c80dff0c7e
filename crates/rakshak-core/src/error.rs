// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rakshak honeypot engine.

use thiserror::Error;

/// The primary error type used across the Rakshak workspace.
///
/// Upstream reasoning failures never cross the gateway boundary as errors;
/// they resolve into fallback responses there. The variants below cover the
/// fallible seams underneath: configuration, input validation, and the raw
/// provider call.
#[derive(Debug, Error)]
pub enum RakshakError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Empty or whitespace-only adversary submission. Rejected locally with
    /// no state change.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The reasoning provider signalled a rate limit (HTTP 429). Never
    /// retried; the gateway records the advisory throttle flag and falls back.
    #[error("provider throttled: {message}")]
    Throttled { message: String },

    /// Reasoning provider failure. `transient` marks 5xx-class errors
    /// eligible for the gateway's bounded retry.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation attempted on a session that has already been closed.
    #[error("session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RakshakError {
    /// True for provider errors worth one more attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, RakshakError::Provider { transient: true, .. })
    }
}
