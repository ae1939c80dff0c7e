// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rakshak honeypot engagement engine.
//!
//! Provides the error type, conversation and reasoning-contract domain
//! types, and the adapter traits implemented by reasoning providers.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RakshakError;
pub use traits::{HealthStatus, PluginAdapter, ReasoningAdapter};
pub use types::{
    ApiStatus, ChatMessage, ConversationTurn, IntelligencePayload, ReasoningCompletion,
    ReasoningRequest, ReasoningResponse, RiskLevel, ScamType, SessionId, TurnRole,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = RakshakError::Config("bad".into());
        let _input = RakshakError::InvalidInput("blank".into());
        let _throttled = RakshakError::Throttled {
            message: "429".into(),
        };
        let _provider = RakshakError::Provider {
            message: "503".into(),
            transient: true,
            source: Some(Box::new(std::io::Error::other("io"))),
        };
        let _closed = RakshakError::SessionClosed {
            session_id: "s".into(),
        };
        let _internal = RakshakError::Internal("oops".into());
    }

    #[test]
    fn reasoning_adapter_is_object_safe() {
        fn _assert(_: &dyn ReasoningAdapter) {}
    }

    #[test]
    fn fallback_reexported_at_root() {
        let fb = ReasoningResponse::fallback();
        assert_eq!(fb.scam_type, ScamType::Unknown);
    }
}
