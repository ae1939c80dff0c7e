// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait for external reasoning providers.

use async_trait::async_trait;

use crate::error::RakshakError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ReasoningCompletion, ReasoningRequest};

/// The raw, fallible seam to an external reasoning service.
///
/// Implementations translate the transcript into the provider's wire protocol
/// and surface failures as typed errors (`Throttled` for rate limits,
/// `Provider { transient }` otherwise). Resilience policy -- retry, throttle
/// bookkeeping, fallback substitution -- lives above this trait in the
/// reasoning gateway, so adapters stay thin.
#[async_trait]
pub trait ReasoningAdapter: PluginAdapter {
    /// Sends the transcript and returns the provider's raw text output.
    async fn complete(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningCompletion, RakshakError>;
}
