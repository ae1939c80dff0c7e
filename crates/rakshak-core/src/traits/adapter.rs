// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait for pluggable adapters.

use async_trait::async_trait;

use crate::error::RakshakError;

/// Health reported by an adapter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identity, lifecycle, and health surface shared by all adapters.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check.
    async fn health_check(&self) -> Result<HealthStatus, RakshakError>;

    /// Gracefully shuts down the adapter, releasing held resources.
    async fn shutdown(&self) -> Result<(), RakshakError>;
}
