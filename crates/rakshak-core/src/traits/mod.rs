// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod reasoning;

pub use adapter::{HealthStatus, PluginAdapter};
pub use reasoning::ReasoningAdapter;
