// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./rakshak.toml` > `~/.config/rakshak/rakshak.toml`
//! > `/etc/rakshak/rakshak.toml`, with environment variable overrides via the
//! `RAKSHAK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RakshakConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rakshak/rakshak.toml` (system-wide)
/// 3. `~/.config/rakshak/rakshak.toml` (user XDG config)
/// 4. `./rakshak.toml` (local directory)
/// 5. `RAKSHAK_*` environment variables
pub fn load_config() -> Result<RakshakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RakshakConfig::default()))
        .merge(Toml::file("/etc/rakshak/rakshak.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rakshak/rakshak.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rakshak.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RakshakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RakshakConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RakshakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RakshakConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment variable provider using explicit `map()` for section-to-dot
/// mapping. `RAKSHAK_GEMINI_API_KEY` must map to `gemini.api_key`, not
/// `gemini.api.key`, so `Env::split("_")` is unsuitable.
fn env_provider() -> Env {
    Env::prefixed("RAKSHAK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("engagement_", "engagement.", 1);
        mapped.into()
    })
}
