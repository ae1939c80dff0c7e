// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express. Collects all
//! failures instead of stopping at the first one.

use crate::diagnostic::ConfigError;
use crate::model::RakshakConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound on provider retries; more than this only prolongs a stalled
/// conversation without helping it recover.
const MAX_RETRY_BOUND: u32 = 3;

/// Upper bound on the reply delay -- ten minutes of "typing" is no longer
/// realism.
const MAX_REPLY_DELAY_MS: u64 = 600_000;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RakshakConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    if config.gemini.max_output_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "gemini.max_output_tokens must be at least 1".to_string(),
        });
    }

    if config.gemini.max_retries > MAX_RETRY_BOUND {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.max_retries must be at most {MAX_RETRY_BOUND}, got {}",
                config.gemini.max_retries
            ),
        });
    }

    if config.engagement.reply_delay_ms > MAX_REPLY_DELAY_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "engagement.reply_delay_ms must be at most {MAX_REPLY_DELAY_MS}, got {}",
                config.engagement.reply_delay_ms
            ),
        });
    }

    if let Some(0) = config.engagement.disengage_after_stale_turns {
        errors.push(ConfigError::Validation {
            message: "engagement.disengage_after_stale_turns must be at least 1 when set"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RakshakConfig::default()).is_ok());
    }

    #[test]
    fn bad_log_level_rejected() {
        let mut config = RakshakConfig::default();
        config.agent.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("log_level"));
    }

    #[test]
    fn retry_bound_enforced() {
        let mut config = RakshakConfig::default();
        config.gemini.max_retries = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_stale_turns_rejected() {
        let mut config = RakshakConfig::default();
        config.engagement.disengage_after_stale_turns = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn all_errors_collected() {
        let mut config = RakshakConfig::default();
        config.agent.name = "  ".into();
        config.agent.log_level = "loud".into();
        config.gemini.max_output_tokens = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
