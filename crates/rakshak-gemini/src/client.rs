// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Performs a single attempt per call and surfaces failures as typed errors:
//! rate limits become [`RakshakError::Throttled`], 5xx-class failures become
//! transient provider errors. Retry and fallback policy live in the
//! reasoning gateway, above this client.

use std::time::Duration;

use rakshak_core::RakshakError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Base URL for the Gemini API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Overall per-request HTTP timeout. Honeypot turns are latency-tolerant,
/// but an unbounded hang would stall the engagement loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    pub fn new(api_key: String, model: String) -> Result<Self, RakshakError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| RakshakError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RakshakError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Returns the model identifier this client targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one `generateContent` request.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RakshakError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RakshakError::Provider {
                message: format!("HTTP request failed: {e}"),
                transient: true,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| RakshakError::Provider {
                message: format!("failed to read response body: {e}"),
                transient: true,
                source: Some(Box::new(e)),
            })?;
            return serde_json::from_str(&body).map_err(|e| RakshakError::Provider {
                message: format!("failed to parse API response: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!(
                "Gemini API error ({}): {}",
                api_err.error.status.as_deref().unwrap_or("UNKNOWN"),
                api_err.error.message
            ),
            Err(_) => format!("API returned {status}: {body}"),
        };

        if status.as_u16() == 429 {
            return Err(RakshakError::Throttled { message });
        }

        Err(RakshakError::Provider {
            message,
            transient: is_transient_status(status),
            source: None,
        })
    }
}

/// True for HTTP status codes worth one more attempt.
fn is_transient_status(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}
