// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intelligence extraction and aggregation for the Rakshak honeypot engine.
//!
//! Normalizes raw indicator payloads from the reasoning provider into a
//! canonical per-turn [`rakshak_core::IntelligencePayload`] and merges them
//! into the session-cumulative [`IntelligenceRecord`] without duplicates.

pub mod extractor;
pub mod types;

pub use extractor::{normalize_key, normalize_payload};
pub use types::{IndicatorClass, IndicatorEntry, IntelligenceRecord, MergeReport};
