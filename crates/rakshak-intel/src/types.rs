// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intelligence domain types: indicator classes, entries, and the
//! session-cumulative record.

use std::collections::HashSet;

use serde::Serialize;
use strum::{Display, EnumIter};

/// The five indicator classes tracked per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum IndicatorClass {
    #[strum(serialize = "upi_id")]
    UpiId,
    #[strum(serialize = "bank_account")]
    BankAccount,
    #[strum(serialize = "ifsc_code")]
    IfscCode,
    #[strum(serialize = "phone_number")]
    PhoneNumber,
    #[strum(serialize = "phishing_url")]
    PhishingUrl,
}

impl IndicatorClass {
    /// Confidence assigned when the upstream payload carries no score.
    /// Opaque ranking hints only; nothing branches on these values.
    pub fn default_confidence(self) -> u8 {
        match self {
            IndicatorClass::UpiId => 98,
            _ => 95,
        }
    }
}

/// One captured indicator value.
///
/// `value` keeps the original casing of the first occurrence; comparison
/// happens on the normalized key, never on `value` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorEntry {
    pub value: String,
    /// 0-100 ranking hint. First-seen wins; never rewritten by re-extraction.
    pub confidence: u8,
    /// Unix milliseconds of first capture.
    pub first_seen: i64,
}

/// Outcome of folding one turn's payload into the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Count of genuinely new entries across all classes. Zero means the
    /// payload only re-confirmed known indicators (or was empty) and no
    /// downstream notification is warranted.
    pub new_entries: usize,
}

impl MergeReport {
    /// True when at least one class gained a new entry.
    pub fn has_new(&self) -> bool {
        self.new_entries > 0
    }
}

/// The session's cumulative extracted indicators, one list per class.
///
/// Within a class, values are unique under case-insensitive,
/// whitespace-collapsed comparison. Entries are only ever appended.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntelligenceRecord {
    pub upi_ids: Vec<IndicatorEntry>,
    pub bank_accounts: Vec<IndicatorEntry>,
    pub ifsc_codes: Vec<IndicatorEntry>,
    pub phone_numbers: Vec<IndicatorEntry>,
    pub phishing_urls: Vec<IndicatorEntry>,
    /// Class-scoped dedup keys for all stored entries.
    #[serde(skip)]
    pub(crate) seen: HashSet<(IndicatorClass, String)>,
}

impl IntelligenceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one class.
    pub fn entries(&self, class: IndicatorClass) -> &[IndicatorEntry] {
        match class {
            IndicatorClass::UpiId => &self.upi_ids,
            IndicatorClass::BankAccount => &self.bank_accounts,
            IndicatorClass::IfscCode => &self.ifsc_codes,
            IndicatorClass::PhoneNumber => &self.phone_numbers,
            IndicatorClass::PhishingUrl => &self.phishing_urls,
        }
    }

    /// Total entries across all classes.
    pub fn len(&self) -> usize {
        self.upi_ids.len()
            + self.bank_accounts.len()
            + self.ifsc_codes.len()
            + self.phone_numbers.len()
            + self.phishing_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
