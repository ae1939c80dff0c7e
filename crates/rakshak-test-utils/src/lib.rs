// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Rakshak workspace.

pub mod mock_reasoning;

pub use mock_reasoning::{
    canned_agent_json, canned_agent_json_with_intel, MockOutcome, MockReasoning,
};
