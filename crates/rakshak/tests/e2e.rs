// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete engagement pipeline as the binary
//! wires it: config -> gateway -> controller, with a scripted adapter in
//! place of the live provider. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use rakshak_core::{ApiStatus, SessionId, TurnRole};
use rakshak_engage::{EngagementController, EngagementPolicy, ReasoningGateway};
use rakshak_test_utils::{canned_agent_json_with_intel, MockOutcome, MockReasoning};

fn pipeline(outcomes: Vec<MockOutcome>) -> (EngagementController, Arc<ApiStatus>) {
    let config = rakshak_config::load_and_validate_str(
        r#"
        [engagement]
        reply_delay_ms = 40
        "#,
    )
    .unwrap();

    let mock = Arc::new(MockReasoning::with_outcomes(outcomes));
    let status = Arc::new(ApiStatus::new());
    let gateway = Arc::new(ReasoningGateway::new(
        mock,
        status.clone(),
        config.gemini.max_retries,
    ));
    let controller = EngagementController::new(
        SessionId("e2e".into()),
        gateway,
        EngagementPolicy::from_config(&config),
    );
    (controller, status)
}

async fn wait_for_transcript_len(controller: &EngagementController, len: usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if controller.transcript().await.len() >= len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("transcript did not reach expected length");
}

#[tokio::test(start_paused = true)]
async fn seeded_session_produces_agent_reply_and_intel() {
    let (controller, _status) = pipeline(vec![MockOutcome::Reply(
        canned_agent_json_with_intel(
            "Sir mujhe account number samajh nahi aaya, phir se bhejo?",
            serde_json::json!({
                "upi_ids": ["fraud@upi"],
                "bank_accounts": [{"account": "12345678", "ifsc": "HDFC0000001"}],
                "ifsc_codes": ["HDFC0000001"],
                "phone_numbers": [],
                "phishing_urls": []
            }),
        ),
    )]);

    controller
        .submit_adversary_turn("Your account is blocked! Pay fine to fraud@upi now")
        .await
        .unwrap();
    wait_for_transcript_len(&controller, 2).await;

    let transcript = controller.transcript().await;
    assert_eq!(transcript[0].role, TurnRole::Adversary);
    assert_eq!(transcript[1].role, TurnRole::Agent);

    let record = controller.intelligence().await;
    assert_eq!(record.upi_ids.len(), 1);
    assert_eq!(record.ifsc_codes.len(), 1);
    // The structured bank account object was flattened to one stable entry.
    assert_eq!(record.bank_accounts.len(), 1);
    assert!(record.bank_accounts[0].value.contains("12345678"));
}

#[tokio::test(start_paused = true)]
async fn degraded_provider_never_leaves_adversary_without_reply() {
    let (controller, status) = pipeline(vec![
        MockOutcome::Throttled,
        MockOutcome::Transient("backend unavailable".into()),
        MockOutcome::Transient("backend unavailable".into()),
    ]);

    controller.submit_adversary_turn("pay now!").await.unwrap();
    wait_for_transcript_len(&controller, 2).await;
    controller.submit_adversary_turn("hello?? pay!").await.unwrap();
    wait_for_transcript_len(&controller, 4).await;

    // Every adversary turn got an agent reply despite two failing calls.
    let transcript = controller.transcript().await;
    let agent_turns: Vec<_> = transcript.iter().filter(|t| t.role == TurnRole::Agent).collect();
    assert_eq!(agent_turns.len(), 2);
    assert!(agent_turns.iter().all(|t| !t.content.is_empty()));

    // Failures are visible only in aggregate.
    assert!(status.error_count() >= 2);
    assert!(status.is_throttled() || status.error_count() > 0);
}

#[tokio::test(start_paused = true)]
async fn recovery_clears_throttle_flag() {
    let (controller, status) = pipeline(vec![
        MockOutcome::Throttled,
        MockOutcome::Reply(canned_agent_json_with_intel(
            "achha ji",
            serde_json::json!({"upi_ids": [], "bank_accounts": [], "ifsc_codes": [],
                "phone_numbers": [], "phishing_urls": []}),
        )),
    ]);

    controller.submit_adversary_turn("first").await.unwrap();
    wait_for_transcript_len(&controller, 2).await;
    assert!(status.is_throttled());

    controller.submit_adversary_turn("second").await.unwrap();
    wait_for_transcript_len(&controller, 4).await;
    assert!(!status.is_throttled());
}
