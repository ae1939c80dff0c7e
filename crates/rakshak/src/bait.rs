// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rakshak bait` command implementation.
//!
//! Launches an interactive bait session: lines typed at the prompt are
//! submitted as adversary turns (exactly the path real scammer replies
//! take), and the agent's generated replies are printed as they commit.
//! Slash commands inspect the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rakshak_config::RakshakConfig;
use rakshak_core::{ApiStatus, ConversationTurn, RakshakError, SessionId, TurnRole};
use rakshak_engage::{EngagementController, EngagementObserver, EngagementPolicy, ReasoningGateway};
use rakshak_gemini::GeminiReasoning;
use rakshak_intel::{IndicatorEntry, IntelligenceRecord};

/// Prints agent turns and intelligence updates as they commit.
struct ConsoleObserver {
    printed: AtomicUsize,
}

impl EngagementObserver for ConsoleObserver {
    fn on_transcript_changed(&self, _session_id: &SessionId, transcript: &[ConversationTurn]) {
        let from = self.printed.swap(transcript.len(), Ordering::SeqCst);
        for turn in transcript.iter().skip(from) {
            if turn.role != TurnRole::Agent {
                continue;
            }
            println!("\n{} {}", "agent>".blue().bold(), turn.content);
            if let (Some(intent), Some(risk)) = (&turn.intent, turn.risk_level) {
                println!("{}", format!("  [{intent} | risk: {risk}]").dimmed());
            }
        }
    }

    fn on_intelligence_changed(&self, _session_id: &SessionId, record: &IntelligenceRecord) {
        println!(
            "{}",
            format!("intel: {} indicator(s) captured, use /intel to inspect", record.len())
                .yellow()
        );
    }
}

/// Runs the interactive bait session REPL.
pub async fn run_bait(config: RakshakConfig, seed: Option<String>) -> Result<(), RakshakError> {
    let adapter = Arc::new(GeminiReasoning::new(&config).await.inspect_err(|_| {
        eprintln!(
            "error: Gemini API key required. Set gemini.api_key in rakshak.toml or the GEMINI_API_KEY environment variable."
        );
    })?);

    let status = Arc::new(ApiStatus::new());
    let gateway = Arc::new(ReasoningGateway::new(
        adapter,
        status.clone(),
        config.gemini.max_retries,
    ));

    let session_id = SessionId(uuid::Uuid::new_v4().to_string());
    let controller = EngagementController::new(
        session_id.clone(),
        gateway,
        EngagementPolicy::from_config(&config),
    );
    controller.add_observer(Arc::new(ConsoleObserver {
        printed: AtomicUsize::new(0),
    }));

    println!("{}", "rakshak bait session".bold().green());
    println!("session {}", session_id.0.dimmed());
    println!(
        "Type as the scammer. Commands: {}, {}, {}, {}.\n",
        "/intel".yellow(),
        "/status".yellow(),
        "/close".yellow(),
        "/quit".yellow()
    );

    if let Some(seed) = seed {
        println!("{} {}", "scammer>".red().bold(), seed);
        controller.submit_adversary_turn(&seed).await?;
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| RakshakError::Internal(format!("failed to initialize readline: {e}")))?;

    let prompt = format!("{}> ", "scammer".red());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/close" => {
                        controller.close().await;
                        println!("{}", "session closed".dimmed());
                    }
                    "/intel" => print_intelligence(&controller.intelligence().await),
                    "/status" => print_status(&controller, &status).await,
                    _ => {
                        if let Err(e) = controller.submit_adversary_turn(trimmed).await {
                            eprintln!("{}: {e}", "error".red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    controller.close().await;
    Ok(())
}

fn print_entries(label: &str, entries: &[IndicatorEntry]) {
    for entry in entries {
        println!(
            "  {label}: {} {}",
            entry.value.bold(),
            format!("(confidence {})", entry.confidence).dimmed()
        );
    }
}

fn print_intelligence(record: &IntelligenceRecord) {
    if record.is_empty() {
        println!("{}", "no indicators captured yet".dimmed());
        return;
    }
    println!("{}", format!("{} indicator(s):", record.len()).yellow());
    print_entries("UPI", &record.upi_ids);
    print_entries("BANK", &record.bank_accounts);
    print_entries("IFSC", &record.ifsc_codes);
    print_entries("TEL", &record.phone_numbers);
    print_entries("URL", &record.phishing_urls);
}

async fn print_status(controller: &EngagementController, status: &ApiStatus) {
    println!("phase: {}", controller.phase().await);
    println!("turns: {}", controller.transcript().await.len());
    println!("skipped generations: {}", controller.skipped_generations());
    println!("provider throttled: {}", status.is_throttled());
    println!("provider errors: {}", status.error_count());
}
