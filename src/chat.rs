//! Interactive line loop over stdin.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{orchestrator::Orchestrator, ports::SetupReport, session::SessionSummary};

pub const HELP: &str = "Commands:
  help      show this message
  summary   show what this session knows so far
  clear     forget this session
  validate  show which collaborators are configured
  quit      leave (also: exit, Ctrl+C)
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Summary,
    Clear,
    Validate,
    Quit,
    Message(String),
    Empty,
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "help" => Self::Help,
            "summary" => Self::Summary,
            "clear" => Self::Clear,
            "validate" => Self::Validate,
            "quit" | "exit" => Self::Quit,
            _ => Self::Message(trimmed.to_string()),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "configured" } else { "not configured" }
}

pub fn render_setup(report: &SetupReport) -> String {
    format!(
        "language model: {}\nsimilarity lookup: {}\nregression model: {}",
        yes_no(report.llm_configured),
        yes_no(report.similarity_configured),
        yes_no(report.regression_configured)
    )
}

pub fn render_summary(summary: &SessionSummary) -> String {
    let intents = summary
        .recent_intents
        .iter()
        .map(|intent| intent.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!(
        "diagnosis completed: {}\nhealth profile fields: {}/5\nconversation turns: {}\nrecent intents: {}",
        summary.diagnosis_completed,
        summary.health_profile_completeness,
        summary.conversation_turns,
        if intents.is_empty() { "none" } else { intents.as_str() }
    );
    if let Some(report) = &summary.last_diagnosis {
        text.push_str("\nlast diagnosis:\n");
        text.push_str(&report.render());
    }
    text
}

/// Reads lines until EOF, `quit`/`exit` or Ctrl+C.
pub async fn run_chat_loop(orchestrator: &Orchestrator, session_id: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("unable to listen for Ctrl+C")?;
                eprintln!("received Ctrl+C; leaving");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Summary => {
                println!("{}", render_summary(&orchestrator.summary(session_id).await));
            }
            ChatCommand::Clear => {
                orchestrator.clear(session_id).await;
                println!("session cleared");
            }
            ChatCommand::Validate => println!("{}", render_setup(&orchestrator.validate())),
            ChatCommand::Quit => break,
            ChatCommand::Message(text) => {
                println!("{}", orchestrator.respond(session_id, &text).await);
            }
        }
    }

    tracing::info!(target: "orchestrator", session_id = session_id, "chat_loop_stopped");
    Ok(())
}
