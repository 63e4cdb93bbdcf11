//! Responder oracle for the impostor
//!
//! Produces the bot's next chat line from the transcript. Any failure of the
//! completion call (no provider, network, parse, timeout, empty output) is
//! answered from a fixed pool of generic replies so a round never stalls.

use rand::seq::IndexedRandom;
use std::time::Duration;

use crate::llm::{GenerateRequest, LlmError, LlmManager, LlmResult};

/// Replies used when the completion call fails
pub const FALLBACK_REPLIES: [&str; 5] = [
    "Interesting...",
    "Agreed!",
    "Hmm, makes sense.",
    "True!",
    "Good question!",
];

const PERSONA: &str = "You are taking part in a game where you must pass as a real human \
    in a casual group chat. Answer naturally, casually and like a person, never like a bot. \
    Keep it brief (two sentences at most), be conversational, use slang now and then and \
    show subtle emotion. Avoid sounding formal or robotic.";

/// One line of the transcript as the bot sees it
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub author: String,
    pub text: String,
}

/// Settings for a single oracle call
#[derive(Debug, Clone, Copy)]
pub struct OracleSettings {
    pub timeout: Duration,
    pub max_tokens: u32,
}

/// Build the user prompt embedding the transcript and the latest message
pub fn build_prompt(latest: &str, history: &[TranscriptLine]) -> String {
    let transcript = history
        .iter()
        .map(|line| format!("{}: {}", line.author, line.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Conversation so far:\n{}\n\nLatest message: {}\n\nWrite your next chat message.",
        transcript, latest
    )
}

/// Pick a reply from the fallback pool
pub fn fallback_reply() -> String {
    FALLBACK_REPLIES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(FALLBACK_REPLIES[0])
        .to_string()
}

/// Produce the bot's next line, never failing
pub async fn respond(
    llm: Option<&LlmManager>,
    settings: OracleSettings,
    latest: &str,
    history: &[TranscriptLine],
) -> String {
    let Some(llm) = llm else {
        tracing::debug!("No LLM configured, using fallback reply");
        return fallback_reply();
    };

    match complete(llm, settings, latest, history).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Oracle call failed: {}, using fallback reply", e);
            fallback_reply()
        }
    }
}

async fn complete(
    llm: &LlmManager,
    settings: OracleSettings,
    latest: &str,
    history: &[TranscriptLine],
) -> LlmResult<String> {
    let request = GenerateRequest {
        system: Some(PERSONA.to_string()),
        prompt: build_prompt(latest, history),
        max_tokens: Some(settings.max_tokens),
        timeout: settings.timeout,
    };

    // Bound the whole fall-through across providers, not just each attempt
    let response = tokio::time::timeout(settings.timeout, llm.generate_first(request))
        .await
        .map_err(|_| LlmError::Timeout(settings.timeout))??;

    let text = response.text.trim();
    if text.is_empty() {
        return Err(LlmError::ParseError("Empty completion".to_string()));
    }
    Ok(text.to_string())
}
