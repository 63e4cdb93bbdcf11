use super::AppState;
use crate::broadcast::message_for;
use crate::oracle::{self, TranscriptLine};
use crate::timer;
use crate::types::*;
use std::sync::Arc;

impl AppState {
    /// Relay a human's chat line and schedule the impostor's answer
    pub async fn submit_message(self: &Arc<Self>, connection_id: &str, text: String) {
        let mut session = self.session.lock().await;

        if session.phase != Phase::Active {
            tracing::debug!("Chat from {} outside an active round ignored", connection_id);
            return;
        }

        let Some(author) = session.find_by_connection(connection_id).cloned() else {
            tracing::debug!("Chat from non-participant {} ignored", connection_id);
            return;
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }

        let message = ChatMessage::new(author.id.clone(), text.clone());
        session.messages.push(message.clone());
        self.relay(&session, &message, &author);

        timer::schedule_bot_reply(self, &mut session, text);
    }

    /// Snapshot the transcript for the oracle if round `generation` is still running
    pub async fn transcript(&self, generation: u64) -> Option<Vec<TranscriptLine>> {
        let session = self.session.lock().await;
        if !session.is_current(generation, Phase::Active) {
            return None;
        }

        Some(
            session
                .messages
                .iter()
                .map(|m| TranscriptLine {
                    author: session
                        .find(&m.author_id)
                        .map(|p| p.name().to_string())
                        .unwrap_or_default(),
                    text: m.text.clone(),
                })
                .collect(),
        )
    }

    /// Ask the oracle for the impostor's next line and post it
    pub async fn bot_reply(self: &Arc<Self>, generation: u64, latest: String) {
        let Some(history) = self.transcript(generation).await else {
            tracing::debug!("Round {} over before the bot replied", generation);
            return;
        };

        let text = oracle::respond(
            self.llm.as_deref(),
            self.oracle_settings(),
            &latest,
            &history,
        )
        .await;

        self.post_bot_message(generation, text).await;
    }

    /// Append the impostor's line, unless the round ended while it was thinking
    pub async fn post_bot_message(&self, generation: u64, text: String) {
        let mut session = self.session.lock().await;

        if !session.is_current(generation, Phase::Active) {
            tracing::debug!("Dropping late bot reply for round {}", generation);
            return;
        }

        let Some(bot) = session.bot().cloned() else {
            return;
        };

        let message = ChatMessage::new(bot.id.clone(), text);
        session.messages.push(message.clone());
        self.relay(&session, &message, &bot);
    }

    fn relay(&self, session: &Session, message: &ChatMessage, author: &Participant) {
        for recipient in session.humans() {
            recipient.send(message_for(
                message,
                author,
                recipient,
                self.config.self_label,
            ));
        }
    }
}
