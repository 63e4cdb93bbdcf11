//! Outbound routing and per-recipient views
//!
//! Canonical session state is never serialised directly. Anything naming a
//! participant goes through a projection for a specific recipient, which
//! renders the recipient as the self label and everyone else (the bot
//! included) by display name only.

use crate::protocol::{RosterEntry, ServerMessage};
use crate::state::{AppState, HUMANS_PER_GAME};
use crate::types::*;

impl AppState {
    /// Send to every connected client, joined or not
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }
}

/// How `subject` is labelled in `recipient`'s view
pub fn view_name(subject: &Participant, recipient: &Participant, self_label: &str) -> String {
    if subject.id == recipient.id {
        self_label.to_string()
    } else {
        subject.name().to_string()
    }
}

/// Roster as `recipient` sees it, in seating order
pub fn roster_for(session: &Session, recipient: &Participant, self_label: &str) -> Vec<RosterEntry> {
    session
        .players
        .iter()
        .map(|p| RosterEntry {
            name: view_name(p, recipient, self_label),
            id: p.id.clone(),
        })
        .collect()
}

/// A chat line as `recipient` sees it
pub fn message_for(
    message: &ChatMessage,
    author: &Participant,
    recipient: &Participant,
    self_label: &str,
) -> ServerMessage {
    ServerMessage::NewMessage {
        id: message.id.clone(),
        player_id: message.author_id.clone(),
        player_name: view_name(author, recipient, self_label),
        text: message.text.clone(),
        timestamp: message.timestamp.clone(),
    }
}

/// Lobby head-count, identical for everyone
pub fn head_count(count: usize) -> ServerMessage {
    ServerMessage::PlayerJoined {
        player_count: count,
        need_players: HUMANS_PER_GAME.saturating_sub(count),
    }
}
