//! WebSocket message dispatch
//!
//! Maps client events onto the session state machine. Only join produces a
//! direct reply; everything else reaches clients through the router.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, GuessOutcome, JoinOutcome};
use std::sync::Arc;

use super::Connection;

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    connection: &Connection,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::JoinGame => match state.join(&connection.id, &connection.sender).await {
            JoinOutcome::Joined {
                player_id,
                player_name,
                waiting_for_players,
            } => Some(ServerMessage::Joined {
                player_id,
                player_name,
                waiting_for_players,
            }),
            JoinOutcome::Full => Some(ServerMessage::GameFull),
        },

        ClientMessage::SendMessage { message } => {
            state.submit_message(&connection.id, message).await;
            None
        }

        ClientMessage::MakeGuess { guessed_id } => {
            if let GuessOutcome::Resolved { correct } =
                state.submit_guess(&connection.id, &guessed_id).await
            {
                tracing::debug!("Round resolved by {} (correct: {})", connection.id, correct);
            }
            None
        }

        ClientMessage::RestartGame => {
            state.restart(&connection.id).await;
            None
        }
    }
}
