use super::AppState;
use crate::broadcast::{head_count, roster_for};
use crate::naming::{assign_names, shuffle_seating};
use crate::protocol::ServerMessage;
use crate::timer;
use crate::types::*;
use std::sync::Arc;

/// Humans needed to start a round
pub const HUMANS_PER_GAME: usize = 2;

/// Result of a join request
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined {
        player_id: ParticipantId,
        player_name: String,
        waiting_for_players: bool,
    },
    Full,
}

impl AppState {
    /// Add a human to the lobby, scheduling the start when the second one arrives
    pub async fn join(self: &Arc<Self>, connection_id: &str, sender: &ClientSender) -> JoinOutcome {
        let mut session = self.session.lock().await;

        if let Some(existing) = session.find_by_connection(connection_id) {
            tracing::debug!("Connection {} joined twice, re-acknowledging", connection_id);
            return JoinOutcome::Joined {
                player_id: existing.id.clone(),
                player_name: existing.lobby_name.clone(),
                waiting_for_players: session.human_count() < HUMANS_PER_GAME,
            };
        }

        let lobby_open = matches!(session.phase, Phase::Idle | Phase::Waiting);
        if !lobby_open || session.human_count() >= HUMANS_PER_GAME {
            tracing::info!(
                "Rejecting join from {}: phase {:?}, {} humans",
                connection_id,
                session.phase,
                session.human_count()
            );
            return JoinOutcome::Full;
        }

        let lobby_name = format!("Player {}", session.human_count() + 1);
        let player = Participant::human(connection_id.to_string(), lobby_name.clone(), sender);
        let player_id = player.id.clone();
        session.players.push(player);
        session.phase = Phase::Waiting;

        let count = session.human_count();
        tracing::info!("{} joined as {} ({}/{})", connection_id, player_id, count, HUMANS_PER_GAME);
        self.broadcast_to_all(head_count(count));

        if count == HUMANS_PER_GAME {
            timer::schedule_start(self, &mut session);
        }

        JoinOutcome::Joined {
            player_id,
            player_name: lobby_name,
            waiting_for_players: count < HUMANS_PER_GAME,
        }
    }

    /// Begin the round if the lobby scheduled at `generation` is still intact
    pub async fn start_game(self: &Arc<Self>, generation: u64) {
        let mut session = self.session.lock().await;

        if !session.is_current(generation, Phase::Waiting)
            || session.human_count() != HUMANS_PER_GAME
        {
            tracing::debug!("Stale start for generation {}, ignoring", generation);
            return;
        }

        let [first, second, bot_name] = assign_names(&self.config.name_pool);
        for (human, name) in session
            .players
            .iter_mut()
            .filter(|p| !p.is_bot)
            .zip([first, second])
        {
            human.display_name = Some(name);
        }

        let bot = Participant::bot(bot_name);
        session.impostor_id = Some(bot.id.clone());
        session.players.push(bot);
        shuffle_seating(&mut session.players);

        let now = chrono::Utc::now();
        session.generation += 1;
        session.phase = Phase::Active;
        session.started_at = Some(now);
        session.round_deadline = chrono::Duration::from_std(self.config.chat_duration)
            .ok()
            .map(|d| now + d);

        let time_limit = self.config.chat_duration.as_millis() as u64;
        for human in session.humans() {
            let players = roster_for(&session, human, self.config.self_label);
            if !human.send(ServerMessage::GameStarted {
                players,
                time_limit,
            }) {
                tracing::warn!("Could not deliver roster to {}", human.id);
            }
        }

        tracing::info!(
            "Game started (generation {}), names: {}",
            session.generation,
            session
                .players
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        timer::schedule_deadline(self, &mut session);
    }

    /// Close the chat when the round's deadline passes
    pub async fn expire_round(&self, generation: u64) {
        let mut session = self.session.lock().await;

        if !session.is_current(generation, Phase::Active) {
            tracing::debug!("Deadline for finished round {} ignored", generation);
            return;
        }

        session.phase = Phase::Guessing;
        tracing::info!("Time is up for round {}", generation);
        self.broadcast_to_all(ServerMessage::TimeUp);
    }

    /// Clear the session and send every human back to the join flow
    pub async fn restart(&self, connection_id: &str) {
        let mut session = self.session.lock().await;

        if session.find_by_connection(connection_id).is_none() {
            tracing::debug!("Restart from non-participant {} ignored", connection_id);
            return;
        }

        let humans = session.reset();
        tracing::info!("Game restarted by {}", connection_id);
        for human in &humans {
            human.send(ServerMessage::GameReset);
        }
    }

    /// Remove a departing connection, resetting the round if it can't continue
    pub async fn disconnect(&self, connection_id: &str) {
        let mut session = self.session.lock().await;

        let Some(index) = session
            .players
            .iter()
            .position(|p| p.is_connection(connection_id))
        else {
            return;
        };

        if session.phase.is_started() && session.human_count() - 1 < HUMANS_PER_GAME {
            // Notify the ones left behind first; the reset drops the departing player with them
            let humans = session.reset();
            tracing::info!("{} left mid-game, resetting session", connection_id);
            for human in humans.iter().filter(|h| !h.is_connection(connection_id)) {
                human.send(ServerMessage::GameReset);
            }
            return;
        }

        session.players.remove(index);
        // A pending start was scheduled for a lobby that no longer exists
        for task in session.tasks.drain(..) {
            task.abort();
        }
        session.generation += 1;

        let count = session.human_count();
        session.phase = if count == 0 {
            Phase::Idle
        } else {
            Phase::Waiting
        };
        tracing::info!("{} left the lobby ({}/{})", connection_id, count, HUMANS_PER_GAME);
        self.broadcast_to_all(head_count(count));
    }
}
