use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::protocol::ServerMessage;

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type ParticipantId = String;
pub type MessageId = String;

/// Outbound half of a live connection
pub type ClientSender = mpsc::UnboundedSender<ServerMessage>;

/// Weak handle to a live connection, held by the session
pub type WeakClientSender = mpsc::WeakUnboundedSender<ServerMessage>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No players
    #[default]
    Idle,
    /// One or two humans joined, game not started yet
    Waiting,
    /// Chat round running
    Active,
    /// Chat closed by the deadline, waiting for a guess
    Guessing,
    /// A guess has been resolved
    Ended,
}

impl Phase {
    /// Whether the current round has started (roster and impostor assigned)
    pub fn is_started(self) -> bool {
        matches!(self, Phase::Active | Phase::Guessing | Phase::Ended)
    }

    /// Whether a guess may still be submitted
    pub fn accepts_guess(self) -> bool {
        matches!(self, Phase::Active | Phase::Guessing)
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub chat_duration: Duration,
    pub start_delay: Duration,
    pub reply_delay_min: Duration,
    pub reply_delay_max: Duration,
    pub name_pool: [&'static str; 3],
    pub self_label: &'static str,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            chat_duration: Duration::from_secs(60),
            start_delay: Duration::from_millis(1000),
            reply_delay_min: Duration::from_millis(1500),
            reply_delay_max: Duration::from_millis(3500),
            name_pool: ["Alex", "Bruno", "Carol"],
            self_label: "You",
        }
    }
}

/// A human or the bot
#[derive(Debug, Clone)]
pub struct Participant {
    /// Public id, the only one clients ever see
    pub id: ParticipantId,
    /// Routing id of the owning connection (None for the bot)
    pub connection_id: Option<ConnectionId>,
    /// Provisional label used while waiting ("Player 1")
    pub lobby_name: String,
    /// Assigned at game start from the shuffled name pool
    pub display_name: Option<String>,
    pub is_bot: bool,
    pub sender: Option<WeakClientSender>,
}

impl Participant {
    pub fn human(connection_id: ConnectionId, lobby_name: String, sender: &ClientSender) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            connection_id: Some(connection_id),
            lobby_name,
            display_name: None,
            is_bot: false,
            sender: Some(sender.downgrade()),
        }
    }

    pub fn bot(display_name: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            connection_id: None,
            lobby_name: String::new(),
            display_name: Some(display_name),
            is_bot: true,
            sender: None,
        }
    }

    /// Display name, falling back to the lobby label before start
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.lobby_name)
    }

    pub fn is_connection(&self, connection_id: &str) -> bool {
        self.connection_id.as_deref() == Some(connection_id)
    }

    /// Deliver a message if the connection is still alive
    pub fn send(&self, msg: ServerMessage) -> bool {
        match self.sender.as_ref().and_then(|weak| weak.upgrade()) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author_id: ParticipantId,
    pub text: String,
    /// Wall-clock display string (HH:MM:SS)
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(author_id: ParticipantId, text: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            author_id,
            text,
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// The single game instance
#[derive(Debug, Default)]
pub struct Session {
    pub players: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
    pub phase: Phase,
    pub impostor_id: Option<ParticipantId>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub round_deadline: Option<chrono::DateTime<chrono::Utc>>,
    /// Bumped on every start and reset; scheduled tasks compare against it
    pub generation: u64,
    pub tasks: Vec<AbortHandle>,
}

impl Session {
    pub fn humans(&self) -> impl Iterator<Item = &Participant> {
        self.players.iter().filter(|p| !p.is_bot)
    }

    pub fn human_count(&self) -> usize {
        self.humans().count()
    }

    pub fn bot(&self) -> Option<&Participant> {
        self.players.iter().find(|p| p.is_bot)
    }

    pub fn find(&self, id: &str) -> Option<&Participant> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn find_by_connection(&self, connection_id: &str) -> Option<&Participant> {
        self.players.iter().find(|p| p.is_connection(connection_id))
    }

    /// Whether a task scheduled at `generation` may still act in `phase`
    pub fn is_current(&self, generation: u64, phase: Phase) -> bool {
        self.generation == generation && self.phase == phase
    }

    /// Drop all state and cancel pending timers, returning the humans that were present
    pub fn reset(&mut self) -> Vec<Participant> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        let generation = self.generation + 1;
        let previous = std::mem::take(self);
        self.generation = generation;
        previous.players.into_iter().filter(|p| !p.is_bot).collect()
    }
}
