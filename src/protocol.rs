use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinGame,
    SendMessage {
        message: String,
    },
    MakeGuess {
        guessed_id: ParticipantId,
    },
    RestartGame,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent to a connection whose join was accepted
    Joined {
        player_id: ParticipantId,
        player_name: String,
        waiting_for_players: bool,
    },
    /// Head-count update, sent to every connected client
    PlayerJoined {
        player_count: usize,
        need_players: usize,
    },
    GameFull,
    /// Personalised roster, one copy per human
    GameStarted {
        players: Vec<RosterEntry>,
        /// Chat duration in milliseconds
        time_limit: u64,
    },
    /// Personalised chat line, one copy per human
    NewMessage {
        id: MessageId,
        player_id: ParticipantId,
        player_name: String,
        text: String,
        timestamp: String,
    },
    TimeUp,
    GameResult {
        correct: bool,
        #[serde(rename = "cabuetaId")]
        impostor_id: ParticipantId,
        #[serde(rename = "cabuetaName")]
        impostor_name: String,
        guessed_id: ParticipantId,
        guessed_name: String,
        guesser_name: String,
    },
    /// Tells a client to go back through the join flow
    GameReset,
    Error {
        code: String,
        msg: String,
    },
}

/// One roster line as seen by a specific recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub name: String,
    pub id: ParticipantId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_parse_camel_case() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"sendMessage","message":"hi"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SendMessage {
                message: "hi".to_string()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"makeGuess","guessedId":"abc"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MakeGuess {
                guessed_id: "abc".to_string()
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"joinGame"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinGame);
    }

    #[test]
    fn test_unknown_client_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"kickPlayer"}"#).is_err());
    }

    #[test]
    fn test_game_result_uses_legacy_impostor_field_names() {
        let msg = ServerMessage::GameResult {
            correct: true,
            impostor_id: "bot".to_string(),
            impostor_name: "Carol".to_string(),
            guessed_id: "bot".to_string(),
            guessed_name: "Carol".to_string(),
            guesser_name: "Alex".to_string(),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["t"], "gameResult");
        assert_eq!(json["cabuetaId"], "bot");
        assert_eq!(json["cabuetaName"], "Carol");
        assert_eq!(json["guessedName"], "Carol");
        assert_eq!(json["guesserName"], "Alex");
    }

    #[test]
    fn test_new_message_wire_shape() {
        let msg = ServerMessage::NewMessage {
            id: "m1".to_string(),
            player_id: "p1".to_string(),
            player_name: "You".to_string(),
            text: "hello".to_string(),
            timestamp: "12:00:00".to_string(),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["t"], "newMessage");
        assert_eq!(json["playerId"], "p1");
        assert_eq!(json["playerName"], "You");
    }
}
