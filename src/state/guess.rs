use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;

/// Result of a guess submission
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    Resolved { correct: bool },
    Ignored,
}

impl AppState {
    /// Resolve the round with a guess; only the first guess counts
    pub async fn submit_guess(&self, connection_id: &str, guessed_id: &str) -> GuessOutcome {
        let mut session = self.session.lock().await;

        if !session.phase.accepts_guess() {
            tracing::debug!(
                "Guess from {} in phase {:?} ignored",
                connection_id,
                session.phase
            );
            return GuessOutcome::Ignored;
        }

        let Some(guesser) = session.find_by_connection(connection_id) else {
            tracing::debug!("Guess from non-participant {} ignored", connection_id);
            return GuessOutcome::Ignored;
        };
        let Some(guessed) = session.find(guessed_id) else {
            tracing::debug!("Guess for unknown participant {} ignored", guessed_id);
            return GuessOutcome::Ignored;
        };
        let Some(impostor) = session.bot() else {
            return GuessOutcome::Ignored;
        };

        let correct = session.impostor_id.as_deref() == Some(guessed.id.as_str());
        let result = ServerMessage::GameResult {
            correct,
            impostor_id: impostor.id.clone(),
            impostor_name: impostor.name().to_string(),
            guessed_id: guessed.id.clone(),
            guessed_name: guessed.name().to_string(),
            guesser_name: guesser.name().to_string(),
        };

        tracing::info!(
            "{} guessed {}. Impostor was {}. Correct: {}",
            guesser.name(),
            guessed.name(),
            impostor.name(),
            correct
        );

        session.phase = Phase::Ended;
        self.broadcast_to_all(result);

        GuessOutcome::Resolved { correct }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn started_state() -> Arc<AppState> {
        let state = Arc::new(AppState::new());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        state.join("c1", &tx1).await;
        state.join("c2", &tx2).await;

        let generation = state.session.lock().await.generation;
        state.start_game(generation).await;
        state
    }

    #[tokio::test]
    async fn test_correct_guess_ends_round() {
        let state = started_state().await;
        let impostor = state.session.lock().await.impostor_id.clone().unwrap();

        let outcome = state.submit_guess("c1", &impostor).await;
        assert_eq!(outcome, GuessOutcome::Resolved { correct: true });
        assert_eq!(state.phase().await, Phase::Ended);
    }

    #[tokio::test]
    async fn test_guessing_a_human_is_wrong() {
        let state = started_state().await;
        let other = state
            .session
            .lock()
            .await
            .find_by_connection("c2")
            .map(|p| p.id.clone())
            .unwrap();

        let outcome = state.submit_guess("c1", &other).await;
        assert_eq!(outcome, GuessOutcome::Resolved { correct: false });
    }

    #[tokio::test]
    async fn test_second_guess_is_ignored() {
        let state = started_state().await;
        let impostor = state.session.lock().await.impostor_id.clone().unwrap();
        let mut all = state.broadcast.subscribe();

        state.submit_guess("c1", &impostor).await;
        let again = state.submit_guess("c2", &impostor).await;

        assert_eq!(again, GuessOutcome::Ignored);
        assert!(matches!(
            all.try_recv(),
            Ok(ServerMessage::GameResult { .. })
        ));
        assert!(all.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_target_is_ignored() {
        let state = started_state().await;

        let outcome = state.submit_guess("c1", "nobody").await;
        assert_eq!(outcome, GuessOutcome::Ignored);
        assert_eq!(state.phase().await, Phase::Active);
    }
}
