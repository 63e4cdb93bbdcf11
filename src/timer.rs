//! Scheduled tasks for the session
//!
//! Each task captures the session generation it was scheduled in and hands
//! it back to the state machine, which ignores it if the round has moved on.
//! Abort handles are kept on the session so a reset cancels everything
//! still pending.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;
use crate::types::Session;

/// Start the game once both clients have had time to render the lobby
pub fn schedule_start(state: &Arc<AppState>, session: &mut Session) {
    let generation = session.generation;
    let delay = state.config.start_delay;
    let state = state.clone();

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.start_game(generation).await;
    });
    session.tasks.push(handle.abort_handle());
}

/// Close the chat when the round deadline passes
pub fn schedule_deadline(state: &Arc<AppState>, session: &mut Session) {
    let generation = session.generation;
    let delay = state.config.chat_duration;
    let state = state.clone();

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.expire_round(generation).await;
    });
    session.tasks.push(handle.abort_handle());
}

/// Let the impostor answer `latest` after a human-looking pause
pub fn schedule_bot_reply(state: &Arc<AppState>, session: &mut Session, latest: String) {
    let generation = session.generation;
    let delay = reply_delay(state.config.reply_delay_min, state.config.reply_delay_max);
    let state = state.clone();

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.bot_reply(generation, latest).await;
    });
    session.tasks.push(handle.abort_handle());
}

/// Uniform delay in `[min, max)`
pub fn reply_delay(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rand::rng().random_range(min_ms..max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_delay_within_bounds() {
        let min = Duration::from_millis(1500);
        let max = Duration::from_millis(3500);
        for _ in 0..200 {
            let delay = reply_delay(min, max);
            assert!(delay >= min);
            assert!(delay < max);
        }
    }

    #[test]
    fn test_reply_delay_degenerate_range() {
        let min = Duration::from_millis(10);
        assert_eq!(reply_delay(min, min), min);
    }
}
