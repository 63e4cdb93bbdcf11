mod chat;
mod guess;
mod session;

pub use guess::GuessOutcome;
pub use session::{JoinOutcome, HUMANS_PER_GAME};

use crate::llm::{LlmConfig, LlmManager};
use crate::oracle::OracleSettings;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Shared application state
///
/// Every handler and timer mutates the session under the one lock and runs
/// to completion before releasing it, so transitions never interleave.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    /// Broadcast channel for events every connected client receives
    pub broadcast: broadcast::Sender<ServerMessage>,
    pub config: GameConfig,
    pub llm: Option<Arc<LlmManager>>,
    pub llm_config: LlmConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default(), None, LlmConfig::default())
    }

    pub fn with_config(
        config: GameConfig,
        llm: Option<LlmManager>,
        llm_config: LlmConfig,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            broadcast: tx,
            config,
            llm: llm.map(Arc::new),
            llm_config,
        }
    }

    pub fn oracle_settings(&self) -> OracleSettings {
        OracleSettings {
            timeout: self.llm_config.default_timeout,
            max_tokens: self.llm_config.default_max_tokens,
        }
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
