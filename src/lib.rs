// Public API for integration tests and potential library usage

pub mod broadcast;
pub mod config;
pub mod llm;
pub mod naming;
pub mod oracle;
pub mod protocol;
pub mod state;
pub mod timer;
pub mod types;
pub mod ws;
