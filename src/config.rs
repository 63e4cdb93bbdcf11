//! Process configuration loaded from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::types::GameConfig;

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Directory served for everything that isn't the websocket
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from BIND_ADDR, PORT and STATIC_DIR
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: parsed_env("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed_env("PORT").unwrap_or(defaults.port),
            static_dir: env_string("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl GameConfig {
    /// Load timings from CHAT_SECONDS, START_DELAY_MS, REPLY_DELAY_MIN_MS and REPLY_DELAY_MAX_MS
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let chat_duration = parsed_env("CHAT_SECONDS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.chat_duration);
        let start_delay = parsed_env("START_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.start_delay);
        let reply_delay_min = parsed_env("REPLY_DELAY_MIN_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.reply_delay_min);
        let mut reply_delay_max = parsed_env("REPLY_DELAY_MAX_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.reply_delay_max);

        if reply_delay_max <= reply_delay_min {
            tracing::warn!(
                "REPLY_DELAY_MAX_MS must exceed REPLY_DELAY_MIN_MS, using {:?}",
                reply_delay_min + Duration::from_millis(1)
            );
            reply_delay_max = reply_delay_min + Duration::from_millis(1);
        }

        Self {
            chat_duration,
            start_delay,
            reply_delay_min,
            reply_delay_max,
            ..defaults
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_defaults() {
        std::env::remove_var("PORT");
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("STATIC_DIR");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_bad_port_falls_back() {
        std::env::set_var("PORT", "not-a-port");
        let config = ServerConfig::from_env();
        std::env::remove_var("PORT");

        assert_eq!(config.port, 3000);
    }

    #[test]
    #[serial]
    fn test_game_timings_from_env() {
        std::env::set_var("CHAT_SECONDS", "30");
        std::env::set_var("REPLY_DELAY_MIN_MS", "500");
        std::env::set_var("REPLY_DELAY_MAX_MS", "100");
        let config = GameConfig::from_env();
        std::env::remove_var("CHAT_SECONDS");
        std::env::remove_var("REPLY_DELAY_MIN_MS");
        std::env::remove_var("REPLY_DELAY_MAX_MS");

        assert_eq!(config.chat_duration, Duration::from_secs(30));
        assert_eq!(config.start_delay, Duration::from_millis(1000));
        assert!(config.reply_delay_max > config.reply_delay_min);
        assert_eq!(config.name_pool, ["Alex", "Bruno", "Carol"]);
    }
}
