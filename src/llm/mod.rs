mod ollama;
mod openai;

use async_trait::async_trait;
use std::time::Duration;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request for a single completion
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Instructions for the model, sent as a system message where supported
    pub system: Option<String>,
    /// The user prompt
    pub prompt: String,
    /// Maximum response length in tokens (provider-dependent)
    pub max_tokens: Option<u32>,
    /// Timeout for the request
    pub timeout: Duration,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text
    pub text: String,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub provider: String,
    pub model: String,
    /// Tokens consumed (if available)
    pub tokens_used: Option<u32>,
    pub latency_ms: u64,
}

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Ordered set of configured providers
pub struct LlmManager {
    pub providers: Vec<Box<dyn LlmProvider>>,
}

impl LlmManager {
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// Try providers in configuration order and return the first success
    pub async fn generate_first(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let mut last_error = LlmError::ConfigError("No LLM providers configured".to_string());

        for provider in &self.providers {
            match provider.generate(request.clone()).await {
                Ok(response) => {
                    tracing::debug!(
                        "Provider {} answered in {}ms (model {}, tokens {:?})",
                        response.metadata.provider,
                        response.metadata.latency_ms,
                        response.metadata.model,
                        response.metadata.tokens_used
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", provider.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Ollama base URL
    pub ollama_base_url: Option<String>,
    pub ollama_model: String,
    /// Upper bound on a single oracle call
    pub default_timeout: Duration,
    /// Max tokens for a chat reply
    pub default_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: Some("http://localhost:11434".to_string()),
            ollama_model: "llama3.2".to_string(),
            default_timeout: Duration::from_secs(10),
            default_max_tokens: 100,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // An explicitly empty OLLAMA_BASE_URL disables Ollama
        let ollama_base_url = match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) => {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(_) => defaults.ollama_base_url,
        };

        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_model: non_empty_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            ollama_base_url,
            ollama_model: non_empty_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            default_timeout: non_empty_env("LLM_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_timeout),
            default_max_tokens: non_empty_env("LLM_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_max_tokens),
        }
    }

    /// Build an LlmManager with all configured providers
    pub fn build_manager(&self) -> LlmResult<LlmManager> {
        let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

        if let Some(api_key) = &self.openai_api_key {
            providers.push(Box::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Box::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )?));
        }

        if providers.is_empty() {
            return Err(LlmError::ConfigError(
                "No LLM providers configured. Set OPENAI_API_KEY or OLLAMA_BASE_URL".to_string(),
            ));
        }

        Ok(LlmManager::new(providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Failing;

    #[async_trait]
    impl LlmProvider for Failing {
        async fn generate(&self, _request: GenerateRequest) -> LlmResult<GenerateResponse> {
            Err(LlmError::ApiError("boom".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl LlmProvider for Counting {
        async fn generate(&self, _request: GenerateRequest) -> LlmResult<GenerateResponse> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(GenerateResponse {
                text: "hey".to_string(),
                metadata: ResponseMetadata {
                    provider: "counting".to_string(),
                    model: "test".to_string(),
                    tokens_used: None,
                    latency_ms: 0,
                },
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            system: None,
            prompt: "hi".to_string(),
            max_tokens: Some(10),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.ollama_model, "llama3.2");
        assert_eq!(config.default_timeout, Duration::from_secs(10));
        assert_eq!(config.default_max_tokens, 100);
    }

    #[test]
    #[serial]
    fn test_empty_ollama_url_disables_provider() {
        std::env::set_var("OLLAMA_BASE_URL", "  ");
        std::env::remove_var("OPENAI_API_KEY");
        let config = LlmConfig::from_env();
        std::env::remove_var("OLLAMA_BASE_URL");

        assert!(config.ollama_base_url.is_none());
        assert!(config.build_manager().is_err());
    }

    #[test]
    #[serial]
    fn test_timeout_from_env() {
        std::env::set_var("LLM_TIMEOUT", "3");
        let config = LlmConfig::from_env();
        std::env::remove_var("LLM_TIMEOUT");

        assert_eq!(config.default_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_generate_first_falls_through_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = LlmManager::new(vec![
            Box::new(Failing),
            Box::new(Counting(calls.clone())),
            Box::new(Counting(calls.clone())),
        ]);

        let response = manager.generate_first(request()).await.unwrap();
        assert_eq!(response.text, "hey");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_first_without_providers_errors() {
        let manager = LlmManager::new(Vec::new());
        let result = manager.generate_first(request()).await;
        assert!(matches!(result, Err(LlmError::ConfigError(_))));
    }
}
