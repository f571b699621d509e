//! Text generation provider trait

use async_trait::async_trait;
use crate::error::Result;

/// Per-call generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
        }
    }
}

/// Trait for prompt-in, text-out generation backends
///
/// Implementations:
/// - `MistralGenerator`: Mistral HTTP API with retry and endpoint fallback
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt
    ///
    /// Fails with a backend error once the implementation's own retries are exhausted.
    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Whether the backend has the credentials it needs
    fn is_configured(&self) -> bool {
        true
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
