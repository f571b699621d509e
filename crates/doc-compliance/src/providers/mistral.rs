//! Mistral text generation provider

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::generation::MistralClient;

use super::llm::{GenerationOptions, TextGenerator};

/// Text generator backed by the Mistral HTTP API
pub struct MistralGenerator {
    client: Arc<MistralClient>,
}

impl MistralGenerator {
    /// Wrap a shared client
    pub fn new(client: Arc<MistralClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextGenerator for MistralGenerator {
    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.client.generate(prompt, options).await
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn name(&self) -> &str {
        "mistral"
    }
}
